use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use domain::{
    Address, CatalogService, DeliveryInfo, MenuItem, MenuItemQuery, NutritionalInfo,
    OpeningHours, Restaurant,
};
use serde::Deserialize;

use crate::error::ApiError;

#[derive(Clone)]
pub struct CatalogState {
    pub service: Arc<CatalogService>,
}

#[derive(Debug, Deserialize)]
pub struct RestaurantRequest {
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub address: Address,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    #[serde(default)]
    pub cuisine_types: Vec<String>,
    pub opening_hours: Option<OpeningHours>,
    pub delivery_info: Option<DeliveryInfo>,
}

impl From<RestaurantRequest> for Restaurant {
    fn from(payload: RestaurantRequest) -> Self {
        let mut restaurant = Restaurant::new(payload.name, payload.address);
        restaurant.description = payload.description;
        restaurant.image_url = payload.image_url;
        restaurant.phone = payload.phone;
        restaurant.email = payload.email;
        restaurant.website = payload.website;
        restaurant.cuisine_types = payload.cuisine_types;
        restaurant.opening_hours = payload.opening_hours;
        restaurant.delivery_info = payload.delivery_info;
        restaurant
    }
}

#[derive(Debug, Deserialize)]
pub struct MenuItemRequest {
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub category: Option<String>,
    pub image_url: Option<String>,
    #[serde(default = "default_true")]
    pub is_available: bool,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub allergen_info: Vec<String>,
    pub nutritional_info: Option<NutritionalInfo>,
}

fn default_true() -> bool {
    true
}

impl MenuItemRequest {
    fn into_item(self, restaurant_id: String) -> MenuItem {
        let mut item = MenuItem::new(restaurant_id, self.name, self.price);
        item.description = self.description;
        item.category = self.category;
        item.image_url = self.image_url;
        item.is_available = self.is_available;
        item.ingredients = self.ingredients;
        item.allergen_info = self.allergen_info;
        item.nutritional_info = self.nutritional_info;
        item
    }
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub size: i64,
}

fn default_page_size() -> i64 {
    10
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub query: String,
}

#[derive(Debug, Deserialize)]
pub struct MenuParams {
    #[serde(default)]
    pub available_only: bool,
}

#[derive(Debug, Deserialize)]
pub struct MenuSearchParams {
    pub category: Option<String>,
    pub max_price: Option<f64>,
    pub exclude_allergen: Option<String>,
}

pub fn router(state: CatalogState) -> Router {
    Router::new()
        .route("/api/restaurants", get(list_restaurants).post(create_restaurant))
        .route("/api/restaurants/search", get(search_restaurants))
        .route("/api/restaurants/cuisine/:cuisine", get(restaurants_by_cuisine))
        .route("/api/restaurants/city/:city", get(restaurants_by_city))
        .route("/api/restaurants/rating/:min_rating", get(restaurants_by_rating))
        .route("/api/restaurants/cuisines", post(restaurants_by_cuisines))
        .route(
            "/api/restaurants/:id",
            get(get_restaurant).put(update_restaurant).delete(delete_restaurant),
        )
        .route(
            "/api/restaurants/:id/menu",
            get(restaurant_menu).post(create_menu_item),
        )
        .route("/api/menu-items/search", get(search_menu_items))
        .route(
            "/api/menu-items/:id",
            get(get_menu_item).put(update_menu_item).delete(delete_menu_item),
        )
        .route("/api/restaurants/health", get(health))
        .with_state(state)
}

async fn create_restaurant(
    State(state): State<CatalogState>,
    Json(payload): Json<RestaurantRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let restaurant = state.service.create_restaurant(payload.into()).await?;
    Ok((StatusCode::CREATED, Json(restaurant)))
}

async fn list_restaurants(
    State(state): State<CatalogState>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let size = params.size.clamp(1, 100);
    let offset = params.page.max(0) * size;
    let restaurants = state.service.list_active(offset, size).await?;
    Ok(Json(restaurants))
}

async fn get_restaurant(
    State(state): State<CatalogState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let restaurant = state.service.get_restaurant(&id).await?;
    Ok(Json(restaurant))
}

async fn update_restaurant(
    State(state): State<CatalogState>,
    Path(id): Path<String>,
    Json(payload): Json<RestaurantRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let restaurant = state.service.update_restaurant(&id, payload.into()).await?;
    Ok(Json(restaurant))
}

async fn delete_restaurant(
    State(state): State<CatalogState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.service.deactivate_restaurant(&id).await?;
    Ok(Json(serde_json::json!({
        "message": "Restaurant deactivated successfully"
    })))
}

async fn search_restaurants(
    State(state): State<CatalogState>,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, ApiError> {
    let restaurants = state.service.search_restaurants(&params.query).await?;
    Ok(Json(restaurants))
}

async fn restaurants_by_cuisine(
    State(state): State<CatalogState>,
    Path(cuisine): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let restaurants = state.service.restaurants_by_cuisine(&cuisine).await?;
    Ok(Json(restaurants))
}

async fn restaurants_by_city(
    State(state): State<CatalogState>,
    Path(city): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let restaurants = state.service.restaurants_by_city(&city).await?;
    Ok(Json(restaurants))
}

async fn restaurants_by_rating(
    State(state): State<CatalogState>,
    Path(min_rating): Path<f64>,
) -> Result<impl IntoResponse, ApiError> {
    let restaurants = state.service.restaurants_by_min_rating(min_rating).await?;
    Ok(Json(restaurants))
}

async fn restaurants_by_cuisines(
    State(state): State<CatalogState>,
    Json(cuisines): Json<Vec<String>>,
) -> Result<impl IntoResponse, ApiError> {
    let restaurants = state.service.restaurants_by_cuisines(&cuisines).await?;
    Ok(Json(restaurants))
}

async fn create_menu_item(
    State(state): State<CatalogState>,
    Path(restaurant_id): Path<String>,
    Json(payload): Json<MenuItemRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let item = state
        .service
        .add_menu_item(payload.into_item(restaurant_id))
        .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

async fn restaurant_menu(
    State(state): State<CatalogState>,
    Path(restaurant_id): Path<String>,
    Query(params): Query<MenuParams>,
) -> Result<impl IntoResponse, ApiError> {
    let items = state
        .service
        .menu_for_restaurant(&restaurant_id, params.available_only)
        .await?;
    Ok(Json(items))
}

async fn get_menu_item(
    State(state): State<CatalogState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let item = state.service.get_menu_item(&id).await?;
    Ok(Json(item))
}

async fn update_menu_item(
    State(state): State<CatalogState>,
    Path(id): Path<String>,
    Json(payload): Json<MenuItemRequest>,
) -> Result<impl IntoResponse, ApiError> {
    // restaurant_id is taken from the stored row, not the payload
    let item = state
        .service
        .update_menu_item(&id, payload.into_item(String::new()))
        .await?;
    Ok(Json(item))
}

async fn delete_menu_item(
    State(state): State<CatalogState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.service.remove_menu_item(&id).await?;
    Ok(Json(serde_json::json!({
        "message": "Menu item removed successfully"
    })))
}

async fn search_menu_items(
    State(state): State<CatalogState>,
    Query(params): Query<MenuSearchParams>,
) -> Result<impl IntoResponse, ApiError> {
    let items = state
        .service
        .search_menu_items(&MenuItemQuery {
            category: params.category,
            max_price: params.max_price,
            exclude_allergen: params.exclude_allergen,
        })
        .await?;
    Ok(Json(items))
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "UP",
        "service": "catalog-service",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}
