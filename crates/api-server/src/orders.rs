use std::sync::Arc;

use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use domain::{
    AuthTokens, Claims, DeliveryAddress, DomainError, Order, OrderItem, OrderService,
    OrderStatus, UserRole,
};
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::error::ApiError;

#[derive(Clone)]
pub struct OrderState {
    pub service: Arc<OrderService>,
    pub tokens: AuthTokens,
}

impl FromRef<OrderState> for AuthTokens {
    fn from_ref(state: &OrderState) -> AuthTokens {
        state.tokens.clone()
    }
}

#[derive(Debug, Deserialize)]
pub struct OrderItemRequest {
    pub menu_item_id: String,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub quantity: i32,
    pub special_instructions: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub restaurant_id: String,
    pub items: Vec<OrderItemRequest>,
    pub total_amount: f64,
    #[serde(default)]
    pub delivery_fee: f64,
    #[serde(default)]
    pub tax_amount: f64,
    pub delivery_address: Option<DeliveryAddress>,
    pub special_instructions: Option<String>,
    pub estimated_delivery_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: String,
}

/// Owner-or-staff rule shared by the per-order endpoints.
fn ensure_can_access(claims: &Claims, owner_id: &str) -> Result<(), ApiError> {
    if claims.user_id() != owner_id && !claims.is_staff() {
        return Err(ApiError(DomainError::Forbidden(
            "You can only access your own orders".to_string(),
        )));
    }
    Ok(())
}

/// Restaurant-level views are open to admins and restaurant owners.
fn ensure_staff(claims: &Claims) -> Result<(), ApiError> {
    if !claims.is_staff() {
        return Err(ApiError(DomainError::Forbidden(
            "Staff privileges required".to_string(),
        )));
    }
    Ok(())
}

/// Platform-wide listings and statistics are admin only.
fn ensure_admin(claims: &Claims) -> Result<(), ApiError> {
    if claims.role != UserRole::Admin {
        return Err(ApiError(DomainError::Forbidden(
            "Admin privileges required".to_string(),
        )));
    }
    Ok(())
}

pub fn router(state: OrderState) -> Router {
    Router::new()
        .route("/api/orders", get(list_orders).post(create_order))
        .route("/api/orders/my-orders", get(my_orders))
        .route("/api/orders/recent", get(recent_orders))
        .route("/api/orders/stats", get(order_stats))
        .route("/api/orders/user/:user_id", get(orders_by_user))
        .route("/api/orders/restaurant/:restaurant_id", get(orders_by_restaurant))
        .route("/api/orders/status/:status", get(orders_by_status))
        .route("/api/orders/:id", get(get_order).delete(cancel_order))
        .route("/api/orders/:id/status", put(update_order_status))
        .route("/api/orders/:id/events", get(order_events))
        .route("/api/orders/health", get(health))
        .with_state(state)
}

async fn create_order(
    State(state): State<OrderState>,
    AuthUser(claims): AuthUser,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    // The caller's identity comes from the token, never the payload
    let mut order = Order::new(
        claims.user_id().to_string(),
        payload.restaurant_id,
        payload.total_amount,
    );
    order.delivery_fee = payload.delivery_fee;
    order.tax_amount = payload.tax_amount;
    order.delivery_address = payload.delivery_address;
    order.special_instructions = payload.special_instructions;
    order.estimated_delivery_time = payload.estimated_delivery_time;
    order.items = payload
        .items
        .into_iter()
        .map(|item| {
            let mut line = OrderItem::new(item.menu_item_id, item.name, item.price, item.quantity);
            line.description = item.description;
            line.special_instructions = item.special_instructions;
            line
        })
        .collect();

    let created = state.service.create_order(order).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn list_orders(
    State(state): State<OrderState>,
    AuthUser(claims): AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    ensure_admin(&claims)?;
    let orders = state.service.list_all().await?;
    Ok(Json(orders))
}

async fn my_orders(
    State(state): State<OrderState>,
    AuthUser(claims): AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let orders = state.service.orders_for_user(claims.user_id()).await?;
    Ok(Json(orders))
}

async fn get_order(
    State(state): State<OrderState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let order = state.service.get_order(&id).await?;
    ensure_can_access(&claims, &order.user_id)?;
    Ok(Json(order))
}

async fn orders_by_user(
    State(state): State<OrderState>,
    AuthUser(claims): AuthUser,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    ensure_can_access(&claims, &user_id)?;
    let orders = state.service.orders_for_user(&user_id).await?;
    Ok(Json(orders))
}

async fn orders_by_restaurant(
    State(state): State<OrderState>,
    AuthUser(claims): AuthUser,
    Path(restaurant_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    ensure_staff(&claims)?;
    let orders = state.service.orders_for_restaurant(&restaurant_id).await?;
    Ok(Json(orders))
}

async fn orders_by_status(
    State(state): State<OrderState>,
    AuthUser(claims): AuthUser,
    Path(status): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    ensure_admin(&claims)?;
    let status: OrderStatus = status.parse()?;
    let orders = state.service.orders_with_status(status).await?;
    Ok(Json(orders))
}

async fn recent_orders(
    State(state): State<OrderState>,
    AuthUser(claims): AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    ensure_admin(&claims)?;
    let orders = state.service.recent_orders().await?;
    Ok(Json(orders))
}

async fn update_order_status(
    State(state): State<OrderState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<StatusUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let order = state.service.get_order(&id).await?;
    ensure_can_access(&claims, &order.user_id)?;

    let new_status: OrderStatus = payload.status.parse()?;
    let updated = state.service.update_status(&id, new_status).await?;
    Ok(Json(updated))
}

async fn cancel_order(
    State(state): State<OrderState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let order = state.service.get_order(&id).await?;
    ensure_can_access(&claims, &order.user_id)?;

    let cancelled = state.service.cancel_order(&id).await?;
    Ok(Json(cancelled))
}

async fn order_events(
    State(state): State<OrderState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let order = state.service.get_order(&id).await?;
    ensure_can_access(&claims, &order.user_id)?;

    let events = state.service.events_for(&id).await?;
    Ok(Json(events))
}

async fn order_stats(
    State(state): State<OrderState>,
    AuthUser(claims): AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    ensure_admin(&claims)?;
    let counts = state.service.stats().await?;
    Ok(Json(serde_json::json!({
        "totalOrders": counts.total,
        "pendingOrders": counts.pending,
        "confirmedOrders": counts.confirmed,
        "deliveredOrders": counts.delivered,
    })))
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "UP",
        "service": "order-service",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}
