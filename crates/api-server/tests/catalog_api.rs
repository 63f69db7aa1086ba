use std::sync::Arc;

use api_server::catalog::{router, CatalogState};
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use domain::{CatalogService, EventPublisher};
use infrastructure::{InMemoryBroker, MemoryMenuItemRepository, MemoryRestaurantRepository};
use serde_json::{json, Value};
use tower::ServiceExt;

fn app() -> Router {
    let broker = Arc::new(InMemoryBroker::new());
    let service = Arc::new(CatalogService::new(
        Arc::new(MemoryRestaurantRepository::new()),
        Arc::new(MemoryMenuItemRepository::new()),
        broker as Arc<dyn EventPublisher>,
    ));
    router(CatalogState { service })
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn restaurant_payload(name: &str) -> Value {
    json!({
        "name": name,
        "address": {
            "street": "1 Market St",
            "city": "San Francisco",
            "state": "CA",
            "zip_code": "94105",
            "country": "USA"
        },
        "cuisine_types": ["Japanese"]
    })
}

async fn create_restaurant(app: &Router, name: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/restaurants",
        Some(restaurant_payload(name)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn create_returns_created_with_id() {
    let app = app();
    let (status, body) = send(
        &app,
        "POST",
        "/api/restaurants",
        Some(restaurant_payload("Noodle Bar")),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(body["id"].is_string());
    assert_eq!(body["is_active"], json!(true));
}

#[tokio::test]
async fn invalid_phone_is_a_bad_request() {
    let app = app();
    let mut payload = restaurant_payload("Noodle Bar");
    payload["phone"] = json!("phone-home");

    let (status, body) = send(&app, "POST", "/api/restaurants", Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("phone"));
}

#[tokio::test]
async fn invalid_zip_is_a_bad_request() {
    let app = app();
    let mut payload = restaurant_payload("Noodle Bar");
    payload["address"]["zip_code"] = json!("941");

    let (status, _) = send(&app, "POST", "/api/restaurants", Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_restaurant_is_not_found() {
    let app = app();
    let (status, _) = send(&app, "GET", "/api/restaurants/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_deactivates_instead_of_removing() {
    let app = app();
    let id = create_restaurant(&app, "Noodle Bar").await;

    let (status, _) = send(&app, "DELETE", &format!("/api/restaurants/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);

    // Still fetchable by id, but gone from the active listing
    let (status, body) = send(&app, "GET", &format!("/api/restaurants/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_active"], json!(false));

    let (_, listing) = send(&app, "GET", "/api/restaurants", None).await;
    assert!(listing.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn listing_pages_by_name() {
    let app = app();
    create_restaurant(&app, "Banh Mi House").await;
    create_restaurant(&app, "Arepa Corner").await;
    create_restaurant(&app, "Curry Leaf").await;

    let (status, page) = send(&app, "GET", "/api/restaurants?page=0&size=2", None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = page
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Arepa Corner", "Banh Mi House"]);

    let (_, page) = send(&app, "GET", "/api/restaurants?page=1&size=2", None).await;
    assert_eq!(page.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn search_matches_name_substring() {
    let app = app();
    create_restaurant(&app, "Noodle Bar").await;
    create_restaurant(&app, "Taco Truck").await;

    let (status, results) = send(&app, "GET", "/api/restaurants/search?query=noodle", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(results.as_array().unwrap().len(), 1);
    assert_eq!(results[0]["name"], json!("Noodle Bar"));
}

#[tokio::test]
async fn menu_item_requires_positive_price_and_existing_restaurant() {
    let app = app();
    let id = create_restaurant(&app, "Noodle Bar").await;

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/restaurants/{}/menu", id),
        Some(json!({"name": "Ramen", "price": 0.0})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/api/restaurants/nope/menu",
        Some(json!({"name": "Ramen", "price": 12.0})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/restaurants/{}/menu", id),
        Some(json!({"name": "Ramen", "price": 12.0})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["popularity"], json!(0));
}

#[tokio::test]
async fn menu_listing_can_filter_to_available_items() {
    let app = app();
    let id = create_restaurant(&app, "Noodle Bar").await;

    send(
        &app,
        "POST",
        &format!("/api/restaurants/{}/menu", id),
        Some(json!({"name": "Ramen", "price": 12.0})),
    )
    .await;
    send(
        &app,
        "POST",
        &format!("/api/restaurants/{}/menu", id),
        Some(json!({"name": "Gyoza", "price": 6.0, "is_available": false})),
    )
    .await;

    let (_, all) = send(&app, "GET", &format!("/api/restaurants/{}/menu", id), None).await;
    assert_eq!(all.as_array().unwrap().len(), 2);

    let (_, available) = send(
        &app,
        "GET",
        &format!("/api/restaurants/{}/menu?available_only=true", id),
        None,
    )
    .await;
    assert_eq!(available.as_array().unwrap().len(), 1);
    assert_eq!(available[0]["name"], json!("Ramen"));
}

#[tokio::test]
async fn menu_search_excludes_allergens_and_caps_price() {
    let app = app();
    let id = create_restaurant(&app, "Noodle Bar").await;

    send(
        &app,
        "POST",
        &format!("/api/restaurants/{}/menu", id),
        Some(json!({"name": "Pad Thai", "price": 14.0, "allergen_info": ["Peanuts"]})),
    )
    .await;
    send(
        &app,
        "POST",
        &format!("/api/restaurants/{}/menu", id),
        Some(json!({"name": "Miso Soup", "price": 5.0})),
    )
    .await;

    let (status, results) = send(
        &app,
        "GET",
        "/api/menu-items/search?exclude_allergen=peanuts",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(results.as_array().unwrap().len(), 1);
    assert_eq!(results[0]["name"], json!("Miso Soup"));

    let (_, results) = send(&app, "GET", "/api/menu-items/search?max_price=10", None).await;
    assert_eq!(results.as_array().unwrap().len(), 1);
}
