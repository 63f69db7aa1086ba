use std::sync::Arc;

use api_server::orders::{router, OrderState};
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use domain::{AuthTokens, EventPublisher, OrderService, User, UserRole};
use infrastructure::{InMemoryBroker, MemoryOrderRepository};
use serde_json::{json, Value};
use tower::ServiceExt;

const SECRET: &str = "test-secret";

fn app() -> Router {
    let tokens = AuthTokens::new(SECRET, 3600);
    let broker = Arc::new(InMemoryBroker::new());
    let service = Arc::new(OrderService::new(
        Arc::new(MemoryOrderRepository::new()),
        broker as Arc<dyn EventPublisher>,
    ));
    router(OrderState { service, tokens })
}

fn token_for(user_id: &str, role: UserRole) -> String {
    let mut user = User::new(
        format!("{}@example.com", user_id),
        "hash".to_string(),
        "Test".to_string(),
        role,
    );
    user.id = Some(user_id.to_string());
    AuthTokens::new(SECRET, 3600).issue(&user).unwrap()
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
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

fn order_payload() -> Value {
    json!({
        "restaurant_id": "r-1",
        "total_amount": 24.0,
        "items": [
            {"menu_item_id": "m-1", "name": "Ramen", "price": 12.0, "quantity": 2}
        ]
    })
}

async fn create_order(app: &Router, token: &str) -> String {
    let (status, body) = send(app, "POST", "/api/orders", Some(token), Some(order_payload())).await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn creating_an_order_requires_authentication() {
    let app = app();
    let (status, _) = send(&app, "POST", "/api/orders", None, Some(order_payload())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn order_owner_is_taken_from_the_token() {
    let app = app();
    let token = token_for("u-1", UserRole::Customer);
    let (status, body) =
        send(&app, "POST", "/api/orders", Some(&token), Some(order_payload())).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user_id"], json!("u-1"));
    assert_eq!(body["status"], json!("PENDING"));
}

#[tokio::test]
async fn users_cannot_read_each_others_orders() {
    let app = app();
    let owner = token_for("u-1", UserRole::Customer);
    let other = token_for("u-2", UserRole::Customer);
    let order_id = create_order(&app, &owner).await;

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/orders/{}", order_id),
        Some(&other),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["error"].as_str().unwrap().contains("your own orders"));

    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/orders/{}", order_id),
        Some(&owner),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn admin_role_bypasses_ownership_checks() {
    let app = app();
    let owner = token_for("u-1", UserRole::Customer);
    let admin = token_for("admin-1", UserRole::Admin);
    let order_id = create_order(&app, &owner).await;

    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/orders/{}", order_id),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn status_update_persists_the_new_value() {
    let app = app();
    let owner = token_for("u-1", UserRole::Customer);
    let order_id = create_order(&app, &owner).await;

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/orders/{}/status", order_id),
        Some(&owner),
        Some(json!({"status": "CONFIRMED"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("CONFIRMED"));

    let (_, fetched) = send(
        &app,
        "GET",
        &format!("/api/orders/{}", order_id),
        Some(&owner),
        None,
    )
    .await;
    assert_eq!(fetched["status"], json!("CONFIRMED"));
}

#[tokio::test]
async fn unknown_status_is_a_bad_request() {
    let app = app();
    let owner = token_for("u-1", UserRole::Customer);
    let order_id = create_order(&app, &owner).await;

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/orders/{}/status", order_id),
        Some(&owner),
        Some(json!({"status": "SHIPPED"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn cancellation_window_is_enforced() {
    let app = app();
    let owner = token_for("u-1", UserRole::Customer);
    let order_id = create_order(&app, &owner).await;

    send(
        &app,
        "PUT",
        &format!("/api/orders/{}/status", order_id),
        Some(&owner),
        Some(json!({"status": "PREPARING"})),
    )
    .await;

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/orders/{}", order_id),
        Some(&owner),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn stats_and_listing_are_admin_only() {
    let app = app();
    let customer = token_for("u-1", UserRole::Customer);
    let admin = token_for("admin-1", UserRole::Admin);
    create_order(&app, &customer).await;

    let (status, _) = send(&app, "GET", "/api/orders/stats", Some(&customer), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, stats) = send(&app, "GET", "/api/orders/stats", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["totalOrders"], json!(1));
    assert_eq!(stats["pendingOrders"], json!(1));

    let (status, _) = send(&app, "GET", "/api/orders", Some(&customer), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, orders) = send(&app, "GET", "/api/orders", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(orders.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn restaurant_owner_sees_restaurant_orders_but_not_global_listings() {
    let app = app();
    let customer = token_for("u-1", UserRole::Customer);
    let owner = token_for("owner-1", UserRole::RestaurantOwner);
    create_order(&app, &customer).await;

    let (status, orders) = send(
        &app,
        "GET",
        "/api/orders/restaurant/r-1",
        Some(&owner),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(orders.as_array().unwrap().len(), 1);

    // Platform-wide listings and stats stay admin only
    let (status, _) = send(&app, "GET", "/api/orders", Some(&owner), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(&app, "GET", "/api/orders/stats", Some(&owner), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn my_orders_only_returns_the_callers_orders() {
    let app = app();
    let alice = token_for("u-1", UserRole::Customer);
    let bob = token_for("u-2", UserRole::Customer);
    create_order(&app, &alice).await;
    create_order(&app, &alice).await;
    create_order(&app, &bob).await;

    let (status, body) = send(&app, "GET", "/api/orders/my-orders", Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);
}
