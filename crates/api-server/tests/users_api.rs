use std::sync::Arc;

use api_server::users::{router, UserState};
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use domain::{AuthTokens, UserService};
use infrastructure::MemoryUserRepository;
use serde_json::{json, Value};
use tower::ServiceExt;

fn app() -> Router {
    let tokens = AuthTokens::new("test-secret", 3600);
    let service = Arc::new(UserService::new(
        Arc::new(MemoryUserRepository::new()),
        tokens.clone(),
    ));
    router(UserState { service, tokens })
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

fn registration(email: &str) -> Value {
    json!({
        "email": email,
        "password": "hunter2hunter2",
        "name": "Alice",
    })
}

#[tokio::test]
async fn register_returns_created_with_token() {
    let app = app();
    let (status, body) = send(
        &app,
        "POST",
        "/api/users/register",
        None,
        Some(registration("a@example.com")),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], json!(true));
    assert!(body["token"].is_string());
    assert_eq!(body["user"]["email"], json!("a@example.com"));
    assert_eq!(body["user"]["role"], json!("CUSTOMER"));
    // The hash must never be serialized
    assert!(body["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn duplicate_email_registration_is_rejected() {
    let app = app();
    send(
        &app,
        "POST",
        "/api/users/register",
        None,
        Some(registration("a@example.com")),
    )
    .await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/users/register",
        None,
        Some(registration("a@example.com")),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("already exists"));
}

#[tokio::test]
async fn malformed_email_is_a_bad_request() {
    let app = app();
    let (status, _) = send(
        &app,
        "POST",
        "/api/users/register",
        None,
        Some(registration("not-an-email")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_with_wrong_password_is_unauthorized() {
    let app = app();
    send(
        &app,
        "POST",
        "/api/users/register",
        None,
        Some(registration("a@example.com")),
    )
    .await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/users/login",
        None,
        Some(json!({"email": "a@example.com", "password": "wrong-password"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn profile_requires_a_token() {
    let app = app();
    let (status, _) = send(&app, "GET", "/api/users/profile", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, "GET", "/api/users/profile", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn profile_round_trip_with_update() {
    let app = app();
    let (_, registered) = send(
        &app,
        "POST",
        "/api/users/register",
        None,
        Some(registration("a@example.com")),
    )
    .await;
    let token = registered["token"].as_str().unwrap().to_string();

    let (status, profile) = send(&app, "GET", "/api/users/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["name"], json!("Alice"));

    let (status, updated) = send(
        &app,
        "PUT",
        "/api/users/profile",
        Some(&token),
        Some(json!({"phone": "+14155552671"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["phone"], json!("+14155552671"));
    assert_eq!(updated["name"], json!("Alice"));
}

#[tokio::test]
async fn deactivated_account_cannot_log_back_in() {
    let app = app();
    let (_, registered) = send(
        &app,
        "POST",
        "/api/users/register",
        None,
        Some(registration("a@example.com")),
    )
    .await;
    let token = registered["token"].as_str().unwrap().to_string();

    let (status, _) = send(&app, "DELETE", "/api/users/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        "POST",
        "/api/users/login",
        None,
        Some(json!({"email": "a@example.com", "password": "hunter2hunter2"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
