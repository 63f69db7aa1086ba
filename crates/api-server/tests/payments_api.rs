use std::sync::Arc;

use api_server::payments::{router, PaymentState};
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use domain::{AuthTokens, EventPublisher, PaymentService, User, UserRole};
use infrastructure::{
    InMemoryBroker, MemoryPaymentMethodRepository, MemoryPaymentRepository,
};
use serde_json::{json, Value};
use tower::ServiceExt;

const SECRET: &str = "test-secret";

fn app() -> Router {
    let tokens = AuthTokens::new(SECRET, 3600);
    let broker = Arc::new(InMemoryBroker::new());
    let service = Arc::new(PaymentService::new(
        Arc::new(MemoryPaymentRepository::new()),
        Arc::new(MemoryPaymentMethodRepository::new()),
        broker as Arc<dyn EventPublisher>,
    ));
    router(PaymentState { service, tokens })
}

fn token_for(user_id: &str) -> String {
    let mut user = User::new(
        format!("{}@example.com", user_id),
        "hash".to_string(),
        "Test".to_string(),
        UserRole::Customer,
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

fn payment_payload(order_id: &str, amount: f64) -> Value {
    json!({
        "order_id": order_id,
        "amount": amount,
        "payment_method": "CREDIT_CARD"
    })
}

async fn capture(app: &Router, token: &str, order_id: &str, amount: f64) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/payments/process",
        Some(token),
        Some(payment_payload(order_id, amount)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["transactionId"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn processing_requires_authentication() {
    let app = app();
    let (status, _) = send(
        &app,
        "POST",
        "/api/payments/process",
        None,
        Some(payment_payload("o-1", 25.0)),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn capture_assigns_a_transaction_id() {
    let app = app();
    let token = token_for("u-1");

    let (status, body) = send(
        &app,
        "POST",
        "/api/payments/process",
        Some(&token),
        Some(payment_payload("o-1", 25.0)),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert!(body["transactionId"].as_str().unwrap().starts_with("TXN_"));
    assert_eq!(body["status"], json!("COMPLETED"));
}

#[tokio::test]
async fn zero_amount_is_a_bad_request() {
    let app = app();
    let token = token_for("u-1");

    let (status, _) = send(
        &app,
        "POST",
        "/api/payments/process",
        Some(&token),
        Some(payment_payload("o-1", 0.0)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn second_capture_for_the_same_order_conflicts() {
    let app = app();
    let token = token_for("u-1");
    capture(&app, &token, "o-1", 25.0).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/payments/process",
        Some(&token),
        Some(payment_payload("o-1", 25.0)),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("already processed"));
}

#[tokio::test]
async fn status_lookup_by_transaction_id() {
    let app = app();
    let token = token_for("u-1");
    let txn = capture(&app, &token, "o-1", 25.0).await;

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/payments/status/{}", txn),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["orderId"], json!("o-1"));
    assert_eq!(body["status"], json!("COMPLETED"));
    assert!(body["refunds"].as_array().unwrap().is_empty());

    let (status, _) = send(
        &app,
        "GET",
        "/api/payments/status/TXN_missing",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn partial_then_full_refund_flips_payment_status() {
    let app = app();
    let token = token_for("u-1");
    let txn = capture(&app, &token, "o-1", 25.0).await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/payments/refund/{}", txn),
        Some(&token),
        Some(json!({"amount": 10.0, "reason": "cold food"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["refundId"].as_str().unwrap().starts_with("REF_"));

    let (_, lookup) = send(
        &app,
        "GET",
        &format!("/api/payments/status/{}", txn),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(lookup["status"], json!("PARTIALLY_REFUNDED"));

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/payments/refund/{}", txn),
        Some(&token),
        Some(json!({"amount": 15.0})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, lookup) = send(
        &app,
        "GET",
        &format!("/api/payments/status/{}", txn),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(lookup["status"], json!("REFUNDED"));
    assert_eq!(lookup["refunds"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn refunds_cannot_exceed_the_captured_amount() {
    let app = app();
    let token = token_for("u-1");
    let txn = capture(&app, &token, "o-1", 25.0).await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/payments/refund/{}", txn),
        Some(&token),
        Some(json!({"amount": 30.0})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("exceed"));
}

#[tokio::test]
async fn supported_method_kinds_are_listed() {
    let app = app();
    let (status, body) = send(&app, "GET", "/api/payments/methods", None, None).await;
    assert_eq!(status, StatusCode::OK);

    let kinds = body["paymentMethods"].as_array().unwrap();
    assert_eq!(kinds.len(), 6);
    assert!(kinds.contains(&json!("CREDIT_CARD")));
    assert!(kinds.contains(&json!("CASH_ON_DELIVERY")));
}

#[tokio::test]
async fn saved_methods_are_scoped_to_their_owner() {
    let app = app();
    let alice = token_for("u-1");
    let bob = token_for("u-2");

    let (status, saved) = send(
        &app,
        "POST",
        "/api/payments/methods",
        Some(&alice),
        Some(json!({"kind": "CREDIT_CARD", "label": "Visa", "last_four": "4242"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let method_id = saved["id"].as_str().unwrap().to_string();

    let (_, mine) = send(&app, "GET", "/api/payments/methods/saved", Some(&alice), None).await;
    assert_eq!(mine.as_array().unwrap().len(), 1);

    let (_, theirs) = send(&app, "GET", "/api/payments/methods/saved", Some(&bob), None).await;
    assert!(theirs.as_array().unwrap().is_empty());

    // Bob cannot delete Alice's card on file
    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/payments/methods/{}", method_id),
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/payments/methods/{}", method_id),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}
