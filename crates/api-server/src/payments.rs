use std::sync::Arc;

use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use domain::{
    AuthTokens, Payment, PaymentMethodKind, PaymentService, SavedPaymentMethod,
};
use serde::Deserialize;
use serde_json::json;

use crate::auth::AuthUser;
use crate::error::ApiError;

#[derive(Clone)]
pub struct PaymentState {
    pub service: Arc<PaymentService>,
    pub tokens: AuthTokens,
}

impl FromRef<PaymentState> for AuthTokens {
    fn from_ref(state: &PaymentState) -> AuthTokens {
        state.tokens.clone()
    }
}

#[derive(Debug, Deserialize)]
pub struct ProcessPaymentRequest {
    pub order_id: String,
    pub amount: f64,
    pub currency: Option<String>,
    pub payment_method: PaymentMethodKind,
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct RefundRequest {
    pub amount: f64,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SaveMethodRequest {
    pub kind: PaymentMethodKind,
    pub label: Option<String>,
    pub last_four: Option<String>,
    #[serde(default)]
    pub is_default: bool,
}

pub fn router(state: PaymentState) -> Router {
    Router::new()
        .route("/api/payments/process", post(process_payment))
        .route("/api/payments/status/:transaction_id", get(payment_status))
        .route("/api/payments/refund/:transaction_id", post(refund_payment))
        .route("/api/payments/methods", get(list_method_kinds).post(save_method))
        .route("/api/payments/methods/saved", get(saved_methods))
        .route("/api/payments/methods/:id", axum::routing::delete(delete_method))
        .route("/api/payments/health", get(health))
        .with_state(state)
}

async fn process_payment(
    State(state): State<PaymentState>,
    AuthUser(claims): AuthUser,
    Json(payload): Json<ProcessPaymentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut payment = Payment::new(
        payload.order_id,
        claims.user_id().to_string(),
        payload.amount,
        payload.payment_method,
        String::new(), // assigned by the service
    );
    if let Some(currency) = payload.currency {
        payment.currency = currency;
    }
    payment.gateway_metadata = payload.metadata;

    let captured = state.service.process_payment(payment).await?;

    Ok(Json(json!({
        "success": true,
        "transactionId": captured.transaction_id,
        "orderId": captured.order_id,
        "amount": captured.amount,
        "paymentMethod": captured.method,
        "status": captured.status,
        "timestamp": captured.created_at.to_rfc3339(),
        "message": "Payment processed successfully"
    })))
}

async fn payment_status(
    State(state): State<PaymentState>,
    AuthUser(_claims): AuthUser,
    Path(transaction_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let status = state.service.payment_status(&transaction_id).await?;

    Ok(Json(json!({
        "transactionId": status.payment.transaction_id,
        "orderId": status.payment.order_id,
        "status": status.payment.status,
        "amount": status.payment.amount,
        "currency": status.payment.currency,
        "paymentMethod": status.payment.method,
        "refunds": status.refunds,
        "timestamp": status.payment.updated_at.to_rfc3339(),
    })))
}

async fn refund_payment(
    State(state): State<PaymentState>,
    AuthUser(_claims): AuthUser,
    Path(transaction_id): Path<String>,
    Json(payload): Json<RefundRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let refund = state
        .service
        .refund(&transaction_id, payload.amount, payload.reason)
        .await?;

    Ok(Json(json!({
        "success": true,
        "refundId": refund.id,
        "transactionId": transaction_id,
        "refundAmount": refund.amount,
        "reason": refund.reason,
        "status": refund.status,
        "timestamp": refund.created_at.to_rfc3339(),
        "message": "Refund processed successfully"
    })))
}

async fn list_method_kinds(State(state): State<PaymentState>) -> impl IntoResponse {
    Json(json!({
        "paymentMethods": state.service.supported_methods(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn save_method(
    State(state): State<PaymentState>,
    AuthUser(claims): AuthUser,
    Json(payload): Json<SaveMethodRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut method = SavedPaymentMethod::new(claims.user_id().to_string(), payload.kind);
    method.label = payload.label;
    method.last_four = payload.last_four;
    method.is_default = payload.is_default;

    let saved = state.service.save_method(method).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

async fn saved_methods(
    State(state): State<PaymentState>,
    AuthUser(claims): AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let methods = state.service.methods_for_user(claims.user_id()).await?;
    Ok(Json(methods))
}

async fn delete_method(
    State(state): State<PaymentState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.service.delete_method(claims.user_id(), &id).await?;
    Ok(Json(json!({ "message": "Payment method removed" })))
}

async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "UP",
        "service": "payment-service",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}
