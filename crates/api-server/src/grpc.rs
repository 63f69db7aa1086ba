//! gRPC facade for the payment service, mirroring the REST surface.
//!
//! Message types are prost derives (standard protobuf wire format, no
//! `.proto` file); the service glue is generated by `build.rs` with
//! `tonic_build::manual`.

use std::sync::Arc;

use domain::{AuthTokens, Claims, DomainError, Payment, PaymentMethodKind, PaymentService};
use tonic::{Request, Response, Status};

// ---------------------------------------------------------------------------
// Message types
// ---------------------------------------------------------------------------

#[derive(Clone, prost::Message)]
pub struct ProcessPaymentRequest {
    #[prost(string, tag = "1")]
    pub order_id: String,
    #[prost(double, tag = "2")]
    pub amount: f64,
    #[prost(string, tag = "3")]
    pub currency: String,
    #[prost(string, tag = "4")]
    pub payment_method: String,
}

#[derive(Clone, prost::Message)]
pub struct PaymentReply {
    #[prost(bool, tag = "1")]
    pub success: bool,
    #[prost(string, tag = "2")]
    pub transaction_id: String,
    #[prost(string, tag = "3")]
    pub order_id: String,
    #[prost(double, tag = "4")]
    pub amount: f64,
    #[prost(string, tag = "5")]
    pub status: String,
    #[prost(string, tag = "6")]
    pub message: String,
}

#[derive(Clone, prost::Message)]
pub struct RefundPaymentRequest {
    #[prost(string, tag = "1")]
    pub transaction_id: String,
    #[prost(double, tag = "2")]
    pub amount: f64,
    #[prost(string, tag = "3")]
    pub reason: String,
}

#[derive(Clone, prost::Message)]
pub struct RefundReply {
    #[prost(bool, tag = "1")]
    pub success: bool,
    #[prost(string, tag = "2")]
    pub refund_id: String,
    #[prost(string, tag = "3")]
    pub transaction_id: String,
    #[prost(double, tag = "4")]
    pub amount: f64,
    #[prost(string, tag = "5")]
    pub status: String,
}

#[derive(Clone, prost::Message)]
pub struct PaymentStatusRequest {
    #[prost(string, tag = "1")]
    pub transaction_id: String,
}

#[derive(Clone, prost::Message)]
pub struct PaymentStatusReply {
    #[prost(string, tag = "1")]
    pub transaction_id: String,
    #[prost(string, tag = "2")]
    pub order_id: String,
    #[prost(string, tag = "3")]
    pub status: String,
    #[prost(double, tag = "4")]
    pub amount: f64,
    #[prost(double, tag = "5")]
    pub refunded_amount: f64,
}

// ---------------------------------------------------------------------------
// Generated service trait + server/client
// ---------------------------------------------------------------------------

include!(concat!(
    env!("OUT_DIR"),
    "/foodordering.payment.PaymentService.rs"
));

pub use payment_service_client::PaymentServiceClient;
pub use payment_service_server::{PaymentService as PaymentServiceGrpc, PaymentServiceServer};

// ---------------------------------------------------------------------------
// Handler implementation
// ---------------------------------------------------------------------------

pub struct PaymentGrpcHandler {
    service: Arc<PaymentService>,
    tokens: AuthTokens,
}

impl PaymentGrpcHandler {
    pub fn new(service: Arc<PaymentService>, tokens: AuthTokens) -> Self {
        Self { service, tokens }
    }

    /// Pulls the caller's claims out of the `authorization` metadata entry.
    fn authenticate<T>(&self, request: &Request<T>) -> Result<Claims, Status> {
        let header = request
            .metadata()
            .get("authorization")
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| Status::unauthenticated("missing authorization metadata"))?;

        self.tokens
            .verify_bearer(header)
            .map_err(|_| Status::unauthenticated("invalid or expired token"))
    }
}

fn status_from(err: DomainError) -> Status {
    match err {
        DomainError::Validation(msg) => Status::invalid_argument(msg),
        DomainError::PaymentNotFound(id) => Status::not_found(id),
        DomainError::PaymentAlreadyProcessed(id) => Status::already_exists(id),
        DomainError::RefundNotAllowed(msg) | DomainError::OrderNotCancellable(msg) => {
            Status::failed_precondition(msg)
        }
        DomainError::InvalidCredentials | DomainError::InvalidToken => {
            Status::unauthenticated("invalid or expired token")
        }
        DomainError::Forbidden(msg) => Status::permission_denied(msg),
        other => Status::internal(other.to_string()),
    }
}

#[tonic::async_trait]
impl PaymentServiceGrpc for PaymentGrpcHandler {
    async fn process_payment(
        &self,
        request: Request<ProcessPaymentRequest>,
    ) -> Result<Response<PaymentReply>, Status> {
        let claims = self.authenticate(&request)?;
        let req = request.into_inner();

        let method: PaymentMethodKind = req.payment_method.parse().map_err(status_from)?;
        let mut payment = Payment::new(
            req.order_id,
            claims.user_id().to_string(),
            req.amount,
            method,
            String::new(),
        );
        if !req.currency.is_empty() {
            payment.currency = req.currency;
        }

        let captured = self
            .service
            .process_payment(payment)
            .await
            .map_err(status_from)?;

        Ok(Response::new(PaymentReply {
            success: true,
            transaction_id: captured.transaction_id,
            order_id: captured.order_id,
            amount: captured.amount,
            status: captured.status.as_str().to_string(),
            message: "Payment processed successfully".to_string(),
        }))
    }

    async fn refund_payment(
        &self,
        request: Request<RefundPaymentRequest>,
    ) -> Result<Response<RefundReply>, Status> {
        self.authenticate(&request)?;
        let req = request.into_inner();

        let reason = if req.reason.is_empty() {
            None
        } else {
            Some(req.reason)
        };
        let refund = self
            .service
            .refund(&req.transaction_id, req.amount, reason)
            .await
            .map_err(status_from)?;

        Ok(Response::new(RefundReply {
            success: true,
            refund_id: refund.id.unwrap_or_default(),
            transaction_id: req.transaction_id,
            amount: refund.amount,
            status: refund.status.as_str().to_string(),
        }))
    }

    async fn get_payment_status(
        &self,
        request: Request<PaymentStatusRequest>,
    ) -> Result<Response<PaymentStatusReply>, Status> {
        self.authenticate(&request)?;
        let req = request.into_inner();

        let status = self
            .service
            .payment_status(&req.transaction_id)
            .await
            .map_err(status_from)?;

        let refunded_amount: f64 = status.refunds.iter().map(|r| r.amount).sum();
        Ok(Response::new(PaymentStatusReply {
            transaction_id: status.payment.transaction_id,
            order_id: status.payment.order_id,
            status: status.payment.status.as_str().to_string(),
            amount: status.payment.amount,
            refunded_amount,
        }))
    }
}

/// Create a `PaymentServiceServer` ready to be added to a tonic router.
pub fn grpc_server(
    service: Arc<PaymentService>,
    tokens: AuthTokens,
) -> PaymentServiceServer<PaymentGrpcHandler> {
    PaymentServiceServer::new(PaymentGrpcHandler::new(service, tokens))
}

/// Bind and serve the gRPC facade at the given address.
pub async fn serve_grpc(
    service: Arc<PaymentService>,
    tokens: AuthTokens,
    addr: &str,
) -> Result<(), tonic::transport::Error> {
    let addr = addr.parse().expect("invalid gRPC address");
    tonic::transport::Server::builder()
        .add_service(grpc_server(service, tokens))
        .serve(addr)
        .await
}
