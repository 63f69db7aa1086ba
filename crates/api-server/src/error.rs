use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use domain::DomainError;
use serde_json::json;

/// HTTP-facing wrapper around `DomainError`; the status mapping lives here
/// so handlers can just use `?`.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            DomainError::Validation(_) => StatusCode::BAD_REQUEST,

            DomainError::InvalidCredentials | DomainError::InvalidToken => {
                StatusCode::UNAUTHORIZED
            }

            DomainError::Forbidden(_) => StatusCode::FORBIDDEN,

            DomainError::RestaurantNotFound(_)
            | DomainError::MenuItemNotFound(_)
            | DomainError::OrderNotFound(_)
            | DomainError::PaymentNotFound(_)
            | DomainError::PaymentMethodNotFound(_)
            | DomainError::UserNotFound(_) => StatusCode::NOT_FOUND,

            DomainError::EmailAlreadyRegistered(_)
            | DomainError::PaymentAlreadyProcessed(_)
            | DomainError::RefundNotAllowed(_)
            | DomainError::OrderNotCancellable(_) => StatusCode::CONFLICT,

            DomainError::Repository(_)
            | DomainError::Publish(_)
            | DomainError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!("request failed: {}", self.0);
        }

        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: DomainError) -> StatusCode {
        ApiError(err).into_response().status()
    }

    #[test]
    fn domain_errors_map_to_expected_statuses() {
        assert_eq!(
            status_of(DomainError::Validation("bad".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(DomainError::InvalidCredentials),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(DomainError::Forbidden("no".to_string())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_of(DomainError::OrderNotFound("o-1".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(DomainError::EmailAlreadyRegistered("a@b.co".to_string())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(DomainError::Repository("boom".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
