use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Restaurant not found with id: {0}")]
    RestaurantNotFound(String),

    #[error("Menu item not found with id: {0}")]
    MenuItemNotFound(String),

    #[error("Order not found with id: {0}")]
    OrderNotFound(String),

    #[error("Payment not found for transaction: {0}")]
    PaymentNotFound(String),

    #[error("Payment method not found with id: {0}")]
    PaymentMethodNotFound(String),

    #[error("User not found with id: {0}")]
    UserNotFound(String),

    #[error("User already exists with email: {0}")]
    EmailAlreadyRegistered(String),

    #[error("Payment already processed for order: {0}")]
    PaymentAlreadyProcessed(String),

    #[error("Refund not allowed: {0}")]
    RefundNotAllowed(String),

    #[error("Order cannot be cancelled in status: {0}")]
    OrderNotCancellable(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Access denied: {0}")]
    Forbidden(String),

    #[error("Repository error: {0}")]
    Repository(String),

    #[error("Event publish error: {0}")]
    Publish(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::Serialization(err.to_string())
    }
}
