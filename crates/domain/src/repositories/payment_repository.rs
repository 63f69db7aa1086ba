use crate::entities::{Payment, Refund, SavedPaymentMethod};
use crate::errors::DomainError;
use async_trait::async_trait;

#[async_trait]
pub trait PaymentRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<Payment>, DomainError>;
    async fn find_by_transaction_id(
        &self,
        transaction_id: &str,
    ) -> Result<Option<Payment>, DomainError>;
    /// The completed (or partially refunded) payment for an order, if any.
    /// Used to reject duplicate charges.
    async fn find_captured_by_order(&self, order_id: &str)
        -> Result<Option<Payment>, DomainError>;
    async fn save(&self, payment: &Payment) -> Result<Payment, DomainError>;
    async fn update(&self, payment: &Payment) -> Result<Payment, DomainError>;
    async fn add_refund(&self, refund: &Refund) -> Result<Refund, DomainError>;
    async fn refunds_for(&self, payment_id: &str) -> Result<Vec<Refund>, DomainError>;
}

#[async_trait]
pub trait PaymentMethodRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<SavedPaymentMethod>, DomainError>;
    async fn save(&self, method: &SavedPaymentMethod)
        -> Result<SavedPaymentMethod, DomainError>;
    async fn find_by_user(&self, user_id: &str) -> Result<Vec<SavedPaymentMethod>, DomainError>;
    async fn delete(&self, id: &str) -> Result<(), DomainError>;
}
