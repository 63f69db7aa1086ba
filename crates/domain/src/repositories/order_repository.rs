use chrono::{DateTime, Utc};

use crate::entities::{Order, OrderAuditEvent, OrderStatus};
use crate::errors::DomainError;
use async_trait::async_trait;

/// Aggregate counts surfaced on the admin stats endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderCounts {
    pub total: i64,
    pub pending: i64,
    pub confirmed: i64,
    pub delivered: i64,
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<Order>, DomainError>;
    /// Persists the order together with its line items.
    async fn save(&self, order: &Order) -> Result<Order, DomainError>;
    /// Rewrites the mutable columns (status, timestamps); items are immutable.
    async fn update(&self, order: &Order) -> Result<Order, DomainError>;
    async fn find_all(&self) -> Result<Vec<Order>, DomainError>;
    /// Newest first.
    async fn find_by_user(&self, user_id: &str) -> Result<Vec<Order>, DomainError>;
    async fn find_by_restaurant(&self, restaurant_id: &str) -> Result<Vec<Order>, DomainError>;
    async fn find_by_status(&self, status: OrderStatus) -> Result<Vec<Order>, DomainError>;
    async fn find_since(&self, since: DateTime<Utc>) -> Result<Vec<Order>, DomainError>;
    async fn counts(&self) -> Result<OrderCounts, DomainError>;
    async fn append_event(
        &self,
        order_id: &str,
        event: &OrderAuditEvent,
    ) -> Result<(), DomainError>;
    async fn events_for(&self, order_id: &str) -> Result<Vec<OrderAuditEvent>, DomainError>;
}
