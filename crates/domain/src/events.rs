//! Cross-service event types and the publish seam.
//!
//! Services publish `EventEnvelope`s to named topics; the broker binds
//! durable queues to a topic with a routing-key pattern. The broker itself
//! is infrastructure — this module only defines the port.

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::OrderStatus;
use crate::errors::DomainError;

/// Topic carrying restaurant and menu lifecycle events.
pub const CATALOG_TOPIC: &str = "catalog_events";
/// Topic carrying order and payment lifecycle events.
pub const ORDER_TOPIC: &str = "order_events";

/// Routing keys used on the topics above.
pub mod routing {
    pub const ORDER_CREATED: &str = "order.created";
    pub const ORDER_STATUS_CHANGED: &str = "order.status_changed";
    pub const ORDER_COMPLETED: &str = "order.completed";
    pub const ORDER_CANCELLED: &str = "order.cancelled";
    pub const PAYMENT_COMPLETED: &str = "payment.completed";
    pub const PAYMENT_REFUNDED: &str = "payment.refunded";
    pub const RESTAURANT_CREATED: &str = "restaurant.created";
    pub const RESTAURANT_DEACTIVATED: &str = "restaurant.deactivated";
    pub const MENU_ITEM_CREATED: &str = "menu_item.created";
}

/// Wire envelope for a single published event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub id: String,
    pub routing_key: String,
    pub payload: serde_json::Value,
    pub occurred_at: DateTime<Utc>,
}

impl EventEnvelope {
    pub fn new<T: Serialize>(routing_key: &str, payload: &T) -> Result<Self, DomainError> {
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            routing_key: routing_key.to_string(),
            payload: serde_json::to_value(payload)?,
            occurred_at: Utc::now(),
        })
    }

    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, DomainError> {
        Ok(serde_json::from_value(self.payload.clone())?)
    }
}

/// Port for publishing events to the message bus.
///
/// Publishing is fire-and-forget from the caller's point of view; delivery
/// guarantees belong to the broker implementation behind this trait.
pub trait EventPublisher: Send + Sync {
    fn publish(&self, topic: &str, event: EventEnvelope) -> Result<(), DomainError>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub menu_item_id: String,
    pub quantity: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderCreated {
    pub order_id: String,
    pub user_id: String,
    pub restaurant_id: String,
    pub total_amount: f64,
    pub items: Vec<OrderLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderStatusChanged {
    pub order_id: String,
    pub previous_status: OrderStatus,
    pub new_status: OrderStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentCompleted {
    pub payment_id: String,
    pub order_id: String,
    pub transaction_id: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRefunded {
    pub payment_id: String,
    pub order_id: String,
    pub transaction_id: String,
    pub refund_id: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestaurantCreated {
    pub restaurant_id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestaurantDeactivated {
    pub restaurant_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItemCreated {
    pub menu_item_id: String,
    pub restaurant_id: String,
    pub name: String,
}
