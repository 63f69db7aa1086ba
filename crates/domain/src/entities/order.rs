use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;
use crate::validation;

/// Closed order lifecycle enumeration; serialized in its wire form
/// ("PENDING", "OUT_FOR_DELIVERY", ...) everywhere it leaves the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Preparing,
    ReadyForPickup,
    OutForDelivery,
    Delivered,
    Cancelled,
    Refunded,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Confirmed => "CONFIRMED",
            OrderStatus::Preparing => "PREPARING",
            OrderStatus::ReadyForPickup => "READY_FOR_PICKUP",
            OrderStatus::OutForDelivery => "OUT_FOR_DELIVERY",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Cancelled => "CANCELLED",
            OrderStatus::Refunded => "REFUNDED",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PENDING" => Ok(OrderStatus::Pending),
            "CONFIRMED" => Ok(OrderStatus::Confirmed),
            "PREPARING" => Ok(OrderStatus::Preparing),
            "READY_FOR_PICKUP" => Ok(OrderStatus::ReadyForPickup),
            "OUT_FOR_DELIVERY" => Ok(OrderStatus::OutForDelivery),
            "DELIVERED" => Ok(OrderStatus::Delivered),
            "CANCELLED" => Ok(OrderStatus::Cancelled),
            "REFUNDED" => Ok(OrderStatus::Refunded),
            other => Err(DomainError::Validation(format!(
                "Unknown order status: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderEventType {
    Created,
    StatusChanged,
    PaymentProcessed,
    Cancelled,
    Delivered,
}

impl OrderEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderEventType::Created => "CREATED",
            OrderEventType::StatusChanged => "STATUS_CHANGED",
            OrderEventType::PaymentProcessed => "PAYMENT_PROCESSED",
            OrderEventType::Cancelled => "CANCELLED",
            OrderEventType::Delivered => "DELIVERED",
        }
    }
}

impl FromStr for OrderEventType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CREATED" => Ok(OrderEventType::Created),
            "STATUS_CHANGED" => Ok(OrderEventType::StatusChanged),
            "PAYMENT_PROCESSED" => Ok(OrderEventType::PaymentProcessed),
            "CANCELLED" => Ok(OrderEventType::Cancelled),
            "DELIVERED" => Ok(OrderEventType::Delivered),
            other => Err(DomainError::Validation(format!(
                "Unknown order event type: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: Option<String>,
    pub user_id: String,
    pub restaurant_id: String,
    pub status: OrderStatus,
    pub total_amount: f64,
    #[serde(default)]
    pub delivery_fee: f64,
    #[serde(default)]
    pub tax_amount: f64,
    pub delivery_address: Option<DeliveryAddress>,
    pub special_instructions: Option<String>,
    pub estimated_delivery_time: Option<DateTime<Utc>>,
    pub actual_delivery_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn new(user_id: String, restaurant_id: String, total_amount: f64) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            user_id,
            restaurant_id,
            status: OrderStatus::Pending,
            total_amount,
            delivery_fee: 0.0,
            tax_amount: 0.0,
            delivery_address: None,
            special_instructions: None,
            estimated_delivery_time: None,
            actual_delivery_time: None,
            items: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        validation::require_non_blank(&self.user_id, "User ID")?;
        validation::require_non_blank(&self.restaurant_id, "Restaurant ID")?;
        validation::require_positive(self.total_amount, "Total amount")?;
        for item in &self.items {
            item.validate()?;
        }
        Ok(())
    }

    /// Reassigns the status and produces the audit event describing the
    /// change. Delivery timestamps are stamped on the DELIVERED transition.
    pub fn update_status(&mut self, new_status: OrderStatus) -> OrderAuditEvent {
        let previous = self.status;
        self.status = new_status;
        self.updated_at = Utc::now();

        if new_status == OrderStatus::Delivered && self.actual_delivery_time.is_none() {
            self.actual_delivery_time = Some(Utc::now());
        }

        OrderAuditEvent::new(
            OrderEventType::StatusChanged,
            format!("Status changed from {} to {}", previous, new_status),
        )
    }

    pub fn can_be_cancelled(&self) -> bool {
        matches!(self.status, OrderStatus::Pending | OrderStatus::Confirmed)
    }

    pub fn is_delivered(&self) -> bool {
        self.status == OrderStatus::Delivered
    }

    pub fn grand_total(&self) -> f64 {
        self.total_amount + self.delivery_fee + self.tax_amount
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: Option<String>,
    pub menu_item_id: String,
    /// Name snapshot taken at order time; menu edits do not rewrite history
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub quantity: i32,
    pub special_instructions: Option<String>,
}

impl OrderItem {
    pub fn new(menu_item_id: String, name: String, price: f64, quantity: i32) -> Self {
        Self {
            id: None,
            menu_item_id,
            name,
            description: None,
            price,
            quantity,
            special_instructions: None,
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        validation::require_non_blank(&self.menu_item_id, "Menu item ID")?;
        validation::require_non_blank(&self.name, "Item name")?;
        validation::require_positive(self.price, "Item price")?;
        if self.quantity <= 0 {
            return Err(DomainError::Validation(
                "Quantity must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn subtotal(&self) -> f64 {
        self.price * self.quantity as f64
    }
}

/// Per-order audit trail row, appended on creation and every status change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderAuditEvent {
    pub id: Option<String>,
    pub event_type: OrderEventType,
    pub description: String,
    pub metadata: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl OrderAuditEvent {
    pub fn new(event_type: OrderEventType, description: String) -> Self {
        Self {
            id: None,
            event_type,
            description,
            metadata: None,
            created_at: Utc::now(),
        }
    }
}

/// Delivery destination embedded on the order, distinct from the user's
/// saved addresses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryAddress {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}
