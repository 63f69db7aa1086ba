use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::entities::{Order, OrderAuditEvent, OrderEventType, OrderStatus};
use crate::errors::DomainError;
use crate::events::{
    routing, EventEnvelope, EventPublisher, OrderCreated, OrderLine, OrderStatusChanged,
    PaymentCompleted, PaymentRefunded, ORDER_TOPIC,
};
use crate::repositories::{OrderCounts, OrderRepository};

/// Order Service - order lifecycle and aggregate statistics
pub struct OrderService {
    orders: Arc<dyn OrderRepository>,
    publisher: Arc<dyn EventPublisher>,
}

impl OrderService {
    pub fn new(orders: Arc<dyn OrderRepository>, publisher: Arc<dyn EventPublisher>) -> Self {
        Self { orders, publisher }
    }

    pub async fn create_order(&self, order: Order) -> Result<Order, DomainError> {
        order.validate()?;
        let saved = self.orders.save(&order).await?;
        let order_id = saved.id.clone().unwrap_or_default();

        self.orders
            .append_event(
                &order_id,
                &OrderAuditEvent::new(OrderEventType::Created, "Order created".to_string()),
            )
            .await?;

        let event = OrderCreated {
            order_id,
            user_id: saved.user_id.clone(),
            restaurant_id: saved.restaurant_id.clone(),
            total_amount: saved.total_amount,
            items: saved
                .items
                .iter()
                .map(|item| OrderLine {
                    menu_item_id: item.menu_item_id.clone(),
                    quantity: item.quantity,
                })
                .collect(),
        };
        self.publisher.publish(
            ORDER_TOPIC,
            EventEnvelope::new(routing::ORDER_CREATED, &event)?,
        )?;

        Ok(saved)
    }

    pub async fn get_order(&self, id: &str) -> Result<Order, DomainError> {
        match self.orders.find_by_id(id).await? {
            Some(order) => Ok(order),
            None => Err(DomainError::OrderNotFound(id.to_string())),
        }
    }

    pub async fn update_status(
        &self,
        id: &str,
        new_status: OrderStatus,
    ) -> Result<Order, DomainError> {
        let mut order = self.get_order(id).await?;
        let previous = order.status;
        let audit = order.update_status(new_status);

        let updated = self.orders.update(&order).await?;
        self.orders.append_event(id, &audit).await?;

        let event = OrderStatusChanged {
            order_id: id.to_string(),
            previous_status: previous,
            new_status,
        };
        self.publisher.publish(
            ORDER_TOPIC,
            EventEnvelope::new(routing::ORDER_STATUS_CHANGED, &event)?,
        )?;

        // Terminal transitions get their own routing keys so consumers can
        // bind narrowly.
        match new_status {
            OrderStatus::Delivered => {
                self.publisher.publish(
                    ORDER_TOPIC,
                    EventEnvelope::new(routing::ORDER_COMPLETED, &event)?,
                )?;
            }
            OrderStatus::Cancelled => {
                self.publisher.publish(
                    ORDER_TOPIC,
                    EventEnvelope::new(routing::ORDER_CANCELLED, &event)?,
                )?;
            }
            _ => {}
        }

        Ok(updated)
    }

    /// Cancels the order while it is still PENDING or CONFIRMED.
    pub async fn cancel_order(&self, id: &str) -> Result<Order, DomainError> {
        let order = self.get_order(id).await?;
        if !order.can_be_cancelled() {
            return Err(DomainError::OrderNotCancellable(order.status.to_string()));
        }
        self.update_status(id, OrderStatus::Cancelled).await
    }

    pub async fn list_all(&self) -> Result<Vec<Order>, DomainError> {
        self.orders.find_all().await
    }

    pub async fn orders_for_user(&self, user_id: &str) -> Result<Vec<Order>, DomainError> {
        self.orders.find_by_user(user_id).await
    }

    pub async fn orders_for_restaurant(
        &self,
        restaurant_id: &str,
    ) -> Result<Vec<Order>, DomainError> {
        self.orders.find_by_restaurant(restaurant_id).await
    }

    pub async fn orders_with_status(&self, status: OrderStatus) -> Result<Vec<Order>, DomainError> {
        self.orders.find_by_status(status).await
    }

    /// Orders created within the last 24 hours.
    pub async fn recent_orders(&self) -> Result<Vec<Order>, DomainError> {
        self.orders.find_since(Utc::now() - Duration::hours(24)).await
    }

    pub async fn stats(&self) -> Result<OrderCounts, DomainError> {
        self.orders.counts().await
    }

    pub async fn events_for(&self, order_id: &str) -> Result<Vec<OrderAuditEvent>, DomainError> {
        self.get_order(order_id).await?;
        self.orders.events_for(order_id).await
    }

    /// Consumes a payment-completed event: a pending order is confirmed,
    /// anything further along is left alone.
    pub async fn apply_payment_completed(
        &self,
        event: &PaymentCompleted,
    ) -> Result<(), DomainError> {
        let order = match self.orders.find_by_id(&event.order_id).await? {
            Some(order) => order,
            None => return Ok(()), // order lives in another deployment's store
        };

        if order.status == OrderStatus::Pending {
            let mut order = order;
            order.update_status(OrderStatus::Confirmed);
            self.orders.update(&order).await?;
            self.orders
                .append_event(
                    &event.order_id,
                    &OrderAuditEvent::new(
                        OrderEventType::PaymentProcessed,
                        format!("Payment {} captured", event.transaction_id),
                    ),
                )
                .await?;
        }
        Ok(())
    }

    /// Consumes a payment-refunded event and marks the order REFUNDED.
    pub async fn apply_payment_refunded(
        &self,
        event: &PaymentRefunded,
    ) -> Result<(), DomainError> {
        let order = match self.orders.find_by_id(&event.order_id).await? {
            Some(order) => order,
            None => return Ok(()),
        };

        let mut order = order;
        let audit = order.update_status(OrderStatus::Refunded);
        self.orders.update(&order).await?;
        self.orders.append_event(&event.order_id, &audit).await?;
        Ok(())
    }
}
