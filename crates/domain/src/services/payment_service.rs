use std::sync::Arc;

use uuid::Uuid;

use crate::entities::{
    Payment, PaymentMethodKind, PaymentStatus, Refund, SavedPaymentMethod,
};
use crate::errors::DomainError;
use crate::events::{
    routing, EventEnvelope, EventPublisher, PaymentCompleted, PaymentRefunded, ORDER_TOPIC,
};
use crate::repositories::{PaymentMethodRepository, PaymentRepository};

/// Payment Service - capture, refunds and saved payment methods.
///
/// The gateway is simulated: a capture succeeds immediately and is assigned
/// a `TXN_` transaction id; refunds are assigned `REF_` ids.
pub struct PaymentService {
    payments: Arc<dyn PaymentRepository>,
    methods: Arc<dyn PaymentMethodRepository>,
    publisher: Arc<dyn EventPublisher>,
}

/// A payment joined with its refunds, as returned by status lookups.
#[derive(Debug, Clone)]
pub struct PaymentWithRefunds {
    pub payment: Payment,
    pub refunds: Vec<Refund>,
}

impl PaymentService {
    pub fn new(
        payments: Arc<dyn PaymentRepository>,
        methods: Arc<dyn PaymentMethodRepository>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            payments,
            methods,
            publisher,
        }
    }

    pub async fn process_payment(
        &self,
        mut payment: Payment,
    ) -> Result<Payment, DomainError> {
        payment.validate()?;

        if let Some(existing) = self
            .payments
            .find_captured_by_order(&payment.order_id)
            .await?
        {
            return Err(DomainError::PaymentAlreadyProcessed(existing.order_id));
        }

        payment.transaction_id = format!("TXN_{}", Uuid::new_v4().simple());
        payment.status = PaymentStatus::Completed;
        let saved = self.payments.save(&payment).await?;

        let event = PaymentCompleted {
            payment_id: saved.id.clone().unwrap_or_default(),
            order_id: saved.order_id.clone(),
            transaction_id: saved.transaction_id.clone(),
            amount: saved.amount,
        };
        self.publisher.publish(
            ORDER_TOPIC,
            EventEnvelope::new(routing::PAYMENT_COMPLETED, &event)?,
        )?;

        Ok(saved)
    }

    pub async fn payment_status(
        &self,
        transaction_id: &str,
    ) -> Result<PaymentWithRefunds, DomainError> {
        let payment = self
            .payments
            .find_by_transaction_id(transaction_id)
            .await?
            .ok_or_else(|| DomainError::PaymentNotFound(transaction_id.to_string()))?;

        let refunds = match &payment.id {
            Some(id) => self.payments.refunds_for(id).await?,
            None => Vec::new(),
        };

        Ok(PaymentWithRefunds { payment, refunds })
    }

    pub async fn refund(
        &self,
        transaction_id: &str,
        amount: f64,
        reason: Option<String>,
    ) -> Result<Refund, DomainError> {
        if !(amount > 0.0) {
            return Err(DomainError::Validation(
                "Refund amount must be greater than 0".to_string(),
            ));
        }

        let mut payment = self
            .payments
            .find_by_transaction_id(transaction_id)
            .await?
            .ok_or_else(|| DomainError::PaymentNotFound(transaction_id.to_string()))?;

        if !payment.is_refundable() {
            return Err(DomainError::RefundNotAllowed(format!(
                "payment is {}",
                payment.status
            )));
        }

        let payment_id = payment
            .id
            .clone()
            .ok_or_else(|| DomainError::Repository("payment row without id".to_string()))?;

        let already_refunded: f64 = self
            .payments
            .refunds_for(&payment_id)
            .await?
            .iter()
            .map(|r| r.amount)
            .sum();
        if already_refunded + amount > payment.amount {
            return Err(DomainError::RefundNotAllowed(format!(
                "refund total {:.2} would exceed captured amount {:.2}",
                already_refunded + amount,
                payment.amount
            )));
        }

        let mut refund = Refund::new(payment_id.clone(), amount, reason);
        refund.id = Some(format!("REF_{}", Uuid::new_v4().simple()));
        let saved_refund = self.payments.add_refund(&refund).await?;

        payment.status = if already_refunded + amount >= payment.amount {
            PaymentStatus::Refunded
        } else {
            PaymentStatus::PartiallyRefunded
        };
        payment.updated_at = chrono::Utc::now();
        self.payments.update(&payment).await?;

        let event = PaymentRefunded {
            payment_id,
            order_id: payment.order_id.clone(),
            transaction_id: transaction_id.to_string(),
            refund_id: saved_refund.id.clone().unwrap_or_default(),
            amount,
        };
        self.publisher.publish(
            ORDER_TOPIC,
            EventEnvelope::new(routing::PAYMENT_REFUNDED, &event)?,
        )?;

        Ok(saved_refund)
    }

    pub fn supported_methods(&self) -> &'static [PaymentMethodKind] {
        &PaymentMethodKind::ALL
    }

    pub async fn save_method(
        &self,
        method: SavedPaymentMethod,
    ) -> Result<SavedPaymentMethod, DomainError> {
        self.methods.save(&method).await
    }

    pub async fn methods_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<SavedPaymentMethod>, DomainError> {
        self.methods.find_by_user(user_id).await
    }

    /// Deletes a saved method after checking it belongs to the caller.
    pub async fn delete_method(&self, user_id: &str, id: &str) -> Result<(), DomainError> {
        let method = self
            .methods
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::PaymentMethodNotFound(id.to_string()))?;

        if method.user_id != user_id {
            return Err(DomainError::Forbidden(
                "You can only remove your own payment methods".to_string(),
            ));
        }
        self.methods.delete(id).await
    }
}
