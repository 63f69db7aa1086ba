use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;
use crate::validation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
    PartiallyRefunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Completed => "COMPLETED",
            PaymentStatus::Failed => "FAILED",
            PaymentStatus::Refunded => "REFUNDED",
            PaymentStatus::PartiallyRefunded => "PARTIALLY_REFUNDED",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(PaymentStatus::Pending),
            "COMPLETED" => Ok(PaymentStatus::Completed),
            "FAILED" => Ok(PaymentStatus::Failed),
            "REFUNDED" => Ok(PaymentStatus::Refunded),
            "PARTIALLY_REFUNDED" => Ok(PaymentStatus::PartiallyRefunded),
            other => Err(DomainError::Validation(format!(
                "Unknown payment status: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethodKind {
    CreditCard,
    DebitCard,
    Paypal,
    ApplePay,
    GooglePay,
    CashOnDelivery,
}

impl PaymentMethodKind {
    pub const ALL: [PaymentMethodKind; 6] = [
        PaymentMethodKind::CreditCard,
        PaymentMethodKind::DebitCard,
        PaymentMethodKind::Paypal,
        PaymentMethodKind::ApplePay,
        PaymentMethodKind::GooglePay,
        PaymentMethodKind::CashOnDelivery,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethodKind::CreditCard => "CREDIT_CARD",
            PaymentMethodKind::DebitCard => "DEBIT_CARD",
            PaymentMethodKind::Paypal => "PAYPAL",
            PaymentMethodKind::ApplePay => "APPLE_PAY",
            PaymentMethodKind::GooglePay => "GOOGLE_PAY",
            PaymentMethodKind::CashOnDelivery => "CASH_ON_DELIVERY",
        }
    }
}

impl fmt::Display for PaymentMethodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethodKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "CREDIT_CARD" => Ok(PaymentMethodKind::CreditCard),
            "DEBIT_CARD" => Ok(PaymentMethodKind::DebitCard),
            "PAYPAL" => Ok(PaymentMethodKind::Paypal),
            "APPLE_PAY" => Ok(PaymentMethodKind::ApplePay),
            "GOOGLE_PAY" => Ok(PaymentMethodKind::GooglePay),
            "CASH_ON_DELIVERY" => Ok(PaymentMethodKind::CashOnDelivery),
            other => Err(DomainError::Validation(format!(
                "Unknown payment method: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RefundStatus {
    Pending,
    Completed,
    Failed,
}

impl RefundStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefundStatus::Pending => "PENDING",
            RefundStatus::Completed => "COMPLETED",
            RefundStatus::Failed => "FAILED",
        }
    }
}

impl FromStr for RefundStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(RefundStatus::Pending),
            "COMPLETED" => Ok(RefundStatus::Completed),
            "FAILED" => Ok(RefundStatus::Failed),
            other => Err(DomainError::Validation(format!(
                "Unknown refund status: {}",
                other
            ))),
        }
    }
}

/// Captured payment against an order. The transaction id is the public
/// handle; uniqueness is enforced by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: Option<String>,
    pub order_id: String,
    pub user_id: String,
    pub amount: f64,
    pub currency: String,
    pub status: PaymentStatus,
    pub method: PaymentMethodKind,
    pub transaction_id: String,
    pub gateway_metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    pub fn new(
        order_id: String,
        user_id: String,
        amount: f64,
        method: PaymentMethodKind,
        transaction_id: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            order_id,
            user_id,
            amount,
            currency: "USD".to_string(),
            status: PaymentStatus::Pending,
            method,
            transaction_id,
            gateway_metadata: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        validation::require_non_blank(&self.order_id, "Order ID")?;
        validation::require_positive(self.amount, "Amount")?;
        validation::require_non_blank(&self.currency, "Currency")?;
        Ok(())
    }

    pub fn is_refundable(&self) -> bool {
        matches!(
            self.status,
            PaymentStatus::Completed | PaymentStatus::PartiallyRefunded
        )
    }
}

/// Refund row belonging to a payment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Refund {
    pub id: Option<String>,
    pub payment_id: String,
    pub amount: f64,
    pub reason: Option<String>,
    pub status: RefundStatus,
    pub created_at: DateTime<Utc>,
}

impl Refund {
    pub fn new(payment_id: String, amount: f64, reason: Option<String>) -> Self {
        Self {
            id: None,
            payment_id,
            amount,
            reason,
            status: RefundStatus::Completed,
            created_at: Utc::now(),
        }
    }
}

/// Saved payment method on a user's account (tokenized card on file etc.)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedPaymentMethod {
    pub id: Option<String>,
    pub user_id: String,
    pub kind: PaymentMethodKind,
    pub label: Option<String>,
    pub last_four: Option<String>,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
}

impl SavedPaymentMethod {
    pub fn new(user_id: String, kind: PaymentMethodKind) -> Self {
        Self {
            id: None,
            user_id,
            kind,
            label: None,
            last_four: None,
            is_default: false,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_validation_rejects_zero_amount() {
        let payment = Payment::new(
            "o-1".to_string(),
            "u-1".to_string(),
            0.0,
            PaymentMethodKind::CreditCard,
            "TXN_x".to_string(),
        );
        assert!(payment.validate().is_err());
    }

    #[test]
    fn only_captured_payments_are_refundable() {
        let mut payment = Payment::new(
            "o-1".to_string(),
            "u-1".to_string(),
            25.0,
            PaymentMethodKind::Paypal,
            "TXN_x".to_string(),
        );
        assert!(!payment.is_refundable());
        payment.status = PaymentStatus::Completed;
        assert!(payment.is_refundable());
        payment.status = PaymentStatus::PartiallyRefunded;
        assert!(payment.is_refundable());
        payment.status = PaymentStatus::Refunded;
        assert!(!payment.is_refundable());
    }

    #[test]
    fn method_kinds_round_trip() {
        for kind in PaymentMethodKind::ALL {
            assert_eq!(kind.as_str().parse::<PaymentMethodKind>().unwrap(), kind);
        }
        assert!("WIRE".parse::<PaymentMethodKind>().is_err());
    }
}
