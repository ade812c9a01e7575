//! Payment records and money types.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{
    PAYMENT_MODE_DEPOSIT, PAYMENT_MODE_FULL, PAYMENT_STATUS_AUTHORIZED, PAYMENT_STATUS_CAPTURED,
    PAYMENT_STATUS_FAILED, PAYMENT_STATUS_REFUNDED, VALID_PAYMENT_MODES,
};
use crate::error::DomainError;

/// An amount in the smallest currency unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    pub amount_cents: i64,
    pub currency: String,
}

impl Money {
    pub fn new(amount_cents: i64, currency: impl Into<String>) -> Self {
        Self {
            amount_cents,
            currency: currency.into(),
        }
    }

    pub fn is_zero(&self) -> bool {
        self.amount_cents == 0
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.amount_cents, self.currency)
    }
}

/// How much of the service price is charged at booking time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentMode {
    Full,
    Deposit,
}

impl FromStr for PaymentMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            PAYMENT_MODE_FULL => Ok(PaymentMode::Full),
            PAYMENT_MODE_DEPOSIT => Ok(PaymentMode::Deposit),
            other => Err(DomainError::invalid_request(format!(
                "Unsupported payment mode '{}'. Must be one of: {}",
                other,
                VALID_PAYMENT_MODES.join(", ")
            ))),
        }
    }
}

impl std::fmt::Display for PaymentMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentMode::Full => write!(f, "{}", PAYMENT_MODE_FULL),
            PaymentMode::Deposit => write!(f, "{}", PAYMENT_MODE_DEPOSIT),
        }
    }
}

/// Payment lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Authorized,
    Captured,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Authorized => PAYMENT_STATUS_AUTHORIZED,
            PaymentStatus::Captured => PAYMENT_STATUS_CAPTURED,
            PaymentStatus::Failed => PAYMENT_STATUS_FAILED,
            PaymentStatus::Refunded => PAYMENT_STATUS_REFUNDED,
        }
    }

    /// The provider still holds the customer's money for this payment.
    pub fn holds_funds(&self) -> bool {
        matches!(self, PaymentStatus::Authorized | PaymentStatus::Captured)
    }
}

impl From<&str> for PaymentStatus {
    fn from(s: &str) -> Self {
        match s {
            PAYMENT_STATUS_AUTHORIZED => PaymentStatus::Authorized,
            PAYMENT_STATUS_FAILED => PaymentStatus::Failed,
            PAYMENT_STATUS_REFUNDED => PaymentStatus::Refunded,
            _ => PaymentStatus::Captured,
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Local mirror of a provider payment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub id: Uuid,
    /// Set once the appointment row exists
    pub appointment_id: Option<Uuid>,
    pub customer_id: Uuid,
    pub external_payment_ref: String,
    pub amount_cents: i64,
    pub currency: String,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PaymentRecord {
    pub fn money(&self) -> Money {
        Money::new(self.amount_cents, self.currency.clone())
    }
}

/// Payment record creation data. The appointment link is filled by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPaymentRecord {
    pub customer_id: Uuid,
    pub external_payment_ref: String,
    pub amount_cents: i64,
    pub currency: String,
    pub status: PaymentStatus,
}
