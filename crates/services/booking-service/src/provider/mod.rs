//! Scheduling and payments provider client.
//!
//! The resolver and the orchestrator only see the [`SchedulingProvider`]
//! trait; [`SquareClient`] is the production implementation. Provider
//! failures are translated to booking outcomes in exactly one place,
//! [`classify`].

mod classify;
mod square;

pub use classify::{classify, to_app_error, BOOKING_CONFLICT_MESSAGE, PAYMENT_DECLINED_MESSAGE};
pub use square::SquareClient;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use domain::{Money, PaymentStatus};
use serde::Deserialize;
use thiserror::Error;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Availability search for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilitySearch {
    pub location_ref: String,
    pub service_ref: String,
    pub staff_ref: Option<String>,
    pub date: NaiveDate,
}

/// One open start time reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityRecord {
    pub start_at: DateTime<Utc>,
    /// Staff member the provider assigned to the slot, if any
    pub staff_ref: Option<String>,
}

/// Slot reservation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingReservation {
    pub location_ref: String,
    pub service_ref: String,
    pub staff_ref: Option<String>,
    pub customer_ref: Option<String>,
    pub start_at: DateTime<Utc>,
    pub duration_minutes: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalBooking {
    pub booking_ref: String,
}

/// Card charge, captured immediately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargeRequest {
    /// Single-use card token
    pub nonce: String,
    pub amount: Money,
    pub location_ref: String,
    pub customer_ref: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargeReceipt {
    pub payment_ref: String,
    pub status: PaymentStatus,
    /// Provider customer the payment was attached to
    pub customer_ref: Option<String>,
}

/// Refund of a captured payment. `None` refunds the full payment amount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefundRequest {
    pub payment_ref: String,
    pub amount: Option<Money>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefundStatus {
    Pending,
    Completed,
    Rejected,
    Failed,
}

impl From<&str> for RefundStatus {
    fn from(s: &str) -> Self {
        match s {
            "COMPLETED" => RefundStatus::Completed,
            "REJECTED" => RefundStatus::Rejected,
            "FAILED" => RefundStatus::Failed,
            _ => RefundStatus::Pending,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefundReceipt {
    pub refund_ref: String,
    pub status: RefundStatus,
}

impl RefundReceipt {
    /// The provider accepted the refund request but will not return the money
    pub fn is_failed(&self) -> bool {
        matches!(self.status, RefundStatus::Rejected | RefundStatus::Failed)
    }
}

/// A single entry of the provider's `errors[]` array.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiErrorDetail {
    pub category: String,
    pub code: String,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub field: Option<String>,
}

impl ApiErrorDetail {
    pub fn new(category: &str, code: &str, detail: Option<&str>) -> Self {
        Self {
            category: category.to_string(),
            code: code.to_string(),
            detail: detail.map(str::to_string),
            field: None,
        }
    }
}

/// Errors returned by provider calls.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Transport failure or timeout
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response with decoded error entries
    #[error("API error {status}: {}", describe(.errors))]
    Api {
        status: u16,
        errors: Vec<ApiErrorDetail>,
    },

    #[error("Failed to decode provider response: {0}")]
    Decode(String),

    #[error("Provider client misconfigured: {0}")]
    Configuration(String),
}

impl ProviderError {
    pub fn api(status: u16, errors: Vec<ApiErrorDetail>) -> Self {
        ProviderError::Api { status, errors }
    }

    /// The request may have taken effect even though no usable answer came
    /// back: a timeout, a cut-off body or a response that did not decode.
    pub fn outcome_unknown(&self) -> bool {
        match self {
            ProviderError::Http(e) => e.is_timeout() || e.is_body() || e.is_decode(),
            ProviderError::Decode(_) => true,
            ProviderError::Api { .. } | ProviderError::Configuration(_) => false,
        }
    }
}

fn describe(errors: &[ApiErrorDetail]) -> String {
    errors
        .iter()
        .map(|e| match &e.detail {
            Some(detail) => format!("{}/{}: {}", e.category, e.code, detail),
            None => format!("{}/{}", e.category, e.code),
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// External scheduling and payments API.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait SchedulingProvider: Send + Sync {
    /// Open start times for a service at a location on one day
    async fn search_availability(
        &self,
        search: AvailabilitySearch,
    ) -> Result<Vec<AvailabilityRecord>, ProviderError>;

    /// Reserve a slot. Fails with a conflict when the slot was taken.
    async fn create_booking(
        &self,
        reservation: BookingReservation,
    ) -> Result<ExternalBooking, ProviderError>;

    async fn cancel_booking(&self, booking_ref: &str) -> Result<(), ProviderError>;

    /// Charge and capture a card payment
    async fn charge_card(&self, charge: ChargeRequest) -> Result<ChargeReceipt, ProviderError>;

    async fn refund_payment(&self, refund: RefundRequest) -> Result<RefundReceipt, ProviderError>;
}
