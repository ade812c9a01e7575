//! Availability query and slot types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Availability lookup for one shop, service and calendar day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityQuery {
    pub shop_id: Uuid,
    pub service_id: Uuid,
    pub barber_id: Option<Uuid>,
    /// Passed to the provider verbatim, no timezone conversion
    pub date: NaiveDate,
}

/// A bookable time range. Computed per request, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct AvailabilitySlot {
    /// Slot start as reported by the provider
    pub start_at: DateTime<Utc>,
    /// Start plus service duration
    pub end_at: DateTime<Utc>,
    /// Local barber, when the provider's staff member is mirrored locally
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barber_id: Option<Uuid>,
}
