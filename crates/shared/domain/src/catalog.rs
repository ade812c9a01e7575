//! Service catalog entity.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{DomainError, DomainResult};

/// A bookable service offered by a shop (haircut, beard trim, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub id: Uuid,
    pub shop_id: Uuid,
    pub name: String,
    /// Length of one appointment, always >= 1
    pub duration_minutes: i32,
    /// Price in the smallest currency unit
    pub price_cents: i64,
    /// Catalog item id at the scheduling provider
    pub external_catalog_ref: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Service {
    /// Check that the service is offered by the given shop
    pub fn belongs_to(&self, shop_id: Uuid) -> bool {
        self.shop_id == shop_id
    }

    /// Provider catalog reference, required before availability or booking.
    pub fn catalog_ref(&self) -> DomainResult<&str> {
        self.external_catalog_ref
            .as_deref()
            .filter(|r| !r.is_empty())
            .ok_or_else(|| {
                DomainError::invalid_request("This service cannot be booked online yet")
            })
    }

    pub fn duration(&self) -> Duration {
        Duration::minutes(i64::from(self.duration_minutes))
    }

    /// End of an appointment starting at `start_at`.
    pub fn end_for(&self, start_at: DateTime<Utc>) -> DateTime<Utc> {
        start_at + self.duration()
    }
}
