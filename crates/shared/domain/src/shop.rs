//! Shop domain entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{DomainError, DomainResult};

/// A barbershop tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shop {
    pub id: Uuid,
    pub name: String,
    /// Location id at the scheduling provider (None = integration not configured)
    pub external_location_ref: Option<String>,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Shop {
    /// Provider location reference, required before availability or booking.
    pub fn location_ref(&self) -> DomainResult<&str> {
        self.external_location_ref
            .as_deref()
            .filter(|r| !r.is_empty())
            .ok_or_else(|| {
                DomainError::invalid_request("Online booking is not configured for this shop")
            })
    }
}
