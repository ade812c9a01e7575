//! Barber domain entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{DomainError, DomainResult};

/// Staff member who performs services.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Barber {
    pub id: Uuid,
    pub shop_id: Uuid,
    pub name: String,
    /// Team member id at the scheduling provider
    pub external_staff_ref: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Barber {
    pub fn belongs_to(&self, shop_id: Uuid) -> bool {
        self.shop_id == shop_id
    }

    /// Provider staff reference of a barber that can take bookings.
    pub fn staff_ref(&self) -> DomainResult<&str> {
        if !self.active {
            return Err(DomainError::invalid_request(
                "This barber is not accepting bookings",
            ));
        }
        self.external_staff_ref
            .as_deref()
            .filter(|r| !r.is_empty())
            .ok_or_else(|| {
                DomainError::invalid_request("This barber cannot be booked online yet")
            })
    }
}
