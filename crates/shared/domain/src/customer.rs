//! Customer domain entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A shop's customer. Phone number is the natural key within a shop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: Uuid,
    pub shop_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: Option<String>,
    /// Customer id at the scheduling provider, filled lazily
    pub external_customer_ref: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Check whether the provider reference still needs to be backfilled
    pub fn needs_external_ref(&self) -> bool {
        self.external_customer_ref.is_none()
    }
}

/// Customer creation data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCustomer {
    pub shop_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: Option<String>,
}
