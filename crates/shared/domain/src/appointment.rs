//! Appointment domain entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{APPOINTMENT_STATUS_BOOKED, APPOINTMENT_STATUS_CANCELLED};

/// Persisted appointment states.
///
/// Only terminal states are stored; an attempt that never reached the
/// provider leaves no appointment row behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Booked,
    Cancelled,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Booked => APPOINTMENT_STATUS_BOOKED,
            AppointmentStatus::Cancelled => APPOINTMENT_STATUS_CANCELLED,
        }
    }
}

impl From<&str> for AppointmentStatus {
    fn from(s: &str) -> Self {
        match s {
            APPOINTMENT_STATUS_CANCELLED => AppointmentStatus::Cancelled,
            _ => AppointmentStatus::Booked,
        }
    }
}

impl std::fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Appointment domain entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub shop_id: Uuid,
    pub barber_id: Option<Uuid>,
    pub service_id: Uuid,
    pub customer_id: Uuid,
    pub start_at: DateTime<Utc>,
    /// Always `start_at + service.duration`
    pub end_at: DateTime<Utc>,
    pub status: AppointmentStatus,
    pub external_booking_ref: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    pub fn is_cancelled(&self) -> bool {
        self.status == AppointmentStatus::Cancelled
    }
}

/// Appointment creation data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAppointment {
    pub shop_id: Uuid,
    pub barber_id: Option<Uuid>,
    pub service_id: Uuid,
    pub customer_id: Uuid,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub external_booking_ref: String,
}
