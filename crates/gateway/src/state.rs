//! Application state for dependency injection.

use std::sync::Arc;

use booking_service_lib::infra::Database;
use booking_service_lib::service::{AvailabilityService, BookingService};
use booking_service_lib::BookingCore;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub availability: Arc<dyn AvailabilityService>,
    pub booking: Arc<dyn BookingService>,
    /// Absent when the gateway runs against in-process fakes
    pub database: Option<Database>,
}

impl AppState {
    /// Create new app state.
    pub fn new(
        availability: Arc<dyn AvailabilityService>,
        booking: Arc<dyn BookingService>,
        database: Option<Database>,
    ) -> Self {
        Self {
            availability,
            booking,
            database,
        }
    }
}

impl From<BookingCore> for AppState {
    fn from(core: BookingCore) -> Self {
        Self::new(core.availability, core.booking, Some(core.database))
    }
}
