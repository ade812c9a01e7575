//! Application services - availability lookups and the booking saga.
//!
//! Both services depend on the [`EntityStore`](crate::repository::EntityStore)
//! and [`SchedulingProvider`](crate::provider::SchedulingProvider) traits and
//! receive them at construction time.

mod availability;
pub mod booking;
mod catalog;

pub use availability::{AvailabilityResolver, AvailabilityService};
pub use booking::{
    BookingOrchestrator, BookingService, BookingState, ChargePolicy, PercentageDeposit, SagaStep,
};
pub use catalog::{load_target, BookingTarget, ProviderRefs};
