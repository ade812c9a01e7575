//! Domain layer - Core business entities and value objects.
//!
//! This crate contains pure domain logic with no infrastructure dependencies.
//! The booking service and the HTTP gateway share these types.

pub mod appointment;
pub mod barber;
pub mod booking;
pub mod catalog;
pub mod constants;
pub mod customer;
pub mod error;
pub mod payment;
pub mod shop;
pub mod slot;

pub use appointment::{Appointment, AppointmentStatus, NewAppointment};
pub use barber::Barber;
pub use booking::{
    AppointmentDetails, BarberSummary, BookingOutcome, BookingRequest, CancellationOutcome,
    CustomerDetails, CustomerSummary, PaymentSummary, ServiceSummary,
};
pub use catalog::Service;
pub use constants::*;
pub use customer::{Customer, NewCustomer};
pub use error::{DomainError, DomainResult};
pub use payment::{Money, NewPaymentRecord, PaymentMode, PaymentRecord, PaymentStatus};
pub use shop::Shop;
pub use slot::{AvailabilityQuery, AvailabilitySlot};
