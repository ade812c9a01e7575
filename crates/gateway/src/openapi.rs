//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::handlers::booking_handler::{
    CancelAppointmentRequest, CreateBookingRequest, CustomerInput,
};
use domain::{
    AppointmentDetails, AvailabilitySlot, BarberSummary, BookingOutcome, CancellationOutcome,
    CustomerSummary, PaymentSummary, ServiceSummary,
};

/// API documentation struct.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::availability_handler::get_availability,
        crate::handlers::booking_handler::create_booking,
        crate::handlers::booking_handler::cancel_appointment,
    ),
    components(
        schemas(
            AvailabilitySlot,
            CreateBookingRequest,
            CustomerInput,
            CancelAppointmentRequest,
            BookingOutcome,
            AppointmentDetails,
            ServiceSummary,
            BarberSummary,
            CustomerSummary,
            PaymentSummary,
            CancellationOutcome,
        )
    ),
    tags(
        (name = "Availability", description = "Bookable time slots"),
        (name = "Bookings", description = "Booking with payment and cancellation"),
    )
)]
pub struct ApiDoc;
