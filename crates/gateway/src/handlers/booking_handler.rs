//! Booking and cancellation handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::post,
    Router,
};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use common::AppResult;
use domain::{BookingOutcome, BookingRequest, CancellationOutcome, CustomerDetails};

use crate::extractors::ValidatedJson;
use crate::state::AppState;

/// Digits with an optional leading `+` and common separators.
static PHONE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\+?[0-9][0-9 ().-]{6,19}$").expect("phone pattern is a valid regex")
});

/// Customer contact data
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInput {
    #[validate(length(min = 1, max = 100, message = "First name is required"))]
    #[schema(example = "Sam")]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "Last name is required"))]
    #[schema(example = "Rivera")]
    pub last_name: String,
    /// Identifies the customer within the shop
    #[validate(regex(path = *PHONE_PATTERN, message = "Phone number is invalid"))]
    #[schema(example = "+15551234567")]
    pub phone: String,
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "sam@example.com")]
    pub email: Option<String>,
}

/// Booking request with validation
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub shop_id: Uuid,
    pub service_id: Uuid,
    /// Omit to book with any barber
    pub barber_id: Option<Uuid>,
    pub start_at: DateTime<Utc>,
    #[validate(nested)]
    pub customer: CustomerInput,
    /// Single-use card token from the provider's web payments SDK
    #[validate(length(min = 1, message = "Payment nonce is required"))]
    pub payment_nonce: String,
    /// `FULL` or `DEPOSIT`
    #[schema(example = "DEPOSIT")]
    pub payment_mode: String,
}

impl From<CreateBookingRequest> for BookingRequest {
    fn from(req: CreateBookingRequest) -> Self {
        Self {
            shop_id: req.shop_id,
            service_id: req.service_id,
            barber_id: req.barber_id,
            start_at: req.start_at,
            customer: CustomerDetails {
                first_name: req.customer.first_name.trim().to_string(),
                last_name: req.customer.last_name.trim().to_string(),
                phone: req.customer.phone.trim().to_string(),
                email: req.customer.email.filter(|e| !e.trim().is_empty()),
            },
            payment_nonce: req.payment_nonce,
            payment_mode: req.payment_mode,
        }
    }
}

/// Cancellation request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CancelAppointmentRequest {
    /// Shop the appointment must belong to
    pub shop_id: Uuid,
}

/// Create booking routes
pub fn booking_routes() -> Router<AppState> {
    Router::new()
        .route("/bookings", post(create_booking))
        .route("/appointments/:id/cancel", post(cancel_appointment))
}

/// Book an appointment and take payment
#[utoipa::path(
    post,
    path = "/bookings",
    tag = "Bookings",
    request_body = CreateBookingRequest,
    responses(
        (status = 201, description = "Appointment booked", body = BookingOutcome),
        (status = 400, description = "Invalid request, declined payment or slot no longer available"),
        (status = 404, description = "Shop, service or barber not found"),
        (status = 500, description = "Provider failure or booking needs manual reconciliation")
    )
)]
pub async fn create_booking(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateBookingRequest>,
) -> AppResult<(StatusCode, Json<BookingOutcome>)> {
    let outcome = state.booking.book(req.into()).await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

/// Cancel an appointment and refund its payment
#[utoipa::path(
    post,
    path = "/appointments/{id}/cancel",
    tag = "Bookings",
    params(
        ("id" = Uuid, Path, description = "Appointment ID")
    ),
    request_body = CancelAppointmentRequest,
    responses(
        (status = 200, description = "Appointment cancelled", body = CancellationOutcome),
        (status = 400, description = "Appointment belongs to another shop or is already cancelled"),
        (status = 404, description = "Appointment not found"),
        (status = 500, description = "Provider failure or refund needs manual reconciliation")
    )
)]
pub async fn cancel_appointment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<CancelAppointmentRequest>,
) -> AppResult<Json<CancellationOutcome>> {
    let outcome = state.booking.cancel_appointment(req.shop_id, id).await?;
    Ok(Json(outcome))
}
