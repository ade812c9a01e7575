//! Booking request and outcome types shared by the orchestrator and the gateway.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::appointment::Appointment;
use crate::barber::Barber;
use crate::catalog::Service;
use crate::customer::Customer;
use crate::payment::PaymentRecord;

/// Customer contact data supplied with a booking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDetails {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: Option<String>,
}

/// One booking-with-payment attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub shop_id: Uuid,
    pub service_id: Uuid,
    pub barber_id: Option<Uuid>,
    pub start_at: DateTime<Utc>,
    pub customer: CustomerDetails,
    /// Single-use card token produced by the provider's web payments SDK
    pub payment_nonce: String,
    /// `FULL` or `DEPOSIT`; anything else is rejected by the orchestrator
    pub payment_mode: String,
}

/// Denormalized service data embedded in an appointment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ServiceSummary {
    pub id: Uuid,
    pub name: String,
    pub duration_minutes: i32,
    pub price_cents: i64,
}

impl From<&Service> for ServiceSummary {
    fn from(service: &Service) -> Self {
        Self {
            id: service.id,
            name: service.name.clone(),
            duration_minutes: service.duration_minutes,
            price_cents: service.price_cents,
        }
    }
}

/// Denormalized barber data embedded in an appointment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct BarberSummary {
    pub id: Uuid,
    pub name: String,
}

impl From<&Barber> for BarberSummary {
    fn from(barber: &Barber) -> Self {
        Self {
            id: barber.id,
            name: barber.name.clone(),
        }
    }
}

/// Denormalized customer data embedded in an appointment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CustomerSummary {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl From<&Customer> for CustomerSummary {
    fn from(customer: &Customer) -> Self {
        Self {
            id: customer.id,
            first_name: customer.first_name.clone(),
            last_name: customer.last_name.clone(),
            phone: customer.phone.clone(),
            email: customer.email.clone(),
        }
    }
}

/// Appointment as returned to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct AppointmentDetails {
    pub id: Uuid,
    pub shop_id: Uuid,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub status: String,
    pub service: ServiceSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barber: Option<BarberSummary>,
    pub customer: CustomerSummary,
}

impl AppointmentDetails {
    pub fn compose(
        appointment: &Appointment,
        service: &Service,
        barber: Option<&Barber>,
        customer: &Customer,
    ) -> Self {
        Self {
            id: appointment.id,
            shop_id: appointment.shop_id,
            start_at: appointment.start_at,
            end_at: appointment.end_at,
            status: appointment.status.to_string(),
            service: ServiceSummary::from(service),
            barber: barber.map(BarberSummary::from),
            customer: CustomerSummary::from(customer),
        }
    }
}

/// Payment as returned to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct PaymentSummary {
    pub id: Uuid,
    pub external_payment_ref: String,
    pub amount_cents: i64,
    pub currency: String,
    pub status: String,
}

impl From<&PaymentRecord> for PaymentSummary {
    fn from(record: &PaymentRecord) -> Self {
        Self {
            id: record.id,
            external_payment_ref: record.external_payment_ref.clone(),
            amount_cents: record.amount_cents,
            currency: record.currency.clone(),
            status: record.status.to_string(),
        }
    }
}

/// Result of a completed booking saga
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct BookingOutcome {
    pub appointment: AppointmentDetails,
    /// None when the service was free and nothing was charged
    pub payment: Option<PaymentSummary>,
    pub external_booking_ref: String,
}

/// Result of cancelling a booked appointment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CancellationOutcome {
    pub appointment_id: Uuid,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refunded_cents: Option<i64>,
}
