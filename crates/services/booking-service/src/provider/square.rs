//! Square v2 REST client.
//!
//! Every mutating call carries a fresh idempotency key. Non-2xx responses
//! are decoded into [`ProviderError::Api`] so they can be classified.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use secrecy::{ExposeSecret, SecretString};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use uuid::Uuid;

use common::ProviderConfig;
use domain::{Money, PaymentStatus};

use super::{
    ApiErrorDetail, AvailabilityRecord, AvailabilitySearch, BookingReservation, ChargeReceipt,
    ChargeRequest, ExternalBooking, ProviderError, RefundReceipt, RefundRequest, RefundStatus,
    SchedulingProvider,
};

const VERSION_HEADER: &str = "Square-Version";

/// Square scheduling and payments client.
#[derive(Clone)]
pub struct SquareClient {
    http: reqwest::Client,
    base_url: String,
    access_token: SecretString,
}

impl std::fmt::Debug for SquareClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SquareClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl SquareClient {
    /// Build a client from provider configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the version header is malformed or the HTTP client
    /// fails to build.
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            VERSION_HEADER,
            HeaderValue::from_str(&config.api_version).map_err(|e| {
                ProviderError::Configuration(format!("Invalid API version header: {e}"))
            })?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            access_token: SecretString::from(config.access_token.clone()),
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ProviderError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .get(&url)
            .bearer_auth(self.access_token.expose_secret())
            .send()
            .await?;
        Self::handle_response(response).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ProviderError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .post(&url)
            .bearer_auth(self.access_token.expose_secret())
            .json(body)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ProviderError> {
        let status = response.status();
        let bytes = response.bytes().await?;

        if status.is_success() {
            return serde_json::from_slice(&bytes)
                .map_err(|e| ProviderError::Decode(e.to_string()));
        }

        // Square always answers failures with an `errors` array; anything
        // else still becomes an Api error so it classifies as upstream.
        let errors = serde_json::from_slice::<ErrorEnvelope>(&bytes)
            .map(|envelope| envelope.errors)
            .unwrap_or_default();
        tracing::debug!(status = status.as_u16(), ?errors, "Provider call failed");
        Err(ProviderError::api(status.as_u16(), errors))
    }

    /// Current version of a catalog item variation, required by bookings
    async fn service_version(&self, service_ref: &str) -> Result<Option<i64>, ProviderError> {
        let response: CatalogObjectResponse = self
            .get(&format!("/v2/catalog/object/{service_ref}"))
            .await?;
        Ok(response.object.and_then(|o| o.version))
    }

    async fn payment_amount(&self, payment_ref: &str) -> Result<Money, ProviderError> {
        let response: PaymentResponse = self.get(&format!("/v2/payments/{payment_ref}")).await?;
        response
            .payment
            .amount_money
            .map(Money::from)
            .ok_or_else(|| ProviderError::Decode(format!("payment {payment_ref} has no amount")))
    }
}

#[async_trait]
impl SchedulingProvider for SquareClient {
    async fn search_availability(
        &self,
        search: AvailabilitySearch,
    ) -> Result<Vec<AvailabilityRecord>, ProviderError> {
        let start = search.date.and_hms_opt(0, 0, 0).map(|t| t.and_utc());
        let end = search
            .date
            .succ_opt()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|t| t.and_utc());
        let (Some(start_at), Some(end_at)) = (start, end) else {
            return Err(ProviderError::Configuration(format!(
                "date {} out of range",
                search.date
            )));
        };

        let body = SearchAvailabilityBody {
            query: SearchQuery {
                filter: SearchFilter {
                    start_at_range: TimeRange { start_at, end_at },
                    location_id: search.location_ref,
                    segment_filters: vec![SegmentFilter {
                        service_variation_id: search.service_ref,
                        team_member_id_filter: search
                            .staff_ref
                            .map(|staff| TeamMemberFilter { any: vec![staff] }),
                    }],
                },
            },
        };

        let response: SearchAvailabilityResponse = self
            .post("/v2/bookings/availability/search", &body)
            .await?;

        Ok(response
            .availabilities
            .into_iter()
            .map(|a| AvailabilityRecord {
                start_at: a.start_at,
                staff_ref: a
                    .appointment_segments
                    .into_iter()
                    .find_map(|s| s.team_member_id),
            })
            .collect())
    }

    async fn create_booking(
        &self,
        reservation: BookingReservation,
    ) -> Result<ExternalBooking, ProviderError> {
        let service_variation_version = self.service_version(&reservation.service_ref).await?;

        let body = CreateBookingBody {
            idempotency_key: Uuid::new_v4().to_string(),
            booking: NewBooking {
                start_at: reservation.start_at,
                location_id: reservation.location_ref,
                customer_id: reservation.customer_ref,
                appointment_segments: vec![AppointmentSegment {
                    duration_minutes: Some(reservation.duration_minutes),
                    service_variation_id: Some(reservation.service_ref),
                    service_variation_version,
                    team_member_id: reservation.staff_ref,
                }],
            },
        };

        let response: BookingResponse = self.post("/v2/bookings", &body).await?;
        Ok(ExternalBooking {
            booking_ref: response.booking.id,
        })
    }

    async fn cancel_booking(&self, booking_ref: &str) -> Result<(), ProviderError> {
        let current: BookingResponse = self.get(&format!("/v2/bookings/{booking_ref}")).await?;

        let body = CancelBookingBody {
            idempotency_key: Uuid::new_v4().to_string(),
            booking_version: current.booking.version,
        };
        let _: BookingResponse = self
            .post(&format!("/v2/bookings/{booking_ref}/cancel"), &body)
            .await?;
        Ok(())
    }

    async fn charge_card(&self, charge: ChargeRequest) -> Result<ChargeReceipt, ProviderError> {
        let body = CreatePaymentBody {
            source_id: charge.nonce,
            idempotency_key: Uuid::new_v4().to_string(),
            amount_money: WireMoney::from(&charge.amount),
            autocomplete: true,
            location_id: charge.location_ref,
            customer_id: charge.customer_ref,
        };

        let response: PaymentResponse = self.post("/v2/payments", &body).await?;
        let payment = response.payment;
        let status = payment_status(payment.status.as_deref()).ok_or_else(|| {
            ProviderError::Decode(format!(
                "payment {} has unrecognized status {:?}",
                payment.id, payment.status
            ))
        })?;
        Ok(ChargeReceipt {
            status,
            payment_ref: payment.id,
            customer_ref: payment.customer_id,
        })
    }

    async fn refund_payment(&self, refund: RefundRequest) -> Result<RefundReceipt, ProviderError> {
        let amount = match refund.amount {
            Some(amount) => amount,
            None => self.payment_amount(&refund.payment_ref).await?,
        };

        let body = RefundPaymentBody {
            idempotency_key: Uuid::new_v4().to_string(),
            payment_id: refund.payment_ref,
            amount_money: WireMoney::from(&amount),
        };

        let response: RefundResponse = self.post("/v2/refunds", &body).await?;
        Ok(RefundReceipt {
            refund_ref: response.refund.id,
            status: RefundStatus::from(response.refund.status.as_str()),
        })
    }
}

/// `None` for a missing or unrecognized status.
fn payment_status(status: Option<&str>) -> Option<PaymentStatus> {
    match status? {
        "COMPLETED" => Some(PaymentStatus::Captured),
        "APPROVED" | "PENDING" => Some(PaymentStatus::Authorized),
        "FAILED" | "CANCELED" => Some(PaymentStatus::Failed),
        _ => None,
    }
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    errors: Vec<ApiErrorDetail>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireMoney {
    amount: i64,
    currency: String,
}

impl From<&Money> for WireMoney {
    fn from(money: &Money) -> Self {
        Self {
            amount: money.amount_cents,
            currency: money.currency.clone(),
        }
    }
}

impl From<WireMoney> for Money {
    fn from(wire: WireMoney) -> Self {
        Money::new(wire.amount, wire.currency)
    }
}

#[derive(Debug, Serialize)]
struct SearchAvailabilityBody {
    query: SearchQuery,
}

#[derive(Debug, Serialize)]
struct SearchQuery {
    filter: SearchFilter,
}

#[derive(Debug, Serialize)]
struct SearchFilter {
    start_at_range: TimeRange,
    location_id: String,
    segment_filters: Vec<SegmentFilter>,
}

#[derive(Debug, Serialize)]
struct TimeRange {
    start_at: DateTime<Utc>,
    end_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
struct SegmentFilter {
    service_variation_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    team_member_id_filter: Option<TeamMemberFilter>,
}

#[derive(Debug, Serialize)]
struct TeamMemberFilter {
    any: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct SearchAvailabilityResponse {
    #[serde(default)]
    availabilities: Vec<WireAvailability>,
}

#[derive(Debug, Deserialize)]
struct WireAvailability {
    start_at: DateTime<Utc>,
    #[serde(default)]
    appointment_segments: Vec<AppointmentSegment>,
}

#[derive(Debug, Serialize, Deserialize)]
struct AppointmentSegment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    duration_minutes: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    service_variation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    service_variation_version: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    team_member_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct CreateBookingBody {
    idempotency_key: String,
    booking: NewBooking,
}

#[derive(Debug, Serialize)]
struct NewBooking {
    start_at: DateTime<Utc>,
    location_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    customer_id: Option<String>,
    appointment_segments: Vec<AppointmentSegment>,
}

#[derive(Debug, Serialize)]
struct CancelBookingBody {
    idempotency_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    booking_version: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct BookingResponse {
    booking: WireBooking,
}

#[derive(Debug, Deserialize)]
struct WireBooking {
    id: String,
    #[serde(default)]
    version: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct CatalogObjectResponse {
    #[serde(default)]
    object: Option<CatalogObject>,
}

#[derive(Debug, Deserialize)]
struct CatalogObject {
    #[serde(default)]
    version: Option<i64>,
}

#[derive(Debug, Serialize)]
struct CreatePaymentBody {
    source_id: String,
    idempotency_key: String,
    amount_money: WireMoney,
    autocomplete: bool,
    location_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    customer_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PaymentResponse {
    payment: WirePayment,
}

#[derive(Debug, Deserialize)]
struct WirePayment {
    id: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    customer_id: Option<String>,
    #[serde(default)]
    amount_money: Option<WireMoney>,
}

#[derive(Debug, Serialize)]
struct RefundPaymentBody {
    idempotency_key: String,
    payment_id: String,
    amount_money: WireMoney,
}

#[derive(Debug, Deserialize)]
struct RefundResponse {
    refund: WireRefund,
}

#[derive(Debug, Deserialize)]
struct WireRefund {
    id: String,
    status: String,
}
