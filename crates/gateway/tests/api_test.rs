//! Integration tests for API endpoints.
//!
//! These tests drive the real router against fake services, so no database
//! or scheduling provider is needed.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{TimeZone, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use booking_service_lib::service::{AvailabilityService, BookingService};
use common::{AppError, AppResult};
use domain::{
    AppointmentDetails, AvailabilityQuery, AvailabilitySlot, BookingOutcome, BookingRequest,
    CancellationOutcome, CustomerSummary, ServiceSummary,
};
use gateway_lib::routes::create_router;
use gateway_lib::state::AppState;

// =============================================================================
// Fake Services for Testing
// =============================================================================

/// Availability fake that records queries and returns a fixed day
#[derive(Default)]
struct FakeAvailability {
    queries: Mutex<Vec<AvailabilityQuery>>,
    failure: Mutex<Option<AppError>>,
}

impl FakeAvailability {
    fn failing(error: AppError) -> Self {
        Self {
            failure: Mutex::new(Some(error)),
            ..Default::default()
        }
    }
}

#[async_trait]
impl AvailabilityService for FakeAvailability {
    async fn find_slots(&self, query: AvailabilityQuery) -> AppResult<Vec<AvailabilitySlot>> {
        self.queries.lock().unwrap().push(query);
        if let Some(error) = self.failure.lock().unwrap().take() {
            return Err(error);
        }
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap();
        Ok(vec![AvailabilitySlot {
            start_at: start,
            end_at: start + chrono::Duration::minutes(30),
            barber_id: None,
        }])
    }
}

/// Booking fake that echoes the request into an outcome
#[derive(Default)]
struct FakeBooking {
    requests: Mutex<Vec<BookingRequest>>,
    cancellations: Mutex<Vec<(Uuid, Uuid)>>,
    failure: Mutex<Option<AppError>>,
}

impl FakeBooking {
    fn failing(error: AppError) -> Self {
        Self {
            failure: Mutex::new(Some(error)),
            ..Default::default()
        }
    }
}

#[async_trait]
impl BookingService for FakeBooking {
    async fn book(&self, request: BookingRequest) -> AppResult<BookingOutcome> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(error) = self.failure.lock().unwrap().take() {
            return Err(error);
        }
        Ok(BookingOutcome {
            appointment: AppointmentDetails {
                id: Uuid::new_v4(),
                shop_id: request.shop_id,
                start_at: request.start_at,
                end_at: request.start_at + chrono::Duration::minutes(30),
                status: "booked".to_string(),
                service: ServiceSummary {
                    id: request.service_id,
                    name: "Skin fade".to_string(),
                    duration_minutes: 30,
                    price_cents: 5000,
                },
                barber: None,
                customer: CustomerSummary {
                    id: Uuid::new_v4(),
                    first_name: request.customer.first_name,
                    last_name: request.customer.last_name,
                    phone: request.customer.phone,
                    email: request.customer.email,
                },
            },
            payment: None,
            external_booking_ref: "bk-1".to_string(),
        })
    }

    async fn cancel_appointment(
        &self,
        shop_id: Uuid,
        appointment_id: Uuid,
    ) -> AppResult<CancellationOutcome> {
        self.cancellations
            .lock()
            .unwrap()
            .push((shop_id, appointment_id));
        if let Some(error) = self.failure.lock().unwrap().take() {
            return Err(error);
        }
        Ok(CancellationOutcome {
            appointment_id,
            status: "cancelled".to_string(),
            refunded_cents: Some(1000),
        })
    }
}

struct TestApp {
    router: Router,
    availability: Arc<FakeAvailability>,
    booking: Arc<FakeBooking>,
}

impl TestApp {
    fn new() -> Self {
        Self::with(FakeAvailability::default(), FakeBooking::default())
    }

    fn with(availability: FakeAvailability, booking: FakeBooking) -> Self {
        let availability = Arc::new(availability);
        let booking = Arc::new(booking);
        let state = AppState::new(availability.clone(), booking.clone(), None);
        Self {
            router: create_router(state),
            availability,
            booking,
        }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }
}

fn booking_body() -> Value {
    json!({
        "shopId": Uuid::new_v4(),
        "serviceId": Uuid::new_v4(),
        "startAt": "2024-06-01T10:00:00Z",
        "customer": {
            "firstName": "Sam",
            "lastName": "Rivera",
            "phone": "+15551234567",
            "email": "sam@example.com"
        },
        "paymentNonce": "cnon:card-nonce-ok",
        "paymentMode": "DEPOSIT"
    })
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn health_is_ok_without_database() {
    let app = TestApp::new();
    let (status, body) = app.get("/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

// =============================================================================
// Availability
// =============================================================================

#[tokio::test]
async fn availability_returns_slots() {
    let app = TestApp::new();
    let shop_id = Uuid::new_v4();
    let service_id = Uuid::new_v4();

    let (status, body) = app
        .get(&format!(
            "/availability?shopId={shop_id}&serviceId={service_id}&date=2024-06-01"
        ))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["startAt"], "2024-06-01T10:00:00Z");
    assert_eq!(body[0]["endAt"], "2024-06-01T10:30:00Z");

    let queries = app.availability.queries.lock().unwrap();
    assert_eq!(queries[0].shop_id, shop_id);
    assert_eq!(queries[0].service_id, service_id);
    assert_eq!(queries[0].barber_id, None);
    assert_eq!(queries[0].date.to_string(), "2024-06-01");
}

#[tokio::test]
async fn availability_rejects_malformed_date() {
    let app = TestApp::new();

    for date in ["06/01/2024", "2024-13-01", "tomorrow"] {
        let (status, body) = app
            .get(&format!(
                "/availability?shopId={}&serviceId={}&date={date}",
                Uuid::new_v4(),
                Uuid::new_v4()
            ))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{date}");
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }
    assert!(app.availability.queries.lock().unwrap().is_empty());
}

#[tokio::test]
async fn availability_rejects_missing_ids() {
    let app = TestApp::new();
    let (status, body) = app.get("/availability?date=2024-06-01").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn availability_errors_use_status_mapping() {
    let app = TestApp::with(
        FakeAvailability::failing(AppError::not_found("Shop")),
        FakeBooking::default(),
    );
    let uri = format!(
        "/availability?shopId={}&serviceId={}&date=2024-06-01",
        Uuid::new_v4(),
        Uuid::new_v4()
    );

    let (status, body) = app.get(&uri).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn availability_hides_provider_detail() {
    let app = TestApp::with(
        FakeAvailability::failing(AppError::upstream(
            "SERVICE_UNAVAILABLE from connect.squareup.com",
        )),
        FakeBooking::default(),
    );
    let uri = format!(
        "/availability?shopId={}&serviceId={}&date=2024-06-01",
        Uuid::new_v4(),
        Uuid::new_v4()
    );

    let (status, body) = app.get(&uri).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], "UPSTREAM_ERROR");
    assert!(!body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("squareup"));
}

// =============================================================================
// Bookings
// =============================================================================

#[tokio::test]
async fn booking_returns_created() {
    let app = TestApp::new();
    let (status, body) = app.post("/bookings", booking_body()).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["externalBookingRef"], "bk-1");
    assert_eq!(body["appointment"]["status"], "booked");
    assert_eq!(body["appointment"]["customer"]["firstName"], "Sam");

    let requests = app.booking.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].payment_mode, "DEPOSIT");
    assert_eq!(requests[0].payment_nonce, "cnon:card-nonce-ok");
    assert_eq!(requests[0].customer.email.as_deref(), Some("sam@example.com"));
}

#[tokio::test]
async fn unknown_payment_mode_reaches_the_orchestrator() {
    let app = TestApp::new();
    let mut body = booking_body();
    body["paymentMode"] = json!("LATER");

    let (status, _) = app.post("/bookings", body).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(app.booking.requests.lock().unwrap()[0].payment_mode, "LATER");
}

#[tokio::test]
async fn booking_rejects_invalid_fields() {
    let app = TestApp::new();

    let cases: Vec<(&str, Value)> = vec![
        ("/customer/firstName", json!("")),
        ("/customer/lastName", json!("")),
        ("/customer/phone", json!("call me")),
        ("/customer/phone", json!("12")),
        ("/customer/email", json!("not-an-email")),
        ("/paymentNonce", json!("")),
    ];

    for (pointer, value) in cases {
        let mut body = booking_body();
        *body.pointer_mut(pointer).unwrap() = value;

        let (status, response) = app.post("/bookings", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{pointer}");
        assert_eq!(response["error"]["code"], "VALIDATION_ERROR", "{pointer}");
    }
    assert!(app.booking.requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn booking_accepts_missing_email_and_barber() {
    let app = TestApp::new();
    let mut body = booking_body();
    body["customer"].as_object_mut().unwrap().remove("email");

    let (status, _) = app.post("/bookings", body).await;

    assert_eq!(status, StatusCode::CREATED);
    let requests = app.booking.requests.lock().unwrap();
    assert_eq!(requests[0].customer.email, None);
    assert_eq!(requests[0].barber_id, None);
}

#[tokio::test]
async fn malformed_json_is_a_validation_error() {
    let app = TestApp::new();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/bookings")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"shopId\":"))
        .unwrap();

    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn booking_failures_map_to_codes() {
    let cases = vec![
        (
            AppError::PaymentDeclined("Your card was declined".into()),
            StatusCode::BAD_REQUEST,
            "PAYMENT_DECLINED",
        ),
        (
            AppError::BookingConflict("This time slot is no longer available".into()),
            StatusCode::BAD_REQUEST,
            "BOOKING_CONFLICT",
        ),
        (
            AppError::invalid_request("Barber does not work at this shop"),
            StatusCode::BAD_REQUEST,
            "INVALID_REQUEST",
        ),
        (
            AppError::CompensationFailed("refund pay-1 rejected".into()),
            StatusCode::INTERNAL_SERVER_ERROR,
            "COMPENSATION_FAILED",
        ),
        (
            AppError::PersistenceInconsistency("booking bk-1 was not saved".into()),
            StatusCode::INTERNAL_SERVER_ERROR,
            "PERSISTENCE_INCONSISTENCY",
        ),
    ];

    for (error, expected_status, code) in cases {
        let app = TestApp::with(FakeAvailability::default(), FakeBooking::failing(error));
        let (status, body) = app.post("/bookings", booking_body()).await;
        assert_eq!(status, expected_status, "{code}");
        assert_eq!(body["error"]["code"], code);
    }
}

#[tokio::test]
async fn incident_responses_do_not_leak_references() {
    let app = TestApp::with(
        FakeAvailability::default(),
        FakeBooking::failing(AppError::CompensationFailed(
            "refund of payment pay-1 failed".into(),
        )),
    );

    let (_, body) = app.post("/bookings", booking_body()).await;
    let message = body["error"]["message"].as_str().unwrap();
    assert!(!message.contains("pay-1"));
}

// =============================================================================
// Cancellation
// =============================================================================

#[tokio::test]
async fn cancellation_passes_shop_and_appointment() {
    let app = TestApp::new();
    let shop_id = Uuid::new_v4();
    let appointment_id = Uuid::new_v4();

    let (status, body) = app
        .post(
            &format!("/appointments/{appointment_id}/cancel"),
            json!({ "shopId": shop_id }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "cancelled");
    assert_eq!(body["refundedCents"], 1000);
    assert_eq!(
        app.booking.cancellations.lock().unwrap()[0],
        (shop_id, appointment_id)
    );
}

#[tokio::test]
async fn cancellation_requires_shop() {
    let app = TestApp::new();
    let (status, body) = app
        .post(&format!("/appointments/{}/cancel", Uuid::new_v4()), json!({}))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert!(app.booking.cancellations.lock().unwrap().is_empty());
}

// =============================================================================
// OpenAPI
// =============================================================================

#[tokio::test]
async fn openapi_document_lists_booking_paths() {
    let app = TestApp::new();
    let (status, body) = app.get("/api-docs/openapi.json").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/availability"].is_object());
    assert!(body["paths"]["/bookings"].is_object());
    assert!(body["paths"]["/appointments/{id}/cancel"].is_object());
}
