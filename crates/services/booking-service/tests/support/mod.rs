//! In-memory collaborators for booking scenarios.
//!
//! The store keeps real state so tests can assert what exists afterwards;
//! the provider replays scripted answers and records every call.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

use booking_service_lib::provider::{
    ApiErrorDetail, AvailabilityRecord, AvailabilitySearch, BookingReservation, ChargeReceipt,
    ChargeRequest, ExternalBooking, ProviderError, RefundReceipt, RefundRequest, RefundStatus,
    SchedulingProvider,
};
use booking_service_lib::repository::EntityStore;
use booking_service_lib::service::{BookingOrchestrator, PercentageDeposit};
use common::{AppError, AppResult};
use domain::{
    Appointment, AppointmentStatus, Barber, BookingRequest, Customer, CustomerDetails,
    NewAppointment, NewCustomer, NewPaymentRecord, PaymentRecord, PaymentStatus, Service, Shop,
};

// =============================================================================
// Entity store
// =============================================================================

#[derive(Default)]
pub struct StoreState {
    pub shops: Vec<Shop>,
    pub services: Vec<Service>,
    pub barbers: Vec<Barber>,
    pub customers: Vec<Customer>,
    pub appointments: Vec<Appointment>,
    pub payments: Vec<PaymentRecord>,
    pub fail_record_booking: bool,
    pub fail_mark_cancelled: bool,
}

#[derive(Default)]
pub struct InMemoryStore {
    pub state: Mutex<StoreState>,
}

impl InMemoryStore {
    pub fn with<R>(&self, f: impl FnOnce(&mut StoreState) -> R) -> R {
        let mut state = self.state.lock().unwrap();
        f(&mut state)
    }

    pub fn customers_with_phone(&self, shop_id: Uuid, phone: &str) -> usize {
        self.with(|s| {
            s.customers
                .iter()
                .filter(|c| c.shop_id == shop_id && c.phone == phone)
                .count()
        })
    }

    pub fn appointment_count(&self) -> usize {
        self.with(|s| s.appointments.len())
    }

    pub fn payment_count(&self) -> usize {
        self.with(|s| s.payments.len())
    }
}

#[async_trait]
impl EntityStore for InMemoryStore {
    async fn find_shop(&self, id: Uuid) -> AppResult<Option<Shop>> {
        Ok(self.with(|s| s.shops.iter().find(|x| x.id == id).cloned()))
    }

    async fn find_service(&self, id: Uuid) -> AppResult<Option<Service>> {
        Ok(self.with(|s| s.services.iter().find(|x| x.id == id).cloned()))
    }

    async fn find_barber(&self, id: Uuid) -> AppResult<Option<Barber>> {
        Ok(self.with(|s| s.barbers.iter().find(|x| x.id == id).cloned()))
    }

    async fn find_barbers_by_staff_refs(
        &self,
        shop_id: Uuid,
        staff_refs: &[String],
    ) -> AppResult<Vec<Barber>> {
        Ok(self.with(|s| {
            s.barbers
                .iter()
                .filter(|b| b.shop_id == shop_id)
                .filter(|b| {
                    b.external_staff_ref
                        .as_ref()
                        .is_some_and(|r| staff_refs.contains(r))
                })
                .cloned()
                .collect()
        }))
    }

    async fn find_customer_by_phone(
        &self,
        shop_id: Uuid,
        phone: &str,
    ) -> AppResult<Option<Customer>> {
        Ok(self.with(|s| {
            s.customers
                .iter()
                .find(|c| c.shop_id == shop_id && c.phone == phone)
                .cloned()
        }))
    }

    async fn create_customer(&self, new: NewCustomer) -> AppResult<Customer> {
        let customer = Customer {
            id: Uuid::new_v4(),
            shop_id: new.shop_id,
            first_name: new.first_name,
            last_name: new.last_name,
            phone: new.phone,
            email: new.email,
            external_customer_ref: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.with(|s| s.customers.push(customer.clone()));
        Ok(customer)
    }

    async fn set_customer_external_ref(
        &self,
        customer_id: Uuid,
        external_ref: String,
    ) -> AppResult<Customer> {
        self.with(|s| {
            let customer = s
                .customers
                .iter_mut()
                .find(|c| c.id == customer_id)
                .ok_or_else(|| AppError::not_found("Customer"))?;
            customer.external_customer_ref = Some(external_ref);
            Ok(customer.clone())
        })
    }

    async fn record_booking(
        &self,
        appointment: NewAppointment,
        payment: Option<NewPaymentRecord>,
    ) -> AppResult<(Appointment, Option<PaymentRecord>)> {
        self.with(|s| {
            if s.fail_record_booking {
                return Err(AppError::internal("connection reset by peer"));
            }
            let appointment = Appointment {
                id: Uuid::new_v4(),
                shop_id: appointment.shop_id,
                barber_id: appointment.barber_id,
                service_id: appointment.service_id,
                customer_id: appointment.customer_id,
                start_at: appointment.start_at,
                end_at: appointment.end_at,
                status: AppointmentStatus::Booked,
                external_booking_ref: appointment.external_booking_ref,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            };
            let payment = payment.map(|p| PaymentRecord {
                id: Uuid::new_v4(),
                appointment_id: Some(appointment.id),
                customer_id: p.customer_id,
                external_payment_ref: p.external_payment_ref,
                amount_cents: p.amount_cents,
                currency: p.currency,
                status: p.status,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            });
            s.appointments.push(appointment.clone());
            s.payments.extend(payment.clone());
            Ok((appointment, payment))
        })
    }

    async fn find_appointment(&self, id: Uuid) -> AppResult<Option<Appointment>> {
        Ok(self.with(|s| s.appointments.iter().find(|a| a.id == id).cloned()))
    }

    async fn find_payment_for_appointment(
        &self,
        appointment_id: Uuid,
    ) -> AppResult<Option<PaymentRecord>> {
        Ok(self.with(|s| {
            s.payments
                .iter()
                .find(|p| p.appointment_id == Some(appointment_id))
                .cloned()
        }))
    }

    async fn mark_cancelled(
        &self,
        appointment_id: Uuid,
        refunded_payment_id: Option<Uuid>,
    ) -> AppResult<Appointment> {
        self.with(|s| {
            if s.fail_mark_cancelled {
                return Err(AppError::internal("connection reset by peer"));
            }
            if let Some(payment_id) = refunded_payment_id {
                if let Some(p) = s.payments.iter_mut().find(|p| p.id == payment_id) {
                    p.status = PaymentStatus::Refunded;
                }
            }
            let appointment = s
                .appointments
                .iter_mut()
                .find(|a| a.id == appointment_id)
                .ok_or_else(|| AppError::not_found("Appointment"))?;
            appointment.status = AppointmentStatus::Cancelled;
            Ok(appointment.clone())
        })
    }
}

// =============================================================================
// Scheduling provider
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChargeScript {
    Approve,
    /// Accepted but left uncaptured
    AuthorizeOnly,
    Decline,
    Outage,
    /// Success status whose body could not be read
    Unreadable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingScript {
    Confirm,
    SlotTaken,
    Outage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefundScript {
    Complete,
    Reject,
    Outage,
}

fn api_error(category: &str, code: &str, detail: &str) -> ProviderError {
    ProviderError::api(400, vec![ApiErrorDetail::new(category, code, Some(detail))])
}

fn outage() -> ProviderError {
    ProviderError::api(
        500,
        vec![ApiErrorDetail::new(
            "API_ERROR",
            "INTERNAL_SERVER_ERROR",
            Some("Square is having trouble"),
        )],
    )
}

pub struct ProviderState {
    pub availability: Vec<AvailabilityRecord>,
    pub charge: ChargeScript,
    pub booking: BookingScript,
    pub refund: RefundScript,
    pub customer_ref: Option<String>,
    pub searches: Vec<AvailabilitySearch>,
    pub charges: Vec<ChargeRequest>,
    pub reservations: Vec<BookingReservation>,
    pub cancellations: Vec<String>,
    pub refunds: Vec<RefundRequest>,
}

impl Default for ProviderState {
    fn default() -> Self {
        Self {
            availability: Vec::new(),
            charge: ChargeScript::Approve,
            booking: BookingScript::Confirm,
            refund: RefundScript::Complete,
            customer_ref: Some("sq-cust-1".into()),
            searches: Vec::new(),
            charges: Vec::new(),
            reservations: Vec::new(),
            cancellations: Vec::new(),
            refunds: Vec::new(),
        }
    }
}

#[derive(Default)]
pub struct ScriptedProvider {
    pub state: Mutex<ProviderState>,
}

impl ScriptedProvider {
    pub fn with<R>(&self, f: impl FnOnce(&mut ProviderState) -> R) -> R {
        let mut state = self.state.lock().unwrap();
        f(&mut state)
    }
}

#[async_trait]
impl SchedulingProvider for ScriptedProvider {
    async fn search_availability(
        &self,
        search: AvailabilitySearch,
    ) -> Result<Vec<AvailabilityRecord>, ProviderError> {
        Ok(self.with(|s| {
            s.searches.push(search);
            s.availability.clone()
        }))
    }

    async fn create_booking(
        &self,
        reservation: BookingReservation,
    ) -> Result<ExternalBooking, ProviderError> {
        self.with(|s| {
            s.reservations.push(reservation);
            match s.booking {
                BookingScript::Confirm => Ok(ExternalBooking {
                    booking_ref: format!("bk-{}", s.reservations.len()),
                }),
                BookingScript::SlotTaken => Err(api_error(
                    "INVALID_REQUEST_ERROR",
                    "BAD_REQUEST",
                    "Stale version of availability: slot no longer available",
                )),
                BookingScript::Outage => Err(outage()),
            }
        })
    }

    async fn cancel_booking(&self, booking_ref: &str) -> Result<(), ProviderError> {
        self.with(|s| s.cancellations.push(booking_ref.to_string()));
        Ok(())
    }

    async fn charge_card(&self, charge: ChargeRequest) -> Result<ChargeReceipt, ProviderError> {
        self.with(|s| {
            s.charges.push(charge);
            match s.charge {
                ChargeScript::Approve => Ok(ChargeReceipt {
                    payment_ref: format!("pay-{}", s.charges.len()),
                    status: PaymentStatus::Captured,
                    customer_ref: s.customer_ref.clone(),
                }),
                ChargeScript::AuthorizeOnly => Ok(ChargeReceipt {
                    payment_ref: format!("pay-{}", s.charges.len()),
                    status: PaymentStatus::Authorized,
                    customer_ref: s.customer_ref.clone(),
                }),
                ChargeScript::Decline => Err(api_error(
                    "PAYMENT_METHOD_ERROR",
                    "CARD_DECLINED",
                    "Square declined card ending 0002",
                )),
                ChargeScript::Outage => Err(outage()),
                ChargeScript::Unreadable => Err(ProviderError::Decode(
                    "expected value at line 1 column 1".into(),
                )),
            }
        })
    }

    async fn refund_payment(&self, refund: RefundRequest) -> Result<RefundReceipt, ProviderError> {
        self.with(|s| {
            s.refunds.push(refund);
            let refund_ref = format!("rf-{}", s.refunds.len());
            match s.refund {
                RefundScript::Complete => Ok(RefundReceipt {
                    refund_ref,
                    status: RefundStatus::Pending,
                }),
                RefundScript::Reject => Ok(RefundReceipt {
                    refund_ref,
                    status: RefundStatus::Rejected,
                }),
                RefundScript::Outage => Err(outage()),
            }
        })
    }
}

// =============================================================================
// Fixture
// =============================================================================

pub struct Fixture {
    pub store: Arc<InMemoryStore>,
    pub provider: Arc<ScriptedProvider>,
    pub shop: Shop,
    pub service: Service,
    pub barber: Barber,
}

pub fn at(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, day, hour, minute, 0).unwrap()
}

impl Fixture {
    /// Shop `loc-1` offering a 30 minute, 5000 cent service `svc-1` with
    /// one active barber `tm-1`.
    pub fn new() -> Self {
        let shop = Shop {
            id: Uuid::new_v4(),
            name: "Fade Factory".into(),
            external_location_ref: Some("loc-1".into()),
            owner_id: Uuid::new_v4(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let service = Service {
            id: Uuid::new_v4(),
            shop_id: shop.id,
            name: "Haircut".into(),
            duration_minutes: 30,
            price_cents: 5000,
            external_catalog_ref: Some("svc-1".into()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let barber = Barber {
            id: Uuid::new_v4(),
            shop_id: shop.id,
            name: "Sam".into(),
            external_staff_ref: Some("tm-1".into()),
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let store = Arc::new(InMemoryStore::default());
        store.with(|s| {
            s.shops.push(shop.clone());
            s.services.push(service.clone());
            s.barbers.push(barber.clone());
        });

        Self {
            store,
            provider: Arc::new(ScriptedProvider::default()),
            shop,
            service,
            barber,
        }
    }

    pub fn orchestrator(&self) -> BookingOrchestrator {
        BookingOrchestrator::new(
            self.store.clone(),
            self.provider.clone(),
            Arc::new(PercentageDeposit::new(20, 500)),
            "USD",
        )
    }

    pub fn request(&self, payment_mode: &str) -> BookingRequest {
        BookingRequest {
            shop_id: self.shop.id,
            service_id: self.service.id,
            barber_id: Some(self.barber.id),
            start_at: at(1, 10, 0),
            customer: CustomerDetails {
                first_name: "Jordan".into(),
                last_name: "Lee".into(),
                phone: "+15551234567".into(),
                email: Some("jordan@example.com".into()),
            },
            payment_nonce: "cnon:card-nonce-ok".into(),
            payment_mode: payment_mode.into(),
        }
    }
}
