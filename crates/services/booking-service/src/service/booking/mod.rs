//! Booking orchestration.
//!
//! A booking attempt runs the [`saga`] steps in order: validate, resolve the
//! customer, price the charge, capture payment, reserve the slot with the
//! provider, then persist. Payment always precedes the reservation, and the
//! reservation always precedes persistence, so a declined card never holds a
//! slot and a lost slot never keeps the customer's money without a refund
//! attempt.

mod cancellation;
mod incident;
pub mod pricing;
pub mod saga;

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use common::{AppError, AppResult, ErrorKind};
use domain::{
    AppointmentDetails, BookingOutcome, BookingRequest, CancellationOutcome, Money,
    NewAppointment, NewCustomer, NewPaymentRecord, PaymentMode, PaymentStatus, PaymentSummary,
};

use self::incident::Incident;
use self::saga::{compensation_for, Compensation, SagaContext, STEPS};
use super::catalog::load_target;
use crate::provider::{
    to_app_error, BookingReservation, ChargeRequest, RefundRequest, SchedulingProvider,
    PAYMENT_DECLINED_MESSAGE,
};
use crate::repository::EntityStore;

pub use pricing::{ChargePolicy, PercentageDeposit};
pub use saga::{BookingState, SagaStep};

/// Booking service trait for dependency injection.
#[async_trait]
pub trait BookingService: Send + Sync {
    /// Book an appointment and take payment as one unit.
    async fn book(&self, request: BookingRequest) -> AppResult<BookingOutcome>;

    /// Cancel a booked appointment and refund its payment.
    async fn cancel_appointment(
        &self,
        shop_id: Uuid,
        appointment_id: Uuid,
    ) -> AppResult<CancellationOutcome>;
}

/// Runs booking sagas against the entity store and the provider.
pub struct BookingOrchestrator {
    store: Arc<dyn EntityStore>,
    provider: Arc<dyn SchedulingProvider>,
    policy: Arc<dyn ChargePolicy>,
    currency: String,
}

impl BookingOrchestrator {
    pub fn new(
        store: Arc<dyn EntityStore>,
        provider: Arc<dyn SchedulingProvider>,
        policy: Arc<dyn ChargePolicy>,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            store,
            provider,
            policy,
            currency: currency.into(),
        }
    }

    /// Run every step, unwinding completed steps when one fails.
    ///
    /// Returns the final context even on failure so callers and tests can
    /// inspect the terminal state.
    pub async fn run(&self, request: BookingRequest) -> (SagaContext, AppResult<()>) {
        let mut ctx = SagaContext::new(request);
        let mut completed: Vec<SagaStep> = Vec::with_capacity(STEPS.len());

        for step in STEPS {
            match self.run_step(step, &mut ctx).await {
                Ok(()) => {
                    ctx.transition(step.success_state());
                    completed.push(step);
                }
                Err(error) => {
                    tracing::debug!(step = step.name(), error = %error, "Booking step failed");
                    let error = self.unwind(step, &completed, &mut ctx, error).await;
                    return (ctx, Err(error));
                }
            }
        }

        (ctx, Ok(()))
    }

    async fn run_step(&self, step: SagaStep, ctx: &mut SagaContext) -> AppResult<()> {
        match step {
            SagaStep::Validate => self.validate(ctx).await,
            SagaStep::ResolveCustomer => self.resolve_customer(ctx).await,
            SagaStep::DetermineCharge => self.determine_charge(ctx),
            SagaStep::CapturePayment => self.capture_payment(ctx).await,
            SagaStep::ReserveSlot => self.reserve_slot(ctx).await,
            SagaStep::Persist => self.persist(ctx).await,
        }
    }

    /// Compensate completed steps in reverse order.
    ///
    /// The original error is returned when every compensation succeeds; a
    /// failed compensation replaces it with `CompensationFailed`.
    async fn unwind(
        &self,
        failed: SagaStep,
        completed: &[SagaStep],
        ctx: &mut SagaContext,
        error: AppError,
    ) -> AppError {
        if failed.unwinds_on_failure() {
            // The failed step may have left an effect behind, so it is
            // compensated first.
            let steps = std::iter::once(failed).chain(completed.iter().rev().copied());
            for step in steps {
                let Some(compensation) = compensation_for(step) else {
                    continue;
                };
                if let Err(comp_err) = self.compensate(compensation, ctx, &error).await {
                    ctx.transition(BookingState::Inconsistent);
                    return comp_err;
                }
            }
        }

        ctx.transition(failed.failure_state());
        error
    }

    async fn compensate(
        &self,
        compensation: Compensation,
        ctx: &SagaContext,
        cause: &AppError,
    ) -> AppResult<()> {
        match compensation {
            Compensation::RefundPayment => {
                let Some(receipt) = &ctx.receipt else {
                    return Ok(());
                };
                let amount = ctx.charge.clone();
                let refund = RefundRequest {
                    payment_ref: receipt.payment_ref.clone(),
                    amount: amount.clone(),
                };

                let failure = match self.provider.refund_payment(refund).await {
                    Ok(r) if !r.is_failed() => {
                        tracing::info!(
                            payment_ref = %receipt.payment_ref,
                            refund_ref = %r.refund_ref,
                            "Refunded payment after failed booking"
                        );
                        return Ok(());
                    }
                    Ok(r) => format!("refund {} ended as {:?}", r.refund_ref, r.status),
                    Err(e) => e.to_string(),
                };

                Incident {
                    shop_id: Some(ctx.request.shop_id),
                    customer_id: ctx.customer.as_ref().map(|c| c.id),
                    payment_ref: Some(receipt.payment_ref.as_str()),
                    amount: amount.as_ref(),
                    ..Default::default()
                }
                .report(
                    ErrorKind::CompensationFailed,
                    &format!("{failure} (booking failed with: {cause})"),
                );

                Err(AppError::CompensationFailed(format!(
                    "refund of payment {} failed: {}",
                    receipt.payment_ref, failure
                )))
            }
        }
    }

    async fn validate(&self, ctx: &mut SagaContext) -> AppResult<()> {
        let request = &ctx.request;
        let target = load_target(
            self.store.as_ref(),
            request.shop_id,
            request.service_id,
            request.barber_id,
        )
        .await?;
        ctx.target = Some(target);
        Ok(())
    }

    async fn resolve_customer(&self, ctx: &mut SagaContext) -> AppResult<()> {
        let shop_id = ctx.request.shop_id;
        let details = &ctx.request.customer;

        let customer = match self
            .store
            .find_customer_by_phone(shop_id, &details.phone)
            .await?
        {
            Some(existing) => existing,
            None => {
                let created = self
                    .store
                    .create_customer(NewCustomer {
                        shop_id,
                        first_name: details.first_name.clone(),
                        last_name: details.last_name.clone(),
                        phone: details.phone.clone(),
                        email: details.email.clone(),
                    })
                    .await?;
                tracing::info!(shop_id = %shop_id, customer_id = %created.id, "Created customer");
                created
            }
        };

        ctx.customer = Some(customer);
        Ok(())
    }

    fn determine_charge(&self, ctx: &mut SagaContext) -> AppResult<()> {
        let mode: PaymentMode = ctx.request.payment_mode.parse()?;
        let price_cents = ctx.target()?.service.price_cents;
        let amount = pricing::charge_cents(self.policy.as_ref(), mode, price_cents);

        ctx.charge = Some(Money::new(amount, self.currency.clone()));
        Ok(())
    }

    async fn capture_payment(&self, ctx: &mut SagaContext) -> AppResult<()> {
        let charge = ctx.charge()?.clone();
        if charge.is_zero() {
            tracing::debug!(shop_id = %ctx.request.shop_id, "Nothing to charge, skipping payment");
            return Ok(());
        }

        let customer = ctx.customer()?;
        let customer_id = customer.id;
        let needs_external_ref = customer.needs_external_ref();
        let request = ChargeRequest {
            nonce: ctx.request.payment_nonce.clone(),
            amount: charge.clone(),
            location_ref: ctx.target()?.refs.location_ref.clone(),
            customer_ref: customer.external_customer_ref.clone(),
        };

        let receipt = match self.provider.charge_card(request).await {
            Ok(receipt) => receipt,
            Err(e) => {
                tracing::warn!(shop_id = %ctx.request.shop_id, error = %e, "Card charge failed");
                if e.outcome_unknown() {
                    Incident {
                        shop_id: Some(ctx.request.shop_id),
                        customer_id: Some(customer_id),
                        nonce: Some(ctx.request.payment_nonce.as_str()),
                        amount: Some(&charge),
                        ..Default::default()
                    }
                    .report(ErrorKind::Upstream, &format!("charge outcome unknown: {e}"));
                }
                return Err(to_app_error(&e));
            }
        };

        match receipt.status {
            PaymentStatus::Captured => {}
            PaymentStatus::Failed => {
                tracing::warn!(payment_ref = %receipt.payment_ref, "Provider reported a failed payment");
                return Err(AppError::PaymentDeclined(PAYMENT_DECLINED_MESSAGE.into()));
            }
            status => {
                tracing::warn!(
                    payment_ref = %receipt.payment_ref,
                    status = %status,
                    "Payment was not captured"
                );
                let error = AppError::upstream(format!(
                    "payment {} ended as {} instead of captured",
                    receipt.payment_ref, status
                ));
                // Refunded by the unwind
                ctx.receipt = Some(receipt);
                return Err(error);
            }
        }

        tracing::info!(
            shop_id = %ctx.request.shop_id,
            payment_ref = %receipt.payment_ref,
            amount = %charge,
            "Captured payment"
        );

        // Backfill failures are logged only
        if let (true, Some(customer_ref)) = (needs_external_ref, &receipt.customer_ref) {
            match self
                .store
                .set_customer_external_ref(customer_id, customer_ref.clone())
                .await
            {
                Ok(updated) => ctx.customer = Some(updated),
                Err(e) => tracing::warn!(
                    customer_id = %customer_id,
                    error = %e,
                    "Could not backfill provider customer reference"
                ),
            }
        }

        ctx.receipt = Some(receipt);
        Ok(())
    }

    async fn reserve_slot(&self, ctx: &mut SagaContext) -> AppResult<()> {
        let target = ctx.target()?;
        let reservation = BookingReservation {
            location_ref: target.refs.location_ref.clone(),
            service_ref: target.refs.service_ref.clone(),
            staff_ref: target.refs.staff_ref.clone(),
            customer_ref: ctx.customer()?.external_customer_ref.clone(),
            start_at: ctx.request.start_at,
            duration_minutes: target.service.duration_minutes,
        };

        let booking = self
            .provider
            .create_booking(reservation)
            .await
            .map_err(|e| {
                tracing::warn!(shop_id = %ctx.request.shop_id, error = %e, "Slot reservation failed");
                to_app_error(&e)
            })?;

        ctx.booking = Some(booking);
        Ok(())
    }

    async fn persist(&self, ctx: &mut SagaContext) -> AppResult<()> {
        let target = ctx.target()?;
        let customer = ctx.customer()?;
        let booking = ctx.booking()?;

        let appointment = NewAppointment {
            shop_id: target.shop.id,
            barber_id: target.barber.as_ref().map(|b| b.id),
            service_id: target.service.id,
            customer_id: customer.id,
            start_at: ctx.request.start_at,
            end_at: target.service.end_for(ctx.request.start_at),
            external_booking_ref: booking.booking_ref.clone(),
        };
        let payment = match (&ctx.receipt, &ctx.charge) {
            (Some(receipt), Some(charge)) => Some(NewPaymentRecord {
                customer_id: customer.id,
                external_payment_ref: receipt.payment_ref.clone(),
                amount_cents: charge.amount_cents,
                currency: charge.currency.clone(),
                status: PaymentStatus::Captured,
            }),
            _ => None,
        };

        let (appointment, payment) = match self.store.record_booking(appointment, payment).await {
            Ok(saved) => saved,
            Err(e) => {
                Incident {
                    shop_id: Some(target.shop.id),
                    customer_id: Some(customer.id),
                    payment_ref: ctx.receipt.as_ref().map(|r| r.payment_ref.as_str()),
                    booking_ref: Some(booking.booking_ref.as_str()),
                    amount: ctx.receipt.as_ref().and(ctx.charge.as_ref()),
                    ..Default::default()
                }
                .report(ErrorKind::PersistenceInconsistency, &e.to_string());

                return Err(AppError::PersistenceInconsistency(format!(
                    "booking {} was not saved: {}",
                    booking.booking_ref, e
                )));
            }
        };

        tracing::info!(
            shop_id = %appointment.shop_id,
            appointment_id = %appointment.id,
            booking_ref = %appointment.external_booking_ref,
            "Booked appointment"
        );

        let outcome = BookingOutcome {
            appointment: AppointmentDetails::compose(
                &appointment,
                &target.service,
                target.barber.as_ref(),
                customer,
            ),
            payment: payment.as_ref().map(PaymentSummary::from),
            external_booking_ref: appointment.external_booking_ref.clone(),
        };
        ctx.outcome = Some(outcome);
        Ok(())
    }
}

#[async_trait]
impl BookingService for BookingOrchestrator {
    async fn book(&self, request: BookingRequest) -> AppResult<BookingOutcome> {
        let (ctx, result) = self.run(request).await;
        result?;
        ctx.into_outcome()
    }

    async fn cancel_appointment(
        &self,
        shop_id: Uuid,
        appointment_id: Uuid,
    ) -> AppResult<CancellationOutcome> {
        self.cancel(shop_id, appointment_id).await
    }
}
