//! Booking saga steps, states and compensations.
//!
//! The orchestrator walks [`STEPS`] in order. When a step fails and
//! [`SagaStep::unwinds_on_failure`] holds, the failed step is compensated
//! first, then the steps already completed in reverse order (see
//! [`compensation_for`]).

use common::{AppError, AppResult};
use domain::{BookingOutcome, BookingRequest, Customer, Money};

use crate::provider::{ChargeReceipt, ExternalBooking};
use crate::service::catalog::BookingTarget;

/// One step of a booking attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SagaStep {
    /// Load shop, service and barber and check they fit together
    Validate,
    /// Find the customer by phone or create one
    ResolveCustomer,
    /// Turn the payment mode into an amount
    DetermineCharge,
    /// Charge the card. Skipped for a zero amount.
    CapturePayment,
    /// Reserve the slot with the provider
    ReserveSlot,
    /// Write appointment and payment record
    Persist,
}

/// Steps in execution order.
pub const STEPS: [SagaStep; 6] = [
    SagaStep::Validate,
    SagaStep::ResolveCustomer,
    SagaStep::DetermineCharge,
    SagaStep::CapturePayment,
    SagaStep::ReserveSlot,
    SagaStep::Persist,
];

/// Undo action for a completed step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compensation {
    RefundPayment,
}

/// Compensation owed by a step once it has completed.
///
/// Customer resolution has none: a customer created for a failed attempt stays.
pub fn compensation_for(step: SagaStep) -> Option<Compensation> {
    match step {
        SagaStep::CapturePayment => Some(Compensation::RefundPayment),
        _ => None,
    }
}

impl SagaStep {
    pub fn name(&self) -> &'static str {
        match self {
            SagaStep::Validate => "validate",
            SagaStep::ResolveCustomer => "resolve_customer",
            SagaStep::DetermineCharge => "determine_charge",
            SagaStep::CapturePayment => "capture_payment",
            SagaStep::ReserveSlot => "reserve_slot",
            SagaStep::Persist => "persist",
        }
    }

    /// Whether completed steps are compensated when this step fails.
    ///
    /// A persistence failure leaves the external booking and the charge in
    /// place for an operator to reconcile.
    pub fn unwinds_on_failure(&self) -> bool {
        !matches!(self, SagaStep::Persist)
    }

    /// State reached when this step succeeds
    pub fn success_state(&self) -> BookingState {
        match self {
            SagaStep::Validate => BookingState::Validating,
            SagaStep::ResolveCustomer | SagaStep::DetermineCharge => {
                BookingState::CustomerResolved
            }
            SagaStep::CapturePayment => BookingState::PaymentAuthorized,
            SagaStep::ReserveSlot => BookingState::ExternallyBooked,
            SagaStep::Persist => BookingState::Persisted,
        }
    }

    /// Terminal state when this step fails and any compensation succeeded
    pub fn failure_state(&self) -> BookingState {
        match self {
            SagaStep::Validate | SagaStep::ResolveCustomer | SagaStep::DetermineCharge => {
                BookingState::RejectedInput
            }
            SagaStep::CapturePayment => BookingState::PaymentDeclined,
            SagaStep::ReserveSlot => BookingState::BookingConflict,
            SagaStep::Persist => BookingState::Inconsistent,
        }
    }
}

/// Lifecycle of one booking attempt. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingState {
    Validating,
    CustomerResolved,
    PaymentAuthorized,
    ExternallyBooked,
    Persisted,
    RejectedInput,
    PaymentDeclined,
    BookingConflict,
    Inconsistent,
}

impl BookingState {
    pub fn is_terminal(&self) -> bool {
        !matches!(
            self,
            BookingState::Validating
                | BookingState::CustomerResolved
                | BookingState::PaymentAuthorized
                | BookingState::ExternallyBooked
        )
    }
}

/// Values accumulated while the saga runs.
#[derive(Debug)]
pub struct SagaContext {
    pub request: BookingRequest,
    pub target: Option<BookingTarget>,
    pub customer: Option<Customer>,
    pub charge: Option<Money>,
    pub receipt: Option<ChargeReceipt>,
    pub booking: Option<ExternalBooking>,
    pub outcome: Option<BookingOutcome>,
    state: BookingState,
}

fn out_of_order(what: &str) -> AppError {
    AppError::internal(format!("booking saga reached a step without {what}"))
}

impl SagaContext {
    pub fn new(request: BookingRequest) -> Self {
        Self {
            request,
            target: None,
            customer: None,
            charge: None,
            receipt: None,
            booking: None,
            outcome: None,
            state: BookingState::Validating,
        }
    }

    pub fn state(&self) -> BookingState {
        self.state
    }

    pub fn transition(&mut self, next: BookingState) {
        if next != self.state {
            tracing::debug!(
                shop_id = %self.request.shop_id,
                from = ?self.state,
                to = ?next,
                "Booking state transition"
            );
            self.state = next;
        }
    }

    pub fn target(&self) -> AppResult<&BookingTarget> {
        self.target.as_ref().ok_or_else(|| out_of_order("a target"))
    }

    pub fn customer(&self) -> AppResult<&Customer> {
        self.customer.as_ref().ok_or_else(|| out_of_order("a customer"))
    }

    pub fn charge(&self) -> AppResult<&Money> {
        self.charge.as_ref().ok_or_else(|| out_of_order("a charge amount"))
    }

    pub fn booking(&self) -> AppResult<&ExternalBooking> {
        self.booking.as_ref().ok_or_else(|| out_of_order("an external booking"))
    }

    pub fn into_outcome(self) -> AppResult<BookingOutcome> {
        self.outcome.ok_or_else(|| out_of_order("an outcome"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_payment_capture_is_compensated() {
        let compensated: Vec<_> = STEPS
            .iter()
            .filter(|s| compensation_for(**s).is_some())
            .collect();
        assert_eq!(compensated, vec![&SagaStep::CapturePayment]);
    }

    #[test]
    fn payment_precedes_reservation_precedes_persistence() {
        let pos = |step| STEPS.iter().position(|s| *s == step).unwrap();
        assert!(pos(SagaStep::CapturePayment) < pos(SagaStep::ReserveSlot));
        assert!(pos(SagaStep::ReserveSlot) < pos(SagaStep::Persist));
    }

    #[test]
    fn persistence_failure_does_not_unwind() {
        assert!(!SagaStep::Persist.unwinds_on_failure());
        assert!(SagaStep::ReserveSlot.unwinds_on_failure());
        assert_eq!(SagaStep::Persist.failure_state(), BookingState::Inconsistent);
    }

    #[test]
    fn failure_states_are_terminal() {
        for step in STEPS {
            assert!(step.failure_state().is_terminal(), "{}", step.name());
        }
        assert!(!SagaStep::ReserveSlot.success_state().is_terminal());
    }
}
