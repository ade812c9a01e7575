//! Incident reporting for divergence between the provider and the local store.

use common::ErrorKind;
use domain::Money;
use uuid::Uuid;

/// What is known about money and bookings when an incident is raised.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct Incident<'a> {
    pub shop_id: Option<Uuid>,
    pub customer_id: Option<Uuid>,
    pub appointment_id: Option<Uuid>,
    pub payment_ref: Option<&'a str>,
    /// Card token of a charge whose outcome is unknown
    pub nonce: Option<&'a str>,
    pub booking_ref: Option<&'a str>,
    pub amount: Option<&'a Money>,
}

impl Incident<'_> {
    /// Emit on the `booking_incident` target, which alerting subscribes to.
    pub(crate) fn report(&self, kind: ErrorKind, detail: &str) {
        tracing::error!(
            target: "booking_incident",
            kind = ?kind,
            shop_id = ?self.shop_id,
            customer_id = ?self.customer_id,
            appointment_id = ?self.appointment_id,
            payment_ref = self.payment_ref.unwrap_or("-"),
            nonce = self.nonce.unwrap_or("-"),
            booking_ref = self.booking_ref.unwrap_or("-"),
            amount_cents = self.amount.map(|m| m.amount_cents),
            currency = self.amount.map(|m| m.currency.as_str()).unwrap_or("-"),
            detail,
            "Manual reconciliation required"
        );
    }
}
