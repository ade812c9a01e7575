//! Cancellation of booked appointments.

use uuid::Uuid;

use common::{AppError, AppResult, ErrorKind, OptionExt};
use domain::{AppointmentStatus, CancellationOutcome};

use super::incident::Incident;
use super::BookingOrchestrator;
use crate::provider::{to_app_error, RefundRequest};

impl BookingOrchestrator {
    /// Cancel with the provider first, then refund, then record locally.
    ///
    /// A provider cancellation failure changes nothing. Failures after it
    /// are incidents, since the provider no longer holds the booking.
    pub(super) async fn cancel(
        &self,
        shop_id: Uuid,
        appointment_id: Uuid,
    ) -> AppResult<CancellationOutcome> {
        let appointment = self
            .store
            .find_appointment(appointment_id)
            .await?
            .ok_or_not_found("Appointment")?;

        if appointment.shop_id != shop_id {
            return Err(AppError::invalid_request(
                "Appointment does not belong to this shop",
            ));
        }
        if appointment.is_cancelled() {
            return Err(AppError::invalid_request("Appointment is already cancelled"));
        }

        let payment = self
            .store
            .find_payment_for_appointment(appointment_id)
            .await?
            .filter(|p| p.status.holds_funds() && p.amount_cents > 0);

        self.provider
            .cancel_booking(&appointment.external_booking_ref)
            .await
            .map_err(|e| {
                tracing::warn!(
                    appointment_id = %appointment_id,
                    error = %e,
                    "Provider cancellation failed"
                );
                to_app_error(&e)
            })?;

        let incident = Incident {
            shop_id: Some(shop_id),
            customer_id: Some(appointment.customer_id),
            appointment_id: Some(appointment_id),
            booking_ref: Some(appointment.external_booking_ref.as_str()),
            ..Default::default()
        };

        if let Some(payment) = &payment {
            let refund = RefundRequest {
                payment_ref: payment.external_payment_ref.clone(),
                amount: Some(payment.money()),
            };
            let failure = match self.provider.refund_payment(refund).await {
                Ok(r) if !r.is_failed() => None,
                Ok(r) => Some(format!("refund {} ended as {:?}", r.refund_ref, r.status)),
                Err(e) => Some(e.to_string()),
            };
            if let Some(failure) = failure {
                let money = payment.money();
                Incident {
                    payment_ref: Some(payment.external_payment_ref.as_str()),
                    amount: Some(&money),
                    ..incident
                }
                .report(ErrorKind::CompensationFailed, &failure);
                return Err(AppError::CompensationFailed(format!(
                    "refund of payment {} failed after cancelling booking {}: {}",
                    payment.external_payment_ref, appointment.external_booking_ref, failure
                )));
            }
        }

        let refunded_payment_id = payment.as_ref().map(|p| p.id);
        if let Err(e) = self
            .store
            .mark_cancelled(appointment_id, refunded_payment_id)
            .await
        {
            Incident {
                payment_ref: payment.as_ref().map(|p| p.external_payment_ref.as_str()),
                ..incident
            }
            .report(ErrorKind::PersistenceInconsistency, &e.to_string());
            return Err(AppError::PersistenceInconsistency(format!(
                "cancellation of appointment {} was not saved: {}",
                appointment_id, e
            )));
        }

        tracing::info!(
            shop_id = %shop_id,
            appointment_id = %appointment_id,
            refunded = payment.is_some(),
            "Cancelled appointment"
        );

        Ok(CancellationOutcome {
            appointment_id,
            status: AppointmentStatus::Cancelled.to_string(),
            refunded_cents: payment.map(|p| p.amount_cents),
        })
    }
}
