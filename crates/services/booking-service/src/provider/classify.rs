//! Provider error classification.

use common::{AppError, ErrorKind};

use super::ProviderError;

pub const PAYMENT_DECLINED_MESSAGE: &str =
    "Your payment was declined. Please check your card details or use a different card";

pub const BOOKING_CONFLICT_MESSAGE: &str =
    "This time slot is no longer available. Please choose another time";

const PAYMENT_METHOD_CATEGORY: &str = "PAYMENT_METHOD_ERROR";

const DECLINE_CODES: &[&str] = &[
    "CARD_DECLINED",
    "CARD_DECLINED_CALL_ISSUER",
    "CARD_DECLINED_VERIFICATION_REQUIRED",
    "INSUFFICIENT_FUNDS",
    "CVV_FAILURE",
    "GENERIC_DECLINE",
    "INVALID_CARD",
    "INVALID_CARD_DATA",
    "INVALID_EXPIRATION",
    "CARD_EXPIRED",
    "ADDRESS_VERIFICATION_FAILURE",
    "TRANSACTION_LIMIT",
    "CARD_NOT_SUPPORTED",
    "CARD_TOKEN_USED",
    "CARD_TOKEN_EXPIRED",
];

const CONFLICT_CODES: &[&str] = &["VERSION_MISMATCH", "CONFLICT"];

const CONFLICT_PHRASES: &[&str] = &["no longer available", "not available", "stale version"];

/// Map a provider failure to the booking failure kind it represents.
///
/// Only `PaymentDeclined`, `BookingConflict` and `Upstream` are produced.
/// Anything unrecognized is `Upstream`.
pub fn classify(error: &ProviderError) -> ErrorKind {
    let ProviderError::Api { errors, .. } = error else {
        return ErrorKind::Upstream;
    };

    let declined = errors.iter().any(|e| {
        e.category == PAYMENT_METHOD_CATEGORY || DECLINE_CODES.contains(&e.code.as_str())
    });
    if declined {
        return ErrorKind::PaymentDeclined;
    }

    let conflict = errors.iter().any(|e| {
        CONFLICT_CODES.contains(&e.code.as_str())
            || e.detail.as_deref().is_some_and(|detail| {
                let detail = detail.to_lowercase();
                CONFLICT_PHRASES.iter().any(|p| detail.contains(p))
            })
    });
    if conflict {
        return ErrorKind::BookingConflict;
    }

    ErrorKind::Upstream
}

/// Convert a provider failure into the error surfaced to callers.
///
/// Declines and conflicts carry a fixed, user-safe message; the provider's
/// own text only survives inside `Upstream`, which is never shown.
pub fn to_app_error(error: &ProviderError) -> AppError {
    match classify(error) {
        ErrorKind::PaymentDeclined => AppError::PaymentDeclined(PAYMENT_DECLINED_MESSAGE.into()),
        ErrorKind::BookingConflict => AppError::BookingConflict(BOOKING_CONFLICT_MESSAGE.into()),
        _ => AppError::upstream(error.to_string()),
    }
}
