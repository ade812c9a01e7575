//! Unified error handling for the booking core and its HTTP boundary.
//!
//! Provides a single error type that converts to an Axum HTTP response and
//! the closed set of failure kinds the booking core can produce.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::DomainError;
use serde::Serialize;
use thiserror::Error;

/// Closed classification of booking failures.
///
/// Provider errors are translated into one of these in a single place;
/// anything that does not match a known pattern is `Upstream`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    InvalidRequest,
    Upstream,
    PaymentDeclined,
    BookingConflict,
    CompensationFailed,
    PersistenceInconsistency,
}

impl ErrorKind {
    /// Conditions that leave the provider and the local store disagreeing.
    pub fn is_incident(&self) -> bool {
        matches!(
            self,
            ErrorKind::CompensationFailed | ErrorKind::PersistenceInconsistency
        )
    }
}

/// Application error types.
#[derive(Error, Debug)]
pub enum AppError {
    // Resource errors
    #[error("{0} not found")]
    NotFound(String),

    // Validation
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    InvalidRequest(String),

    // Booking outcomes the caller can act on
    #[error("{0}")]
    PaymentDeclined(String),

    #[error("{0}")]
    BookingConflict(String),

    // External service errors
    #[error("Scheduling provider error: {0}")]
    Upstream(String),

    #[cfg(feature = "database")]
    #[error("Database error")]
    Database(#[from] sea_orm::DbErr),

    // Incidents that need manual reconciliation
    #[error("Compensation failed: {0}")]
    CompensationFailed(String),

    #[error("Persistence inconsistency: {0}")]
    PersistenceInconsistency(String),

    // Internal
    #[error("Internal server error")]
    Internal(String),
}

/// Error response body for HTTP
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
}

impl AppError {
    /// Get error code for client
    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::InvalidRequest(_) => "INVALID_REQUEST",
            AppError::PaymentDeclined(_) => "PAYMENT_DECLINED",
            AppError::BookingConflict(_) => "BOOKING_CONFLICT",
            AppError::Upstream(_) => "UPSTREAM_ERROR",
            #[cfg(feature = "database")]
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::CompensationFailed(_) => "COMPENSATION_FAILED",
            AppError::PersistenceInconsistency(_) => "PERSISTENCE_INCONSISTENCY",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get HTTP status code
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_)
            | AppError::InvalidRequest(_)
            | AppError::PaymentDeclined(_)
            | AppError::BookingConflict(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Failure kind, for errors produced by the booking core.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            AppError::NotFound(_) => Some(ErrorKind::NotFound),
            AppError::InvalidRequest(_) => Some(ErrorKind::InvalidRequest),
            AppError::PaymentDeclined(_) => Some(ErrorKind::PaymentDeclined),
            AppError::BookingConflict(_) => Some(ErrorKind::BookingConflict),
            AppError::Upstream(_) => Some(ErrorKind::Upstream),
            AppError::CompensationFailed(_) => Some(ErrorKind::CompensationFailed),
            AppError::PersistenceInconsistency(_) => Some(ErrorKind::PersistenceInconsistency),
            _ => None,
        }
    }

    /// Get user-facing message (hides internal details)
    pub fn user_message(&self) -> String {
        match self {
            // Show full message for client errors
            AppError::Validation(msg)
            | AppError::InvalidRequest(msg)
            | AppError::PaymentDeclined(msg)
            | AppError::BookingConflict(msg) => msg.clone(),

            // Hide details for internal errors
            AppError::Upstream(detail) => {
                tracing::error!("Scheduling provider error: {}", detail);
                "The booking provider could not process the request. Please try again later"
                    .to_string()
            }
            #[cfg(feature = "database")]
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "A database error occurred".to_string()
            }
            // Already reported on the incident channel where they were raised
            AppError::CompensationFailed(_) | AppError::PersistenceInconsistency(_) => {
                "We could not complete your booking. Our team has been notified and will contact you"
                    .to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An internal error occurred".to_string()
            }

            // Use default message for others
            _ => self.to_string(),
        }
    }
}

// =============================================================================
// HTTP Response (Axum)
// =============================================================================

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.code().to_string(),
                message: self.user_message(),
            },
        };

        (status, Json(body)).into_response()
    }
}

// =============================================================================
// Domain Error Conversion
// =============================================================================

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => AppError::Validation(msg),
            DomainError::NotFound(entity) => AppError::NotFound(entity),
            DomainError::InvalidRequest(msg) => AppError::InvalidRequest(msg),
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Extension trait for Option -> AppError conversion
pub trait OptionExt<T> {
    fn ok_or_not_found(self, entity: &str) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self, entity: &str) -> AppResult<T> {
        self.ok_or_else(|| AppError::not_found(entity))
    }
}

/// Convenience constructors
impl AppError {
    pub fn not_found(entity: impl Into<String>) -> Self {
        AppError::NotFound(entity.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn invalid_request(msg: impl Into<String>) -> Self {
        AppError::InvalidRequest(msg.into())
    }

    pub fn upstream(detail: impl Into<String>) -> Self {
        AppError::Upstream(detail.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn client_errors_map_to_4xx() {
        let (status, _) = body_json(AppError::not_found("Shop")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        for err in [
            AppError::invalid_request("wrong shop"),
            AppError::PaymentDeclined("declined".into()),
            AppError::BookingConflict("taken".into()),
        ] {
            let (status, _) = body_json(err).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
        }
    }

    #[tokio::test]
    async fn server_errors_hide_provider_detail() {
        let cases = [
            AppError::upstream("INTERNAL_SERVER_ERROR: square exploded"),
            AppError::CompensationFailed("refund rf-1 rejected by square".into()),
            AppError::PersistenceInconsistency("insert appointments: square bk-1".into()),
        ];
        for err in cases {
            let code = err.code();
            let (status, body) = body_json(err).await;
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(body["error"]["code"], code);
            let message = body["error"]["message"].as_str().unwrap();
            assert!(!message.to_lowercase().contains("square"));
        }
    }

    #[test]
    fn incident_kinds() {
        assert!(ErrorKind::CompensationFailed.is_incident());
        assert!(ErrorKind::PersistenceInconsistency.is_incident());
        assert!(!ErrorKind::BookingConflict.is_incident());
        assert_eq!(
            AppError::BookingConflict("x".into()).kind(),
            Some(ErrorKind::BookingConflict)
        );
        assert_eq!(AppError::validation("x").kind(), None);
    }
}
