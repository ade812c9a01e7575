//! Domain-level constants.
//!
//! These constants define business rules and validation requirements.

// =============================================================================
// Appointment Status
// =============================================================================

/// Appointment reserved with the provider and paid for (if payment was required)
pub const APPOINTMENT_STATUS_BOOKED: &str = "booked";

/// Appointment cancelled after booking
pub const APPOINTMENT_STATUS_CANCELLED: &str = "cancelled";

// =============================================================================
// Payment Status
// =============================================================================

/// Funds authorized but not yet captured
pub const PAYMENT_STATUS_AUTHORIZED: &str = "authorized";

/// Funds captured
pub const PAYMENT_STATUS_CAPTURED: &str = "captured";

/// Payment rejected by the provider
pub const PAYMENT_STATUS_FAILED: &str = "failed";

/// Captured funds returned to the customer
pub const PAYMENT_STATUS_REFUNDED: &str = "refunded";

// =============================================================================
// Payment Modes
// =============================================================================

/// Charge the full service price
pub const PAYMENT_MODE_FULL: &str = "FULL";

/// Charge a deposit computed from the service price
pub const PAYMENT_MODE_DEPOSIT: &str = "DEPOSIT";

/// All valid payment mode values
pub const VALID_PAYMENT_MODES: &[&str] = &[PAYMENT_MODE_FULL, PAYMENT_MODE_DEPOSIT];

// =============================================================================
// Validation
// =============================================================================

/// Shortest bookable service, in minutes
pub const MIN_SERVICE_DURATION_MINUTES: i32 = 1;

/// Calendar date format accepted by availability queries
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Currency used when none is configured
pub const DEFAULT_CURRENCY: &str = "USD";
