//! Booking service configuration.

use std::env;

use common::{DatabaseConfig, DepositConfig, ProviderConfig};
use domain::DEFAULT_CURRENCY;

/// Booking service configuration.
#[derive(Debug, Clone)]
pub struct BookingServiceConfig {
    /// Database connection settings
    pub database: DatabaseConfig,
    /// Scheduling/payments provider settings
    pub provider: ProviderConfig,
    /// Deposit policy for `DEPOSIT` bookings
    pub deposit: DepositConfig,
    /// ISO 4217 currency for all charges
    pub currency: String,
}

impl BookingServiceConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            database: DatabaseConfig {
                url: env::var("BOOKING_DATABASE_URL")
                    .or_else(|_| env::var("DATABASE_URL"))
                    .unwrap_or(defaults.database.url),
                max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.database.max_connections),
                min_connections: env::var("DATABASE_MIN_CONNECTIONS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.database.min_connections),
            },
            provider: ProviderConfig {
                base_url: env::var("SQUARE_BASE_URL").unwrap_or(defaults.provider.base_url),
                access_token: env::var("SQUARE_ACCESS_TOKEN").unwrap_or_else(|_| {
                    tracing::warn!("SQUARE_ACCESS_TOKEN not set, provider calls will be rejected");
                    String::new()
                }),
                api_version: env::var("SQUARE_API_VERSION")
                    .unwrap_or(defaults.provider.api_version),
                request_timeout_ms: env::var("SQUARE_TIMEOUT_MS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.provider.request_timeout_ms),
            },
            deposit: DepositConfig {
                percent: env::var("DEPOSIT_PERCENT")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .filter(|p| *p <= 100)
                    .unwrap_or(defaults.deposit.percent),
                minimum_cents: env::var("DEPOSIT_MINIMUM_CENTS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .filter(|c| *c >= 0)
                    .unwrap_or(defaults.deposit.minimum_cents),
            },
            currency: env::var("BOOKING_CURRENCY")
                .map(|c| c.to_uppercase())
                .unwrap_or(defaults.currency),
        }
    }
}

impl Default for BookingServiceConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            provider: ProviderConfig::default(),
            deposit: DepositConfig::default(),
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }
}
