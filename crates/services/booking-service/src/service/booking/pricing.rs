//! Charge amount policy.

use common::DepositConfig;
use domain::PaymentMode;

/// Decides how much of a service price is taken as a deposit.
pub trait ChargePolicy: Send + Sync {
    fn deposit_cents(&self, price_cents: i64) -> i64;
}

/// Deposit of a percentage of the price, raised to a floor and capped at
/// the price itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PercentageDeposit {
    pub percent: u32,
    pub minimum_cents: i64,
}

impl PercentageDeposit {
    pub fn new(percent: u32, minimum_cents: i64) -> Self {
        Self {
            percent: percent.min(100),
            minimum_cents: minimum_cents.max(0),
        }
    }
}

impl From<&DepositConfig> for PercentageDeposit {
    fn from(config: &DepositConfig) -> Self {
        Self::new(config.percent, config.minimum_cents)
    }
}

impl Default for PercentageDeposit {
    fn default() -> Self {
        Self::from(&DepositConfig::default())
    }
}

impl ChargePolicy for PercentageDeposit {
    fn deposit_cents(&self, price_cents: i64) -> i64 {
        let price = price_cents.max(0);
        // Round up so a deposit never undercharges by a cent
        let share = (price * i64::from(self.percent) + 99) / 100;
        share.max(self.minimum_cents).min(price)
    }
}

/// Amount to charge at booking time for the given mode.
pub fn charge_cents(policy: &dyn ChargePolicy, mode: PaymentMode, price_cents: i64) -> i64 {
    match mode {
        PaymentMode::Full => price_cents.max(0),
        PaymentMode::Deposit => policy.deposit_cents(price_cents),
    }
}
