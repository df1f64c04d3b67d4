use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::RentalFinanceError;
use crate::RentalFinanceResult;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5%). Never as percentages.
pub type Rate = Decimal;

/// Values already scaled to percent (25 = 25%).
pub type Percent = Decimal;

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    for warning in &warnings {
        tracing::warn!(methodology, "{warning}");
    }

    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

/// Sum amounts, rejecting a total that does not fit in a `Decimal`.
pub fn checked_sum(
    amounts: impl IntoIterator<Item = Money>,
    field: &str,
) -> RentalFinanceResult<Money> {
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, amount| acc.checked_add(amount))
        .ok_or_else(|| RentalFinanceError::overflow(field))
}

/// Round a monetary amount to cents, half away from zero.
pub fn round_money(value: Money) -> Money {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Round a percentage to a whole number, half away from zero.
pub fn round_whole(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round_money_half_away_from_zero() {
        assert_eq!(round_money(dec!(3.335)), dec!(3.34));
        assert_eq!(round_money(dec!(3.3333)), dec!(3.33));
        assert_eq!(round_money(dec!(-1.005)), dec!(-1.01));
    }

    #[test]
    fn test_round_whole() {
        assert_eq!(round_whole(dec!(24.5)), dec!(25));
        assert_eq!(round_whole(dec!(33.333)), dec!(33));
    }
}
