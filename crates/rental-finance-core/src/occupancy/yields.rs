use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::vacancy::{validate_properties, PortfolioInput};
use crate::entities::PropertyStatus;
use crate::error::RentalFinanceError;
use crate::types::{checked_sum, round_money, with_metadata, ComputationOutput, Money, Percent};
use crate::RentalFinanceResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioYield {
    /// Annual rent of rented properties over total market value, in percent
    pub annual_yield_pct: Percent,
    /// Monthly rent of rented properties times twelve
    pub annual_rental_income: Money,
    /// Market value across every property, vacant ones included
    pub total_market_value: Money,
}

/// Gross rental yield of the whole portfolio.
///
/// Returns zero rather than failing when the portfolio has no market value.
pub fn portfolio_yield(
    input: &PortfolioInput,
) -> RentalFinanceResult<ComputationOutput<PortfolioYield>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_properties(&input.properties)?;

    let monthly_income = checked_sum(
        input
            .properties
            .iter()
            .filter(|p| p.status == PropertyStatus::Rented)
            .map(|p| p.rent_or_zero()),
        "properties.rent_amount",
    )?;
    let annual_rental_income = monthly_income
        .checked_mul(dec!(12))
        .ok_or_else(|| RentalFinanceError::overflow("properties.rent_amount"))?;
    let total_market_value = checked_sum(
        input.properties.iter().map(|p| p.market_value_or_zero()),
        "properties.market_value",
    )?;

    let annual_yield_pct = if total_market_value.is_zero() {
        if !input.properties.is_empty() {
            warnings.push("Total market value is zero; yield reported as 0".into());
        }
        Decimal::ZERO
    } else {
        let ratio = annual_rental_income
            .checked_div(total_market_value)
            .and_then(|r| r.checked_mul(dec!(100)))
            .ok_or_else(|| RentalFinanceError::overflow("properties.market_value"))?;
        round_money(ratio)
    };

    let unvalued = input
        .properties
        .iter()
        .filter(|p| p.market_value.is_none())
        .count();
    if unvalued > 0 && !total_market_value.is_zero() {
        warnings.push(format!(
            "{unvalued} properties have no market value; yield may be overstated"
        ));
    }

    tracing::debug!(
        annual_income = %annual_rental_income,
        market_value = %total_market_value,
        yield_pct = %annual_yield_pct,
        "portfolio yield computed"
    );

    let output = PortfolioYield {
        annual_yield_pct,
        annual_rental_income,
        total_market_value,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Gross Portfolio Rental Yield",
        input,
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Property;
    use crate::error::RentalFinanceError;

    fn property(status: PropertyStatus, rent: Option<Decimal>, value: Option<Decimal>) -> Property {
        Property {
            id: "p".into(),
            name: "Casa".into(),
            status,
            rent_amount: rent,
            market_value: value,
            area: dec!(100),
        }
    }

    #[test]
    fn test_yield_uses_rented_income_over_all_value() {
        let input = PortfolioInput {
            properties: vec![
                property(PropertyStatus::Rented, Some(dec!(2000)), Some(dec!(400000))),
                property(PropertyStatus::Available, Some(dec!(1500)), Some(dec!(300000))),
                property(PropertyStatus::Rented, Some(dec!(1000)), Some(dec!(300000))),
            ],
        };
        let out = portfolio_yield(&input).unwrap().result;

        assert_eq!(out.annual_rental_income, dec!(36000));
        assert_eq!(out.total_market_value, dec!(1000000));
        assert_eq!(out.annual_yield_pct, dec!(3.60));
    }

    #[test]
    fn test_yield_rounded_to_two_places() {
        let input = PortfolioInput {
            properties: vec![property(
                PropertyStatus::Rented,
                Some(dec!(1000)),
                Some(dec!(350000)),
            )],
        };
        // 12000 / 350000 * 100 = 3.428571...
        let out = portfolio_yield(&input).unwrap().result;
        assert_eq!(out.annual_yield_pct, dec!(3.43));
    }

    #[test]
    fn test_zero_market_value_yields_zero() {
        let input = PortfolioInput {
            properties: vec![
                property(PropertyStatus::Rented, Some(dec!(2000)), Some(Decimal::ZERO)),
                property(PropertyStatus::Rented, Some(dec!(1000)), None),
            ],
        };
        let result = portfolio_yield(&input).unwrap();
        assert_eq!(result.result.annual_yield_pct, Decimal::ZERO);
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_empty_portfolio_yields_zero() {
        let result = portfolio_yield(&PortfolioInput { properties: vec![] }).unwrap();
        assert_eq!(result.result.annual_yield_pct, Decimal::ZERO);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_maintenance_income_excluded() {
        let input = PortfolioInput {
            properties: vec![property(
                PropertyStatus::UnderMaintenance,
                Some(dec!(2000)),
                Some(dec!(200000)),
            )],
        };
        let out = portfolio_yield(&input).unwrap().result;
        assert_eq!(out.annual_yield_pct, Decimal::ZERO);
        assert_eq!(out.total_market_value, dec!(200000));
    }

    #[test]
    fn test_negative_market_value_rejected() {
        let input = PortfolioInput {
            properties: vec![property(PropertyStatus::Rented, None, Some(dec!(-5)))],
        };
        let err = portfolio_yield(&input).unwrap_err();
        assert!(matches!(err, RentalFinanceError::InvalidInput { .. }));
    }

    #[test]
    fn test_income_too_large_is_rejected_not_panicking() {
        let huge = Some(Decimal::MAX / dec!(2));
        let input = PortfolioInput {
            properties: vec![
                property(PropertyStatus::Rented, huge, Some(dec!(1))),
                property(PropertyStatus::Rented, huge, Some(dec!(1))),
                property(PropertyStatus::Rented, huge, Some(dec!(1))),
            ],
        };
        let err = portfolio_yield(&input).unwrap_err();
        match err {
            RentalFinanceError::InvalidInput { field, .. } => {
                assert_eq!(field, "properties.rent_amount")
            }
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_tiny_market_value_overflow_is_rejected() {
        let input = PortfolioInput {
            properties: vec![property(
                PropertyStatus::Rented,
                Some(Decimal::MAX / dec!(100)),
                Some(dec!(0.0000000001)),
            )],
        };
        let err = portfolio_yield(&input).unwrap_err();
        assert!(matches!(err, RentalFinanceError::InvalidInput { .. }));
    }
}
