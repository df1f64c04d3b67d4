use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::entities::{Property, PropertyStatus};
use crate::error::RentalFinanceError;
use crate::types::{round_whole, with_metadata, ComputationOutput, Money, Percent};
use crate::RentalFinanceResult;

/// Default portfolio-health threshold, in percent.
pub const DEFAULT_ALERT_THRESHOLD: Percent = dec!(20);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioInput {
    #[serde(default)]
    pub properties: Vec<Property>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VacancyMetrics {
    /// Share of properties available for rent, whole percent
    pub physical_pct: Percent,
    /// Share of potential rent sitting on available properties, whole percent
    pub financial_pct: Percent,
    /// Either metric above the threshold
    pub alert: bool,
    pub alert_threshold: Percent,
    pub total_properties: usize,
    pub available: usize,
    pub rented: usize,
    pub under_maintenance: usize,
    /// Monthly rent across every property
    pub potential_monthly_rent: Money,
    /// Monthly rent of the available properties
    pub vacant_monthly_rent: Money,
}

/// Physical and financial vacancy against the default 20% threshold.
pub fn vacancy_metrics(
    input: &PortfolioInput,
) -> RentalFinanceResult<ComputationOutput<VacancyMetrics>> {
    vacancy_metrics_with(input, DEFAULT_ALERT_THRESHOLD)
}

/// Physical and financial vacancy against a configured threshold.
///
/// Only `available` counts as vacant; properties under maintenance are
/// neither vacant nor producing income, and stay in both denominators. An
/// empty portfolio reports zero vacancy.
pub fn vacancy_metrics_with(
    input: &PortfolioInput,
    alert_threshold: Percent,
) -> RentalFinanceResult<ComputationOutput<VacancyMetrics>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if alert_threshold < Decimal::ZERO || alert_threshold > dec!(100) {
        return Err(RentalFinanceError::invalid(
            "alert_threshold",
            "Alert threshold must be between 0 and 100",
        ));
    }
    validate_properties(&input.properties)?;

    let mut available = 0usize;
    let mut rented = 0usize;
    let mut under_maintenance = 0usize;
    let mut potential_monthly_rent = Decimal::ZERO;
    let mut vacant_monthly_rent = Decimal::ZERO;
    let mut unpriced = 0usize;

    for property in &input.properties {
        let rent = property.rent_or_zero();
        if property.rent_amount.is_none() {
            unpriced += 1;
        }
        // vacant rent is a subset of potential rent
        potential_monthly_rent = potential_monthly_rent
            .checked_add(rent)
            .ok_or_else(|| RentalFinanceError::overflow("properties.rent_amount"))?;
        match property.status {
            PropertyStatus::Available => {
                available += 1;
                vacant_monthly_rent += rent;
            }
            PropertyStatus::Rented => rented += 1,
            PropertyStatus::UnderMaintenance => under_maintenance += 1,
        }
    }

    let total = input.properties.len();
    let physical_pct = if total == 0 {
        Decimal::ZERO
    } else {
        round_whole(Decimal::from(available) / Decimal::from(total) * dec!(100))
    };
    let financial_pct = if potential_monthly_rent.is_zero() {
        Decimal::ZERO
    } else {
        round_whole(vacant_monthly_rent / potential_monthly_rent * dec!(100))
    };
    let alert = physical_pct > alert_threshold || financial_pct > alert_threshold;

    if unpriced > 0 {
        warnings.push(format!(
            "{unpriced} properties have no rent set and count as zero in financial vacancy"
        ));
    }

    tracing::debug!(
        total,
        available,
        physical_pct = %physical_pct,
        financial_pct = %financial_pct,
        alert,
        "vacancy metrics computed"
    );

    let output = VacancyMetrics {
        physical_pct,
        financial_pct,
        alert,
        alert_threshold,
        total_properties: total,
        available,
        rented,
        under_maintenance,
        potential_monthly_rent,
        vacant_monthly_rent,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Physical and Financial Vacancy",
        input,
        warnings,
        elapsed,
        output,
    ))
}

pub(crate) fn validate_properties(properties: &[Property]) -> RentalFinanceResult<()> {
    for (i, property) in properties.iter().enumerate() {
        if property.rent_amount.is_some_and(|r| r < Decimal::ZERO) {
            return Err(RentalFinanceError::invalid(
                format!("properties[{i}].rent_amount"),
                "Rent must not be negative",
            ));
        }
        if property.market_value.is_some_and(|v| v < Decimal::ZERO) {
            return Err(RentalFinanceError::invalid(
                format!("properties[{i}].market_value"),
                "Market value must not be negative",
            ));
        }
    }
    Ok(())
}
