use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::config::{ForecastPolicy, ForecastSettings};
use crate::dates::{parse_date, Period};
use crate::entities::{CashFlowPoint, Contract};
use crate::error::RentalFinanceError;
use crate::types::{checked_sum, with_metadata, ComputationOutput, Money};
use crate::RentalFinanceResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Realized cash flow for a past month.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoricalCashFlow {
    pub period: String,
    pub realized: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashFlowProjectionInput {
    /// Past months in chronological order
    #[serde(default)]
    pub history: Vec<HistoricalCashFlow>,
    #[serde(default)]
    pub contracts: Vec<Contract>,
    /// Anchor month used when there is no history; the forecast starts after it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub as_of: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashFlowProjection {
    pub points: Vec<CashFlowPoint>,
    pub policy: ForecastPolicy,
    pub total_realized: Money,
    pub total_projected: Money,
    /// Active contracts dropped from at least one forecast month
    pub contracts_ending_in_window: Vec<String>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Merge realized history with a three-month forecast, honouring contract
/// end dates.
pub fn project_cash_flow(
    input: &CashFlowProjectionInput,
) -> RentalFinanceResult<ComputationOutput<CashFlowProjection>> {
    project_cash_flow_with(input, &ForecastSettings::default())
}

/// Merge realized history with a forecast built from `active` contracts.
///
/// Under [`ForecastPolicy::RespectEndDates`] a contract stops counting from
/// the first forecast month whose first day is on or after its end date.
/// [`ForecastPolicy::Legacy`] counts every active contract in every month.
pub fn project_cash_flow_with(
    input: &CashFlowProjectionInput,
    settings: &ForecastSettings,
) -> RentalFinanceResult<ComputationOutput<CashFlowProjection>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    settings.validate()?;
    let history = parse_history(&input.history)?;
    let last = match (history.last(), input.as_of.as_deref()) {
        (Some((period, _)), _) => *period,
        (None, Some(raw)) => Period::parse("as_of", raw)?,
        (None, None) => {
            return Err(RentalFinanceError::InsufficientData(
                "Cash-flow projection needs at least one historical month or an as_of month"
                    .into(),
            ))
        }
    };

    let active = active_contracts(&input.contracts, settings.policy, &mut warnings)?;

    let mut points: Vec<CashFlowPoint> = history
        .iter()
        .map(|&(period, realized)| CashFlowPoint {
            period,
            realized,
            projected: Decimal::ZERO,
            is_projection: false,
        })
        .collect();

    let mut contracts_ending_in_window: Vec<String> = Vec::new();
    let mut period = last;
    for _ in 0..settings.horizon {
        period = period.next();
        let month_start = period.first_day();
        let mut projected = Decimal::ZERO;
        for &(contract, end) in &active {
            let ended = end.is_some_and(|end| month_start >= end);
            if ended {
                if !contracts_ending_in_window.contains(&contract.id) {
                    contracts_ending_in_window.push(contract.id.clone());
                }
                continue;
            }
            projected = projected
                .checked_add(contract.monthly_value)
                .ok_or_else(|| RentalFinanceError::overflow("contracts.monthly_value"))?;
        }
        points.push(CashFlowPoint {
            period,
            realized: Decimal::ZERO,
            projected,
            is_projection: true,
        });
    }

    if settings.policy == ForecastPolicy::Legacy {
        let window_end = period.next().first_day();
        for contract in input.contracts.iter().filter(|c| c.is_active()) {
            if let Ok(end) = parse_date("end_date", &contract.end_date) {
                if end < window_end {
                    warnings.push(format!(
                        "Contract '{}' ends on {end} but is projected for the whole window",
                        contract.id
                    ));
                }
            }
        }
    }

    let total_realized = checked_sum(points.iter().map(|p| p.realized), "history.realized")?;
    let total_projected =
        checked_sum(points.iter().map(|p| p.projected), "contracts.monthly_value")?;

    tracing::debug!(
        historical = history.len(),
        forecast = settings.horizon,
        active = active.len(),
        policy = ?settings.policy,
        total_projected = %total_projected,
        "cash flow projected"
    );

    let output = CashFlowProjection {
        points,
        policy: settings.policy,
        total_realized,
        total_projected,
        contracts_ending_in_window,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Realized Cash Flow with Active-Contract Forecast",
        input,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_history(history: &[HistoricalCashFlow]) -> RentalFinanceResult<Vec<(Period, Money)>> {
    let mut parsed: Vec<(Period, Money)> = Vec::with_capacity(history.len());
    for (i, point) in history.iter().enumerate() {
        let period = Period::parse(&format!("history[{i}].period"), &point.period)?;
        if let Some((prev, _)) = parsed.last() {
            if period <= *prev {
                return Err(RentalFinanceError::invalid(
                    format!("history[{i}].period"),
                    format!("{period} does not follow {prev}; history must be chronological"),
                ));
            }
        }
        parsed.push((period, point.realized));
    }
    Ok(parsed)
}

/// Active contracts paired with their end date when the policy needs it.
/// `None` means the contract counts in every forecast month.
fn active_contracts<'a>(
    contracts: &'a [Contract],
    policy: ForecastPolicy,
    warnings: &mut Vec<String>,
) -> RentalFinanceResult<Vec<(&'a Contract, Option<NaiveDate>)>> {
    let mut active = Vec::new();
    for (i, contract) in contracts.iter().enumerate() {
        if !contract.is_active() {
            continue;
        }
        if contract.monthly_value < Decimal::ZERO {
            return Err(RentalFinanceError::invalid(
                format!("contracts[{i}].monthly_value"),
                "Monthly value must not be negative",
            ));
        }
        let end = match policy {
            // a blank end date is an open-ended lease
            ForecastPolicy::RespectEndDates if contract.end_date.trim().is_empty() => None,
            ForecastPolicy::RespectEndDates => {
                let end = parse_date(&format!("contracts[{i}].end_date"), &contract.end_date)?;
                let begin =
                    parse_date(&format!("contracts[{i}].start_date"), &contract.start_date)?;
                if end < begin {
                    warnings.push(format!(
                        "Contract '{}' ends before it starts ({end} < {begin})",
                        contract.id
                    ));
                }
                Some(end)
            }
            ForecastPolicy::Legacy => None,
        };
        active.push((contract, end));
    }
    Ok(active)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
