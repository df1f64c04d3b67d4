use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::config::DelinquencyTerms;
use crate::dates::parse_date;
use crate::error::RentalFinanceError;
use crate::types::{round_money, with_metadata, ComputationOutput, Money, Rate};
use crate::RentalFinanceResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// An overdue (or on-time) payment to assess.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DelinquencyInput {
    /// Amount originally billed
    pub original_amount: Money,
    /// ISO date the amount fell due
    pub due_date: String,
    /// ISO date of payment; today when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_date: Option<String>,
}

/// Penalty and interest owed on a late payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DelinquencyOutput {
    pub original_amount: Money,
    /// Whole calendar days between due and paid dates, 0 when on time
    pub days_late: i64,
    /// One-off moratorium penalty
    pub penalty: Money,
    /// Simple pro-rata interest
    pub interest: Money,
    pub total_payable: Money,
    pub daily_interest_rate: Rate,
    pub due_date: NaiveDate,
    pub paid_date: NaiveDate,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Assess late fees with the default terms, treating a missing paid date as
/// today's local calendar date.
pub fn calculate_delinquency_fee(
    input: &DelinquencyInput,
) -> RentalFinanceResult<ComputationOutput<DelinquencyOutput>> {
    calculate_delinquency_fee_with(input, &DelinquencyTerms::default())
}

/// Assess late fees with configured terms, defaulting the paid date to today.
pub fn calculate_delinquency_fee_with(
    input: &DelinquencyInput,
    terms: &DelinquencyTerms,
) -> RentalFinanceResult<ComputationOutput<DelinquencyOutput>> {
    let today = chrono::Local::now().date_naive();
    calculate_delinquency_fee_on(input, today, terms)
}

/// Assess late fees with explicit terms and an explicit "today".
///
/// Penalty, interest and total are each rounded to cents from the unrounded
/// figures, so the three returned values may differ from `original +
/// penalty + interest` by at most one cent.
pub fn calculate_delinquency_fee_on(
    input: &DelinquencyInput,
    today: NaiveDate,
    terms: &DelinquencyTerms,
) -> RentalFinanceResult<ComputationOutput<DelinquencyOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    terms.validate()?;
    if input.original_amount <= Decimal::ZERO {
        return Err(RentalFinanceError::invalid(
            "original_amount",
            "Original amount must be positive",
        ));
    }
    let due_date = parse_date("due_date", &input.due_date)?;
    let paid_date = match input.paid_date.as_deref() {
        Some(raw) => parse_date("paid_date", raw)?,
        None => today,
    };

    let days_late = (paid_date - due_date).num_days().max(0);
    let daily_interest_rate = terms.daily_interest_rate();

    let (penalty, interest) = if days_late == 0 {
        (Decimal::ZERO, Decimal::ZERO)
    } else {
        // rates are at most 1, so only the day count can overflow
        let penalty = input.original_amount * terms.penalty_rate;
        // original * monthly * days / days_per_month keeps the division last
        let interest = (input.original_amount * terms.monthly_interest_rate)
            .checked_mul(Decimal::from(days_late))
            .ok_or_else(|| RentalFinanceError::overflow("original_amount"))?
            / Decimal::from(terms.days_per_month);
        (penalty, interest)
    };
    let total_payable = input
        .original_amount
        .checked_add(penalty)
        .and_then(|sum| sum.checked_add(interest))
        .ok_or_else(|| RentalFinanceError::overflow("original_amount"))?;

    if days_late > 365 {
        warnings.push(format!(
            "Payment is {days_late} days late; simple interest may understate the amount due"
        ));
    }

    tracing::debug!(
        days_late,
        original = %input.original_amount,
        penalty = %penalty,
        interest = %interest,
        "delinquency fee assessed"
    );

    let output = DelinquencyOutput {
        original_amount: input.original_amount,
        days_late,
        penalty: round_money(penalty),
        interest: round_money(interest),
        total_payable: round_money(total_payable),
        daily_interest_rate,
        due_date,
        paid_date,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Late Payment Penalty and Pro-Rata Interest",
        input,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
