use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;

use crate::config::TaxTable;
use crate::dates::{parse_date, Period};
use crate::entities::RentalReceipt;
use crate::error::RentalFinanceError;
use crate::types::{round_money, with_metadata, ComputationOutput, Money, Rate};
use crate::RentalFinanceResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Receipts for a single tax period. The caller decides the grouping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxLiabilityInput {
    #[serde(default)]
    pub receipts: Vec<RentalReceipt>,
}

/// Tax owed on one period's taxable base.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxLiabilityOutput {
    /// Sum of gross receipts
    pub gross_income: Money,
    /// Deductions actually applied (capped at each receipt's gross)
    pub total_deductions: Money,
    /// Net taxable income, never negative
    pub taxable_base: Money,
    /// Marginal rate of the matched bracket
    pub rate: Rate,
    /// Subtraction constant of the matched bracket
    pub bracket_deduction: Money,
    /// max(0, base * rate - deduction), rounded to cents
    pub tax_owed: Money,
    /// "Isento" or the marginal rate as a percentage
    pub bracket_label: String,
    /// tax_owed / taxable_base (0 when base is 0)
    pub effective_rate: Rate,
    pub receipt_count: usize,
}

/// Liability for one calendar month.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyTaxLiability {
    pub period: Period,
    pub liability: TaxLiabilityOutput,
}

/// Per-month liabilities in chronological order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyTaxOutput {
    pub months: Vec<MonthlyTaxLiability>,
    pub total_taxable_base: Money,
    pub total_tax_owed: Money,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Compute the period's tax liability using the default bracket table.
pub fn calculate_tax_liability(
    input: &TaxLiabilityInput,
) -> RentalFinanceResult<ComputationOutput<TaxLiabilityOutput>> {
    calculate_tax_liability_with(input, &TaxTable::default())
}

/// Compute the period's tax liability against a configured bracket table.
///
/// Each receipt is netted against its owner-paid deductions and floored at
/// zero before the receipts are summed, so an expensive month on one
/// property never offsets income from another.
pub fn calculate_tax_liability_with(
    input: &TaxLiabilityInput,
    table: &TaxTable,
) -> RentalFinanceResult<ComputationOutput<TaxLiabilityOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    table.validate()?;
    for (i, receipt) in input.receipts.iter().enumerate() {
        validate_receipt(i, receipt)?;
    }

    let receipts: Vec<&RentalReceipt> = input.receipts.iter().collect();
    let output = assess(&receipts, table, &mut warnings)?;

    tracing::debug!(
        receipts = output.receipt_count,
        taxable_base = %output.taxable_base,
        tax_owed = %output.tax_owed,
        bracket = %output.bracket_label,
        "tax liability computed"
    );

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        &format!("Progressive Rental Income Tax ({})", table.name),
        input,
        warnings,
        elapsed,
        output,
    ))
}

/// Group receipts by calendar month and assess each month separately.
pub fn calculate_monthly_tax_liabilities(
    input: &TaxLiabilityInput,
    table: &TaxTable,
) -> RentalFinanceResult<ComputationOutput<MonthlyTaxOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    table.validate()?;

    let mut by_month: BTreeMap<Period, Vec<&RentalReceipt>> = BTreeMap::new();
    for (i, receipt) in input.receipts.iter().enumerate() {
        let date = validate_receipt(i, receipt)?;
        by_month.entry(Period::of(date)).or_default().push(receipt);
    }

    let mut months = Vec::with_capacity(by_month.len());
    let mut total_taxable_base = Decimal::ZERO;
    let mut total_tax_owed = Decimal::ZERO;
    for (period, receipts) in by_month {
        let mut month_warnings = Vec::new();
        let liability = assess(&receipts, table, &mut month_warnings)?;
        warnings.extend(month_warnings.into_iter().map(|w| format!("{period}: {w}")));
        total_taxable_base = total_taxable_base
            .checked_add(liability.taxable_base)
            .ok_or_else(|| RentalFinanceError::overflow("receipts.gross_amount"))?;
        // tax owed never exceeds the taxable base
        total_tax_owed += liability.tax_owed;
        months.push(MonthlyTaxLiability { period, liability });
    }

    tracing::debug!(
        months = months.len(),
        total_tax_owed = %total_tax_owed,
        "monthly tax liabilities computed"
    );

    let output = MonthlyTaxOutput {
        months,
        total_taxable_base,
        total_tax_owed,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        &format!("Monthly Rental Income Tax ({})", table.name),
        input,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_receipt(
    index: usize,
    receipt: &RentalReceipt,
) -> RentalFinanceResult<chrono::NaiveDate> {
    let date = parse_date(
        &format!("receipts[{index}].receipt_date"),
        &receipt.receipt_date,
    )?;

    if receipt.gross_amount < Decimal::ZERO {
        return Err(RentalFinanceError::invalid(
            format!("receipts[{index}].gross_amount"),
            "Gross amount must not be negative",
        ));
    }

    let d = &receipt.deductions;
    for (name, value) in [
        ("property_tax", d.property_tax),
        ("condo_fee", d.condo_fee),
        ("management_fee", d.management_fee),
    ] {
        if value < Decimal::ZERO {
            return Err(RentalFinanceError::invalid(
                format!("receipts[{index}].deductions.{name}"),
                "Deductions must not be negative",
            ));
        }
    }

    Ok(date)
}

// ---------------------------------------------------------------------------
// Assessment
// ---------------------------------------------------------------------------

fn assess(
    receipts: &[&RentalReceipt],
    table: &TaxTable,
    warnings: &mut Vec<String>,
) -> RentalFinanceResult<TaxLiabilityOutput> {
    let mut gross_income = Decimal::ZERO;
    let mut total_deductions = Decimal::ZERO;
    let mut taxable_base = Decimal::ZERO;

    for receipt in receipts {
        let deductions = receipt
            .deductions
            .total()
            .ok_or_else(|| RentalFinanceError::overflow("receipts.deductions"))?;
        let net = (receipt.gross_amount - deductions).max(Decimal::ZERO);
        if deductions > receipt.gross_amount {
            warnings.push(format!(
                "Receipt of {} on {} has deductions of {}; net floored at zero",
                receipt.gross_amount, receipt.receipt_date, deductions
            ));
        }
        // the other two sums are bounded by gross_income
        gross_income = gross_income
            .checked_add(receipt.gross_amount)
            .ok_or_else(|| RentalFinanceError::overflow("receipts.gross_amount"))?;
        total_deductions += receipt.gross_amount - net;
        taxable_base += net;
    }

    // Dependents belong to the taxpayer, so the largest declared count wins.
    if !table.dependent_deduction.is_zero() {
        let dependents = receipts
            .iter()
            .filter_map(|r| r.dependents)
            .max()
            .unwrap_or(0);
        let allowance = table
            .dependent_deduction
            .checked_mul(Decimal::from(dependents))
            .ok_or_else(|| RentalFinanceError::overflow("receipts.dependents"))?;
        let applied = allowance.min(taxable_base);
        total_deductions += applied;
        taxable_base -= applied;
    }

    let bracket = table.bracket_for(taxable_base)?;
    let tax_owed =
        round_money((taxable_base * bracket.rate - bracket.deduction).max(Decimal::ZERO));
    let effective_rate = if taxable_base.is_zero() {
        Decimal::ZERO
    } else {
        tax_owed / taxable_base
    };

    Ok(TaxLiabilityOutput {
        gross_income,
        total_deductions,
        taxable_base,
        rate: bracket.rate,
        bracket_deduction: bracket.deduction,
        tax_owed,
        bracket_label: bracket.label(),
        effective_rate,
        receipt_count: receipts.len(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
