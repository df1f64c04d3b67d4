use clap::Args;
use serde_json::Value;

use rental_finance_core::tax::liability::{self, TaxLiabilityInput};
use rental_finance_core::EngineConfig;

use crate::input;

/// Arguments for a single-period tax liability
#[derive(Args)]
pub struct TaxArgs {
    /// Path to JSON input file with a `receipts` array
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for month-by-month tax liabilities
#[derive(Args)]
pub struct TaxMonthlyArgs {
    /// Path to JSON input file with a `receipts` array spanning several months
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_tax(
    args: TaxArgs,
    config: &EngineConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let tax_input: TaxLiabilityInput =
        input::read_payload(args.input.as_deref(), "tax liability")?;
    let result = liability::calculate_tax_liability_with(&tax_input, &config.tax_table)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_tax_monthly(
    args: TaxMonthlyArgs,
    config: &EngineConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let tax_input: TaxLiabilityInput =
        input::read_payload(args.input.as_deref(), "monthly tax liability")?;
    let result = liability::calculate_monthly_tax_liabilities(&tax_input, &config.tax_table)?;
    Ok(serde_json::to_value(result)?)
}
