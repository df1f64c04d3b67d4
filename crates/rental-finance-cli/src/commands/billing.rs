use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use rental_finance_core::apportionment::split::{
    self, ApportionmentInput, ApportionmentStrategy,
};
use rental_finance_core::delinquency::fees::{self, DelinquencyInput};
use rental_finance_core::{EngineConfig, Money, Unit};

use crate::input;

/// Arguments for late-payment fees
#[derive(Args)]
pub struct LateFeeArgs {
    /// Amount originally billed
    #[arg(long)]
    pub amount: Option<Decimal>,

    /// Due date (YYYY-MM-DD)
    #[arg(long)]
    pub due: Option<String>,

    /// Payment date (YYYY-MM-DD); defaults to today
    #[arg(long)]
    pub paid: Option<String>,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StrategyArg {
    ByUnit,
    ByOccupant,
}

impl From<StrategyArg> for ApportionmentStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::ByUnit => ApportionmentStrategy::ByUnit,
            StrategyArg::ByOccupant => ApportionmentStrategy::ByOccupant,
        }
    }
}

/// Arguments for splitting a shared expense
#[derive(Args)]
pub struct ApportionArgs {
    /// Path to JSON input file with `total_expense` and `units`
    #[arg(long)]
    pub input: Option<String>,

    /// Allocation rule; overrides `strategy` in the input file
    #[arg(long, value_enum)]
    pub strategy: Option<StrategyArg>,

    /// Total expense; overrides `total_expense` in the input file
    #[arg(long)]
    pub total: Option<Decimal>,
}

/// Apportionment payload as read from disk, where the strategy may come from a flag.
#[derive(Deserialize)]
struct ApportionPayload {
    #[serde(default)]
    total_expense: Option<Money>,
    #[serde(default)]
    units: Vec<Unit>,
    #[serde(default)]
    strategy: Option<ApportionmentStrategy>,
}

pub fn run_late_fee(
    args: LateFeeArgs,
    config: &EngineConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let fee_input: DelinquencyInput = if args.input.is_some() || args.amount.is_none() {
        input::read_payload(args.input.as_deref(), "late fee")?
    } else {
        DelinquencyInput {
            original_amount: args.amount.ok_or("--amount is required (or provide --input)")?,
            due_date: args.due.ok_or("--due is required (or provide --input)")?,
            paid_date: args.paid,
        }
    };
    let result = fees::calculate_delinquency_fee_with(&fee_input, &config.delinquency)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_apportion(args: ApportionArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let payload: ApportionPayload = input::read_payload(args.input.as_deref(), "apportionment")?;
    let strategy = args
        .strategy
        .map(ApportionmentStrategy::from)
        .or(payload.strategy)
        .ok_or("--strategy by-unit|by-occupant is required when the input has none")?;
    let total_expense = args
        .total
        .or(payload.total_expense)
        .ok_or("--total is required when the input has no total_expense")?;

    let result = split::apportion_expense(&ApportionmentInput {
        total_expense,
        units: payload.units,
        strategy,
    })?;
    Ok(serde_json::to_value(result)?)
}

