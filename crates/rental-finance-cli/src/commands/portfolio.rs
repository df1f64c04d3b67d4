use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use rental_finance_core::cash_flow::projection::{self, CashFlowProjectionInput};
use rental_finance_core::config::{ForecastPolicy, ForecastSettings};
use rental_finance_core::occupancy::vacancy::{self, PortfolioInput};
use rental_finance_core::occupancy::yields;
use rental_finance_core::EngineConfig;

use crate::input;

/// Arguments for vacancy metrics
#[derive(Args)]
pub struct VacancyArgs {
    /// Path to JSON input file with a `properties` array
    #[arg(long)]
    pub input: Option<String>,

    /// Alert threshold in percent; overrides the configured value
    #[arg(long)]
    pub threshold: Option<Decimal>,
}

/// Arguments for portfolio rental yield
#[derive(Args)]
pub struct YieldArgs {
    /// Path to JSON input file with a `properties` array
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for the cash-flow projection
#[derive(Args)]
pub struct CashFlowArgs {
    /// Path to JSON input file with `history`, `contracts` and optional `as_of`
    #[arg(long)]
    pub input: Option<String>,

    /// Number of months to forecast; overrides the configured horizon
    #[arg(long)]
    pub horizon: Option<u32>,

    /// Count every active contract in every forecast month, ignoring end dates
    #[arg(long)]
    pub legacy: bool,
}

pub fn run_vacancy(
    args: VacancyArgs,
    config: &EngineConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let portfolio: PortfolioInput = input::read_payload(args.input.as_deref(), "vacancy")?;
    let threshold = args.threshold.unwrap_or(config.vacancy_alert_threshold);
    let result = vacancy::vacancy_metrics_with(&portfolio, threshold)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_yield(args: YieldArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let portfolio: PortfolioInput = input::read_payload(args.input.as_deref(), "yield")?;
    let result = yields::portfolio_yield(&portfolio)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_cash_flow(
    args: CashFlowArgs,
    config: &EngineConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let flow_input: CashFlowProjectionInput =
        input::read_payload(args.input.as_deref(), "cash-flow projection")?;
    let settings = forecast_settings(&config.forecast, args.horizon, args.legacy);
    let result = projection::project_cash_flow_with(&flow_input, &settings)?;
    Ok(serde_json::to_value(result)?)
}

fn forecast_settings(
    base: &ForecastSettings,
    horizon: Option<u32>,
    legacy: bool,
) -> ForecastSettings {
    let mut settings = base.clone();
    if let Some(months) = horizon {
        settings.horizon = months;
    }
    if legacy {
        settings.policy = ForecastPolicy::Legacy;
    }
    settings
}
