use napi::Result as NapiResult;
use napi_derive::napi;
use serde::Serialize;

use rental_finance_core::apportionment::split::{self, ApportionmentInput};
use rental_finance_core::cash_flow::projection::{self, CashFlowProjectionInput};
use rental_finance_core::delinquency::fees::{self, DelinquencyInput};
use rental_finance_core::occupancy::vacancy::{self, PortfolioInput};
use rental_finance_core::occupancy::yields;
use rental_finance_core::tax::liability::{self, TaxLiabilityInput};
use rental_finance_core::EngineConfig;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn parse<T: serde::de::DeserializeOwned>(json: &str) -> NapiResult<T> {
    serde_json::from_str(json).map_err(to_napi_error)
}

/// Engine configuration as JSON, or the defaults when absent.
fn engine_config(config_json: Option<String>) -> NapiResult<EngineConfig> {
    let config: EngineConfig = match config_json {
        Some(json) => parse(&json)?,
        None => EngineConfig::default(),
    };
    config.validate().map_err(to_napi_error)?;
    Ok(config)
}

fn to_json(output: &impl Serialize) -> NapiResult<String> {
    serde_json::to_string(output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Tax
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_tax_liability(
    input_json: String,
    config_json: Option<String>,
) -> NapiResult<String> {
    let input: TaxLiabilityInput = parse(&input_json)?;
    let config = engine_config(config_json)?;
    let output =
        liability::calculate_tax_liability_with(&input, &config.tax_table).map_err(to_napi_error)?;
    to_json(&output)
}

#[napi]
pub fn calculate_monthly_tax_liabilities(
    input_json: String,
    config_json: Option<String>,
) -> NapiResult<String> {
    let input: TaxLiabilityInput = parse(&input_json)?;
    let config = engine_config(config_json)?;
    let output = liability::calculate_monthly_tax_liabilities(&input, &config.tax_table)
        .map_err(to_napi_error)?;
    to_json(&output)
}

// ---------------------------------------------------------------------------
// Billing
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_delinquency_fee(
    input_json: String,
    config_json: Option<String>,
) -> NapiResult<String> {
    let input: DelinquencyInput = parse(&input_json)?;
    let config = engine_config(config_json)?;
    let output =
        fees::calculate_delinquency_fee_with(&input, &config.delinquency).map_err(to_napi_error)?;
    to_json(&output)
}

#[napi]
pub fn apportion_expense(input_json: String) -> NapiResult<String> {
    let input: ApportionmentInput = parse(&input_json)?;
    let output = split::apportion_expense(&input).map_err(to_napi_error)?;
    to_json(&output)
}

// ---------------------------------------------------------------------------
// Portfolio
// ---------------------------------------------------------------------------

#[napi]
pub fn vacancy_metrics(input_json: String, config_json: Option<String>) -> NapiResult<String> {
    let input: PortfolioInput = parse(&input_json)?;
    let config = engine_config(config_json)?;
    let output = vacancy::vacancy_metrics_with(&input, config.vacancy_alert_threshold)
        .map_err(to_napi_error)?;
    to_json(&output)
}

#[napi]
pub fn portfolio_yield(input_json: String) -> NapiResult<String> {
    let input: PortfolioInput = parse(&input_json)?;
    let output = yields::portfolio_yield(&input).map_err(to_napi_error)?;
    to_json(&output)
}

#[napi]
pub fn project_cash_flow(input_json: String, config_json: Option<String>) -> NapiResult<String> {
    let input: CashFlowProjectionInput = parse(&input_json)?;
    let config = engine_config(config_json)?;
    let output =
        projection::project_cash_flow_with(&input, &config.forecast).map_err(to_napi_error)?;
    to_json(&output)
}
