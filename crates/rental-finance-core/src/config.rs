//! Engine configuration.
//!
//! Every section carries `#[serde(default)]`, so a partial TOML or JSON
//! document only overrides what it names. Configuration is immutable once
//! loaded and is passed by reference into the `*_with` calculator variants.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::RentalFinanceError;
use crate::types::{Money, Percent, Rate};
use crate::RentalFinanceResult;

/// Top-level configuration for all calculators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub tax_table: TaxTable,
    pub delinquency: DelinquencyTerms,
    /// Vacancy percentage above which the portfolio is flagged
    pub vacancy_alert_threshold: Percent,
    pub forecast: ForecastSettings,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tax_table: TaxTable::default(),
            delinquency: DelinquencyTerms::default(),
            vacancy_alert_threshold: dec!(20),
            forecast: ForecastSettings::default(),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> RentalFinanceResult<()> {
        self.tax_table.validate()?;
        self.delinquency.validate()?;
        if self.vacancy_alert_threshold < Decimal::ZERO || self.vacancy_alert_threshold > dec!(100)
        {
            return Err(RentalFinanceError::InvalidConfig(format!(
                "vacancy_alert_threshold {} must be between 0 and 100",
                self.vacancy_alert_threshold
            )));
        }
        self.forecast.validate()
    }
}

// ---------------------------------------------------------------------------
// Tax brackets
// ---------------------------------------------------------------------------

/// One tier of a progressive table: `tax = base * rate - deduction`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxBracket {
    /// Inclusive upper bound of the tier; `None` for the top tier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper_bound: Option<Money>,
    pub rate: Rate,
    #[serde(default)]
    pub deduction: Money,
}

impl TaxBracket {
    /// "Isento" for a zero-rate tier, otherwise the rate as a percentage.
    pub fn label(&self) -> String {
        if self.rate.is_zero() {
            "Isento".to_string()
        } else {
            format!("{}%", (self.rate * dec!(100)).normalize())
        }
    }
}

/// A monthly progressive income tax table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxTable {
    pub name: String,
    pub brackets: Vec<TaxBracket>,
    /// Monthly deduction per declared dependent; zero disables it
    pub dependent_deduction: Money,
}

impl Default for TaxTable {
    /// Monthly IRPF table. These figures are a projection and should be
    /// overridden from configuration with the values in force.
    fn default() -> Self {
        Self {
            name: "IRPF mensal (projeção)".to_string(),
            brackets: vec![
                TaxBracket {
                    upper_bound: Some(dec!(2428.80)),
                    rate: Decimal::ZERO,
                    deduction: Decimal::ZERO,
                },
                TaxBracket {
                    upper_bound: Some(dec!(2826.65)),
                    rate: dec!(0.075),
                    deduction: dec!(182.16),
                },
                TaxBracket {
                    upper_bound: Some(dec!(3751.05)),
                    rate: dec!(0.15),
                    deduction: dec!(394.16),
                },
                TaxBracket {
                    upper_bound: Some(dec!(4664.68)),
                    rate: dec!(0.225),
                    deduction: dec!(675.49),
                },
                TaxBracket {
                    upper_bound: None,
                    rate: dec!(0.275),
                    deduction: dec!(908.73),
                },
            ],
            dependent_deduction: Decimal::ZERO,
        }
    }
}

impl TaxTable {
    /// Tiers must be ordered, contiguous and end in an unbounded tier, so
    /// that exactly one tier matches any non-negative base.
    pub fn validate(&self) -> RentalFinanceResult<()> {
        let Some(last) = self.brackets.last() else {
            return Err(RentalFinanceError::InvalidConfig(
                "tax table must define at least one bracket".into(),
            ));
        };
        if last.upper_bound.is_some() {
            return Err(RentalFinanceError::InvalidConfig(
                "the last tax bracket must have no upper bound".into(),
            ));
        }

        let mut prev_upper: Option<Money> = None;
        let mut prev_rate = Decimal::ZERO;
        for (i, bracket) in self.brackets.iter().enumerate() {
            if bracket.rate < Decimal::ZERO || bracket.rate >= Decimal::ONE {
                return Err(RentalFinanceError::InvalidConfig(format!(
                    "brackets[{i}].rate {} must be in [0, 1)",
                    bracket.rate
                )));
            }
            if bracket.rate < prev_rate {
                return Err(RentalFinanceError::InvalidConfig(format!(
                    "brackets[{i}].rate decreases; progressive rates must not fall"
                )));
            }
            if bracket.deduction < Decimal::ZERO {
                return Err(RentalFinanceError::InvalidConfig(format!(
                    "brackets[{i}].deduction must not be negative"
                )));
            }
            if i + 1 < self.brackets.len() {
                let Some(upper) = bracket.upper_bound else {
                    return Err(RentalFinanceError::InvalidConfig(format!(
                        "brackets[{i}] is unbounded but is not the last bracket"
                    )));
                };
                if upper < Decimal::ZERO {
                    return Err(RentalFinanceError::InvalidConfig(format!(
                        "brackets[{i}].upper_bound must not be negative"
                    )));
                }
                if let Some(prev) = prev_upper {
                    if upper <= prev {
                        return Err(RentalFinanceError::InvalidConfig(format!(
                            "brackets[{i}].upper_bound {upper} must exceed \
                             the previous bound {prev}"
                        )));
                    }
                }
                prev_upper = Some(upper);
            }
            prev_rate = bracket.rate;
        }

        if self.dependent_deduction < Decimal::ZERO {
            return Err(RentalFinanceError::InvalidConfig(
                "dependent_deduction must not be negative".into(),
            ));
        }
        Ok(())
    }

    /// The single bracket containing `base`. Upper bounds are inclusive.
    pub fn bracket_for(&self, base: Money) -> RentalFinanceResult<&TaxBracket> {
        self.brackets
            .iter()
            .find(|b| b.upper_bound.is_none_or(|upper| base <= upper))
            .ok_or_else(|| {
                RentalFinanceError::InvalidConfig(format!(
                    "no tax bracket covers a base of {base}"
                ))
            })
    }
}

// ---------------------------------------------------------------------------
// Delinquency
// ---------------------------------------------------------------------------

/// Late-payment terms applied to overdue rent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DelinquencyTerms {
    /// One-off penalty on the original amount (0.10 = 10%)
    pub penalty_rate: Rate,
    /// Simple monthly interest (0.01 = 1% a month)
    pub monthly_interest_rate: Rate,
    /// Days used to turn the monthly rate into a daily rate
    pub days_per_month: u32,
}

impl Default for DelinquencyTerms {
    fn default() -> Self {
        Self {
            penalty_rate: dec!(0.10),
            monthly_interest_rate: dec!(0.01),
            days_per_month: 30,
        }
    }
}

impl DelinquencyTerms {
    pub fn validate(&self) -> RentalFinanceResult<()> {
        if self.penalty_rate < Decimal::ZERO || self.penalty_rate > Decimal::ONE {
            return Err(RentalFinanceError::InvalidConfig(format!(
                "penalty_rate {} must be between 0 and 1",
                self.penalty_rate
            )));
        }
        if self.monthly_interest_rate < Decimal::ZERO || self.monthly_interest_rate > Decimal::ONE
        {
            return Err(RentalFinanceError::InvalidConfig(format!(
                "monthly_interest_rate {} must be between 0 and 1",
                self.monthly_interest_rate
            )));
        }
        if self.days_per_month == 0 {
            return Err(RentalFinanceError::InvalidConfig(
                "days_per_month must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn daily_interest_rate(&self) -> Rate {
        self.monthly_interest_rate / Decimal::from(self.days_per_month)
    }
}

// ---------------------------------------------------------------------------
// Forecast
// ---------------------------------------------------------------------------

/// How contract end dates are treated inside the forecast window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecastPolicy {
    /// Drop a contract from every forecast month starting on or after its end date
    #[default]
    RespectEndDates,
    /// Count every active contract in every forecast month
    Legacy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastSettings {
    /// Number of months projected past the last historical month
    pub horizon: u32,
    pub policy: ForecastPolicy,
}

impl Default for ForecastSettings {
    fn default() -> Self {
        Self {
            horizon: 3,
            policy: ForecastPolicy::default(),
        }
    }
}

impl ForecastSettings {
    pub fn validate(&self) -> RentalFinanceResult<()> {
        if self.horizon == 0 || self.horizon > 120 {
            return Err(RentalFinanceError::InvalidConfig(format!(
                "forecast.horizon {} must be between 1 and 120 months",
                self.horizon
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        EngineConfig::default().validate().unwrap();
    }

    #[test]
    fn test_bracket_upper_bound_is_inclusive() {
        let table = TaxTable::default();
        assert_eq!(table.bracket_for(dec!(2428.80)).unwrap().rate, Decimal::ZERO);
        assert_eq!(table.bracket_for(dec!(2428.81)).unwrap().rate, dec!(0.075));
        assert_eq!(table.bracket_for(dec!(4664.68)).unwrap().rate, dec!(0.225));
        assert_eq!(table.bracket_for(dec!(1000000)).unwrap().rate, dec!(0.275));
    }

    #[test]
    fn test_bracket_labels() {
        let table = TaxTable::default();
        let labels: Vec<String> = table.brackets.iter().map(|b| b.label()).collect();
        assert_eq!(labels, vec!["Isento", "7.5%", "15%", "22.5%", "27.5%"]);
    }

    #[test]
    fn test_unsorted_table_rejected() {
        let mut table = TaxTable::default();
        table.brackets.swap(1, 2);
        assert!(matches!(
            table.validate(),
            Err(RentalFinanceError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_bounded_top_bracket_rejected() {
        let mut table = TaxTable::default();
        if let Some(last) = table.brackets.last_mut() {
            last.upper_bound = Some(dec!(10000));
        }
        assert!(table.validate().is_err());
    }

    #[test]
    fn test_empty_table_rejected() {
        let table = TaxTable {
            brackets: vec![],
            ..TaxTable::default()
        };
        assert!(table.validate().is_err());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let cfg: EngineConfig =
            serde_json::from_str(r#"{"vacancy_alert_threshold": "15"}"#).unwrap();
        assert_eq!(cfg.vacancy_alert_threshold, dec!(15));
        assert_eq!(cfg.tax_table, TaxTable::default());
        assert_eq!(cfg.forecast.horizon, 3);
    }

    #[test]
    fn test_forecast_policy_serde_names() {
        let cfg: ForecastSettings = serde_json::from_str(r#"{"policy": "legacy"}"#).unwrap();
        assert_eq!(cfg.policy, ForecastPolicy::Legacy);
        assert_eq!(cfg.horizon, 3);
    }

    #[test]
    fn test_zero_horizon_rejected() {
        let settings = ForecastSettings {
            horizon: 0,
            ..ForecastSettings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_daily_interest_rate() {
        let terms = DelinquencyTerms::default();
        assert_eq!(terms.daily_interest_rate(), dec!(0.01) / dec!(30));
    }
}
