use rental_finance_core::EngineConfig;

use super::file;

/// Load the engine configuration from a TOML file, or fall back to defaults.
///
/// Sections missing from the file keep their default values. The merged
/// configuration is validated before any command runs.
pub fn load_config(path: Option<&str>) -> Result<EngineConfig, Box<dyn std::error::Error>> {
    let config = match path {
        Some(path) => {
            let config: EngineConfig = file::read_toml(path)?;
            tracing::info!(path, table = %config.tax_table.name, "engine configuration loaded");
            config
        }
        None => {
            tracing::debug!("no configuration file given; using defaults");
            EngineConfig::default()
        }
    };
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rental_finance_core::config::ForecastPolicy;
    use rust_decimal_macros::dec;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults_without_path() {
        let config = load_config(None).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_partial_toml_overrides() {
        let file = write_config(
            r#"
vacancy_alert_threshold = 25

[delinquency]
penalty_rate = "0.02"

[forecast]
horizon = 6
policy = "legacy"
"#,
        );
        let config = load_config(file.path().to_str()).unwrap();
        assert_eq!(config.vacancy_alert_threshold, dec!(25));
        assert_eq!(config.delinquency.penalty_rate, dec!(0.02));
        assert_eq!(config.delinquency.monthly_interest_rate, dec!(0.01));
        assert_eq!(config.forecast.horizon, 6);
        assert_eq!(config.forecast.policy, ForecastPolicy::Legacy);
        assert_eq!(config.tax_table.brackets.len(), 5);
    }

    #[test]
    fn test_tax_table_from_toml() {
        let file = write_config(
            r#"
[tax_table]
name = "IRPF 2025"
dependent_deduction = "189.59"

[[tax_table.brackets]]
upper_bound = "2428.80"
rate = "0"

[[tax_table.brackets]]
rate = "0.275"
deduction = "667.92"
"#,
        );
        let config = load_config(file.path().to_str()).unwrap();
        assert_eq!(config.tax_table.name, "IRPF 2025");
        assert_eq!(config.tax_table.brackets.len(), 2);
        assert_eq!(config.tax_table.brackets[1].upper_bound, None);
        assert_eq!(config.tax_table.dependent_deduction, dec!(189.59));
    }

    #[test]
    fn test_invalid_table_rejected() {
        let file = write_config(
            r#"
[[tax_table.brackets]]
upper_bound = "1000"
rate = "0.1"
"#,
        );
        let err = load_config(file.path().to_str()).unwrap_err();
        assert!(err.to_string().contains("no upper bound"));
    }
}
