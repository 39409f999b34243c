use std::path::PathBuf;

use crate::error::EmissionsError;
use crate::schema::tables;

pub const ENV_DATA_DIR: &str = "EMISSIONS_DATA_DIR";
pub const ENV_OUTPUT_FILE: &str = "EMISSIONS_OUTPUT_FILE";
pub const ENV_OPERATIONS_TABLE: &str = "EMISSIONS_OPERATIONS_TABLE";
pub const ENV_CURRENT_YEAR: &str = "EMISSIONS_CURRENT_YEAR";

/// Settings of one calculation run.
#[derive(Debug, Clone, PartialEq)]
pub struct CalculatorConfig {
    /// Directory of input CSV files.
    pub data_dir: PathBuf,
    /// Where the emission table is written.
    pub output_file: PathBuf,
    /// Table key (CSV file stem) of the operation records.
    pub operations_table: String,
    /// Overrides the calendar year used for current-year fuel factors.
    pub current_year: Option<i32>,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data/raw"),
            output_file: PathBuf::from("data/outputs/annual_emissions.csv"),
            operations_table: tables::OPERATION_DATA.to_string(),
            current_year: None,
        }
    }
}

impl CalculatorConfig {
    /// Defaults overridden by `EMISSIONS_*` environment variables.
    pub fn from_env() -> Result<Self, EmissionsError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self, EmissionsError> {
        let mut config = Self::default();
        if let Some(dir) = var(ENV_DATA_DIR) {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(file) = var(ENV_OUTPUT_FILE) {
            config.output_file = PathBuf::from(file);
        }
        if let Some(table) = var(ENV_OPERATIONS_TABLE) {
            config.operations_table = table;
        }
        config.current_year = parse_year(var(ENV_CURRENT_YEAR))?;
        Ok(config)
    }
}

fn parse_year(raw: Option<String>) -> Result<Option<i32>, EmissionsError> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse::<i32>().map(Some).map_err(|e| {
            EmissionsError::Config(format!("invalid {ENV_CURRENT_YEAR} '{value}': {e}"))
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let config = CalculatorConfig::from_lookup(env(&[])).unwrap();
        assert_eq!(config, CalculatorConfig::default());
    }

    #[test]
    fn environment_overrides() {
        let config = CalculatorConfig::from_lookup(env(&[
            (ENV_DATA_DIR, "/srv/raw"),
            (ENV_OPERATIONS_TABLE, "operation_data_test_2"),
            (ENV_CURRENT_YEAR, "2024"),
        ]))
        .unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/srv/raw"));
        assert_eq!(config.operations_table, "operation_data_test_2");
        assert_eq!(config.current_year, Some(2024));
    }

    #[test]
    fn invalid_year_is_rejected() {
        let err = CalculatorConfig::from_lookup(env(&[(ENV_CURRENT_YEAR, "next")])).unwrap_err();
        assert!(matches!(err, EmissionsError::Config(_)));
    }
}
