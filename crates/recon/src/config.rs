use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

pub const DEFAULT_PRIMARY: &str = "ddh_database.xlsx";
pub const DEFAULT_SECONDARY: &str = "IET_Database.xlsx";
pub const DEFAULT_OUTPUT: &str = "ddh_database_updated.xlsx";
pub const DEFAULT_KEY_COLUMN: &str = "Co_No";
pub const DEFAULT_MASTER_COLUMN: &str = "MasterNo";
pub const DEFAULT_IMPUTE_COLUMN: &str = "Scan Type";
pub const DEFAULT_IMPUTE_VALUE: &str = "Hyperspectral VNIR-LWIR";

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Everything the validation run needs, explicit instead of baked-in paths.
///
/// Every field has a default, so an empty TOML document is a valid config
/// that reproduces the stock `ddh_database.xlsx` / `IET_Database.xlsx` run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidateConfig {
    /// Authoritative table, mutated and written to `output`.
    pub primary: PathBuf,
    /// Read-only source of corrections.
    pub secondary: PathBuf,
    pub output: PathBuf,
    /// Column whose values are canonicalized in both tables (fuzzy match).
    pub key_column: String,
    /// Join key for synchronization and uniqueness key for deduplication.
    pub master_column: String,
    /// Column whose missing cells are filled with `impute_value`.
    pub impute_column: String,
    pub impute_value: String,
    /// Extra shared columns never overwritten from the secondary table.
    pub exclude: Vec<String>,
}

impl Default for ValidateConfig {
    fn default() -> Self {
        Self {
            primary: PathBuf::from(DEFAULT_PRIMARY),
            secondary: PathBuf::from(DEFAULT_SECONDARY),
            output: PathBuf::from(DEFAULT_OUTPUT),
            key_column: DEFAULT_KEY_COLUMN.to_string(),
            master_column: DEFAULT_MASTER_COLUMN.to_string(),
            impute_column: DEFAULT_IMPUTE_COLUMN.to_string(),
            impute_value: DEFAULT_IMPUTE_VALUE.to_string(),
            exclude: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ValidateConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ValidateConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        for (field, value) in [
            ("key_column", &self.key_column),
            ("master_column", &self.master_column),
            ("impute_column", &self.impute_column),
        ] {
            if value.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!("{field} must not be empty")));
            }
        }

        if self.output.extension().is_none() {
            return Err(ReconError::ConfigValidation(format!(
                "output '{}' needs a file extension (.xlsx or .csv)",
                self.output.display()
            )));
        }

        if self.output == self.secondary {
            return Err(ReconError::ConfigValidation(
                "output must not overwrite the secondary table".into(),
            ));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_stock_run() {
        let config = ValidateConfig::from_toml("").unwrap();
        assert_eq!(config, ValidateConfig::default());
        assert_eq!(config.primary, PathBuf::from("ddh_database.xlsx"));
        assert_eq!(config.impute_value, "Hyperspectral VNIR-LWIR");
        assert!(config.exclude.is_empty());
    }

    #[test]
    fn parse_overrides() {
        let input = r#"
primary = "in/ddh.csv"
secondary = "in/iet.csv"
output = "out/ddh_updated.csv"
master_column = "Master_No"
impute_value = "VNIR"
exclude = ["Comments", "Logged By"]
"#;
        let config = ValidateConfig::from_toml(input).unwrap();
        assert_eq!(config.primary, PathBuf::from("in/ddh.csv"));
        assert_eq!(config.master_column, "Master_No");
        assert_eq!(config.key_column, "Co_No");
        assert_eq!(config.impute_value, "VNIR");
        assert_eq!(config.exclude, vec!["Comments", "Logged By"]);
    }

    #[test]
    fn reject_unknown_field() {
        let err = ValidateConfig::from_toml("primry = \"x.xlsx\"").unwrap_err();
        assert!(matches!(err, ReconError::ConfigParse(_)));
    }

    #[test]
    fn reject_blank_column_name() {
        let err = ValidateConfig::from_toml("master_column = \"  \"").unwrap_err();
        assert!(err.to_string().contains("master_column must not be empty"));
    }

    #[test]
    fn reject_output_without_extension() {
        let err = ValidateConfig::from_toml("output = \"ddh_updated\"").unwrap_err();
        assert!(err.to_string().contains("needs a file extension"));
    }

    #[test]
    fn reject_output_over_secondary() {
        let input = "secondary = \"iet.xlsx\"\noutput = \"iet.xlsx\"";
        let err = ValidateConfig::from_toml(input).unwrap_err();
        assert!(err.to_string().contains("secondary"));
    }
}
