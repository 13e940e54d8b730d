use serde::Deserialize;

use crate::error::ReconError;

/// Upper bound on the probable-tier date window.
pub const MAX_DATE_WINDOW_DAYS: u32 = 31;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ReconConfig {
    pub name: String,
    pub statement: SourceConfig,
    pub accounting: SourceConfig,
    #[serde(default)]
    pub policy: MatchPolicy,
    #[serde(default)]
    pub output: OutputConfig,
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// Where one side's records come from and which columns hold which field.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    pub file: String,
    /// Worksheet name for spreadsheet sources. First sheet when absent.
    #[serde(default)]
    pub sheet: Option<String>,
    pub columns: ColumnMapping,
}

/// Explicit header names. Matching is case-insensitive on trimmed headers.
///
/// Either `amount` or at least one of `credit` / `debit` must be mapped. With a
/// credit/debit split the first non-empty cell wins; sign is irrelevant because
/// amounts are compared by magnitude.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnMapping {
    pub date: String,
    pub description: String,
    #[serde(default)]
    pub amount: Option<String>,
    #[serde(default)]
    pub credit: Option<String>,
    #[serde(default)]
    pub debit: Option<String>,
}

// ---------------------------------------------------------------------------
// Policy + Output
// ---------------------------------------------------------------------------

/// Tier thresholds.
///
/// Matched: same day and `score >= matched_min_score`.
/// Probable: within `date_window_days` and `score >= probable_min_score`, not Matched.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MatchPolicy {
    pub date_window_days: u32,
    pub matched_min_score: u8,
    pub probable_min_score: u8,
}

impl Default for MatchPolicy {
    fn default() -> Self {
        Self {
            date_window_days: 3,
            matched_min_score: 90,
            probable_min_score: 70,
        }
    }
}

impl MatchPolicy {
    pub fn validate(&self) -> Result<(), ReconError> {
        if self.matched_min_score > 100 {
            return Err(ReconError::ConfigValidation(format!(
                "matched_min_score must be <= 100, got {}",
                self.matched_min_score
            )));
        }
        if self.probable_min_score > self.matched_min_score {
            return Err(ReconError::ConfigValidation(format!(
                "probable_min_score ({}) must not exceed matched_min_score ({})",
                self.probable_min_score, self.matched_min_score
            )));
        }
        if self.date_window_days > MAX_DATE_WINDOW_DAYS {
            return Err(ReconError::ConfigValidation(format!(
                "date_window_days must be <= {MAX_DATE_WINDOW_DAYS}, got {}",
                self.date_window_days
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory for spreadsheet exports. Relative paths resolve against the config file.
    pub dir: String,
    /// File name prefix; a `_YYYYMMDD_HHMMSS.xlsx` suffix is appended.
    pub prefix: String,
    pub json: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: "outputs".into(),
            prefix: "conciliacion".into(),
            json: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        validate_source("statement", &self.statement)?;
        validate_source("accounting", &self.accounting)?;
        self.policy.validate()?;

        if self.output.prefix.trim().is_empty() {
            return Err(ReconError::ConfigValidation("output.prefix must not be empty".into()));
        }
        Ok(())
    }
}

fn validate_source(side: &str, source: &SourceConfig) -> Result<(), ReconError> {
    if source.file.trim().is_empty() {
        return Err(ReconError::ConfigValidation(format!("{side}: file must not be empty")));
    }
    let cols = &source.columns;
    if cols.date.trim().is_empty() || cols.description.trim().is_empty() {
        return Err(ReconError::ConfigValidation(format!(
            "{side}: date and description columns must be named"
        )));
    }
    if cols.amount.is_none() && cols.credit.is_none() && cols.debit.is_none() {
        return Err(ReconError::ConfigValidation(format!(
            "{side}: map either an amount column or credit/debit columns"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"
name = "Santander January"

[statement]
file = "extracto.xlsx"
sheet = "Movimientos"

[statement.columns]
date        = "Fecha"
description = "Concepto"
amount      = "Importe"

[accounting]
file = "contable.csv"

[accounting.columns]
date        = "fecha_contable"
description = "concepto"
credit      = "haber"
debit       = "debe"
"#;

    #[test]
    fn parse_valid_with_defaults() {
        let config = ReconConfig::from_toml(VALID).unwrap();
        assert_eq!(config.name, "Santander January");
        assert_eq!(config.statement.sheet.as_deref(), Some("Movimientos"));
        assert_eq!(config.statement.columns.amount.as_deref(), Some("Importe"));
        assert!(config.accounting.sheet.is_none());
        assert_eq!(config.accounting.columns.credit.as_deref(), Some("haber"));
        assert_eq!(config.policy, MatchPolicy::default());
        assert_eq!(config.output.dir, "outputs");
        assert_eq!(config.output.prefix, "conciliacion");
        assert!(config.output.json.is_none());
    }

    #[test]
    fn parse_policy_partial_override() {
        let input = format!(
            r#"{VALID}
[policy]
date_window_days = 5
"#
        );
        let config = ReconConfig::from_toml(&input).unwrap();
        assert_eq!(config.policy.date_window_days, 5);
        assert_eq!(config.policy.matched_min_score, 90);
        assert_eq!(config.policy.probable_min_score, 70);
    }

    #[test]
    fn reject_inverted_thresholds() {
        let input = format!(
            r#"{VALID}
[policy]
matched_min_score = 60
probable_min_score = 70
"#
        );
        let err = ReconConfig::from_toml(&input).unwrap_err();
        assert!(err.to_string().contains("must not exceed"));
    }

    #[test]
    fn reject_policy_typo() {
        let input = format!(
            r#"{VALID}
[policy]
date_window = 5
"#
        );
        let err = ReconConfig::from_toml(&input).unwrap_err();
        assert!(matches!(err, ReconError::ConfigParse(_)));
    }

    #[test]
    fn reject_missing_amount_mapping() {
        let input = r#"
name = "Bad"

[statement]
file = "a.csv"
[statement.columns]
date = "fecha"
description = "concepto"

[accounting]
file = "b.csv"
[accounting.columns]
date = "fecha"
description = "concepto"
amount = "monto"
"#;
        let err = ReconConfig::from_toml(input).unwrap_err();
        assert!(err.to_string().contains("statement"));
        assert!(err.to_string().contains("amount"));
    }

    #[test]
    fn reject_wide_window() {
        let policy = MatchPolicy { date_window_days: 90, ..MatchPolicy::default() };
        assert!(policy.validate().is_err());
    }
}
