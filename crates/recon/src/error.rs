use std::fmt;

use serde::Serialize;

/// Which input list was empty when a run was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptySide {
    Statement,
    Accounting,
    Both,
}

impl fmt::Display for EmptySide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Statement => write!(f, "statement"),
            Self::Accounting => write!(f, "accounting"),
            Self::Both => write!(f, "statement and accounting"),
        }
    }
}

/// Batch-level failure. Any of these aborts the run; no partial result is returned.
#[derive(Debug)]
pub enum ReconError {
    /// One or both input record lists were empty.
    EmptyInput { side: EmptySide },
    /// Internal invariant broken while matching or assembling rows.
    UnexpectedProcessing(String),
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (bad thresholds, missing column mapping, etc.).
    ConfigValidation(String),
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyInput { side: EmptySide::Both } => {
                write!(f, "empty input: both statement and accounting record lists are empty")
            }
            Self::EmptyInput { side } => {
                write!(f, "empty input: the {side} record list is empty")
            }
            Self::UnexpectedProcessing(msg) => write!(f, "unexpected processing error: {msg}"),
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
        }
    }
}

impl std::error::Error for ReconError {}

/// Per-record, per-field normalization failure.
///
/// Never fatal: the record is kept, excluded from matching, and the failure is
/// surfaced in its row observation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum FieldNormalizationFailure {
    UnparseableDate(String),
    UnparseableAmount(String),
}

impl fmt::Display for FieldNormalizationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnparseableDate(raw) if raw.trim().is_empty() => write!(f, "missing date"),
            Self::UnparseableAmount(raw) if raw.trim().is_empty() => write!(f, "missing amount"),
            Self::UnparseableDate(raw) => write!(f, "unparseable date '{raw}'"),
            Self::UnparseableAmount(raw) => write!(f, "unparseable amount '{raw}'"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_names_the_side() {
        let err = ReconError::EmptyInput { side: EmptySide::Accounting };
        assert_eq!(err.to_string(), "empty input: the accounting record list is empty");

        let err = ReconError::EmptyInput { side: EmptySide::Both };
        assert!(err.to_string().contains("both"));
    }

    #[test]
    fn failure_display_quotes_raw_value() {
        let f = FieldNormalizationFailure::UnparseableAmount("abc".into());
        assert_eq!(f.to_string(), "unparseable amount 'abc'");
        assert_eq!(FieldNormalizationFailure::UnparseableDate("  ".into()).to_string(), "missing date");
    }
}
