use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::FieldNormalizationFailure;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One side's movement as extracted from its source, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMovement {
    pub date_text: String,
    pub description_text: String,
    pub amount_text: String,
}

impl RawMovement {
    pub fn new(
        date_text: impl Into<String>,
        description_text: impl Into<String>,
        amount_text: impl Into<String>,
    ) -> Self {
        Self {
            date_text: date_text.into(),
            description_text: description_text.into(),
            amount_text: amount_text.into(),
        }
    }
}

/// Canonical form of a `RawMovement`. Built once per record, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedMovement {
    /// Position of the source record in its input list.
    pub index: usize,
    pub date: Option<NaiveDate>,
    pub description: String,
    /// Magnitude rounded to 2 dp. Sign is discarded.
    pub amount: Option<Decimal>,
    pub issues: Vec<FieldNormalizationFailure>,
}

impl NormalizedMovement {
    /// Date and amount, when both normalized. The only fields candidates are keyed on.
    pub fn match_key(&self) -> Option<(NaiveDate, Decimal)> {
        Some((self.date?, self.amount?))
    }

    /// Only records with both a date and an amount can become match candidates.
    pub fn is_matchable(&self) -> bool {
        self.match_key().is_some()
    }
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

/// Provisional statement ↔ accounting pairing. Indices point into the
/// normalized input slices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchCandidate {
    pub statement: usize,
    pub accounting: usize,
    pub day_offset: u32,
    pub score: u8,
}

/// A committed pairing with its tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pairing {
    pub statement: usize,
    pub accounting: usize,
    pub status: MatchStatus,
    pub day_offset: u32,
    pub score: u8,
}

#[derive(Debug, Default)]
pub struct MatchOutput {
    pub pairs: Vec<Pairing>,
    pub statement_only: Vec<usize>,
    pub accounting_only: Vec<usize>,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Matched,
    Probable,
    Unmatched,
}

impl std::fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Matched => write!(f, "matched"),
            Self::Probable => write!(f, "probable"),
            Self::Unmatched => write!(f, "unmatched"),
        }
    }
}

/// Presentation of one side of a row. Normalized values where they exist,
/// the raw text otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MovementView {
    pub index: usize,
    pub date: String,
    pub description: String,
    pub amount: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciliationRow {
    pub statement: Option<MovementView>,
    pub accounting: Option<MovementView>,
    pub status: MatchStatus,
    pub observation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_offset: Option<u32>,
}

impl ReconciliationRow {
    pub const COLUMNS: [&'static str; 8] = [
        "statement_date",
        "statement_description",
        "statement_amount",
        "accounting_date",
        "accounting_description",
        "accounting_amount",
        "status",
        "observation",
    ];

    /// Flatten into the fixed export column order (see `COLUMNS`).
    /// A missing side yields three empty cells.
    pub fn cells(&self) -> [String; 8] {
        let side = |v: &Option<MovementView>| match v {
            Some(v) => (v.date.clone(), v.description.clone(), v.amount.clone()),
            None => (String::new(), String::new(), String::new()),
        };
        let (sd, sdesc, sa) = side(&self.statement);
        let (ad, adesc, aa) = side(&self.accounting);
        [sd, sdesc, sa, ad, adesc, aa, self.status.to_string(), self.observation.clone()]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconSummary {
    pub statement_total: usize,
    pub accounting_total: usize,
    pub matched: usize,
    pub probable: usize,
    pub statement_only: usize,
    pub accounting_only: usize,
}

impl ReconSummary {
    pub fn unmatched(&self) -> usize {
        self.statement_only + self.accounting_only
    }

    /// True when every record on both sides was paired (matched or probable).
    pub fn is_fully_reconciled(&self) -> bool {
        self.unmatched() == 0
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Reconciliation {
    pub summary: ReconSummary,
    pub rows: Vec<ReconciliationRow>,
}
