//! `conciliar-recon`: bank statement vs accounting ledger reconciliation engine.
//!
//! Pure engine crate: receives already-extracted raw movements, returns classified
//! rows plus a summary. No file, spreadsheet or network dependencies.

pub mod assemble;
pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod matcher;
pub mod model;
pub mod normalize;
pub mod similarity;

pub use config::{MatchPolicy, ReconConfig};
pub use engine::{reconcile, reconcile_default};
pub use error::{EmptySide, FieldNormalizationFailure, ReconError};
pub use model::{
    MatchStatus, MovementView, NormalizedMovement, RawMovement, Reconciliation, ReconciliationRow,
    ReconSummary,
};
