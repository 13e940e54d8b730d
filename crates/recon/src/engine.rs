use crate::assemble::{assemble, Side};
use crate::config::MatchPolicy;
use crate::error::{EmptySide, ReconError};
use crate::matcher::match_movements;
use crate::model::{NormalizedMovement, RawMovement, Reconciliation};
use crate::normalize::normalize_movement;

/// Reconcile a statement extract against accounting records.
///
/// Per-record normalization failures are absorbed: those records end up as
/// one-sided Unmatched rows with a note. Only an empty input list, an invalid
/// policy or a broken internal invariant fails the run.
pub fn reconcile(
    statement: &[RawMovement],
    accounting: &[RawMovement],
    policy: &MatchPolicy,
) -> Result<Reconciliation, ReconError> {
    let side = match (statement.is_empty(), accounting.is_empty()) {
        (true, true) => Some(EmptySide::Both),
        (true, false) => Some(EmptySide::Statement),
        (false, true) => Some(EmptySide::Accounting),
        (false, false) => None,
    };
    if let Some(side) = side {
        return Err(ReconError::EmptyInput { side });
    }
    policy.validate()?;

    let statement_norm = normalize_all(statement);
    let accounting_norm = normalize_all(accounting);

    let output = match_movements(&statement_norm, &accounting_norm, policy);

    let result = assemble(
        Side { raw: statement, normalized: &statement_norm },
        Side { raw: accounting, normalized: &accounting_norm },
        &output,
    )?;

    let s = &result.summary;
    log::info!(
        "reconciled {} statement / {} accounting records: {} matched, {} probable, {} statement-only, {} accounting-only",
        s.statement_total,
        s.accounting_total,
        s.matched,
        s.probable,
        s.statement_only,
        s.accounting_only,
    );

    Ok(result)
}

/// `reconcile` with the default thresholds (same day ≥ 90, ±3 days ≥ 70).
pub fn reconcile_default(
    statement: &[RawMovement],
    accounting: &[RawMovement],
) -> Result<Reconciliation, ReconError> {
    reconcile(statement, accounting, &MatchPolicy::default())
}

fn normalize_all(raw: &[RawMovement]) -> Vec<NormalizedMovement> {
    raw.iter()
        .enumerate()
        .map(|(i, r)| normalize_movement(i, r))
        .collect()
}
