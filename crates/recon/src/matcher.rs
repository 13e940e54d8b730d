use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::classify::{partition_tiers, Tiers};
use crate::config::MatchPolicy;
use crate::model::{MatchCandidate, MatchOutput, MatchStatus, NormalizedMovement, Pairing};
use crate::similarity::score;

/// Every (statement, accounting) pair with both dates and amounts present, equal
/// amounts, and dates within `policy.date_window_days`. Indices are slice positions.
pub fn build_candidates(
    statement: &[NormalizedMovement],
    accounting: &[NormalizedMovement],
    policy: &MatchPolicy,
) -> Vec<MatchCandidate> {
    // Accounting positions by amount; only equal amounts are ever compared.
    let mut by_amount: BTreeMap<Decimal, Vec<(usize, NaiveDate)>> = BTreeMap::new();
    for (ai, a) in accounting.iter().enumerate() {
        if let Some((date, amount)) = a.match_key() {
            by_amount.entry(amount).or_default().push((ai, date));
        }
    }

    let mut candidates = Vec::new();
    for (si, s) in statement.iter().enumerate() {
        let Some((s_date, amount)) = s.match_key() else {
            continue;
        };
        let Some(same_amount) = by_amount.get(&amount) else {
            continue;
        };
        for &(ai, a_date) in same_amount {
            let a = &accounting[ai];
            let day_offset = (s_date - a_date).num_days().unsigned_abs();
            if day_offset > u64::from(policy.date_window_days) {
                continue;
            }
            candidates.push(MatchCandidate {
                statement: si,
                accounting: ai,
                day_offset: day_offset as u32,
                score: score(&s.description, &a.description),
            });
        }
    }
    candidates
}

/// Greedy one-to-one commit over tiers, Matched before Probable.
///
/// A candidate is committed only if neither of its records is already taken; a
/// commit removes both records from every later tier.
pub fn commit_tiers(tiers: &Tiers, statement_len: usize, accounting_len: usize) -> MatchOutput {
    let mut statement_used = vec![false; statement_len];
    let mut accounting_used = vec![false; accounting_len];
    let mut pairs = Vec::new();

    for (status, tier) in [
        (MatchStatus::Matched, &tiers.matched),
        (MatchStatus::Probable, &tiers.probable),
    ] {
        let before = pairs.len();
        for c in tier {
            if statement_used[c.statement] || accounting_used[c.accounting] {
                continue;
            }
            statement_used[c.statement] = true;
            accounting_used[c.accounting] = true;
            pairs.push(Pairing {
                statement: c.statement,
                accounting: c.accounting,
                status,
                day_offset: c.day_offset,
                score: c.score,
            });
        }
        log::debug!(
            "{status} tier: {} candidate(s), {} committed",
            tier.len(),
            pairs.len() - before
        );
    }

    let statement_only = unused(&statement_used);
    let accounting_only = unused(&accounting_used);

    MatchOutput {
        pairs,
        statement_only,
        accounting_only,
    }
}

/// Candidate generation, tiering and greedy commit in one step.
pub fn match_movements(
    statement: &[NormalizedMovement],
    accounting: &[NormalizedMovement],
    policy: &MatchPolicy,
) -> MatchOutput {
    let excluded = statement
        .iter()
        .chain(accounting)
        .filter(|m| !m.is_matchable())
        .count();
    if excluded > 0 {
        log::debug!("{excluded} record(s) without a usable date or amount excluded from matching");
    }

    let candidates = build_candidates(statement, accounting, policy);
    log::debug!(
        "{} candidate pair(s) from {}x{} records",
        candidates.len(),
        statement.len(),
        accounting.len()
    );
    let tiers = partition_tiers(candidates, policy);
    commit_tiers(&tiers, statement.len(), accounting.len())
}

fn unused(used: &[bool]) -> Vec<usize> {
    used.iter()
        .enumerate()
        .filter(|(_, u)| !**u)
        .map(|(i, _)| i)
        .collect()
}
