use crate::config::MatchPolicy;
use crate::model::{MatchCandidate, MatchStatus};

/// Candidates split by tier. Each list is in commit order.
#[derive(Debug, Default)]
pub struct Tiers {
    pub matched: Vec<MatchCandidate>,
    pub probable: Vec<MatchCandidate>,
}

/// Tier a single candidate falls in, or `None` if it is not good enough to pair.
///
/// - Matched: same day and `score >= matched_min_score`.
/// - Probable: within the date window and `score >= probable_min_score`, not Matched.
pub fn tier_for(candidate: &MatchCandidate, policy: &MatchPolicy) -> Option<MatchStatus> {
    if candidate.day_offset > policy.date_window_days {
        return None;
    }
    if candidate.day_offset == 0 && candidate.score >= policy.matched_min_score {
        Some(MatchStatus::Matched)
    } else if candidate.score >= policy.probable_min_score {
        Some(MatchStatus::Probable)
    } else {
        None
    }
}

/// Commit priority: higher score first, then smaller day offset, then input order
/// (statement, then accounting). Total order, so the greedy pass is deterministic.
pub fn priority_key(c: &MatchCandidate) -> (std::cmp::Reverse<u8>, u32, usize, usize) {
    (std::cmp::Reverse(c.score), c.day_offset, c.statement, c.accounting)
}

/// Partition candidates into tiers, dropping the ones below every threshold, and
/// sort each tier by `priority_key`.
pub fn partition_tiers(candidates: Vec<MatchCandidate>, policy: &MatchPolicy) -> Tiers {
    let mut tiers = Tiers::default();
    for c in candidates {
        match tier_for(&c, policy) {
            Some(MatchStatus::Matched) => tiers.matched.push(c),
            Some(MatchStatus::Probable) => tiers.probable.push(c),
            Some(MatchStatus::Unmatched) | None => {}
        }
    }
    tiers.matched.sort_by_key(priority_key);
    tiers.probable.sort_by_key(priority_key);
    tiers
}
