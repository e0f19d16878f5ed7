use crate::models::{FitnessProfile, MatchRecord};
use std::collections::HashSet;

/// Collect every user that already shares a match record with `user_id`,
/// regardless of direction or status.
pub fn matched_user_ids(user_id: &str, records: &[MatchRecord]) -> HashSet<String> {
    records
        .iter()
        .filter(|r| r.involves(user_id))
        .map(|r| r.other_party(user_id).to_string())
        .collect()
}

/// Check whether a candidate may be scored at all.
///
/// Drops the user themself, anyone in `excluded` and incomplete profiles.
#[inline]
pub fn is_eligible(
    user_id: &str,
    candidate: &FitnessProfile,
    excluded: &HashSet<String>,
) -> bool {
    candidate.user_id != user_id
        && !excluded.contains(&candidate.user_id)
        && candidate.attributes.is_complete()
}

/// Scores at or below the threshold never reach the match list
#[inline]
pub fn passes_threshold(score: f64, min_score: f64) -> bool {
    score > min_score
}
