use crate::core::{
    filters::{is_eligible, passes_threshold},
    scoring::{evaluate, match_reason},
};
use crate::models::{FitnessAttributes, FitnessProfile, MatchingRules, ScoredCandidate};
use std::collections::HashSet;

/// Result of the matching process
#[derive(Debug)]
pub struct MatchResult {
    pub matches: Vec<ScoredCandidate>,
    pub total_candidates: usize,
    pub scored_candidates: usize,
}

/// Main matching orchestrator
///
/// # Pipeline Stages
/// 1. Exclusion of the user and anyone they already share a match with
/// 2. Completeness check
/// 3. Compatibility scoring
/// 4. Score threshold
/// 5. Ranking
#[derive(Debug, Clone)]
pub struct Matcher {
    rules: MatchingRules,
}

impl Matcher {
    pub fn new(rules: MatchingRules) -> Self {
        Self { rules }
    }

    pub fn with_default_rules() -> Self {
        Self {
            rules: MatchingRules::default(),
        }
    }

    pub fn rules(&self) -> &MatchingRules {
        &self.rules
    }

    /// Find compatible gym buddies for a user
    ///
    /// # Arguments
    /// * `user_id` - The user the list is built for
    /// * `me` - That user's fitness attributes
    /// * `candidates` - Profiles fetched from the store
    /// * `excluded` - Users already in a match record with `user_id`
    /// * `limit` - `None` keeps every qualifying candidate, `Some(n)` the top n
    pub fn find_matches(
        &self,
        user_id: &str,
        me: &FitnessAttributes,
        candidates: Vec<FitnessProfile>,
        excluded: &HashSet<String>,
        limit: Option<usize>,
    ) -> MatchResult {
        let total_candidates = candidates.len();
        let mut scored_candidates = 0;

        let qualifying: Vec<ScoredCandidate> = candidates
            .into_iter()
            // Stages 1 & 2: exclusion and completeness
            .filter(|profile| is_eligible(user_id, profile, excluded))
            // Stages 3 & 4: score and threshold
            .filter_map(|profile| {
                scored_candidates += 1;
                let compatibility = evaluate(me, &profile.attributes);

                if !passes_threshold(compatibility.score, self.rules.min_score) {
                    return None;
                }

                Some(ScoredCandidate {
                    user_id: profile.user_id,
                    display_name: profile.display_name,
                    match_reasons: compatibility.criteria.iter().map(match_reason).collect(),
                    attributes: profile.attributes,
                    compatibility_score: compatibility.score,
                    criteria: compatibility.criteria,
                })
            })
            .collect();

        // Stage 5: ranking
        let limit = limit.unwrap_or(qualifying.len());
        let matches = rank(&qualifying, limit);

        MatchResult {
            matches,
            total_candidates,
            scored_candidates,
        }
    }

    /// Top matches using the configured default limit
    pub fn top_matches(
        &self,
        user_id: &str,
        me: &FitnessAttributes,
        candidates: Vec<FitnessProfile>,
        excluded: &HashSet<String>,
    ) -> MatchResult {
        self.find_matches(
            user_id,
            me,
            candidates,
            excluded,
            Some(self.rules.default_limit),
        )
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_default_rules()
    }
}

/// Order candidates by compatibility score, highest first, and keep `limit`.
///
/// The sort is stable so equal scores keep their input order. The input is
/// left untouched.
pub fn rank(candidates: &[ScoredCandidate], limit: usize) -> Vec<ScoredCandidate> {
    let mut ranked = candidates.to_vec();
    ranked.sort_by(|a, b| b.compatibility_score.total_cmp(&a.compatibility_score));
    ranked.truncate(limit);
    ranked
}
