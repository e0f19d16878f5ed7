// Core algorithm exports
pub mod filters;
pub mod labels;
pub mod lifecycle;
pub mod matcher;
pub mod scoring;

pub use filters::{is_eligible, matched_user_ids, passes_threshold};
pub use labels::{format_days, format_goal, format_level, format_style, format_time_slots};
pub use lifecycle::{ensure_no_existing_match, pair_key, MatchError, MatchResponse};
pub use matcher::{rank, MatchResult, Matcher};
pub use scoring::{calculate_compatibility, evaluate, match_reason};
