use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Self-reported training experience
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitnessLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl FitnessLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            FitnessLevel::Beginner => "beginner",
            FitnessLevel::Intermediate => "intermediate",
            FitnessLevel::Advanced => "advanced",
        }
    }
}

/// Primary training goal
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitnessGoal {
    Bulking,
    Cutting,
    Maintenance,
    Endurance,
    Flexibility,
    General,
}

impl FitnessGoal {
    pub fn as_str(&self) -> &'static str {
        match self {
            FitnessGoal::Bulking => "bulking",
            FitnessGoal::Cutting => "cutting",
            FitnessGoal::Maintenance => "maintenance",
            FitnessGoal::Endurance => "endurance",
            FitnessGoal::Flexibility => "flexibility",
            FitnessGoal::General => "general",
        }
    }
}

/// Time-of-day bucket a user prefers to train in
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeSlot {
    EarlyMorning,
    Morning,
    Midday,
    Afternoon,
    Evening,
    Night,
}

impl TimeSlot {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeSlot::EarlyMorning => "early_morning",
            TimeSlot::Morning => "morning",
            TimeSlot::Midday => "midday",
            TimeSlot::Afternoon => "afternoon",
            TimeSlot::Evening => "evening",
            TimeSlot::Night => "night",
        }
    }
}

/// Day of the week, stored as a short tag ("mon", "tue", ...)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    #[serde(alias = "monday")]
    Mon,
    #[serde(alias = "tuesday")]
    Tue,
    #[serde(alias = "wednesday")]
    Wed,
    #[serde(alias = "thursday")]
    Thu,
    #[serde(alias = "friday")]
    Fri,
    #[serde(alias = "saturday")]
    Sat,
    #[serde(alias = "sunday")]
    Sun,
}

impl Weekday {
    pub fn as_str(&self) -> &'static str {
        match self {
            Weekday::Mon => "mon",
            Weekday::Tue => "tue",
            Weekday::Wed => "wed",
            Weekday::Thu => "thu",
            Weekday::Fri => "fri",
            Weekday::Sat => "sat",
            Weekday::Sun => "sun",
        }
    }
}

/// Fitness attributes a user declares about themselves.
///
/// `level` and `goal` are optional because rows written by an unfinished
/// onboarding flow may lack them. Such profiles are incomplete and never
/// reach the scorer through the matching pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FitnessAttributes {
    #[serde(default)]
    pub level: Option<FitnessLevel>,
    #[serde(default)]
    pub styles: BTreeSet<String>,
    #[serde(default)]
    pub goal: Option<FitnessGoal>,
    #[serde(default)]
    pub preferred_time_slots: BTreeSet<TimeSlot>,
    #[serde(default)]
    pub availability_days: BTreeSet<Weekday>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub gym_name: Option<String>,
}

impl FitnessAttributes {
    /// A profile is complete once it has a level, a goal and at least one style
    pub fn is_complete(&self) -> bool {
        self.level.is_some() && self.goal.is_some() && !self.styles.is_empty()
    }
}

/// Persisted fitness profile row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FitnessProfile {
    pub user_id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(flatten)]
    pub attributes: FitnessAttributes,
}

/// Scoring criteria in evaluation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    Goal,
    Styles,
    TimeSlots,
    Gym,
    Location,
    Level,
    Availability,
}

/// What a triggered criterion found in common. Each variant belongs to
/// exactly one `Criterion`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "criterion", content = "value", rename_all = "snake_case")]
pub enum CriterionDetail {
    Goal(FitnessGoal),
    Styles(Vec<String>),
    TimeSlots(usize),
    Gym,
    Location,
    Level(FitnessLevel),
    Availability(usize),
}

impl CriterionDetail {
    pub fn criterion(&self) -> Criterion {
        match self {
            CriterionDetail::Goal(_) => Criterion::Goal,
            CriterionDetail::Styles(_) => Criterion::Styles,
            CriterionDetail::TimeSlots(_) => Criterion::TimeSlots,
            CriterionDetail::Gym => Criterion::Gym,
            CriterionDetail::Location => Criterion::Location,
            CriterionDetail::Level(_) => Criterion::Level,
            CriterionDetail::Availability(_) => Criterion::Availability,
        }
    }
}

/// One criterion that contributed to a compatibility score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionResult {
    pub points: u32,
    pub detail: CriterionDetail,
}

impl CriterionResult {
    pub fn criterion(&self) -> Criterion {
        self.detail.criterion()
    }
}

/// Structured outcome of comparing two sets of fitness attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Compatibility {
    pub raw: u32,
    pub score: f64,
    pub criteria: Vec<CriterionResult>,
}

/// Candidate with computed compatibility, lives for one scoring pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredCandidate {
    pub user_id: String,
    pub display_name: Option<String>,
    pub attributes: FitnessAttributes,
    pub compatibility_score: f64,
    pub match_reasons: Vec<String>,
    pub criteria: Vec<CriterionResult>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Pending,
    Accepted,
    Rejected,
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MatchStatus::Pending => "pending",
            MatchStatus::Accepted => "accepted",
            MatchStatus::Rejected => "rejected",
        };
        f.write_str(s)
    }
}

/// Persisted match between two users.
///
/// `compatibility_score` is captured when the record is created and is not
/// refreshed when either profile changes afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord {
    pub id: String,
    pub user_id: String,
    pub matched_user_id: String,
    pub status: MatchStatus,
    #[serde(default)]
    pub compatibility_score: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MatchRecord {
    /// Whether `user_id` is on either side of this record
    pub fn involves(&self, user_id: &str) -> bool {
        self.user_id == user_id || self.matched_user_id == user_id
    }

    /// The participant that is not `user_id`
    pub fn other_party(&self, user_id: &str) -> &str {
        if self.user_id == user_id {
            &self.matched_user_id
        } else {
            &self.user_id
        }
    }
}

/// Matching thresholds applied by the pipeline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchingRules {
    /// Candidates scoring at or below this are dropped
    pub min_score: f64,
    pub default_limit: usize,
}

impl Default for MatchingRules {
    fn default() -> Self {
        Self {
            min_score: 0.3,
            default_limit: 3,
        }
    }
}
