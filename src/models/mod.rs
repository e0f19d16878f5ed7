// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    Compatibility, Criterion, CriterionDetail, CriterionResult, FitnessAttributes, FitnessGoal,
    FitnessLevel, FitnessProfile, MatchRecord, MatchStatus, MatchingRules, ScoredCandidate,
    TimeSlot, Weekday,
};
pub use requests::{
    CompatibilityQuery, CreateMatchRequest, FindMatchesRequest, RespondMatchRequest, UserQuery,
};
pub use responses::{
    CompatibilityResponse, ErrorResponse, FindMatchesResponse, HealthResponse, LabelsResponse,
    MatchListResponse, MatchRecordResponse,
};
