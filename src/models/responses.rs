use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use crate::models::domain::{Compatibility, MatchRecord, ScoredCandidate};

/// Response for the potential/top matches endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindMatchesResponse {
    pub matches: Vec<ScoredCandidate>,
    pub total_candidates: usize,
    pub scored_candidates: usize,
}

/// Compatibility breakdown between two users
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompatibilityResponse {
    pub user_id: String,
    pub other_user_id: String,
    #[serde(flatten)]
    pub compatibility: Compatibility,
    pub match_reasons: Vec<String>,
}

/// Single match record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchRecordResponse {
    #[serde(rename = "match")]
    pub record: MatchRecord,
}

/// All match records for a user
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchListResponse {
    pub user_id: String,
    pub matches: Vec<MatchRecord>,
    pub count: usize,
}

/// Display label tables for UI surfaces
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelsResponse {
    pub goals: BTreeMap<String, String>,
    pub levels: BTreeMap<String, String>,
    pub styles: BTreeMap<String, String>,
    pub time_slots: BTreeMap<String, String>,
    pub days: BTreeMap<String, String>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
