use crate::models::{MatchRecord, MatchStatus};
use chrono::{DateTime, Utc};
use std::str::FromStr;
use thiserror::Error;

/// Rule violations in the match lifecycle
#[derive(Debug, Error, PartialEq)]
pub enum MatchError {
    #[error("A user cannot match with themselves")]
    SelfMatch,

    #[error("A match between {0} and {1} already exists")]
    AlreadyExists(String, String),

    #[error("User {0} cannot respond to this match")]
    NotParticipant(String),

    #[error("Match is already {0}")]
    AlreadyResolved(MatchStatus),

    #[error("Invalid action: {0} (expected accept or reject)")]
    InvalidAction(String),
}

/// Answer from the invited user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchResponse {
    Accept,
    Reject,
}

impl FromStr for MatchResponse {
    type Err = MatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "accept" | "accepted" => Ok(MatchResponse::Accept),
            "reject" | "rejected" => Ok(MatchResponse::Reject),
            _ => Err(MatchError::InvalidAction(s.to_string())),
        }
    }
}

impl MatchRecord {
    /// Start a pending match, snapshotting the current compatibility score
    pub fn new_pending(
        user_id: &str,
        matched_user_id: &str,
        compatibility_score: Option<f64>,
        now: DateTime<Utc>,
    ) -> Result<Self, MatchError> {
        if user_id == matched_user_id {
            return Err(MatchError::SelfMatch);
        }

        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            matched_user_id: matched_user_id.to_string(),
            status: MatchStatus::Pending,
            compatibility_score,
            created_at: now,
            updated_at: now,
        })
    }

    /// Key shared by both directions of a pair, used to keep one record per pair
    pub fn pair_key(&self) -> String {
        pair_key(&self.user_id, &self.matched_user_id)
    }

    /// Apply the invited user's answer. The score snapshot is left as is.
    pub fn respond(
        &mut self,
        responder: &str,
        response: MatchResponse,
        now: DateTime<Utc>,
    ) -> Result<(), MatchError> {
        if responder != self.matched_user_id {
            return Err(MatchError::NotParticipant(responder.to_string()));
        }
        if self.status != MatchStatus::Pending {
            return Err(MatchError::AlreadyResolved(self.status));
        }

        self.status = match response {
            MatchResponse::Accept => MatchStatus::Accepted,
            MatchResponse::Reject => MatchStatus::Rejected,
        };
        self.updated_at = now;
        Ok(())
    }
}

/// Order-independent key for two users
pub fn pair_key(a: &str, b: &str) -> String {
    if a <= b {
        format!("{}:{}", a, b)
    } else {
        format!("{}:{}", b, a)
    }
}

/// Refuse a new record when the pair already has one, in either direction
pub fn ensure_no_existing_match(
    user_id: &str,
    matched_user_id: &str,
    existing: &[MatchRecord],
) -> Result<(), MatchError> {
    let exists = existing
        .iter()
        .any(|r| r.involves(user_id) && r.other_party(user_id) == matched_user_id);

    if exists {
        return Err(MatchError::AlreadyExists(
            user_id.to_string(),
            matched_user_id.to_string(),
        ));
    }
    Ok(())
}
