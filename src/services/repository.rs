use crate::core::MatchError;
use crate::models::{FitnessProfile, MatchRecord, MatchStatus};
use crate::services::store::{Filter, Row, RowStore, StoreError};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

/// Errors surfaced by typed data access
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Match(#[from] MatchError),

    #[error("Failed to decode {table} row: {message}")]
    Decode { table: String, message: String },

    #[error("Fitness profile not found for user {0}")]
    ProfileNotFound(String),

    #[error("Match {0} not found")]
    MatchNotFound(String),
}

/// Column holding the direction-free pair key of a match row
const PAIR_KEY: &str = "pairKey";

/// Table names in the managed backend
#[derive(Debug, Clone)]
pub struct Tables {
    pub fitness_profiles: String,
    pub matches: String,
}

impl Default for Tables {
    fn default() -> Self {
        Self {
            fitness_profiles: "fitness_profiles".to_string(),
            matches: "matches".to_string(),
        }
    }
}

/// Typed access to fitness profiles and match records over any row store
#[derive(Clone)]
pub struct BuddyRepository {
    store: Arc<dyn RowStore>,
    tables: Tables,
}

impl BuddyRepository {
    pub fn new(store: Arc<dyn RowStore>, tables: Tables) -> Self {
        Self { store, tables }
    }

    pub fn store(&self) -> &Arc<dyn RowStore> {
        &self.store
    }

    fn decode<T: DeserializeOwned>(&self, table: &str, row: Row) -> Result<T, RepositoryError> {
        serde_json::from_value(row).map_err(|e| RepositoryError::Decode {
            table: table.to_string(),
            message: e.to_string(),
        })
    }

    /// Fetch a user's fitness profile, keyed by user id
    pub async fn get_profile(&self, user_id: &str) -> Result<FitnessProfile, RepositoryError> {
        let table = &self.tables.fitness_profiles;
        let row = self
            .store
            .get_by_id(table, user_id)
            .await?
            .ok_or_else(|| RepositoryError::ProfileNotFound(user_id.to_string()))?;

        self.decode(table, row)
    }

    /// Every fitness profile that could be a candidate.
    ///
    /// Rows that fail to decode are skipped with a warning instead of
    /// failing the whole list.
    pub async fn list_profiles(&self) -> Result<Vec<FitnessProfile>, RepositoryError> {
        let table = &self.tables.fitness_profiles;
        let rows = self.store.list(table, &Filter::new()).await?;

        let profiles = rows
            .into_iter()
            .filter_map(|row| match self.decode::<FitnessProfile>(table, row) {
                Ok(profile) => Some(profile),
                Err(e) => {
                    tracing::warn!("Skipping malformed profile: {}", e);
                    None
                }
            })
            .collect();

        Ok(profiles)
    }

    /// Create or replace a profile, keyed by its user id
    pub async fn save_profile(&self, profile: &FitnessProfile) -> Result<(), RepositoryError> {
        let mut row = serde_json::to_value(profile).map_err(|e| RepositoryError::Decode {
            table: self.tables.fitness_profiles.clone(),
            message: e.to_string(),
        })?;
        if let Some(obj) = row.as_object_mut() {
            obj.insert("id".to_string(), json!(profile.user_id));
        }

        self.store.upsert(&self.tables.fitness_profiles, row).await?;
        Ok(())
    }

    /// All match records where the user is on either side
    pub async fn matches_for(&self, user_id: &str) -> Result<Vec<MatchRecord>, RepositoryError> {
        let table = &self.tables.matches;

        let mut rows = self
            .store
            .list(table, &Filter::new().eq("userId", user_id))
            .await?;
        rows.extend(
            self.store
                .list(table, &Filter::new().eq("matchedUserId", user_id))
                .await?,
        );

        let mut records: Vec<MatchRecord> = rows
            .into_iter()
            .map(|row| self.decode(table, row))
            .collect::<Result<_, _>>()?;
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        records.dedup_by(|a, b| a.id == b.id);

        Ok(records)
    }

    pub async fn get_match(&self, match_id: &str) -> Result<MatchRecord, RepositoryError> {
        let table = &self.tables.matches;
        let row = self
            .store
            .get_by_id(table, match_id)
            .await?
            .ok_or_else(|| RepositoryError::MatchNotFound(match_id.to_string()))?;

        self.decode(table, row)
    }

    /// Store a new match record.
    ///
    /// Rows carry a direction-free `pairKey`, so a second record for the same
    /// two users is refused by the store even when requests race.
    pub async fn insert_match(&self, record: &MatchRecord) -> Result<MatchRecord, RepositoryError> {
        let table = &self.tables.matches;
        let mut row = serde_json::to_value(record).map_err(|e| RepositoryError::Decode {
            table: table.clone(),
            message: e.to_string(),
        })?;
        if let Some(obj) = row.as_object_mut() {
            obj.insert(PAIR_KEY.to_string(), json!(record.pair_key()));
        }

        let stored = match self.store.insert_unique(table, row, PAIR_KEY).await {
            Ok(row) => row,
            Err(StoreError::Conflict(_)) => {
                return Err(MatchError::AlreadyExists(
                    record.user_id.clone(),
                    record.matched_user_id.clone(),
                )
                .into())
            }
            Err(e) => return Err(e.into()),
        };
        tracing::debug!(
            "Created match {} ({} -> {})",
            record.id,
            record.user_id,
            record.matched_user_id
        );

        self.decode(table, stored)
    }

    /// Move a pending match to its final status.
    ///
    /// The write only applies while the stored row is still pending; if
    /// another response landed first the current status is reported as
    /// `AlreadyResolved`. Only status and timestamp are written, so the
    /// score snapshot is never touched.
    pub async fn resolve_match(
        &self,
        match_id: &str,
        status: MatchStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<MatchRecord, RepositoryError> {
        let table = &self.tables.matches;
        let patch = json!({
            "status": status,
            "updatedAt": updated_at,
        });
        let still_pending = Filter::new().eq("status", json!(MatchStatus::Pending));

        match self.store.update(table, match_id, &still_pending, patch).await {
            Ok(row) => self.decode(table, row),
            Err(StoreError::Conflict(_)) => {
                let current = self.get_match(match_id).await?;
                tracing::info!("Match {} was already {}", match_id, current.status);
                Err(MatchError::AlreadyResolved(current.status).into())
            }
            Err(StoreError::NotFound(_)) => Err(RepositoryError::MatchNotFound(match_id.to_string())),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FitnessAttributes, FitnessGoal, FitnessLevel};
    use crate::services::store::MemoryRowStore;

    fn repo() -> BuddyRepository {
        BuddyRepository::new(Arc::new(MemoryRowStore::new()), Tables::default())
    }

    fn profile(id: &str) -> FitnessProfile {
        FitnessProfile {
            user_id: id.to_string(),
            display_name: None,
            attributes: FitnessAttributes {
                level: Some(FitnessLevel::Advanced),
                goal: Some(FitnessGoal::Endurance),
                styles: ["running".to_string()].into_iter().collect(),
                location: "Boulder, CO".to_string(),
                ..Default::default()
            },
        }
    }

    #[tokio::test]
    async fn test_profile_round_trip() {
        let repo = repo();
        repo.save_profile(&profile("u1")).await.unwrap();

        let loaded = repo.get_profile("u1").await.unwrap();
        assert_eq!(loaded, profile("u1"));

        let missing = repo.get_profile("u2").await;
        assert!(matches!(missing, Err(RepositoryError::ProfileNotFound(_))));
    }

    #[tokio::test]
    async fn test_list_skips_malformed_rows() {
        let repo = repo();
        repo.save_profile(&profile("u1")).await.unwrap();
        repo.store()
            .insert("fitness_profiles", json!({"id": "bad", "level": 42}))
            .await
            .unwrap();

        let profiles = repo.list_profiles().await.unwrap();
        assert_eq!(profiles.len(), 1);
    }

    #[tokio::test]
    async fn test_matches_for_both_directions() {
        let repo = repo();
        let now = Utc::now();
        for (a, b) in [("u1", "u2"), ("u3", "u1"), ("u2", "u3")] {
            let record = MatchRecord::new_pending(a, b, Some(0.5), now).unwrap();
            repo.insert_match(&record).await.unwrap();
        }

        let records = repo.matches_for("u1").await.unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.involves("u1")));
    }

    #[tokio::test]
    async fn test_status_update_keeps_snapshot() {
        let repo = repo();
        let now = Utc::now();
        let record = MatchRecord::new_pending("u1", "u2", Some(0.44), now).unwrap();
        repo.insert_match(&record).await.unwrap();

        let updated = repo
            .resolve_match(&record.id, MatchStatus::Accepted, Utc::now())
            .await
            .unwrap();
        assert_eq!(updated.status, MatchStatus::Accepted);
        assert_eq!(updated.compatibility_score, Some(0.44));
        assert_eq!(repo.get_match(&record.id).await.unwrap().status, MatchStatus::Accepted);
    }

    #[tokio::test]
    async fn test_second_resolution_is_refused() {
        let repo = repo();
        let record = MatchRecord::new_pending("u1", "u2", None, Utc::now()).unwrap();
        repo.insert_match(&record).await.unwrap();

        repo.resolve_match(&record.id, MatchStatus::Rejected, Utc::now())
            .await
            .unwrap();
        let err = repo
            .resolve_match(&record.id, MatchStatus::Accepted, Utc::now())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            RepositoryError::Match(MatchError::AlreadyResolved(MatchStatus::Rejected))
        ));
        assert_eq!(repo.get_match(&record.id).await.unwrap().status, MatchStatus::Rejected);

        let missing = repo.resolve_match("nope", MatchStatus::Accepted, Utc::now()).await;
        assert!(matches!(missing, Err(RepositoryError::MatchNotFound(_))));
    }

    #[tokio::test]
    async fn test_one_record_per_pair() {
        let repo = repo();
        let first = MatchRecord::new_pending("u1", "u2", None, Utc::now()).unwrap();
        repo.insert_match(&first).await.unwrap();

        let reverse = MatchRecord::new_pending("u2", "u1", None, Utc::now()).unwrap();
        let err = repo.insert_match(&reverse).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Match(MatchError::AlreadyExists(..))));
        assert_eq!(repo.matches_for("u1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_save_profile_replaces_existing() {
        let repo = repo();
        repo.save_profile(&profile("u1")).await.unwrap();

        let mut moved = profile("u1");
        moved.attributes.location = "Denver, CO".to_string();
        repo.save_profile(&moved).await.unwrap();

        assert_eq!(repo.get_profile("u1").await.unwrap(), moved);
        assert_eq!(repo.list_profiles().await.unwrap().len(), 1);
    }
}
