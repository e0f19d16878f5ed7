use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;
use tokio::sync::RwLock;

/// A row as exchanged with the backing store: a JSON object keyed by `id`
pub type Row = Value;

/// Errors that can occur when talking to a row store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: invalid API key")]
    Unauthorized,

    #[error("Invalid row: {0}")]
    InvalidRow(String),

    #[error("Conflict: {0}")]
    Conflict(String),
}

/// Equality filter: every `(field, value)` pair must match
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    pub conditions: Vec<(String, Value)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.conditions.push((field.to_string(), value.into()));
        self
    }

    /// Whether a row satisfies every condition
    pub fn matches(&self, row: &Row) -> bool {
        self.conditions
            .iter()
            .all(|(field, value)| row.get(field) == Some(value))
    }
}

/// Generic data-store interface offered by the managed backend
#[async_trait]
pub trait RowStore: Send + Sync {
    async fn get_by_id(&self, table: &str, id: &str) -> Result<Option<Row>, StoreError>;

    async fn list(&self, table: &str, filter: &Filter) -> Result<Vec<Row>, StoreError>;

    /// Insert a new row. Fails with `Conflict` when the id is taken.
    async fn insert(&self, table: &str, row: Row) -> Result<Row, StoreError>;

    /// Insert a new row unless another row holds the same value in `key`.
    ///
    /// The default relies on a unique index on `key` in the backend, which
    /// turns a duplicate into `Conflict`.
    async fn insert_unique(&self, table: &str, row: Row, _key: &str) -> Result<Row, StoreError> {
        self.insert(table, row).await
    }

    /// Insert a row or replace the one with the same id
    async fn upsert(&self, table: &str, row: Row) -> Result<Row, StoreError>;

    /// Merge the fields of `patch` into an existing row, but only while the
    /// row still satisfies `expected`. Fails with `Conflict` otherwise.
    async fn update(
        &self,
        table: &str,
        id: &str,
        expected: &Filter,
        patch: Row,
    ) -> Result<Row, StoreError>;

    /// Cheap connectivity probe for health checks
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// In-process row store, used for local runs and tests
#[derive(Default)]
pub struct MemoryRowStore {
    tables: RwLock<HashMap<String, BTreeMap<String, Row>>>,
}

impl MemoryRowStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn object_id(row: &Row) -> Result<String, StoreError> {
    if !row.is_object() {
        return Err(StoreError::InvalidRow("row must be a JSON object".to_string()));
    }
    match row.get("id") {
        Some(Value::String(id)) => Ok(id.clone()),
        Some(other) => Ok(other.to_string()),
        None => Err(StoreError::InvalidRow("row has no id".to_string())),
    }
}

#[async_trait]
impl RowStore for MemoryRowStore {
    async fn get_by_id(&self, table: &str, id: &str) -> Result<Option<Row>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.get(table).and_then(|rows| rows.get(id)).cloned())
    }

    async fn list(&self, table: &str, filter: &Filter) -> Result<Vec<Row>, StoreError> {
        let tables = self.tables.read().await;
        let rows: Vec<Row> = tables
            .get(table)
            .map(|rows| rows.values().filter(|r| filter.matches(r)).cloned().collect())
            .unwrap_or_default();
        Ok(rows)
    }

    async fn insert(&self, table: &str, row: Row) -> Result<Row, StoreError> {
        let id = object_id(&row)?;

        let mut tables = self.tables.write().await;
        let rows = tables.entry(table.to_string()).or_default();
        if rows.contains_key(&id) {
            return Err(StoreError::Conflict(format!("{} row {} already exists", table, id)));
        }
        rows.insert(id, row.clone());

        tracing::debug!("Inserted row into {}", table);
        Ok(row)
    }

    async fn insert_unique(&self, table: &str, row: Row, key: &str) -> Result<Row, StoreError> {
        let id = object_id(&row)?;
        let value = row
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::InvalidRow(format!("row has no {}", key)))?;

        // check and write under one lock
        let mut tables = self.tables.write().await;
        let rows = tables.entry(table.to_string()).or_default();
        if rows.contains_key(&id) || rows.values().any(|r| r.get(key) == Some(&value)) {
            return Err(StoreError::Conflict(format!(
                "{} row with {} {} already exists",
                table, key, value
            )));
        }
        rows.insert(id, row.clone());

        tracing::debug!("Inserted unique row into {}", table);
        Ok(row)
    }

    async fn upsert(&self, table: &str, row: Row) -> Result<Row, StoreError> {
        let id = object_id(&row)?;

        let mut tables = self.tables.write().await;
        tables
            .entry(table.to_string())
            .or_default()
            .insert(id, row.clone());

        Ok(row)
    }

    async fn update(
        &self,
        table: &str,
        id: &str,
        expected: &Filter,
        patch: Row,
    ) -> Result<Row, StoreError> {
        let Value::Object(fields) = patch else {
            return Err(StoreError::InvalidRow("patch must be a JSON object".to_string()));
        };

        let mut tables = self.tables.write().await;
        let row = tables
            .get_mut(table)
            .and_then(|rows| rows.get_mut(id))
            .ok_or_else(|| StoreError::NotFound(format!("{} row {}", table, id)))?;

        if !expected.matches(row) {
            return Err(StoreError::Conflict(format!("{} row {} changed concurrently", table, id)));
        }

        let target: &mut Map<String, Value> = row
            .as_object_mut()
            .ok_or_else(|| StoreError::InvalidRow(format!("{} row {} is not an object", table, id)))?;
        for (key, value) in fields {
            target.insert(key, value);
        }

        Ok(row.clone())
    }
}
