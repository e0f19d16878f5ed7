use crate::services::store::{Filter, Row, RowStore, StoreError};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::Value;
use std::time::Duration;

/// Row store backed by the managed backend's REST API
///
/// Speaks the PostgREST dialect: one resource per table under `/rest/v1`,
/// `field=eq.value` filters, and `Prefer: return=representation` so writes
/// echo the stored row back. Uniqueness (`id`, and the `key` passed to
/// `insert_unique`) is enforced by the backend's indexes and reported as 409.
pub struct RestRowStore {
    base_url: String,
    api_key: String,
    client: Client,
}

impl RestRowStore {
    /// Create a new REST store client
    pub fn new(base_url: String, api_key: String, timeout_secs: u64) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            base_url,
            api_key,
            client,
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url.trim_end_matches('/'), table)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
    }

    async fn rows(&self, response: Response, action: &str) -> Result<Vec<Row>, StoreError> {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(StoreError::Unauthorized);
        }
        if status == StatusCode::CONFLICT {
            return Err(StoreError::Conflict(format!("Failed to {}: duplicate row", action)));
        }
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read body".to_string());
            tracing::error!("Failed to {}: {} - {}", action, status, body);
            return Err(StoreError::ApiError(format!("Failed to {}: {}", action, status)));
        }

        match response.json::<Value>().await? {
            Value::Array(rows) => Ok(rows),
            other => Err(StoreError::InvalidRow(format!(
                "expected an array of rows, got {}",
                other
            ))),
        }
    }
}

/// Render a filter value the way PostgREST expects it in the query string
fn filter_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Build the `field=eq.value&...` query string for a filter
pub fn filter_query(filter: &Filter) -> String {
    filter
        .conditions
        .iter()
        .map(|(field, value)| {
            format!(
                "{}=eq.{}",
                urlencoding::encode(field),
                urlencoding::encode(&filter_value(value))
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

#[async_trait]
impl RowStore for RestRowStore {
    async fn get_by_id(&self, table: &str, id: &str) -> Result<Option<Row>, StoreError> {
        let url = format!(
            "{}?id=eq.{}&select=*",
            self.table_url(table),
            urlencoding::encode(id)
        );

        tracing::debug!("Fetching {} row {}", table, id);

        let response = self.authorized(self.client.get(&url)).send().await?;
        let rows = self.rows(response, &format!("fetch {} row", table)).await?;

        Ok(rows.into_iter().next())
    }

    async fn list(&self, table: &str, filter: &Filter) -> Result<Vec<Row>, StoreError> {
        let query = filter_query(filter);
        let url = if query.is_empty() {
            format!("{}?select=*", self.table_url(table))
        } else {
            format!("{}?{}&select=*", self.table_url(table), query)
        };

        let response = self.authorized(self.client.get(&url)).send().await?;
        let rows = self.rows(response, &format!("list {}", table)).await?;

        tracing::debug!("Listed {} rows from {}", rows.len(), table);
        Ok(rows)
    }

    async fn insert(&self, table: &str, row: Row) -> Result<Row, StoreError> {
        let response = self
            .authorized(self.client.post(self.table_url(table)))
            .header("Prefer", "return=representation")
            .json(&row)
            .send()
            .await?;

        self.rows(response, &format!("insert into {}", table))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::InvalidRow(format!("insert into {} returned no row", table)))
    }

    async fn upsert(&self, table: &str, row: Row) -> Result<Row, StoreError> {
        let response = self
            .authorized(self.client.post(self.table_url(table)))
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .json(&row)
            .send()
            .await?;

        self.rows(response, &format!("upsert into {}", table))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::InvalidRow(format!("upsert into {} returned no row", table)))
    }

    async fn update(
        &self,
        table: &str,
        id: &str,
        expected: &Filter,
        patch: Row,
    ) -> Result<Row, StoreError> {
        let mut url = format!("{}?id=eq.{}", self.table_url(table), urlencoding::encode(id));
        let condition = filter_query(expected);
        if !condition.is_empty() {
            url = format!("{}&{}", url, condition);
        }

        let response = self
            .authorized(self.client.patch(&url))
            .header("Prefer", "return=representation")
            .json(&patch)
            .send()
            .await?;

        let updated = self
            .rows(response, &format!("update {} row", table))
            .await?
            .into_iter()
            .next();

        if let Some(row) = updated {
            return Ok(row);
        }

        // nothing matched: tell a missing row from one in another state
        if !expected.conditions.is_empty() && self.get_by_id(table, id).await?.is_some() {
            return Err(StoreError::Conflict(format!(
                "{} row {} changed concurrently",
                table, id
            )));
        }
        Err(StoreError::NotFound(format!("{} row {}", table, id)))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let url = format!("{}/rest/v1/", self.base_url.trim_end_matches('/'));
        let response = self.authorized(self.client.get(&url)).send().await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(StoreError::ApiError(format!("Health probe failed: {}", response.status())))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    #[test]
    fn test_filter_query() {
        let filter = Filter::new()
            .eq("userId", "u 1")
            .eq("status", "pending")
            .eq("score", 0.5);
        assert_eq!(
            filter_query(&filter),
            "userId=eq.u%201&status=eq.pending&score=eq.0.5"
        );
        assert_eq!(filter_query(&Filter::new()), "");
    }

    #[tokio::test]
    async fn test_get_by_id() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/rest/v1/fitness_profiles")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("id".into(), "eq.u1".into()),
                Matcher::UrlEncoded("select".into(), "*".into()),
            ]))
            .match_header("apikey", "secret")
            .match_header("authorization", "Bearer secret")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!([{"id": "u1", "userId": "u1"}]).to_string())
            .create_async()
            .await;

        let store = RestRowStore::new(server.url(), "secret".to_string(), 5).unwrap();
        let row = store.get_by_id("fitness_profiles", "u1").await.unwrap();

        mock.assert_async().await;
        assert_eq!(row, Some(json!({"id": "u1", "userId": "u1"})));
    }

    #[tokio::test]
    async fn test_get_by_id_missing() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/rest/v1/fitness_profiles")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let store = RestRowStore::new(server.url(), "secret".to_string(), 5).unwrap();
        assert!(store
            .get_by_id("fitness_profiles", "nobody")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_list_with_filter() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/rest/v1/matches")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("userId".into(), "eq.u1".into()),
                Matcher::UrlEncoded("select".into(), "*".into()),
            ]))
            .with_status(200)
            .with_body(json!([{"id": "m1"}, {"id": "m2"}]).to_string())
            .create_async()
            .await;

        let store = RestRowStore::new(server.url(), "secret".to_string(), 5).unwrap();
        let rows = store
            .list("matches", &Filter::new().eq("userId", "u1"))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(rows.len(), 2);
    }

    #[tokio::test]
    async fn test_insert_returns_representation() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/rest/v1/matches")
            .match_header("prefer", "return=representation")
            .match_body(Matcher::PartialJson(json!({"id": "m1"})))
            .with_status(201)
            .with_body(json!([{"id": "m1", "status": "pending"}]).to_string())
            .create_async()
            .await;

        let store = RestRowStore::new(server.url(), "secret".to_string(), 5).unwrap();
        let row = store
            .insert("matches", json!({"id": "m1", "status": "pending"}))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(row["status"], "pending");
    }

    #[tokio::test]
    async fn test_update_missing_row() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("PATCH", "/rest/v1/matches")
            .match_query(Matcher::UrlEncoded("id".into(), "eq.m9".into()))
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let store = RestRowStore::new(server.url(), "secret".to_string(), 5).unwrap();
        let err = store
            .update("matches", "m9", &Filter::new(), json!({"status": "accepted"}))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_conditional_update() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PATCH", "/rest/v1/matches")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("id".into(), "eq.m1".into()),
                Matcher::UrlEncoded("status".into(), "eq.pending".into()),
            ]))
            .match_body(Matcher::Json(json!({"status": "accepted"})))
            .with_status(200)
            .with_body(json!([{"id": "m1", "status": "accepted"}]).to_string())
            .create_async()
            .await;

        let store = RestRowStore::new(server.url(), "secret".to_string(), 5).unwrap();
        let row = store
            .update(
                "matches",
                "m1",
                &Filter::new().eq("status", "pending"),
                json!({"status": "accepted"}),
            )
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(row["status"], "accepted");
    }

    #[tokio::test]
    async fn test_conditional_update_on_settled_row() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("PATCH", "/rest/v1/matches")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;
        server
            .mock("GET", "/rest/v1/matches")
            .match_query(Matcher::UrlEncoded("id".into(), "eq.m1".into()))
            .with_status(200)
            .with_body(json!([{"id": "m1", "status": "rejected"}]).to_string())
            .create_async()
            .await;

        let store = RestRowStore::new(server.url(), "secret".to_string(), 5).unwrap();
        let err = store
            .update(
                "matches",
                "m1",
                &Filter::new().eq("status", "pending"),
                json!({"status": "accepted"}),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_upsert_merges_duplicates() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/rest/v1/fitness_profiles")
            .match_header("prefer", "resolution=merge-duplicates,return=representation")
            .with_status(201)
            .with_body(json!([{"id": "u1", "location": "Austin, TX"}]).to_string())
            .create_async()
            .await;

        let store = RestRowStore::new(server.url(), "secret".to_string(), 5).unwrap();
        let row = store
            .upsert("fitness_profiles", json!({"id": "u1", "location": "Austin, TX"}))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(row["id"], "u1");
    }

    #[tokio::test]
    async fn test_duplicate_insert_is_conflict() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/rest/v1/matches")
            .with_status(409)
            .with_body(r#"{"code":"23505","message":"duplicate key value"}"#)
            .create_async()
            .await;

        let store = RestRowStore::new(server.url(), "secret".to_string(), 5).unwrap();
        let err = store
            .insert_unique("matches", json!({"id": "m2", "pairKey": "a:b"}), "pairKey")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_unauthorized() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/rest/v1/matches")
            .match_query(Matcher::Any)
            .with_status(401)
            .create_async()
            .await;

        let store = RestRowStore::new(server.url(), "bad".to_string(), 5).unwrap();
        let err = store.list("matches", &Filter::new()).await.unwrap_err();
        assert!(matches!(err, StoreError::Unauthorized));
    }

    #[tokio::test]
    async fn test_server_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/rest/v1/matches")
            .match_query(Matcher::Any)
            .with_status(503)
            .with_body("down")
            .create_async()
            .await;

        let store = RestRowStore::new(server.url(), "secret".to_string(), 5).unwrap();
        let err = store.list("matches", &Filter::new()).await.unwrap_err();
        assert!(matches!(err, StoreError::ApiError(_)));
    }
}
