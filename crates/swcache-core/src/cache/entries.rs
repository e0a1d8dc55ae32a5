//! Entry lookup.

use super::db::CacheStorage;
use super::error::StoreError;
use super::types::{EntrySummary, GenerationState};
use crate::http::{Headers, RequestKey, Response};
use sqlx::Row;

impl CacheStorage {
    /// Look up a stored response. Only `ready` generations serve.
    pub async fn match_request(
        &self,
        generation: &str,
        key: &RequestKey,
    ) -> Result<Option<Response>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT e.status, e.headers_json, e.body
            FROM entries e
            JOIN generations g ON g.name = e.generation
            WHERE e.generation = ?1
              AND g.state = ?2
              AND e.method = ?3
              AND e.url = ?4
            "#,
        )
        .bind(generation)
        .bind(GenerationState::Ready.as_str())
        .bind(&key.method)
        .bind(&key.url)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let status: i64 = row.get("status");
        let headers_json: String = row.get("headers_json");
        let headers: Headers = serde_json::from_str(&headers_json)?;
        let body: Vec<u8> = row.get("body");
        Ok(Some(Response::new(status as u16, headers, body)))
    }

    pub async fn list_entries(&self, generation: &str) -> Result<Vec<EntrySummary>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT method, url, status, LENGTH(body) AS size, body_sha256
            FROM entries
            WHERE generation = ?1
            ORDER BY url, method
            "#,
        )
        .bind(generation)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| EntrySummary {
                method: row.get("method"),
                url: row.get("url"),
                status: row.get::<i64, _>("status") as u16,
                size: row.get("size"),
                body_sha256: row.get("body_sha256"),
            })
            .collect())
    }
}
