//! Generation lifecycle: staging, atomic commit, discard, controller pointer.

use super::db::{unix_timestamp, CacheStorage};
use super::error::StoreError;
use super::types::{GenerationState, GenerationSummary};
use crate::checksum::sha256_hex;
use crate::http::{RequestKey, Response};
use sqlx::Row;

impl CacheStorage {
    pub async fn generation_state(
        &self,
        name: &str,
    ) -> Result<Option<GenerationState>, StoreError> {
        let row = sqlx::query("SELECT state FROM generations WHERE name = ?1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| GenerationState::from_str(&r.get::<String, _>("state"))))
    }

    /// Open (creating if absent) a generation for an install attempt.
    ///
    /// A `building` leftover from a failed attempt loses its stale entries.
    /// A `ready` generation keeps serving; the attempt's entries replace its
    /// own on commit. Returns the state the generation is in afterwards.
    pub async fn begin_generation(&self, name: &str) -> Result<GenerationState, StoreError> {
        let mut tx = self.pool.begin().await?;
        let existing = sqlx::query("SELECT state FROM generations WHERE name = ?1")
            .bind(name)
            .fetch_optional(&mut *tx)
            .await?
            .map(|r| GenerationState::from_str(&r.get::<String, _>("state")));

        let state = match existing {
            Some(GenerationState::Ready) => GenerationState::Ready,
            Some(GenerationState::Building) => {
                sqlx::query("DELETE FROM entries WHERE generation = ?1")
                    .bind(name)
                    .execute(&mut *tx)
                    .await?;
                sqlx::query("UPDATE generations SET updated_at = ?1 WHERE name = ?2")
                    .bind(unix_timestamp())
                    .bind(name)
                    .execute(&mut *tx)
                    .await?;
                GenerationState::Building
            }
            None => {
                let now = unix_timestamp();
                sqlx::query(
                    r#"
                    INSERT INTO generations (name, state, created_at, updated_at)
                    VALUES (?1, ?2, ?3, ?4)
                    "#,
                )
                .bind(name)
                .bind(GenerationState::Building.as_str())
                .bind(now)
                .bind(now)
                .execute(&mut *tx)
                .await?;
                GenerationState::Building
            }
        };
        tx.commit().await?;
        Ok(state)
    }

    /// Store every entry and mark the generation `ready` in one transaction.
    pub async fn commit_generation(
        &self,
        name: &str,
        entries: &[(RequestKey, Response)],
    ) -> Result<(), StoreError> {
        let now = unix_timestamp();
        let mut tx = self.pool.begin().await?;

        for (key, response) in entries {
            let headers_json = serde_json::to_string(&response.headers)?;
            sqlx::query(
                r#"
                INSERT OR REPLACE INTO entries (
                    generation, method, url, status, headers_json,
                    body, body_sha256, stored_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
            )
            .bind(name)
            .bind(&key.method)
            .bind(&key.url)
            .bind(i64::from(response.status))
            .bind(headers_json)
            .bind(&response.body)
            .bind(sha256_hex(&response.body))
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        let updated = sqlx::query(
            r#"
            UPDATE generations
            SET state = ?1,
                updated_at = ?2
            WHERE name = ?3
            "#,
        )
        .bind(GenerationState::Ready.as_str())
        .bind(now)
        .bind(name)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if updated == 0 {
            // Dropping `tx` rolls the inserted entries back.
            return Err(StoreError::UnknownGeneration(name.to_string()));
        }
        tx.commit().await?;
        Ok(())
    }

    /// Remove a generation and all of its entries.
    pub async fn discard_generation(&self, name: &str) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM entries WHERE generation = ?1")
            .bind(name)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM generations WHERE name = ?1")
            .bind(name)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    pub async fn active_generation(&self) -> Result<Option<String>, StoreError> {
        let row = sqlx::query("SELECT generation FROM controller WHERE id = 1")
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| r.get::<String, _>("generation")))
    }

    /// Point the controller at `name`. Returns false if it already was.
    pub async fn set_active(&self, name: &str) -> Result<bool, StoreError> {
        let mut tx = self.pool.begin().await?;
        let state = sqlx::query("SELECT state FROM generations WHERE name = ?1")
            .bind(name)
            .fetch_optional(&mut *tx)
            .await?
            .map(|r| GenerationState::from_str(&r.get::<String, _>("state")));
        match state {
            None => return Err(StoreError::UnknownGeneration(name.to_string())),
            Some(GenerationState::Building) => return Err(StoreError::NotReady(name.to_string())),
            Some(GenerationState::Ready) => {}
        }

        let current: Option<String> = sqlx::query("SELECT generation FROM controller WHERE id = 1")
            .fetch_optional(&mut *tx)
            .await?
            .map(|r| r.get("generation"));
        if current.as_deref() == Some(name) {
            return Ok(false);
        }

        sqlx::query(
            r#"
            INSERT INTO controller (id, generation, activated_at)
            VALUES (1, ?1, ?2)
            ON CONFLICT(id) DO UPDATE SET
                generation = excluded.generation,
                activated_at = excluded.activated_at
            "#,
        )
        .bind(name)
        .bind(unix_timestamp())
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(true)
    }

    /// All generations, newest first.
    pub async fn list_generations(&self) -> Result<Vec<GenerationSummary>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT g.name AS name,
                   g.state AS state,
                   (SELECT COUNT(*) FROM entries e WHERE e.generation = g.name) AS entries,
                   EXISTS (SELECT 1 FROM controller c WHERE c.generation = g.name) AS active
            FROM generations g
            ORDER BY g.created_at DESC, g.name DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let state: String = row.get("state");
            let active: i64 = row.get("active");
            out.push(GenerationSummary {
                name: row.get("name"),
                state: GenerationState::from_str(&state),
                entries: row.get("entries"),
                active: active != 0,
            });
        }
        Ok(out)
    }
}
