//! PostgreSQL implementation of the interest archive.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::models::ArchivedInterest;
use crate::domain::{InterestId, InterestRecord, RoomId};
use crate::error::GatewayError;

/// PostgreSQL-backed archive of interest records using `sqlx::PgPool`.
///
/// Mirrors the in-process store's mutations: creation, the matched-pair
/// transition, and removal of unmatched records on disconnect.
#[derive(Debug, Clone)]
pub struct InterestArchive {
    pool: PgPool,
}

impl InterestArchive {
    /// Creates an archive over the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the `interests` table if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::Store`] on database failure.
    pub async fn ensure_schema(&self) -> Result<(), GatewayError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS interests (
                id UUID PRIMARY KEY,
                connection_id UUID NOT NULL,
                text TEXT NOT NULL,
                embedding JSONB NOT NULL,
                matched BOOLEAN NOT NULL DEFAULT FALSE,
                room_id TEXT,
                created_at TIMESTAMPTZ NOT NULL
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| GatewayError::Store(e.to_string()))?;
        Ok(())
    }

    /// Inserts a freshly created record.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::Store`] on database failure.
    pub async fn record_created(&self, record: &InterestRecord) -> Result<(), GatewayError> {
        let embedding = serde_json::to_value(&record.embedding)
            .map_err(|e| GatewayError::Store(e.to_string()))?;

        sqlx::query(
            "INSERT INTO interests (id, connection_id, text, embedding, matched, room_id, created_at) \
             VALUES ($1, $2, $3, $4, FALSE, NULL, $5)",
        )
        .bind(record.id.as_uuid())
        .bind(record.connection_id.as_uuid())
        .bind(&record.text)
        .bind(embedding)
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| GatewayError::Store(e.to_string()))?;

        Ok(())
    }

    /// Marks both records of a matched pair with their shared room.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::Store`] on database failure.
    pub async fn pair_matched(
        &self,
        a: InterestId,
        b: InterestId,
        room_id: &RoomId,
    ) -> Result<(), GatewayError> {
        sqlx::query("UPDATE interests SET matched = TRUE, room_id = $1 WHERE id IN ($2, $3)")
            .bind(room_id.as_str())
            .bind(a.as_uuid())
            .bind(b.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| GatewayError::Store(e.to_string()))?;
        Ok(())
    }

    /// Deletes an unmatched record removed by disconnect cleanup or a
    /// re-submission.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::Store`] on database failure.
    pub async fn unmatched_removed(&self, id: InterestId) -> Result<(), GatewayError> {
        sqlx::query("DELETE FROM interests WHERE id = $1 AND matched = FALSE")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| GatewayError::Store(e.to_string()))?;
        Ok(())
    }

    /// Loads archived records created after the given timestamp, oldest
    /// first.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::Store`] on database failure.
    pub async fn load_created_after(
        &self,
        after: DateTime<Utc>,
    ) -> Result<Vec<ArchivedInterest>, GatewayError> {
        let rows = sqlx::query_as::<
            _,
            (
                Uuid,
                Uuid,
                String,
                serde_json::Value,
                bool,
                Option<String>,
                DateTime<Utc>,
            ),
        >(
            "SELECT id, connection_id, text, embedding, matched, room_id, created_at \
             FROM interests WHERE created_at > $1 ORDER BY created_at ASC",
        )
        .bind(after)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| GatewayError::Store(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(
                |(id, connection_id, text, embedding, matched, room_id, created_at)| {
                    ArchivedInterest {
                        id,
                        connection_id,
                        text,
                        embedding,
                        matched,
                        room_id,
                        created_at,
                    }
                },
            )
            .collect())
    }
}
