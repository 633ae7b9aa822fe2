use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use sqlx::Row;

use greenearth_core::domain::footprint::UserFootprint;

use super::{FootprintRepository, RepositoryError};
use crate::DbPool;

pub struct SqlFootprintRepository {
    pool: DbPool,
}

impl SqlFootprintRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_footprint(
    user_id: &str,
    row: &sqlx::sqlite::SqliteRow,
) -> Result<UserFootprint, RepositoryError> {
    let payload: String =
        row.try_get("payload").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let updated_at: String =
        row.try_get("updated_at").map_err(|e| RepositoryError::Decode(e.to_string()))?;

    let data = serde_json::from_str::<Map<String, Value>>(&payload)
        .map_err(|e| RepositoryError::Decode(format!("footprint payload for `{user_id}`: {e}")))?;
    let timestamp = DateTime::parse_from_rfc3339(&updated_at)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Decode(format!("footprint timestamp `{updated_at}`: {e}")))?;

    Ok(UserFootprint { user_id: user_id.to_string(), timestamp, data })
}

#[async_trait::async_trait]
impl FootprintRepository for SqlFootprintRepository {
    async fn save(
        &self,
        user_id: &str,
        update: Map<String, Value>,
    ) -> Result<UserFootprint, RepositoryError> {
        let user_id = user_id.trim();
        // Read-then-write: take the write lock before the read so a concurrent
        // writer makes us wait on busy_timeout instead of failing the upgrade.
        let mut tx = self.pool.begin_with("BEGIN IMMEDIATE").await?;

        let existing = sqlx::query("SELECT payload, updated_at FROM user_footprint WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?
            .map(|row| row_to_footprint(user_id, &row))
            .transpose()?;

        let footprint = UserFootprint::merged(existing, user_id, update, Utc::now())?;
        let payload = Value::Object(footprint.data.clone()).to_string();

        sqlx::query(
            "INSERT INTO user_footprint (user_id, payload, updated_at)
             VALUES (?, ?, ?)
             ON CONFLICT(user_id) DO UPDATE SET
                payload = excluded.payload,
                updated_at = excluded.updated_at",
        )
        .bind(&footprint.user_id)
        .bind(payload)
        .bind(footprint.timestamp.to_rfc3339())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(footprint)
    }

    async fn get(&self, user_id: &str) -> Result<Option<UserFootprint>, RepositoryError> {
        let user_id = user_id.trim();
        let row = sqlx::query("SELECT payload, updated_at FROM user_footprint WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| row_to_footprint(user_id, &row)).transpose()
    }
}
