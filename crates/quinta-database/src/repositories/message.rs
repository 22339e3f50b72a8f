//! Connection message repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use quinta_core::error::{AppError, ErrorKind};
use quinta_core::result::AppResult;
use quinta_entity::connection::{ConnectionMessage, NewConnectionMessage};
use quinta_entity::store::MessageStore;

/// Append-only repository for the message log of a connection.
#[derive(Debug, Clone)]
pub struct MessageRepository {
    pool: PgPool,
}

impl MessageRepository {
    /// Create a new message repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageStore for MessageRepository {
    async fn append(&self, data: &NewConnectionMessage) -> AppResult<ConnectionMessage> {
        sqlx::query_as::<_, ConnectionMessage>(
            "INSERT INTO connection_messages (connection_id, sender_id, content) \
             VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(data.connection_id)
        .bind(data.sender_id)
        .bind(&data.content)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to append message", e))
    }

    async fn list(&self, connection_id: Uuid) -> AppResult<Vec<ConnectionMessage>> {
        sqlx::query_as::<_, ConnectionMessage>(
            "SELECT * FROM connection_messages \
             WHERE connection_id = $1 ORDER BY created_at ASC",
        )
        .bind(connection_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list messages", e))
    }

    async fn count(&self, connection_id: Uuid) -> AppResult<u64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM connection_messages WHERE connection_id = $1")
                .bind(connection_id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to count messages", e)
                })?;
        Ok(count as u64)
    }
}
