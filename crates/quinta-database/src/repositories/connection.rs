//! Connection repository implementation.
//!
//! Pairwise uniqueness is enforced by the `connections_pair_key`
//! expression index over `LEAST/GREATEST(user_a_id, user_b_id)`; a
//! unique violation on that index is surfaced as `Conflict`.

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use quinta_core::error::{AppError, ErrorKind};
use quinta_core::result::AppResult;
use quinta_entity::connection::{Connection, SharingSetting};
use quinta_entity::store::ConnectionStore;

/// Repository for connection rows and the pairwise invariant.
#[derive(Debug, Clone)]
pub struct ConnectionRepository {
    pool: PgPool,
}

impl ConnectionRepository {
    /// Create a new connection repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Insert an `ACTIVE` connection for the pair inside an open transaction.
///
/// Shared with the request repository so that accepting a request can
/// create the connection in the same transaction as the status update.
pub(crate) async fn insert_connection_pair(
    conn: &mut PgConnection,
    user_a_id: Uuid,
    user_b_id: Uuid,
) -> AppResult<Connection> {
    sqlx::query_as::<_, Connection>(
        "INSERT INTO connections (user_a_id, user_b_id, status) \
         VALUES ($1, $2, 'ACTIVE') RETURNING *",
    )
    .bind(user_a_id)
    .bind(user_b_id)
    .fetch_one(conn)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db_err)
            if db_err.constraint() == Some("connections_pair_key") =>
        {
            AppError::conflict("A connection already exists between these users")
        }
        _ => AppError::with_source(ErrorKind::Database, "Failed to create connection", e),
    })
}

/// Insert the two default-false sharing rows for a fresh connection,
/// inside the same transaction as the connection insert.
pub(crate) async fn insert_default_sharing(
    conn: &mut PgConnection,
    connection_id: Uuid,
    user_a_id: Uuid,
    user_b_id: Uuid,
) -> AppResult<Vec<SharingSetting>> {
    sqlx::query_as::<_, SharingSetting>(
        "INSERT INTO connection_sharing_settings (connection_id, user_id) \
         VALUES ($1, $2), ($1, $3) RETURNING *",
    )
    .bind(connection_id)
    .bind(user_a_id)
    .bind(user_b_id)
    .fetch_all(conn)
    .await
    .map_err(|e| {
        AppError::with_source(ErrorKind::Database, "Failed to create sharing settings", e)
    })
}

#[async_trait]
impl ConnectionStore for ConnectionRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Connection>> {
        sqlx::query_as::<_, Connection>("SELECT * FROM connections WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find connection", e))
    }

    async fn find_existing(&self, user_x: Uuid, user_y: Uuid) -> AppResult<Option<Connection>> {
        sqlx::query_as::<_, Connection>(
            "SELECT * FROM connections \
             WHERE (user_a_id = $1 AND user_b_id = $2) \
                OR (user_a_id = $2 AND user_b_id = $1)",
        )
        .bind(user_x)
        .bind(user_y)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find connection for pair", e)
        })
    }

    async fn create_for_pair(&self, user_a: Uuid, user_b: Uuid) -> AppResult<Connection> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let connection = insert_connection_pair(&mut *tx, user_a, user_b).await?;
        insert_default_sharing(&mut *tx, connection.id, user_a, user_b).await?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit transaction", e)
        })?;

        Ok(connection)
    }

    async fn cancel(
        &self,
        id: Uuid,
        actor_id: Uuid,
        reason: Option<String>,
    ) -> AppResult<Connection> {
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Connection not found"))?;

        if existing.status == quinta_entity::connection::ConnectionStatus::Cancelled {
            return Err(AppError::validation("Connection is already cancelled"));
        }

        sqlx::query_as::<_, Connection>(
            "UPDATE connections \
             SET status = 'CANCELLED', cancelled_by = $2, cancelled_at = NOW(), \
                 cancellation_reason = $3, updated_at = NOW() \
             WHERE id = $1 AND status = 'ACTIVE' RETURNING *",
        )
        .bind(id)
        .bind(actor_id)
        .bind(reason)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to cancel connection", e))?
        .ok_or_else(|| AppError::validation("Connection is already cancelled"))
    }

    async fn list_active_for_user(&self, user_id: Uuid) -> AppResult<Vec<Connection>> {
        sqlx::query_as::<_, Connection>(
            "SELECT * FROM connections \
             WHERE (user_a_id = $1 OR user_b_id = $1) AND status = 'ACTIVE' \
             ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list connections", e))
    }

    async fn list_all(&self) -> AppResult<Vec<Connection>> {
        sqlx::query_as::<_, Connection>("SELECT * FROM connections ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to list all connections", e)
            })
    }
}
