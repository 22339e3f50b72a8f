//! Connection request repository implementation.
//!
//! `accept` is the one path that must be atomic across aggregates: the
//! status update, the connection insert, and both sharing rows happen in
//! a single transaction so a crash can never leave an `ACCEPTED` request
//! without a connection.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use quinta_core::error::{AppError, ErrorKind};
use quinta_core::result::AppResult;
use quinta_entity::connection::{Connection, ConnectionRequest, NewConnectionRequest, RequestStatus};
use quinta_entity::store::ConnectionRequestStore;

use super::connection::{insert_connection_pair, insert_default_sharing};

/// Repository for connection request rows and the transactional accept.
#[derive(Debug, Clone)]
pub struct ConnectionRequestRepository {
    pool: PgPool,
}

impl ConnectionRequestRepository {
    /// Create a new request repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConnectionRequestStore for ConnectionRequestRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<ConnectionRequest>> {
        sqlx::query_as::<_, ConnectionRequest>("SELECT * FROM connection_requests WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find request", e))
    }

    async fn find_pending_between(
        &self,
        user_x: Uuid,
        user_y: Uuid,
    ) -> AppResult<Option<ConnectionRequest>> {
        sqlx::query_as::<_, ConnectionRequest>(
            "SELECT * FROM connection_requests \
             WHERE ((sender_id = $1 AND receiver_id = $2) \
                 OR (sender_id = $2 AND receiver_id = $1)) \
               AND status IN ('PENDING', 'PENDING_ADMIN_APPROVAL')",
        )
        .bind(user_x)
        .bind(user_y)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find pending request", e)
        })
    }

    async fn create(&self, data: &NewConnectionRequest) -> AppResult<ConnectionRequest> {
        sqlx::query_as::<_, ConnectionRequest>(
            "INSERT INTO connection_requests \
             (sender_id, receiver_id, status, requires_admin_approval, message) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(data.sender_id)
        .bind(data.receiver_id)
        .bind(data.status)
        .bind(data.requires_admin_approval)
        .bind(&data.message)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err)
                if db_err.constraint() == Some("connection_requests_pending_pair_key") =>
            {
                AppError::conflict("A pending request already exists between these users")
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create request", e),
        })
    }

    async fn list_for_receiver(&self, user_id: Uuid) -> AppResult<Vec<ConnectionRequest>> {
        sqlx::query_as::<_, ConnectionRequest>(
            "SELECT * FROM connection_requests \
             WHERE receiver_id = $1 AND status = 'PENDING' \
             ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list pending requests", e)
        })
    }

    async fn list_admin_queue(&self) -> AppResult<Vec<ConnectionRequest>> {
        sqlx::query_as::<_, ConnectionRequest>(
            "SELECT * FROM connection_requests \
             WHERE status = 'PENDING_ADMIN_APPROVAL' AND requires_admin_approval = TRUE \
             ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list admin queue", e))
    }

    async fn accept(
        &self,
        id: Uuid,
        from: RequestStatus,
        approved_by_admin_id: Option<Uuid>,
    ) -> AppResult<Connection> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        // Conditional update makes the transition effective exactly once
        // even under concurrent double-submission.
        let request = sqlx::query_as::<_, ConnectionRequest>(
            "UPDATE connection_requests \
             SET status = 'ACCEPTED', approved_by_admin_id = $3, updated_at = NOW() \
             WHERE id = $1 AND status = $2 RETURNING *",
        )
        .bind(id)
        .bind(from)
        .bind(approved_by_admin_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to accept request", e))?
        .ok_or_else(|| AppError::validation("Request has already been processed"))?;

        let connection =
            insert_connection_pair(&mut *tx, request.sender_id, request.receiver_id).await?;
        insert_default_sharing(
            &mut *tx,
            connection.id,
            request.sender_id,
            request.receiver_id,
        )
        .await?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit transaction", e)
        })?;

        Ok(connection)
    }

    async fn reject(&self, id: Uuid, from: RequestStatus) -> AppResult<ConnectionRequest> {
        sqlx::query_as::<_, ConnectionRequest>(
            "UPDATE connection_requests \
             SET status = 'REJECTED', updated_at = NOW() \
             WHERE id = $1 AND status = $2 RETURNING *",
        )
        .bind(id)
        .bind(from)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to reject request", e))?
        .ok_or_else(|| AppError::validation("Request has already been processed"))
    }
}
