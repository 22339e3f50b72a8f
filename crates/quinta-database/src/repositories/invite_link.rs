//! Invite link repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use quinta_core::error::{AppError, ErrorKind};
use quinta_core::result::AppResult;
use quinta_entity::connection::{ConnectionRequest, InviteLink, NewConnectionRequest, NewInviteLink};
use quinta_entity::store::InviteLinkStore;

/// Repository for invite link rows and the transactional consume path.
#[derive(Debug, Clone)]
pub struct InviteLinkRepository {
    pool: PgPool,
}

impl InviteLinkRepository {
    /// Create a new invite link repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InviteLinkStore for InviteLinkRepository {
    async fn create(&self, data: &NewInviteLink) -> AppResult<InviteLink> {
        sqlx::query_as::<_, InviteLink>(
            "INSERT INTO connection_invite_links (token, creator_id, status, expires_at) \
             VALUES ($1, $2, 'ACTIVE', $3) RETURNING *",
        )
        .bind(&data.token)
        .bind(data.creator_id)
        .bind(data.expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err)
                if db_err.constraint() == Some("connection_invite_links_token_key") =>
            {
                AppError::conflict("Invite token collision, retry")
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create invite link", e),
        })
    }

    async fn find_by_token(&self, token: &str) -> AppResult<Option<InviteLink>> {
        sqlx::query_as::<_, InviteLink>("SELECT * FROM connection_invite_links WHERE token = $1")
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find invite link", e)
            })
    }

    async fn consume(
        &self,
        link_id: Uuid,
        used_by_id: Uuid,
        request: &NewConnectionRequest,
    ) -> AppResult<ConnectionRequest> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        // ACTIVE -> USED exactly once; a concurrent redeem loses here.
        let updated = sqlx::query(
            "UPDATE connection_invite_links \
             SET status = 'USED', used_by_id = $2 \
             WHERE id = $1 AND status = 'ACTIVE'",
        )
        .bind(link_id)
        .bind(used_by_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to consume link", e))?;

        if updated.rows_affected() == 0 {
            return Err(AppError::validation("This invite link has already been used"));
        }

        let request = sqlx::query_as::<_, ConnectionRequest>(
            "INSERT INTO connection_requests \
             (sender_id, receiver_id, status, requires_admin_approval, message) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(request.sender_id)
        .bind(request.receiver_id)
        .bind(request.status)
        .bind(request.requires_admin_approval)
        .bind(&request.message)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err)
                if db_err.constraint() == Some("connection_requests_pending_pair_key") =>
            {
                AppError::conflict("A pending request already exists between these users")
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create request", e),
        })?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit transaction", e)
        })?;

        Ok(request)
    }
}
