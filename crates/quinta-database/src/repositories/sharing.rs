//! Sharing settings repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use quinta_core::error::{AppError, ErrorKind};
use quinta_core::result::AppResult;
use quinta_entity::connection::{SharingSetting, SharingSettingPatch};
use quinta_entity::store::SharingStore;

/// Repository for the per-participant sharing flags of a connection.
#[derive(Debug, Clone)]
pub struct SharingRepository {
    pool: PgPool,
}

impl SharingRepository {
    /// Create a new sharing repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SharingStore for SharingRepository {
    async fn find(&self, connection_id: Uuid, user_id: Uuid) -> AppResult<Option<SharingSetting>> {
        sqlx::query_as::<_, SharingSetting>(
            "SELECT * FROM connection_sharing_settings \
             WHERE connection_id = $1 AND user_id = $2",
        )
        .bind(connection_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find sharing settings", e)
        })
    }

    async fn create_default(
        &self,
        connection_id: Uuid,
        user_id: Uuid,
    ) -> AppResult<SharingSetting> {
        // A no-op update on conflict keeps this idempotent under a
        // concurrent backfill and still returns the row.
        sqlx::query_as::<_, SharingSetting>(
            "INSERT INTO connection_sharing_settings (connection_id, user_id) \
             VALUES ($1, $2) \
             ON CONFLICT (connection_id, user_id) \
             DO UPDATE SET user_id = EXCLUDED.user_id \
             RETURNING *",
        )
        .bind(connection_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to create sharing settings", e)
        })
    }

    async fn upsert(
        &self,
        connection_id: Uuid,
        user_id: Uuid,
        patch: &SharingSettingPatch,
    ) -> AppResult<SharingSetting> {
        // COALESCE against the stored value so absent patch fields leave
        // the flag untouched; the insert arm uses FALSE as the base.
        sqlx::query_as::<_, SharingSetting>(
            "INSERT INTO connection_sharing_settings \
             (connection_id, user_id, share_inventories, share_feedbacks, \
              share_questionnaires, share_activity_history) \
             VALUES ($1, $2, COALESCE($3, FALSE), COALESCE($4, FALSE), \
                     COALESCE($5, FALSE), COALESCE($6, FALSE)) \
             ON CONFLICT (connection_id, user_id) DO UPDATE SET \
                 share_inventories = COALESCE($3, connection_sharing_settings.share_inventories), \
                 share_feedbacks = COALESCE($4, connection_sharing_settings.share_feedbacks), \
                 share_questionnaires = COALESCE($5, connection_sharing_settings.share_questionnaires), \
                 share_activity_history = COALESCE($6, connection_sharing_settings.share_activity_history) \
             RETURNING *",
        )
        .bind(connection_id)
        .bind(user_id)
        .bind(patch.share_inventories)
        .bind(patch.share_feedbacks)
        .bind(patch.share_questionnaires)
        .bind(patch.share_activity_history)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update sharing settings", e)
        })
    }

    async fn list_for_connection(&self, connection_id: Uuid) -> AppResult<Vec<SharingSetting>> {
        sqlx::query_as::<_, SharingSetting>(
            "SELECT * FROM connection_sharing_settings WHERE connection_id = $1",
        )
        .bind(connection_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list sharing settings", e)
        })
    }
}
