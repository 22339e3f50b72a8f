//! Assessment content provider backed by the `assessment_results` table.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use quinta_core::error::{AppError, ErrorKind};
use quinta_core::result::AppResult;
use quinta_entity::content::ContentProvider;

/// Reads shareable assessment content for a user.
///
/// Questionnaire answers and activity history live in subsystems this
/// service has no read model for yet, so those categories resolve to
/// empty lists when enabled.
#[derive(Debug, Clone)]
pub struct AssessmentContentProvider {
    pool: PgPool,
}

impl AssessmentContentProvider {
    /// Create a new content provider.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContentProvider for AssessmentContentProvider {
    async fn latest_inventories(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> AppResult<Vec<serde_json::Value>> {
        sqlx::query_scalar::<_, serde_json::Value>(
            "SELECT result FROM assessment_results \
             WHERE user_id = $1 AND status = 'COMPLETED' \
             ORDER BY created_at DESC LIMIT $2",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load inventories", e))
    }

    async fn questionnaires(&self, _user_id: Uuid) -> AppResult<Vec<serde_json::Value>> {
        Ok(Vec::new())
    }

    async fn activity_history(&self, _user_id: Uuid) -> AppResult<Vec<serde_json::Value>> {
        Ok(Vec::new())
    }
}
