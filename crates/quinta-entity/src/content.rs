//! Content-provider seam for shared assessment data.
//!
//! The questionnaire and scoring engines are external collaborators; the
//! connection engine only needs read access to the categories a partner
//! may have enabled. Results are opaque JSON documents owned by the
//! assessment subsystem.

use async_trait::async_trait;
use uuid::Uuid;

use quinta_core::AppResult;

/// Read access to the shareable content categories of a user.
#[async_trait]
pub trait ContentProvider: Send + Sync + 'static {
    /// The user's most recent completed assessment results.
    async fn latest_inventories(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> AppResult<Vec<serde_json::Value>>;

    /// The user's questionnaire answers.
    async fn questionnaires(&self, user_id: Uuid) -> AppResult<Vec<serde_json::Value>>;

    /// The user's activity history.
    async fn activity_history(&self, user_id: Uuid) -> AppResult<Vec<serde_json::Value>>;
}
