//! Per-user, per-connection sharing settings.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Boolean capability flags controlling what one participant exposes to
/// the other. Exactly one row exists per `(connection_id, user_id)`;
/// all flags default to `false`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SharingSetting {
    /// Unique row identifier.
    pub id: Uuid,
    /// The connection this row belongs to.
    pub connection_id: Uuid,
    /// The participant whose sharing choices this row records.
    pub user_id: Uuid,
    /// Expose completed assessment inventories.
    pub share_inventories: bool,
    /// Expose received feedbacks.
    pub share_feedbacks: bool,
    /// Expose questionnaire answers.
    pub share_questionnaires: bool,
    /// Expose activity history.
    pub share_activity_history: bool,
}

/// Partial update of the four sharing flags. Absent fields are left
/// unchanged; only the owning user may apply a patch to their row.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SharingSettingPatch {
    /// New value for `share_inventories`, if provided.
    pub share_inventories: Option<bool>,
    /// New value for `share_feedbacks`, if provided.
    pub share_feedbacks: Option<bool>,
    /// New value for `share_questionnaires`, if provided.
    pub share_questionnaires: Option<bool>,
    /// New value for `share_activity_history`, if provided.
    pub share_activity_history: Option<bool>,
}

impl SharingSetting {
    /// Apply a patch, returning the updated flags.
    pub fn apply(&self, patch: &SharingSettingPatch) -> SharingSetting {
        SharingSetting {
            id: self.id,
            connection_id: self.connection_id,
            user_id: self.user_id,
            share_inventories: patch.share_inventories.unwrap_or(self.share_inventories),
            share_feedbacks: patch.share_feedbacks.unwrap_or(self.share_feedbacks),
            share_questionnaires: patch
                .share_questionnaires
                .unwrap_or(self.share_questionnaires),
            share_activity_history: patch
                .share_activity_history
                .unwrap_or(self.share_activity_history),
        }
    }
}
