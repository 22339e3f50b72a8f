//! Request DTOs.

use serde::{Deserialize, Serialize};
use validator::Validate;

use quinta_entity::connection::SharingSettingPatch;

/// POST /api/connections/invite
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SendInviteRequest {
    /// Email address of the user to invite.
    #[validate(email(message = "A valid email address is required"))]
    pub email: String,
    /// Optional personal message.
    pub message: Option<String>,
}

/// PUT /api/connections/{id}/settings
///
/// Absent flags are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateSettingsRequest {
    /// Expose completed inventories.
    pub share_inventories: Option<bool>,
    /// Expose received feedbacks.
    pub share_feedbacks: Option<bool>,
    /// Expose questionnaire answers.
    pub share_questionnaires: Option<bool>,
    /// Expose activity history.
    pub share_activity_history: Option<bool>,
}

impl UpdateSettingsRequest {
    /// Convert into the entity-level patch.
    pub fn into_patch(self) -> SharingSettingPatch {
        SharingSettingPatch {
            share_inventories: self.share_inventories,
            share_feedbacks: self.share_feedbacks,
            share_questionnaires: self.share_questionnaires,
            share_activity_history: self.share_activity_history,
        }
    }
}

/// POST /api/connections/{id}/messages
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SendMessageRequest {
    /// Message body.
    #[validate(length(min = 1, max = 4000, message = "Message must be 1-4000 characters"))]
    pub content: String,
}

/// DELETE /api/connections/admin/{id}
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminCancelRequest {
    /// Optional cancellation reason shown to the participants.
    pub reason: Option<String>,
}
