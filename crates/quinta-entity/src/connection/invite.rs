//! Invite link entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Lifecycle status of an invite link.
///
/// Expiry is not a stored status; it is checked lazily against
/// `expires_at` on every validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "invite_link_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InviteLinkStatus {
    /// The link can still be redeemed.
    Active,
    /// The link was redeemed. Terminal.
    Used,
}

/// A single-use, time-bounded shareable invite token.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InviteLink {
    /// Unique link identifier.
    pub id: Uuid,
    /// The unguessable token embedded in the shared URL.
    pub token: String,
    /// The user who generated the link.
    pub creator_id: Uuid,
    /// Current status.
    pub status: InviteLinkStatus,
    /// Lazy expiry deadline.
    pub expires_at: Option<DateTime<Utc>>,
    /// The user who redeemed the link, once used.
    pub used_by_id: Option<Uuid>,
    /// When the link was created.
    pub created_at: DateTime<Utc>,
}

impl InviteLink {
    /// Whether the link has passed its expiry deadline.
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|deadline| Utc::now() > deadline)
    }
}

/// Data required to create a new invite link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewInviteLink {
    /// Generated token.
    pub token: String,
    /// Creating user.
    pub creator_id: Uuid,
    /// Expiry deadline.
    pub expires_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn link(expires_at: Option<DateTime<Utc>>) -> InviteLink {
        InviteLink {
            id: Uuid::new_v4(),
            token: "AB12CD34".to_string(),
            creator_id: Uuid::new_v4(),
            status: InviteLinkStatus::Active,
            expires_at,
            used_by_id: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_expiry_is_lazy_on_timestamp() {
        assert!(link(Some(Utc::now() - Duration::hours(1))).is_expired());
        assert!(!link(Some(Utc::now() + Duration::days(7))).is_expired());
        assert!(!link(None).is_expired());
    }
}
