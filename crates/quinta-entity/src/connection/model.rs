//! Connection entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Lifecycle status of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "connection_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConnectionStatus {
    /// The connection is live; content sharing and messaging are enabled.
    Active,
    /// The connection was cancelled by a participant or an admin. Terminal.
    Cancelled,
}

/// The persisted, bidirectional link between two users.
///
/// At most one connection exists per unordered `(user_a_id, user_b_id)`
/// pair, regardless of status; the database enforces this with a unique
/// index over `LEAST/GREATEST` of the two IDs.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Connection {
    /// Unique connection identifier.
    pub id: Uuid,
    /// First participant (the original request sender).
    pub user_a_id: Uuid,
    /// Second participant (the original request receiver).
    pub user_b_id: Uuid,
    /// Current status.
    pub status: ConnectionStatus,
    /// Who cancelled the connection, when cancelled.
    pub cancelled_by: Option<Uuid>,
    /// When the connection was cancelled.
    pub cancelled_at: Option<DateTime<Utc>>,
    /// Free-form cancellation reason.
    pub cancellation_reason: Option<String>,
    /// Moderation notes, admin-visible only.
    pub admin_notes: Option<String>,
    /// When the connection was created.
    pub created_at: DateTime<Utc>,
    /// When the connection was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Connection {
    /// Whether the given user is one of the two participants.
    pub fn has_participant(&self, user_id: Uuid) -> bool {
        self.user_a_id == user_id || self.user_b_id == user_id
    }

    /// The other participant relative to `user_id`.
    ///
    /// Returns `None` when `user_id` is not a participant.
    pub fn partner_of(&self, user_id: Uuid) -> Option<Uuid> {
        if self.user_a_id == user_id {
            Some(self.user_b_id)
        } else if self.user_b_id == user_id {
            Some(self.user_a_id)
        } else {
            None
        }
    }
}
