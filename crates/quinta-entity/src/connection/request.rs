//! Connection request entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Lifecycle status of a connection request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "request_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    /// Awaiting the receiver's decision (direct invite path).
    Pending,
    /// Awaiting a tenant-admin decision (shareable-link path).
    PendingAdminApproval,
    /// Accepted; a connection was created. Terminal.
    Accepted,
    /// Rejected by the receiver or an admin. Terminal.
    Rejected,
}

impl RequestStatus {
    /// Whether no further transition is permitted from this status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Accepted | Self::Rejected)
    }
}

/// A pending proposal to form a connection between two users.
///
/// At most one request with a non-terminal status exists per unordered
/// `(sender_id, receiver_id)` pair; the database enforces this with a
/// partial unique index.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ConnectionRequest {
    /// Unique request identifier.
    pub id: Uuid,
    /// The user who initiated the request (or created the invite link).
    pub sender_id: Uuid,
    /// The user being invited (or who redeemed the link).
    pub receiver_id: Uuid,
    /// Current status.
    pub status: RequestStatus,
    /// True only for link-originated requests.
    pub requires_admin_approval: bool,
    /// The admin who approved the request, once approved.
    pub approved_by_admin_id: Option<Uuid>,
    /// Optional personal message.
    pub message: Option<String>,
    /// When the request was created.
    pub created_at: DateTime<Utc>,
    /// When the request was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Data required to create a new connection request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewConnectionRequest {
    /// Request sender.
    pub sender_id: Uuid,
    /// Request receiver.
    pub receiver_id: Uuid,
    /// Initial status (`Pending` or `PendingAdminApproval`).
    pub status: RequestStatus,
    /// Whether admin approval is required (link path only).
    pub requires_admin_approval: bool,
    /// Optional personal message.
    pub message: Option<String>,
}
