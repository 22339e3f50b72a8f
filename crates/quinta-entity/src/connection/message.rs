//! Connection message entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A message in the append-only log of a connection.
///
/// `sender_id` is always one of the connection's two participants;
/// ordering is creation-timestamp ascending.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ConnectionMessage {
    /// Unique message identifier.
    pub id: Uuid,
    /// The connection this message belongs to.
    pub connection_id: Uuid,
    /// The participant who sent the message.
    pub sender_id: Uuid,
    /// Message body.
    pub content: String,
    /// Message type, currently always `TEXT`.
    pub message_type: String,
    /// When the receiver read the message, if tracked.
    pub read_at: Option<DateTime<Utc>>,
    /// When the message was created.
    pub created_at: DateTime<Utc>,
}

/// Data required to append a new message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewConnectionMessage {
    /// Target connection.
    pub connection_id: Uuid,
    /// Sending participant.
    pub sender_id: Uuid,
    /// Message body.
    pub content: String,
}
