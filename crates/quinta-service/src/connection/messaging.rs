//! Participant messaging over a connection.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use quinta_core::error::AppError;
use quinta_core::result::AppResult;
use quinta_entity::connection::{Connection, ConnectionMessage, NewConnectionMessage};
use quinta_entity::store::{ConnectionStore, MessageStore};

use crate::context::RequestContext;

/// Append-only message exchange between the two participants.
///
/// Clients poll the list endpoint for the live feel; there is no push
/// channel. Cancelled connections intentionally still accept messages so
/// a final exchange about the cancellation remains possible.
#[derive(Clone)]
pub struct MessagingChannel {
    connections: Arc<dyn ConnectionStore>,
    messages: Arc<dyn MessageStore>,
}

impl MessagingChannel {
    /// Creates a new messaging channel.
    pub fn new(connections: Arc<dyn ConnectionStore>, messages: Arc<dyn MessageStore>) -> Self {
        Self {
            connections,
            messages,
        }
    }

    async fn participant_connection(
        &self,
        ctx: &RequestContext,
        connection_id: Uuid,
    ) -> AppResult<Connection> {
        let connection = self
            .connections
            .find_by_id(connection_id)
            .await?
            .ok_or_else(|| AppError::not_found("Connection not found"))?;

        if !connection.has_participant(ctx.user_id) {
            return Err(AppError::forbidden(
                "You are not a participant of this connection",
            ));
        }
        Ok(connection)
    }

    /// Appends a message from the caller to the connection's log.
    pub async fn send(
        &self,
        ctx: &RequestContext,
        connection_id: Uuid,
        content: &str,
    ) -> AppResult<ConnectionMessage> {
        self.participant_connection(ctx, connection_id).await?;

        let content = content.trim();
        if content.is_empty() {
            return Err(AppError::validation("Message content cannot be empty"));
        }

        let message = self
            .messages
            .append(&NewConnectionMessage {
                connection_id,
                sender_id: ctx.user_id,
                content: content.to_string(),
            })
            .await?;

        info!(
            connection_id = %connection_id,
            message_id = %message.id,
            "Message sent"
        );

        Ok(message)
    }

    /// All messages of the connection, oldest first.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        connection_id: Uuid,
    ) -> AppResult<Vec<ConnectionMessage>> {
        self.participant_connection(ctx, connection_id).await?;
        self.messages.list(connection_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{TestWorld, ctx_for};
    use quinta_core::error::ErrorKind;

    #[tokio::test]
    async fn test_messages_are_listed_oldest_first() {
        let world = TestWorld::new();
        let (alice, bob, connection) = world.connected_pair().await;
        let channel = world.messaging_channel();

        channel
            .send(&ctx_for(&alice), connection.id, "first")
            .await
            .unwrap();
        channel
            .send(&ctx_for(&bob), connection.id, "second")
            .await
            .unwrap();

        let messages = channel.list(&ctx_for(&alice), connection.id).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, "first");
        assert_eq!(messages[1].content, "second");
    }

    #[tokio::test]
    async fn test_non_participant_cannot_send_or_read() {
        let world = TestWorld::new();
        let (_alice, _bob, connection) = world.connected_pair().await;
        let carol = world.add_user("Carol", "carol@example.com");
        let channel = world.messaging_channel();

        let err = channel
            .send(&ctx_for(&carol), connection.id, "hi")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Forbidden);

        let err = channel
            .list(&ctx_for(&carol), connection.id)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Forbidden);
    }

    #[tokio::test]
    async fn test_empty_message_is_rejected() {
        let world = TestWorld::new();
        let (alice, _bob, connection) = world.connected_pair().await;

        let err = world
            .messaging_channel()
            .send(&ctx_for(&alice), connection.id, "   ")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_send_allowed_on_cancelled_connection() {
        let world = TestWorld::new();
        let (alice, bob, connection) = world.connected_pair().await;

        world
            .connection_service()
            .remove_connection(&ctx_for(&alice), connection.id)
            .await
            .unwrap();

        // No status gate on messaging.
        world
            .messaging_channel()
            .send(&ctx_for(&bob), connection.id, "goodbye")
            .await
            .unwrap();
    }
}
