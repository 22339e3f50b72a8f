//! Direct-invite workflow and participant-facing connection views.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use quinta_core::error::AppError;
use quinta_core::result::AppResult;
use quinta_entity::connection::{
    Connection, ConnectionRequest, NewConnectionRequest, RequestStatus, SharingSetting,
};
use quinta_entity::store::{
    ConnectionRequestStore, ConnectionStore, SharingStore, UserDirectory,
};
use quinta_entity::user::UserSummary;

use crate::context::RequestContext;

/// Manages direct invites, request decisions, and connection listings
/// for regular participants.
#[derive(Clone)]
pub struct ConnectionService {
    connections: Arc<dyn ConnectionStore>,
    requests: Arc<dyn ConnectionRequestStore>,
    sharing: Arc<dyn SharingStore>,
    users: Arc<dyn UserDirectory>,
}

/// A pending request together with the sender's display info.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingRequestView {
    /// The request itself.
    pub request: ConnectionRequest,
    /// Display info for the user who sent it.
    pub sender: UserSummary,
}

/// One entry in a participant's connection list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartnerCard {
    /// The connection ID.
    pub connection_id: Uuid,
    /// Display info for the other participant.
    pub partner: UserSummary,
    /// When the connection was formed.
    pub connected_at: chrono::DateTime<chrono::Utc>,
}

/// Full participant view of one connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionDetail {
    /// The connection row.
    pub connection: Connection,
    /// Display info for the other participant.
    pub partner: UserSummary,
    /// The caller's own sharing settings.
    pub my_settings: SharingSetting,
    /// The partner's sharing settings.
    pub partner_settings: SharingSetting,
}

impl ConnectionService {
    /// Creates a new connection service.
    pub fn new(
        connections: Arc<dyn ConnectionStore>,
        requests: Arc<dyn ConnectionRequestStore>,
        sharing: Arc<dyn SharingStore>,
        users: Arc<dyn UserDirectory>,
    ) -> Self {
        Self {
            connections,
            requests,
            sharing,
            users,
        }
    }

    /// Sends a direct connection invite to the user registered under the
    /// given email address.
    pub async fn send_invite(
        &self,
        ctx: &RequestContext,
        receiver_email: &str,
        message: Option<String>,
    ) -> AppResult<ConnectionRequest> {
        let receiver = self
            .users
            .find_by_email(receiver_email)
            .await?
            .ok_or_else(|| AppError::not_found("No user found with this email address"))?;

        if receiver.id == ctx.user_id {
            return Err(AppError::validation("You cannot connect with yourself"));
        }

        // Fast-path duplicate checks for a friendly message; the unique
        // indexes remain the authoritative guard under concurrency.
        if self
            .connections
            .find_existing(ctx.user_id, receiver.id)
            .await?
            .is_some()
        {
            return Err(AppError::validation(
                "A connection already exists with this user",
            ));
        }
        if self
            .requests
            .find_pending_between(ctx.user_id, receiver.id)
            .await?
            .is_some()
        {
            return Err(AppError::validation(
                "A pending request already exists with this user",
            ));
        }

        let request = self
            .requests
            .create(&NewConnectionRequest {
                sender_id: ctx.user_id,
                receiver_id: receiver.id,
                status: RequestStatus::Pending,
                requires_admin_approval: false,
                message,
            })
            .await?;

        info!(
            request_id = %request.id,
            sender_id = %ctx.user_id,
            receiver_id = %receiver.id,
            "Connection invite sent"
        );

        Ok(request)
    }

    /// Accepts a pending direct invite. Only the receiver may accept;
    /// on success the connection and both default sharing rows exist.
    pub async fn accept_request(
        &self,
        ctx: &RequestContext,
        request_id: Uuid,
    ) -> AppResult<Connection> {
        let request = self
            .requests
            .find_by_id(request_id)
            .await?
            .ok_or_else(|| AppError::not_found("Connection request not found"))?;

        if request.receiver_id != ctx.user_id {
            return Err(AppError::forbidden(
                "Only the invited user can accept this request",
            ));
        }
        if request.status != RequestStatus::Pending {
            return Err(AppError::validation("Request has already been processed"));
        }

        let connection = self
            .requests
            .accept(request_id, RequestStatus::Pending, None)
            .await?;

        info!(
            request_id = %request_id,
            connection_id = %connection.id,
            "Connection request accepted"
        );

        Ok(connection)
    }

    /// Rejects a pending direct invite. Only the receiver may reject.
    pub async fn reject_request(
        &self,
        ctx: &RequestContext,
        request_id: Uuid,
    ) -> AppResult<ConnectionRequest> {
        let request = self
            .requests
            .find_by_id(request_id)
            .await?
            .ok_or_else(|| AppError::not_found("Connection request not found"))?;

        if request.receiver_id != ctx.user_id {
            return Err(AppError::forbidden(
                "Only the invited user can reject this request",
            ));
        }
        if request.status != RequestStatus::Pending {
            return Err(AppError::validation("Request has already been processed"));
        }

        let rejected = self
            .requests
            .reject(request_id, RequestStatus::Pending)
            .await?;

        info!(request_id = %request_id, "Connection request rejected");

        Ok(rejected)
    }

    /// Pending direct invites addressed to the caller, with sender info.
    pub async fn pending_requests(&self, ctx: &RequestContext) -> AppResult<Vec<PendingRequestView>> {
        let requests = self.requests.list_for_receiver(ctx.user_id).await?;

        let mut views = Vec::with_capacity(requests.len());
        for request in requests {
            let sender = self
                .users
                .find_by_id(request.sender_id)
                .await?
                .ok_or_else(|| AppError::not_found("Request sender not found"))?;
            views.push(PendingRequestView {
                request,
                sender: sender.summary(),
            });
        }
        Ok(views)
    }

    /// The caller's active connections, each with the partner's info.
    pub async fn connections(&self, ctx: &RequestContext) -> AppResult<Vec<PartnerCard>> {
        let connections = self.connections.list_active_for_user(ctx.user_id).await?;

        let mut cards = Vec::with_capacity(connections.len());
        for connection in connections {
            let partner_id = connection
                .partner_of(ctx.user_id)
                .ok_or_else(|| AppError::internal("Connection listing returned a non-participant"))?;
            let partner = self
                .users
                .find_by_id(partner_id)
                .await?
                .ok_or_else(|| AppError::not_found("Connection partner not found"))?;
            cards.push(PartnerCard {
                connection_id: connection.id,
                partner: partner.summary(),
                connected_at: connection.created_at,
            });
        }
        Ok(cards)
    }

    /// Full detail for one connection: partner info plus both sides'
    /// sharing settings. Participant-only.
    pub async fn connection_detail(
        &self,
        ctx: &RequestContext,
        connection_id: Uuid,
    ) -> AppResult<ConnectionDetail> {
        let connection = self
            .connections
            .find_by_id(connection_id)
            .await?
            .ok_or_else(|| AppError::not_found("Connection not found"))?;

        let partner_id = connection
            .partner_of(ctx.user_id)
            .ok_or_else(|| AppError::forbidden("You are not a participant of this connection"))?;

        let partner = self
            .users
            .find_by_id(partner_id)
            .await?
            .ok_or_else(|| AppError::not_found("Connection partner not found"))?;

        let my_settings = self.settings_or_default(connection_id, ctx.user_id).await?;
        let partner_settings = self.settings_or_default(connection_id, partner_id).await?;

        Ok(ConnectionDetail {
            connection,
            partner: partner.summary(),
            my_settings,
            partner_settings,
        })
    }

    /// Self-service removal: either participant may cancel.
    pub async fn remove_connection(
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

        let cancelled = self
            .connections
            .cancel(connection_id, ctx.user_id, None)
            .await?;

        info!(
            connection_id = %connection_id,
            cancelled_by = %ctx.user_id,
            "Connection removed by participant"
        );

        Ok(cancelled)
    }

    async fn settings_or_default(
        &self,
        connection_id: Uuid,
        user_id: Uuid,
    ) -> AppResult<SharingSetting> {
        match self.sharing.find(connection_id, user_id).await? {
            Some(settings) => Ok(settings),
            None => self.sharing.create_default(connection_id, user_id).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{TestWorld, ctx_for};
    use quinta_core::error::ErrorKind;

    #[tokio::test]
    async fn test_invite_creates_pending_request() {
        let world = TestWorld::new();
        let alice = world.add_user("Alice", "alice@example.com");
        let bob = world.add_user("Bob", "bob@example.com");

        let request = world
            .connection_service()
            .send_invite(&ctx_for(&alice), "bob@example.com", Some("hi".into()))
            .await
            .unwrap();

        assert_eq!(request.sender_id, alice.id);
        assert_eq!(request.receiver_id, bob.id);
        assert_eq!(request.status, RequestStatus::Pending);
        assert!(!request.requires_admin_approval);
    }

    #[tokio::test]
    async fn test_invite_unknown_email_is_not_found() {
        let world = TestWorld::new();
        let alice = world.add_user("Alice", "alice@example.com");

        let err = world
            .connection_service()
            .send_invite(&ctx_for(&alice), "nobody@example.com", None)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_self_invite_is_rejected() {
        let world = TestWorld::new();
        let alice = world.add_user("Alice", "alice@example.com");

        let err = world
            .connection_service()
            .send_invite(&ctx_for(&alice), "alice@example.com", None)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_duplicate_pending_request_is_rejected_in_both_directions() {
        let world = TestWorld::new();
        let alice = world.add_user("Alice", "alice@example.com");
        let bob = world.add_user("Bob", "bob@example.com");
        let service = world.connection_service();

        service
            .send_invite(&ctx_for(&alice), "bob@example.com", None)
            .await
            .unwrap();

        // Same direction.
        let err = service
            .send_invite(&ctx_for(&alice), "bob@example.com", None)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        // Reverse direction.
        let err = service
            .send_invite(&ctx_for(&bob), "alice@example.com", None)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_accept_creates_connection_and_default_sharing() {
        let world = TestWorld::new();
        let alice = world.add_user("Alice", "alice@example.com");
        let bob = world.add_user("Bob", "bob@example.com");
        let service = world.connection_service();

        let request = service
            .send_invite(&ctx_for(&alice), "bob@example.com", None)
            .await
            .unwrap();
        let connection = service
            .accept_request(&ctx_for(&bob), request.id)
            .await
            .unwrap();

        assert!(connection.has_participant(alice.id));
        assert!(connection.has_participant(bob.id));

        // Both sharing rows exist and default to all-false.
        let detail = service
            .connection_detail(&ctx_for(&alice), connection.id)
            .await
            .unwrap();
        assert!(!detail.my_settings.share_inventories);
        assert!(!detail.partner_settings.share_inventories);
    }

    #[tokio::test]
    async fn test_only_receiver_may_accept() {
        let world = TestWorld::new();
        let alice = world.add_user("Alice", "alice@example.com");
        let _bob = world.add_user("Bob", "bob@example.com");
        let service = world.connection_service();

        let request = service
            .send_invite(&ctx_for(&alice), "bob@example.com", None)
            .await
            .unwrap();

        // The sender cannot accept their own invite.
        let err = service
            .accept_request(&ctx_for(&alice), request.id)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Forbidden);
    }

    #[tokio::test]
    async fn test_accept_is_not_idempotent() {
        let world = TestWorld::new();
        let alice = world.add_user("Alice", "alice@example.com");
        let bob = world.add_user("Bob", "bob@example.com");
        let service = world.connection_service();

        let request = service
            .send_invite(&ctx_for(&alice), "bob@example.com", None)
            .await
            .unwrap();
        service
            .accept_request(&ctx_for(&bob), request.id)
            .await
            .unwrap();

        let err = service
            .accept_request(&ctx_for(&bob), request.id)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_reject_leaves_no_connection() {
        let world = TestWorld::new();
        let alice = world.add_user("Alice", "alice@example.com");
        let bob = world.add_user("Bob", "bob@example.com");
        let service = world.connection_service();

        let request = service
            .send_invite(&ctx_for(&alice), "bob@example.com", None)
            .await
            .unwrap();
        let rejected = service
            .reject_request(&ctx_for(&bob), request.id)
            .await
            .unwrap();
        assert_eq!(rejected.status, RequestStatus::Rejected);

        assert!(service.connections(&ctx_for(&alice)).await.unwrap().is_empty());

        // A rejected request no longer blocks a new invite.
        service
            .send_invite(&ctx_for(&alice), "bob@example.com", None)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_invite_blocked_by_existing_connection() {
        let world = TestWorld::new();
        let alice = world.add_user("Alice", "alice@example.com");
        let bob = world.add_user("Bob", "bob@example.com");
        let service = world.connection_service();

        let request = service
            .send_invite(&ctx_for(&alice), "bob@example.com", None)
            .await
            .unwrap();
        service
            .accept_request(&ctx_for(&bob), request.id)
            .await
            .unwrap();

        let err = service
            .send_invite(&ctx_for(&bob), "alice@example.com", None)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_remove_connection_requires_participant() {
        let world = TestWorld::new();
        let alice = world.add_user("Alice", "alice@example.com");
        let bob = world.add_user("Bob", "bob@example.com");
        let carol = world.add_user("Carol", "carol@example.com");
        let service = world.connection_service();

        let request = service
            .send_invite(&ctx_for(&alice), "bob@example.com", None)
            .await
            .unwrap();
        let connection = service
            .accept_request(&ctx_for(&bob), request.id)
            .await
            .unwrap();

        let err = service
            .remove_connection(&ctx_for(&carol), connection.id)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Forbidden);

        let cancelled = service
            .remove_connection(&ctx_for(&alice), connection.id)
            .await
            .unwrap();
        assert_eq!(cancelled.cancelled_by, Some(alice.id));

        // Cancelled connections drop out of the active listing.
        assert!(service.connections(&ctx_for(&bob)).await.unwrap().is_empty());
    }
}
