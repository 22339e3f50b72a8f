//! Admin moderation: link-request approvals, global listings, forced
//! cancellation, and message transcripts.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use quinta_auth::policy::is_connections_admin;
use quinta_core::error::AppError;
use quinta_core::result::AppResult;
use quinta_entity::connection::{Connection, ConnectionMessage, ConnectionRequest, RequestStatus};
use quinta_entity::store::{
    ConnectionRequestStore, ConnectionStore, MessageStore, UserDirectory,
};
use quinta_entity::user::{User, UserSummary};

use crate::context::RequestContext;

/// Cancellation reason recorded when an admin cancels without giving one.
const DEFAULT_ADMIN_CANCEL_REASON: &str = "Cancelled by administrator";

/// Moderation operations over connections and link-originated requests.
#[derive(Clone)]
pub struct ConnectionAdminService {
    connections: Arc<dyn ConnectionStore>,
    requests: Arc<dyn ConnectionRequestStore>,
    messages: Arc<dyn MessageStore>,
    users: Arc<dyn UserDirectory>,
}

/// A link-originated request awaiting approval, with both users' info.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminRequestView {
    /// The request itself.
    pub request: ConnectionRequest,
    /// The link creator.
    pub sender: UserSummary,
    /// The user who redeemed the link.
    pub receiver: UserSummary,
}

/// One entry in the global connection listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConnectionView {
    /// The connection row, any status.
    pub connection: Connection,
    /// First participant.
    pub user_a: UserSummary,
    /// Second participant.
    pub user_b: UserSummary,
    /// Who cancelled the connection, when cancelled.
    pub cancelled_by: Option<UserSummary>,
    /// Number of messages exchanged.
    pub message_count: u64,
}

/// A full message transcript for moderation review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminTranscript {
    /// The connection row.
    pub connection: Connection,
    /// First participant.
    pub user_a: UserSummary,
    /// Second participant.
    pub user_b: UserSummary,
    /// All messages, oldest first.
    pub messages: Vec<ConnectionMessage>,
    /// Total message count.
    pub count: u64,
}

impl ConnectionAdminService {
    /// Creates a new admin service.
    pub fn new(
        connections: Arc<dyn ConnectionStore>,
        requests: Arc<dyn ConnectionRequestStore>,
        messages: Arc<dyn MessageStore>,
        users: Arc<dyn UserDirectory>,
    ) -> Self {
        Self {
            connections,
            requests,
            messages,
            users,
        }
    }

    /// Verifies the caller holds the admin capability against their live
    /// user record. The token's role is never trusted here because roles
    /// can change between login and action.
    async fn ensure_admin(&self, ctx: &RequestContext) -> AppResult<User> {
        let user = self
            .users
            .find_by_id(ctx.user_id)
            .await?
            .ok_or_else(|| AppError::forbidden("Admin privileges required"))?;

        if !is_connections_admin(user.role, user.user_type) {
            return Err(AppError::forbidden("Admin privileges required"));
        }
        Ok(user)
    }

    async fn user_summary(&self, id: Uuid) -> AppResult<UserSummary> {
        Ok(self
            .users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?
            .summary())
    }

    /// Link-originated requests awaiting approval, newest first.
    pub async fn pending_approvals(&self, ctx: &RequestContext) -> AppResult<Vec<AdminRequestView>> {
        self.ensure_admin(ctx).await?;

        let requests = self.requests.list_admin_queue().await?;
        let mut views = Vec::with_capacity(requests.len());
        for request in requests {
            let sender = self.user_summary(request.sender_id).await?;
            let receiver = self.user_summary(request.receiver_id).await?;
            views.push(AdminRequestView {
                request,
                sender,
                receiver,
            });
        }
        Ok(views)
    }

    /// Approves a link-originated request, creating the connection and
    /// both default sharing rows atomically and stamping the approver.
    pub async fn approve(&self, ctx: &RequestContext, request_id: Uuid) -> AppResult<Connection> {
        let admin = self.ensure_admin(ctx).await?;

        let request = self
            .requests
            .find_by_id(request_id)
            .await?
            .ok_or_else(|| AppError::not_found("Connection request not found"))?;

        if request.status != RequestStatus::PendingAdminApproval {
            return Err(AppError::validation("Request has already been processed"));
        }

        let connection = self
            .requests
            .accept(
                request_id,
                RequestStatus::PendingAdminApproval,
                Some(admin.id),
            )
            .await?;

        info!(
            request_id = %request_id,
            connection_id = %connection.id,
            admin_id = %admin.id,
            "Connection request approved"
        );

        Ok(connection)
    }

    /// Rejects a link-originated request.
    pub async fn reject(&self, ctx: &RequestContext, request_id: Uuid) -> AppResult<ConnectionRequest> {
        let admin = self.ensure_admin(ctx).await?;

        let request = self
            .requests
            .find_by_id(request_id)
            .await?
            .ok_or_else(|| AppError::not_found("Connection request not found"))?;

        if request.status != RequestStatus::PendingAdminApproval {
            return Err(AppError::validation("Request has already been processed"));
        }

        let rejected = self
            .requests
            .reject(request_id, RequestStatus::PendingAdminApproval)
            .await?;

        info!(
            request_id = %request_id,
            admin_id = %admin.id,
            "Connection request rejected by admin"
        );

        Ok(rejected)
    }

    /// Every connection on the platform, any status, newest first, with
    /// participant info and message counts.
    pub async fn list_all(&self, ctx: &RequestContext) -> AppResult<Vec<AdminConnectionView>> {
        self.ensure_admin(ctx).await?;

        let connections = self.connections.list_all().await?;
        let mut views = Vec::with_capacity(connections.len());
        for connection in connections {
            let user_a = self.user_summary(connection.user_a_id).await?;
            let user_b = self.user_summary(connection.user_b_id).await?;
            let cancelled_by = match connection.cancelled_by {
                Some(id) => Some(self.user_summary(id).await?),
                None => None,
            };
            let message_count = self.messages.count(connection.id).await?;
            views.push(AdminConnectionView {
                connection,
                user_a,
                user_b,
                cancelled_by,
                message_count,
            });
        }
        Ok(views)
    }

    /// Forcibly cancels a connection, recording the acting admin and the
    /// given reason (or a default one).
    pub async fn cancel(
        &self,
        ctx: &RequestContext,
        connection_id: Uuid,
        reason: Option<String>,
    ) -> AppResult<Connection> {
        let admin = self.ensure_admin(ctx).await?;

        let reason = reason
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ADMIN_CANCEL_REASON.to_string());

        let cancelled = self
            .connections
            .cancel(connection_id, admin.id, Some(reason))
            .await?;

        info!(
            connection_id = %connection_id,
            admin_id = %admin.id,
            "Connection cancelled by admin"
        );

        Ok(cancelled)
    }

    /// The full message transcript of a connection, bypassing the
    /// participant check but still behind the admin gate.
    pub async fn transcript(
        &self,
        ctx: &RequestContext,
        connection_id: Uuid,
    ) -> AppResult<AdminTranscript> {
        self.ensure_admin(ctx).await?;

        let connection = self
            .connections
            .find_by_id(connection_id)
            .await?
            .ok_or_else(|| AppError::not_found("Connection not found"))?;

        let user_a = self.user_summary(connection.user_a_id).await?;
        let user_b = self.user_summary(connection.user_b_id).await?;
        let messages = self.messages.list(connection_id).await?;
        let count = messages.len() as u64;

        Ok(AdminTranscript {
            connection,
            user_a,
            user_b,
            messages,
            count,
        })
    }
}
