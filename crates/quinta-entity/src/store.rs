//! Store traits for the connection engine.
//!
//! Services are constructed against these seams rather than concrete
//! repositories, so the full workflow can be exercised with in-memory
//! implementations in tests. `quinta-database` provides the PostgreSQL
//! implementations.
//!
//! Methods documented as *atomic* must perform all of their writes in a
//! single transactional unit: a crash in the middle must never leave an
//! `ACCEPTED` request without a connection, or a `USED` link without a
//! request.

use async_trait::async_trait;
use uuid::Uuid;

use quinta_core::AppResult;

use crate::connection::{
    Connection, ConnectionMessage, ConnectionRequest, InviteLink, NewConnectionMessage,
    NewConnectionRequest, NewInviteLink, RequestStatus, SharingSetting, SharingSettingPatch,
};
use crate::user::User;

/// Persistence and pairwise-uniqueness guarantees for [`Connection`] rows.
#[async_trait]
pub trait ConnectionStore: Send + Sync + 'static {
    /// Find a connection by primary key.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Connection>>;

    /// Symmetric lookup: any connection covering the unordered pair,
    /// regardless of status.
    async fn find_existing(&self, user_x: Uuid, user_y: Uuid) -> AppResult<Option<Connection>>;

    /// Create an `ACTIVE` connection for the pair. Atomic with the
    /// creation of two default-false sharing rows. Fails with `Conflict`
    /// when any connection already covers the pair.
    async fn create_for_pair(&self, user_a: Uuid, user_b: Uuid) -> AppResult<Connection>;

    /// Cancel a connection, stamping the audit fields. Fails with
    /// `NotFound` when missing and `Validation` when already cancelled.
    async fn cancel(
        &self,
        id: Uuid,
        actor_id: Uuid,
        reason: Option<String>,
    ) -> AppResult<Connection>;

    /// Active connections involving the given user.
    async fn list_active_for_user(&self, user_id: Uuid) -> AppResult<Vec<Connection>>;

    /// All connections, any status, newest first. Admin listings only.
    async fn list_all(&self) -> AppResult<Vec<Connection>>;
}

/// Persistence for [`ConnectionRequest`] rows and the transactional
/// accept path.
#[async_trait]
pub trait ConnectionRequestStore: Send + Sync + 'static {
    /// Find a request by primary key.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<ConnectionRequest>>;

    /// Any non-terminal request between the pair, in either direction.
    async fn find_pending_between(
        &self,
        user_x: Uuid,
        user_y: Uuid,
    ) -> AppResult<Option<ConnectionRequest>>;

    /// Create a request. Fails with `Conflict` when a non-terminal
    /// request already exists for the pair.
    async fn create(&self, data: &NewConnectionRequest) -> AppResult<ConnectionRequest>;

    /// Pending direct-invite requests addressed to the given user.
    async fn list_for_receiver(&self, user_id: Uuid) -> AppResult<Vec<ConnectionRequest>>;

    /// All requests awaiting admin approval, newest first.
    async fn list_admin_queue(&self) -> AppResult<Vec<ConnectionRequest>>;

    /// Accept a request currently in `from` status and create the
    /// connection plus both default sharing rows. Atomic. Fails with
    /// `Validation` when the request is no longer in `from`, and
    /// `Conflict` when a connection already covers the pair.
    async fn accept(
        &self,
        id: Uuid,
        from: RequestStatus,
        approved_by_admin_id: Option<Uuid>,
    ) -> AppResult<Connection>;

    /// Reject a request currently in `from` status. Fails with
    /// `Validation` when the request is no longer in `from`.
    async fn reject(&self, id: Uuid, from: RequestStatus) -> AppResult<ConnectionRequest>;
}

/// Persistence for [`InviteLink`] rows and the transactional consume path.
#[async_trait]
pub trait InviteLinkStore: Send + Sync + 'static {
    /// Persist a freshly issued link.
    async fn create(&self, data: &NewInviteLink) -> AppResult<InviteLink>;

    /// Find a link by its token.
    async fn find_by_token(&self, token: &str) -> AppResult<Option<InviteLink>>;

    /// Mark an `ACTIVE` link `USED` by `used_by_id` and create the
    /// admin-gated connection request. Atomic. Fails with `Validation`
    /// when the link is no longer `ACTIVE`.
    async fn consume(
        &self,
        link_id: Uuid,
        used_by_id: Uuid,
        request: &NewConnectionRequest,
    ) -> AppResult<ConnectionRequest>;
}

/// Persistence for [`SharingSetting`] rows.
#[async_trait]
pub trait SharingStore: Send + Sync + 'static {
    /// The row for one participant of a connection, if present.
    async fn find(&self, connection_id: Uuid, user_id: Uuid) -> AppResult<Option<SharingSetting>>;

    /// Create a default-false row. Used to backfill pre-existing
    /// connections that are missing settings.
    async fn create_default(&self, connection_id: Uuid, user_id: Uuid)
    -> AppResult<SharingSetting>;

    /// Apply a patch to the row, creating it first when absent.
    async fn upsert(
        &self,
        connection_id: Uuid,
        user_id: Uuid,
        patch: &SharingSettingPatch,
    ) -> AppResult<SharingSetting>;

    /// Both participants' rows for a connection.
    async fn list_for_connection(&self, connection_id: Uuid) -> AppResult<Vec<SharingSetting>>;
}

/// Append-only persistence for [`ConnectionMessage`] rows.
#[async_trait]
pub trait MessageStore: Send + Sync + 'static {
    /// Append a message to the log.
    async fn append(&self, data: &NewConnectionMessage) -> AppResult<ConnectionMessage>;

    /// All messages of a connection, creation-timestamp ascending.
    async fn list(&self, connection_id: Uuid) -> AppResult<Vec<ConnectionMessage>>;

    /// Number of messages in a connection.
    async fn count(&self, connection_id: Uuid) -> AppResult<u64>;
}

/// Read-only access to user records.
///
/// The admin gate is evaluated against the live record returned here,
/// never against the role cached in the bearer token.
#[async_trait]
pub trait UserDirectory: Send + Sync + 'static {
    /// Find a user by primary key.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Find a user by email (case-insensitive).
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;
}
