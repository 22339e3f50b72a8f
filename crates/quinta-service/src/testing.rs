//! In-memory store implementations and a test harness for exercising
//! the full connection workflow without a database.
//!
//! The fakes enforce the same invariants the PostgreSQL repositories
//! get from unique indexes (one connection per pair, one non-terminal
//! request per pair, single-use links) so workflow tests observe the
//! production semantics.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use uuid::Uuid;

use quinta_core::config::ConnectConfig;
use quinta_core::error::AppError;
use quinta_core::result::AppResult;
use quinta_entity::connection::{
    Connection, ConnectionMessage, ConnectionRequest, ConnectionStatus, InviteLink,
    InviteLinkStatus, NewConnectionMessage, NewConnectionRequest, NewInviteLink, RequestStatus,
    SharingSetting, SharingSettingPatch,
};
use quinta_entity::content::ContentProvider;
use quinta_entity::store::{
    ConnectionRequestStore, ConnectionStore, InviteLinkStore, MessageStore, SharingStore,
    UserDirectory,
};
use quinta_entity::user::{User, UserRole, UserType};

use crate::connection::{
    ConnectionAdminService, ConnectionService, InviteLinkIssuer, MessagingChannel, SharingPolicy,
};
use crate::context::RequestContext;

#[derive(Default)]
struct State {
    users: Vec<User>,
    connections: Vec<Connection>,
    requests: Vec<ConnectionRequest>,
    links: Vec<InviteLink>,
    sharing: Vec<SharingSetting>,
    messages: Vec<ConnectionMessage>,
    inventories: HashMap<Uuid, Vec<serde_json::Value>>,
}

/// One shared in-memory store implementing every persistence trait.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

fn same_pair(a1: Uuid, b1: Uuid, a2: Uuid, b2: Uuid) -> bool {
    (a1 == a2 && b1 == b2) || (a1 == b2 && b1 == a2)
}

impl MemoryStore {
    fn insert_connection_locked(
        state: &mut State,
        user_a: Uuid,
        user_b: Uuid,
    ) -> AppResult<Connection> {
        if state
            .connections
            .iter()
            .any(|c| same_pair(c.user_a_id, c.user_b_id, user_a, user_b))
        {
            return Err(AppError::conflict(
                "A connection already exists between these users",
            ));
        }
        let now = Utc::now();
        let connection = Connection {
            id: Uuid::new_v4(),
            user_a_id: user_a,
            user_b_id: user_b,
            status: ConnectionStatus::Active,
            cancelled_by: None,
            cancelled_at: None,
            cancellation_reason: None,
            admin_notes: None,
            created_at: now,
            updated_at: now,
        };
        state.connections.push(connection.clone());
        for user_id in [user_a, user_b] {
            state.sharing.push(SharingSetting {
                id: Uuid::new_v4(),
                connection_id: connection.id,
                user_id,
                share_inventories: false,
                share_feedbacks: false,
                share_questionnaires: false,
                share_activity_history: false,
            });
        }
        Ok(connection)
    }

    fn insert_request_locked(
        state: &mut State,
        data: &NewConnectionRequest,
    ) -> AppResult<ConnectionRequest> {
        if state.requests.iter().any(|r| {
            !r.status.is_terminal()
                && same_pair(r.sender_id, r.receiver_id, data.sender_id, data.receiver_id)
        }) {
            return Err(AppError::conflict(
                "A pending request already exists between these users",
            ));
        }
        let now = Utc::now();
        let request = ConnectionRequest {
            id: Uuid::new_v4(),
            sender_id: data.sender_id,
            receiver_id: data.receiver_id,
            status: data.status,
            requires_admin_approval: data.requires_admin_approval,
            approved_by_admin_id: None,
            message: data.message.clone(),
            created_at: now,
            updated_at: now,
        };
        state.requests.push(request.clone());
        Ok(request)
    }
}

#[async_trait]
impl ConnectionStore for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Connection>> {
        let state = self.state.lock().unwrap();
        Ok(state.connections.iter().find(|c| c.id == id).cloned())
    }

    async fn find_existing(&self, user_x: Uuid, user_y: Uuid) -> AppResult<Option<Connection>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .connections
            .iter()
            .find(|c| same_pair(c.user_a_id, c.user_b_id, user_x, user_y))
            .cloned())
    }

    async fn create_for_pair(&self, user_a: Uuid, user_b: Uuid) -> AppResult<Connection> {
        let mut state = self.state.lock().unwrap();
        Self::insert_connection_locked(&mut state, user_a, user_b)
    }

    async fn cancel(
        &self,
        id: Uuid,
        actor_id: Uuid,
        reason: Option<String>,
    ) -> AppResult<Connection> {
        let mut state = self.state.lock().unwrap();
        let connection = state
            .connections
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| AppError::not_found("Connection not found"))?;
        if connection.status == ConnectionStatus::Cancelled {
            return Err(AppError::validation("Connection is already cancelled"));
        }
        connection.status = ConnectionStatus::Cancelled;
        connection.cancelled_by = Some(actor_id);
        connection.cancelled_at = Some(Utc::now());
        connection.cancellation_reason = reason;
        connection.updated_at = Utc::now();
        Ok(connection.clone())
    }

    async fn list_active_for_user(&self, user_id: Uuid) -> AppResult<Vec<Connection>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .connections
            .iter()
            .filter(|c| c.status == ConnectionStatus::Active && c.has_participant(user_id))
            .cloned()
            .collect())
    }

    async fn list_all(&self) -> AppResult<Vec<Connection>> {
        let state = self.state.lock().unwrap();
        let mut all: Vec<_> = state.connections.clone();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }
}

#[async_trait]
impl ConnectionRequestStore for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<ConnectionRequest>> {
        let state = self.state.lock().unwrap();
        Ok(state.requests.iter().find(|r| r.id == id).cloned())
    }

    async fn find_pending_between(
        &self,
        user_x: Uuid,
        user_y: Uuid,
    ) -> AppResult<Option<ConnectionRequest>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .requests
            .iter()
            .find(|r| {
                !r.status.is_terminal() && same_pair(r.sender_id, r.receiver_id, user_x, user_y)
            })
            .cloned())
    }

    async fn create(&self, data: &NewConnectionRequest) -> AppResult<ConnectionRequest> {
        let mut state = self.state.lock().unwrap();
        Self::insert_request_locked(&mut state, data)
    }

    async fn list_for_receiver(&self, user_id: Uuid) -> AppResult<Vec<ConnectionRequest>> {
        let state = self.state.lock().unwrap();
        let mut pending: Vec<_> = state
            .requests
            .iter()
            .filter(|r| r.receiver_id == user_id && r.status == RequestStatus::Pending)
            .cloned()
            .collect();
        pending.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(pending)
    }

    async fn list_admin_queue(&self) -> AppResult<Vec<ConnectionRequest>> {
        let state = self.state.lock().unwrap();
        let mut queue: Vec<_> = state
            .requests
            .iter()
            .filter(|r| r.status == RequestStatus::PendingAdminApproval)
            .cloned()
            .collect();
        queue.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(queue)
    }

    async fn accept(
        &self,
        id: Uuid,
        from: RequestStatus,
        approved_by_admin_id: Option<Uuid>,
    ) -> AppResult<Connection> {
        let mut state = self.state.lock().unwrap();
        let (sender_id, receiver_id) = {
            let request = state
                .requests
                .iter()
                .find(|r| r.id == id && r.status == from)
                .ok_or_else(|| AppError::validation("Request has already been processed"))?;
            (request.sender_id, request.receiver_id)
        };

        let connection = Self::insert_connection_locked(&mut state, sender_id, receiver_id)?;

        let request = state
            .requests
            .iter_mut()
            .find(|r| r.id == id)
            .expect("request vanished mid-accept");
        request.status = RequestStatus::Accepted;
        request.approved_by_admin_id = approved_by_admin_id;
        request.updated_at = Utc::now();

        Ok(connection)
    }

    async fn reject(&self, id: Uuid, from: RequestStatus) -> AppResult<ConnectionRequest> {
        let mut state = self.state.lock().unwrap();
        let request = state
            .requests
            .iter_mut()
            .find(|r| r.id == id && r.status == from)
            .ok_or_else(|| AppError::validation("Request has already been processed"))?;
        request.status = RequestStatus::Rejected;
        request.updated_at = Utc::now();
        Ok(request.clone())
    }
}

#[async_trait]
impl InviteLinkStore for MemoryStore {
    async fn create(&self, data: &NewInviteLink) -> AppResult<InviteLink> {
        let mut state = self.state.lock().unwrap();
        if state.links.iter().any(|l| l.token == data.token) {
            return Err(AppError::conflict("Invite token collision, retry"));
        }
        let link = InviteLink {
            id: Uuid::new_v4(),
            token: data.token.clone(),
            creator_id: data.creator_id,
            status: InviteLinkStatus::Active,
            expires_at: data.expires_at,
            used_by_id: None,
            created_at: Utc::now(),
        };
        state.links.push(link.clone());
        Ok(link)
    }

    async fn find_by_token(&self, token: &str) -> AppResult<Option<InviteLink>> {
        let state = self.state.lock().unwrap();
        Ok(state.links.iter().find(|l| l.token == token).cloned())
    }

    async fn consume(
        &self,
        link_id: Uuid,
        used_by_id: Uuid,
        request: &NewConnectionRequest,
    ) -> AppResult<ConnectionRequest> {
        let mut state = self.state.lock().unwrap();
        {
            let link = state
                .links
                .iter_mut()
                .find(|l| l.id == link_id && l.status == InviteLinkStatus::Active)
                .ok_or_else(|| {
                    AppError::validation("This invite link has already been used")
                })?;
            link.status = InviteLinkStatus::Used;
            link.used_by_id = Some(used_by_id);
        }
        Self::insert_request_locked(&mut state, request)
    }
}

#[async_trait]
impl SharingStore for MemoryStore {
    async fn find(&self, connection_id: Uuid, user_id: Uuid) -> AppResult<Option<SharingSetting>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .sharing
            .iter()
            .find(|s| s.connection_id == connection_id && s.user_id == user_id)
            .cloned())
    }

    async fn create_default(
        &self,
        connection_id: Uuid,
        user_id: Uuid,
    ) -> AppResult<SharingSetting> {
        let mut state = self.state.lock().unwrap();
        if let Some(existing) = state
            .sharing
            .iter()
            .find(|s| s.connection_id == connection_id && s.user_id == user_id)
        {
            return Ok(existing.clone());
        }
        let settings = SharingSetting {
            id: Uuid::new_v4(),
            connection_id,
            user_id,
            share_inventories: false,
            share_feedbacks: false,
            share_questionnaires: false,
            share_activity_history: false,
        };
        state.sharing.push(settings.clone());
        Ok(settings)
    }

    async fn upsert(
        &self,
        connection_id: Uuid,
        user_id: Uuid,
        patch: &SharingSettingPatch,
    ) -> AppResult<SharingSetting> {
        let mut state = self.state.lock().unwrap();
        if let Some(existing) = state
            .sharing
            .iter_mut()
            .find(|s| s.connection_id == connection_id && s.user_id == user_id)
        {
            *existing = existing.apply(patch);
            return Ok(existing.clone());
        }
        let base = SharingSetting {
            id: Uuid::new_v4(),
            connection_id,
            user_id,
            share_inventories: false,
            share_feedbacks: false,
            share_questionnaires: false,
            share_activity_history: false,
        };
        let settings = base.apply(patch);
        state.sharing.push(settings.clone());
        Ok(settings)
    }

    async fn list_for_connection(&self, connection_id: Uuid) -> AppResult<Vec<SharingSetting>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .sharing
            .iter()
            .filter(|s| s.connection_id == connection_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl MessageStore for MemoryStore {
    async fn append(&self, data: &NewConnectionMessage) -> AppResult<ConnectionMessage> {
        let mut state = self.state.lock().unwrap();
        let message = ConnectionMessage {
            id: Uuid::new_v4(),
            connection_id: data.connection_id,
            sender_id: data.sender_id,
            content: data.content.clone(),
            message_type: "TEXT".to_string(),
            read_at: None,
            created_at: Utc::now(),
        };
        state.messages.push(message.clone());
        Ok(message)
    }

    async fn list(&self, connection_id: Uuid) -> AppResult<Vec<ConnectionMessage>> {
        let state = self.state.lock().unwrap();
        // Insertion order is creation order.
        Ok(state
            .messages
            .iter()
            .filter(|m| m.connection_id == connection_id)
            .cloned()
            .collect())
    }

    async fn count(&self, connection_id: Uuid) -> AppResult<u64> {
        let state = self.state.lock().unwrap();
        Ok(state
            .messages
            .iter()
            .filter(|m| m.connection_id == connection_id)
            .count() as u64)
    }
}

#[async_trait]
impl UserDirectory for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let state = self.state.lock().unwrap();
        Ok(state.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }
}

#[async_trait]
impl ContentProvider for MemoryStore {
    async fn latest_inventories(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> AppResult<Vec<serde_json::Value>> {
        let state = self.state.lock().unwrap();
        let mut inventories = state.inventories.get(&user_id).cloned().unwrap_or_default();
        inventories.truncate(limit as usize);
        Ok(inventories)
    }

    async fn questionnaires(&self, _user_id: Uuid) -> AppResult<Vec<serde_json::Value>> {
        Ok(Vec::new())
    }

    async fn activity_history(&self, _user_id: Uuid) -> AppResult<Vec<serde_json::Value>> {
        Ok(Vec::new())
    }
}

/// Shared fixture wiring every service onto one [`MemoryStore`].
pub struct TestWorld {
    store: Arc<MemoryStore>,
}

/// A request context for the given user, as the API layer would build it
/// from a fresh token.
pub fn ctx_for(user: &User) -> RequestContext {
    RequestContext::new(user.id, user.tenant_id, user.role, user.user_type)
}

impl TestWorld {
    pub fn new() -> Self {
        Self {
            store: Arc::new(MemoryStore::default()),
        }
    }

    pub fn add_user(&self, name: &str, email: &str) -> User {
        self.add_user_with(name, email, UserRole::User, UserType::Individual)
    }

    pub fn add_user_with(
        &self,
        name: &str,
        email: &str,
        role: UserRole,
        user_type: UserType,
    ) -> User {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            company_name: None,
            tenant_id: None,
            role,
            user_type,
            created_at: now,
            updated_at: now,
        };
        self.store.state.lock().unwrap().users.push(user.clone());
        user
    }

    pub fn connection_service(&self) -> ConnectionService {
        ConnectionService::new(
            self.store.clone(),
            self.store.clone(),
            self.store.clone(),
            self.store.clone(),
        )
    }

    pub fn link_issuer(&self) -> InviteLinkIssuer {
        InviteLinkIssuer::new(
            self.store.clone(),
            self.store.clone(),
            self.store.clone(),
            ConnectConfig::default(),
        )
    }

    pub fn sharing_policy(&self) -> SharingPolicy {
        SharingPolicy::new(self.store.clone(), self.store.clone(), self.store.clone())
    }

    pub fn messaging_channel(&self) -> MessagingChannel {
        MessagingChannel::new(self.store.clone(), self.store.clone())
    }

    pub fn admin_service(&self) -> ConnectionAdminService {
        ConnectionAdminService::new(
            self.store.clone(),
            self.store.clone(),
            self.store.clone(),
            self.store.clone(),
        )
    }

    /// Two fresh users with an accepted connection between them.
    pub async fn connected_pair(&self) -> (User, User, Connection) {
        let alice = self.add_user("Alice", "alice@example.com");
        let bob = self.add_user("Bob", "bob@example.com");
        let service = self.connection_service();

        let request = service
            .send_invite(&ctx_for(&alice), &bob.email, None)
            .await
            .unwrap();
        let connection = service
            .accept_request(&ctx_for(&bob), request.id)
            .await
            .unwrap();
        (alice, bob, connection)
    }

    /// Backdates a link's expiry so the lazy check sees it as expired.
    pub fn expire_link(&self, token: &str) {
        let mut state = self.store.state.lock().unwrap();
        let link = state
            .links
            .iter_mut()
            .find(|l| l.token == token)
            .expect("unknown link token");
        link.expires_at = Some(Utc::now() - Duration::hours(1));
    }

    /// Registers one completed inventory for the user.
    pub fn add_inventory(&self, user: &User) {
        self.store
            .state
            .lock()
            .unwrap()
            .inventories
            .entry(user.id)
            .or_default()
            .push(serde_json::json!({"assessment": "big-five", "score": 42}));
    }

    /// Removes a sharing row, simulating a connection created before
    /// sharing settings existed.
    pub fn drop_sharing_row(&self, connection_id: Uuid, user_id: Uuid) {
        self.store
            .state
            .lock()
            .unwrap()
            .sharing
            .retain(|s| !(s.connection_id == connection_id && s.user_id == user_id));
    }

    pub fn request_by_id(&self, id: Uuid) -> ConnectionRequest {
        self.store
            .state
            .lock()
            .unwrap()
            .requests
            .iter()
            .find(|r| r.id == id)
            .expect("unknown request id")
            .clone()
    }
}
