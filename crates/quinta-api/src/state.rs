//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use sqlx::PgPool;

use quinta_auth::jwt::decoder::JwtDecoder;
use quinta_core::config::AppConfig;
use quinta_service::connection::{
    ConnectionAdminService, ConnectionService, InviteLinkIssuer, MessagingChannel, SharingPolicy,
};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`. All fields are
/// cheap to clone across tasks.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// PostgreSQL connection pool.
    pub db_pool: PgPool,
    /// JWT token decoder and validator.
    pub jwt_decoder: Arc<JwtDecoder>,
    /// Direct-invite workflow and connection views.
    pub connection_service: ConnectionService,
    /// Shareable invite link issuance and redemption.
    pub link_issuer: InviteLinkIssuer,
    /// Sharing settings and content gating.
    pub sharing_policy: SharingPolicy,
    /// Participant messaging.
    pub messaging_channel: MessagingChannel,
    /// Admin moderation operations.
    pub admin_service: ConnectionAdminService,
}
