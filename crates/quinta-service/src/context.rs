//! Request context carrying the authenticated principal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use quinta_entity::user::{UserRole, UserType};

/// Context for the current authenticated request.
///
/// Extracted from the bearer token by middleware and passed into service
/// methods so that every operation knows who is acting. Role and user
/// type reflect the token; admin-gated operations re-check the live user
/// record instead of trusting them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The authenticated user's ID.
    pub user_id: Uuid,
    /// Tenant the user belongs to, if any.
    pub tenant_id: Option<Uuid>,
    /// The user's role at the time the token was issued.
    pub role: UserRole,
    /// The account type at the time the token was issued.
    pub user_type: UserType,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(
        user_id: Uuid,
        tenant_id: Option<Uuid>,
        role: UserRole,
        user_type: UserType,
    ) -> Self {
        Self {
            user_id,
            tenant_id,
            role,
            user_type,
            request_time: Utc::now(),
        }
    }
}
