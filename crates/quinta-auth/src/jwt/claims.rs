//! JWT claims structure for access tokens issued by the accounts subsystem.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use quinta_entity::user::{UserRole, UserType};

/// Claims payload embedded in every access token.
///
/// Role and user type here reflect the moment of issuance; admin-only
/// operations re-check the live user record instead of trusting them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user ID.
    pub sub: Uuid,
    /// Tenant the user belongs to, if any.
    pub tenant_id: Option<Uuid>,
    /// User role at the time of token issuance.
    pub role: UserRole,
    /// Account type at the time of token issuance.
    pub user_type: UserType,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    /// JWT ID.
    pub jti: Uuid,
}

impl Claims {
    /// Returns the user ID from the subject claim.
    pub fn user_id(&self) -> Uuid {
        self.sub
    }

    /// Returns the expiration as a `DateTime<Utc>`.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_else(Utc::now)
    }

    /// Checks whether this token has expired.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}
