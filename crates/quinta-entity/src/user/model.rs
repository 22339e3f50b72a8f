//! User entity model.
//!
//! Users are owned by the accounts subsystem; the connection engine only
//! reads them (email lookup for direct invites, live role checks for the
//! admin gate, partner display info).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::role::{UserRole, UserType};

/// A registered user on the platform.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Unique email address.
    pub email: String,
    /// Company name, when the account belongs to a tenant.
    pub company_name: Option<String>,
    /// Tenant this user belongs to, if any.
    pub tenant_id: Option<Uuid>,
    /// Platform role.
    pub role: UserRole,
    /// Account type.
    pub user_type: UserType,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Reduce to the display summary exposed to connection partners.
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            company_name: self.company_name.clone(),
            user_type: self.user_type,
        }
    }
}

/// The subset of user fields shown to the other side of a connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    /// User ID.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Company name, when present.
    pub company_name: Option<String>,
    /// Account type.
    pub user_type: UserType,
}
