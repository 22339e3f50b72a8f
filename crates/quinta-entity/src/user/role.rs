//! User role and account-type enumerations.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Roles available on the assessment platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    /// Platform-wide administrator.
    SuperAdmin,
    /// Administrator scoped to a company tenant.
    TenantAdmin,
    /// Regular assessment taker.
    User,
}

impl UserRole {
    /// Return the role as its wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SuperAdmin => "SUPER_ADMIN",
            Self::TenantAdmin => "TENANT_ADMIN",
            Self::User => "USER",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = quinta_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SUPER_ADMIN" => Ok(Self::SuperAdmin),
            "TENANT_ADMIN" => Ok(Self::TenantAdmin),
            "USER" => Ok(Self::User),
            _ => Err(quinta_core::AppError::validation(format!(
                "Invalid user role: '{s}'. Expected one of: SUPER_ADMIN, TENANT_ADMIN, USER"
            ))),
        }
    }
}

/// Account type, distinguishing company-managed accounts from individuals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserType {
    /// Account belonging to a company tenant.
    Company,
    /// Self-registered individual account.
    Individual,
}

impl UserType {
    /// Return the account type as its wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Company => "COMPANY",
            Self::Individual => "INDIVIDUAL",
        }
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
