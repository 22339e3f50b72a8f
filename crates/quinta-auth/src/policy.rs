//! Authorization policy for connection administration.

use quinta_entity::user::{UserRole, UserType};

/// Whether a user may perform connection-administration operations.
///
/// Super admins always qualify. Tenant admins qualify only when their
/// account is a company account; an individual account holding the
/// tenant-admin role does not administer connections.
pub fn is_connections_admin(role: UserRole, user_type: UserType) -> bool {
    match role {
        UserRole::SuperAdmin => true,
        UserRole::TenantAdmin => user_type == UserType::Company,
        UserRole::User => false,
    }
}
