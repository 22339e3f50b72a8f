//! User entity and role/type enums.

pub mod model;
pub mod role;

pub use model::{User, UserSummary};
pub use role::{UserRole, UserType};
