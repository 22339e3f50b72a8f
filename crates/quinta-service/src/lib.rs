//! # quinta-service
//!
//! Business logic service layer for Quinta Connect. Each service
//! orchestrates the store traits from `quinta-entity` to implement
//! application-level use cases.
//!
//! Services follow constructor injection; all dependencies are provided
//! at construction time via `Arc` references to the store traits, so the
//! full workflow is testable against in-memory stores.

pub mod connection;
pub mod context;

#[cfg(test)]
pub(crate) mod testing;

pub use connection::{
    ConnectionAdminService, ConnectionService, InviteLinkIssuer, MessagingChannel, SharingPolicy,
};
pub use context::RequestContext;
