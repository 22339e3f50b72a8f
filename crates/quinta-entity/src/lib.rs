//! # quinta-entity
//!
//! Domain entities for the Quinta peer-connection engine: users,
//! connections, connection requests, invite links, sharing settings,
//! and connection messages.
//!
//! Also declares the store and content-provider traits the engine is
//! built against; `quinta-database` provides the PostgreSQL
//! implementations.

pub mod connection;
pub mod content;
pub mod store;
pub mod user;
