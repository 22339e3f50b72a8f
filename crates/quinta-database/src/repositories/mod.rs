//! Repository implementations, one per aggregate.

pub mod connection;
pub mod content;
pub mod invite_link;
pub mod message;
pub mod request;
pub mod sharing;
pub mod user;
