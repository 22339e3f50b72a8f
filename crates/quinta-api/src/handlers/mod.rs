//! HTTP request handlers, organized by domain.

pub mod admin;
pub mod connection;
pub mod health;
pub mod invite;
