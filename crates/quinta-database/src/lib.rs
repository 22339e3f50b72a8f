//! # quinta-database
//!
//! PostgreSQL persistence for Quinta Connect: connection pool management,
//! the migration runner, and one repository per aggregate implementing
//! the store traits from `quinta-entity`.

pub mod connection;
pub mod migration;
pub mod repositories;
