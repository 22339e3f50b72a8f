//! # quinta-api
//!
//! HTTP API layer for Quinta Connect built on Axum: REST endpoints for
//! the connection engine, bearer-token extraction, middleware (CORS,
//! tracing, request logging), DTOs, and error mapping.

pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::AppState;
