//! # quinta-auth
//!
//! Bearer-token validation and the authorization policy for the
//! connection engine. Token issuance belongs to the accounts subsystem;
//! this crate only verifies what it receives.

pub mod jwt;
pub mod policy;

pub use jwt::claims::Claims;
pub use jwt::decoder::JwtDecoder;
