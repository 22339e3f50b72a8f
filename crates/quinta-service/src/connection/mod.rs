//! Peer-connection services: direct invites, shareable links, sharing
//! authorization, messaging, and admin moderation.

pub mod admin;
pub mod link;
pub mod messaging;
pub mod service;
pub mod sharing;

pub use admin::ConnectionAdminService;
pub use link::InviteLinkIssuer;
pub use messaging::MessagingChannel;
pub use service::ConnectionService;
pub use sharing::SharingPolicy;
