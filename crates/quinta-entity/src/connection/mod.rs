//! Connection aggregate: the link itself, pending requests, invite links,
//! sharing settings, and the message log.

pub mod invite;
pub mod message;
pub mod model;
pub mod request;
pub mod sharing;

pub use invite::{InviteLink, InviteLinkStatus, NewInviteLink};
pub use message::{ConnectionMessage, NewConnectionMessage};
pub use model::{Connection, ConnectionStatus};
pub use request::{ConnectionRequest, NewConnectionRequest, RequestStatus};
pub use sharing::{SharingSetting, SharingSettingPatch};
