//! Connection-engine configuration.

use serde::{Deserialize, Serialize};

/// Settings for the peer-connection subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectConfig {
    /// Base URL of the frontend, used to build shareable join links.
    #[serde(default = "default_frontend_base_url")]
    pub frontend_base_url: String,
    /// Invite-link lifetime in days.
    #[serde(default = "default_invite_ttl_days")]
    pub invite_ttl_days: i64,
    /// Length of generated invite tokens.
    #[serde(default = "default_invite_token_length")]
    pub invite_token_length: usize,
}

impl Default for ConnectConfig {
    fn default() -> Self {
        Self {
            frontend_base_url: default_frontend_base_url(),
            invite_ttl_days: default_invite_ttl_days(),
            invite_token_length: default_invite_token_length(),
        }
    }
}

fn default_frontend_base_url() -> String {
    "http://localhost:3001".to_string()
}

fn default_invite_ttl_days() -> i64 {
    7
}

fn default_invite_token_length() -> usize {
    8
}
