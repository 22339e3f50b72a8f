//! Shareable invite link issuance, validation, and redemption.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rand::RngExt;
use rand::distr::Alphanumeric;
use serde::{Deserialize, Serialize};
use tracing::info;

use quinta_core::config::ConnectConfig;
use quinta_core::error::{AppError, ErrorKind};
use quinta_core::result::AppResult;
use quinta_entity::connection::{
    ConnectionRequest, InviteLink, InviteLinkStatus, NewConnectionRequest, NewInviteLink,
    RequestStatus,
};
use quinta_entity::store::{ConnectionStore, InviteLinkStore, UserDirectory};
use quinta_entity::user::UserSummary;

use crate::context::RequestContext;

/// How many times token generation retries after a uniqueness collision.
const TOKEN_RETRY_LIMIT: usize = 3;

/// Issues, validates, and consumes shareable invite links.
#[derive(Clone)]
pub struct InviteLinkIssuer {
    links: Arc<dyn InviteLinkStore>,
    connections: Arc<dyn ConnectionStore>,
    users: Arc<dyn UserDirectory>,
    config: ConnectConfig,
}

/// A freshly issued invite link, ready to share out-of-band.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuedInvite {
    /// The raw token.
    pub token: String,
    /// The full join URL built from the frontend base URL.
    pub link: String,
    /// When the link stops being redeemable.
    pub expires_at: Option<DateTime<Utc>>,
}

/// The result of validating a token, with creator display info for the
/// join page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InviteValidation {
    /// The link row.
    pub link: InviteLink,
    /// Display info for the user who created the link.
    pub creator: UserSummary,
}

impl InviteLinkIssuer {
    /// Creates a new invite link issuer.
    pub fn new(
        links: Arc<dyn InviteLinkStore>,
        connections: Arc<dyn ConnectionStore>,
        users: Arc<dyn UserDirectory>,
        config: ConnectConfig,
    ) -> Self {
        Self {
            links,
            connections,
            users,
            config,
        }
    }

    /// Generates a short random invite token.
    fn generate_token(&self) -> String {
        rand::rng()
            .sample_iter(&Alphanumeric)
            .take(self.config.invite_token_length)
            .map(|b| (b as char).to_ascii_uppercase())
            .collect()
    }

    /// Issues a new single-use link for the caller.
    pub async fn issue(&self, ctx: &RequestContext) -> AppResult<IssuedInvite> {
        let expires_at = Some(Utc::now() + Duration::days(self.config.invite_ttl_days));

        // Tokens are short, so retry the rare uniqueness collision.
        let mut attempts = 0;
        let link = loop {
            let token = self.generate_token();
            match self
                .links
                .create(&NewInviteLink {
                    token,
                    creator_id: ctx.user_id,
                    expires_at,
                })
                .await
            {
                Ok(link) => break link,
                Err(e) if e.kind == ErrorKind::Conflict && attempts < TOKEN_RETRY_LIMIT => {
                    attempts += 1;
                }
                Err(e) => return Err(e),
            }
        };

        info!(link_id = %link.id, creator_id = %ctx.user_id, "Invite link issued");

        Ok(IssuedInvite {
            link: format!(
                "{}/dashboard/connections/join/{}",
                self.config.frontend_base_url, link.token
            ),
            token: link.token,
            expires_at: link.expires_at,
        })
    }

    /// Pure read: checks that a token exists, is unused, and is within
    /// its expiry window.
    pub async fn validate(&self, token: &str) -> AppResult<InviteValidation> {
        let link = self
            .links
            .find_by_token(token)
            .await?
            .ok_or_else(|| AppError::not_found("Invalid invite link"))?;

        if link.status != InviteLinkStatus::Active {
            return Err(AppError::validation(
                "This invite link has already been used",
            ));
        }
        if link.is_expired() {
            return Err(AppError::validation("This invite link has expired"));
        }

        let creator = self
            .users
            .find_by_id(link.creator_id)
            .await?
            .ok_or_else(|| AppError::not_found("Invite link creator not found"))?;

        Ok(InviteValidation {
            link,
            creator: creator.summary(),
        })
    }

    /// Redeems a link for the caller: marks it `USED` and creates the
    /// admin-gated connection request, atomically.
    ///
    /// This is the only path that produces `PENDING_ADMIN_APPROVAL`.
    pub async fn consume(&self, ctx: &RequestContext, token: &str) -> AppResult<ConnectionRequest> {
        let validated = self.validate(token).await?;
        let link = validated.link;

        if link.creator_id == ctx.user_id {
            return Err(AppError::validation(
                "You cannot accept your own invite link",
            ));
        }
        if self
            .connections
            .find_existing(link.creator_id, ctx.user_id)
            .await?
            .is_some()
        {
            return Err(AppError::validation(
                "A connection already exists with this user",
            ));
        }

        let request = self
            .links
            .consume(
                link.id,
                ctx.user_id,
                &NewConnectionRequest {
                    sender_id: link.creator_id,
                    receiver_id: ctx.user_id,
                    status: RequestStatus::PendingAdminApproval,
                    requires_admin_approval: true,
                    message: Some("Connection via shareable link".to_string()),
                },
            )
            .await?;

        info!(
            link_id = %link.id,
            request_id = %request.id,
            used_by = %ctx.user_id,
            "Invite link consumed"
        );

        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{TestWorld, ctx_for};

    #[tokio::test]
    async fn test_issue_builds_join_url() {
        let world = TestWorld::new();
        let alice = world.add_user("Alice", "alice@example.com");

        let issued = world
            .link_issuer()
            .issue(&ctx_for(&alice))
            .await
            .unwrap();

        assert_eq!(issued.token.len(), 8);
        assert!(issued.token.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
        assert_eq!(
            issued.link,
            format!("http://localhost:3001/dashboard/connections/join/{}", issued.token)
        );
        assert!(issued.expires_at.unwrap() > Utc::now() + Duration::days(6));
    }

    #[tokio::test]
    async fn test_validate_unknown_token_is_not_found() {
        let world = TestWorld::new();
        world.add_user("Alice", "alice@example.com");

        let err = world.link_issuer().validate("NOPE1234").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_consume_creates_admin_gated_request() {
        let world = TestWorld::new();
        let alice = world.add_user("Alice", "alice@example.com");
        let bob = world.add_user("Bob", "bob@example.com");
        let issuer = world.link_issuer();

        let issued = issuer.issue(&ctx_for(&alice)).await.unwrap();
        let request = issuer
            .consume(&ctx_for(&bob), &issued.token)
            .await
            .unwrap();

        assert_eq!(request.sender_id, alice.id);
        assert_eq!(request.receiver_id, bob.id);
        assert_eq!(request.status, RequestStatus::PendingAdminApproval);
        assert!(request.requires_admin_approval);
        assert_eq!(
            request.message.as_deref(),
            Some("Connection via shareable link")
        );
    }

    #[tokio::test]
    async fn test_link_is_single_use() {
        let world = TestWorld::new();
        let alice = world.add_user("Alice", "alice@example.com");
        let bob = world.add_user("Bob", "bob@example.com");
        let carol = world.add_user("Carol", "carol@example.com");
        let issuer = world.link_issuer();

        let issued = issuer.issue(&ctx_for(&alice)).await.unwrap();
        issuer.consume(&ctx_for(&bob), &issued.token).await.unwrap();

        let err = issuer
            .consume(&ctx_for(&carol), &issued.token)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_creator_cannot_redeem_own_link() {
        let world = TestWorld::new();
        let alice = world.add_user("Alice", "alice@example.com");
        let issuer = world.link_issuer();

        let issued = issuer.issue(&ctx_for(&alice)).await.unwrap();
        let err = issuer
            .consume(&ctx_for(&alice), &issued.token)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_expired_link_is_rejected_lazily() {
        let world = TestWorld::new();
        let alice = world.add_user("Alice", "alice@example.com");
        let bob = world.add_user("Bob", "bob@example.com");
        let issuer = world.link_issuer();

        let issued = issuer.issue(&ctx_for(&alice)).await.unwrap();
        world.expire_link(&issued.token);

        let err = issuer.validate(&issued.token).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        let err = issuer
            .consume(&ctx_for(&bob), &issued.token)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }
}
