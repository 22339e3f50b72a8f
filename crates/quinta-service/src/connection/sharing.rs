//! Sharing authorization: per-participant settings and the gated
//! content resolution.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use quinta_core::error::AppError;
use quinta_core::result::AppResult;
use quinta_entity::connection::{Connection, SharingSetting, SharingSettingPatch};
use quinta_entity::content::ContentProvider;
use quinta_entity::store::{ConnectionStore, SharingStore};

use crate::context::RequestContext;

/// How many recent completed inventories a partner may see.
const INVENTORY_LIMIT: i64 = 5;

/// Enforces who sees what across a connection.
#[derive(Clone)]
pub struct SharingPolicy {
    connections: Arc<dyn ConnectionStore>,
    sharing: Arc<dyn SharingStore>,
    content: Arc<dyn ContentProvider>,
}

/// The partner content visible to a requester, one field per category.
///
/// A disabled category is `None`, never an empty list, so the client can
/// distinguish "not shared" from "shared but empty". When the partner
/// has no settings row at all, `blocked` is set and every category is
/// `None`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentBundle {
    /// True when the partner has no sharing settings at all.
    pub blocked: bool,
    /// Recent completed inventories, when shared.
    pub inventories: Option<Vec<serde_json::Value>>,
    /// Questionnaire answers, when shared.
    pub questionnaires: Option<Vec<serde_json::Value>>,
    /// Activity history, when shared.
    pub activity_history: Option<Vec<serde_json::Value>>,
}

impl ContentBundle {
    fn blocked() -> Self {
        Self {
            blocked: true,
            inventories: None,
            questionnaires: None,
            activity_history: None,
        }
    }
}

impl SharingPolicy {
    /// Creates a new sharing policy.
    pub fn new(
        connections: Arc<dyn ConnectionStore>,
        sharing: Arc<dyn SharingStore>,
        content: Arc<dyn ContentProvider>,
    ) -> Self {
        Self {
            connections,
            sharing,
            content,
        }
    }

    async fn participant_connection(
        &self,
        ctx: &RequestContext,
        connection_id: Uuid,
    ) -> AppResult<Connection> {
        let connection = self
            .connections
            .find_by_id(connection_id)
            .await?
            .ok_or_else(|| AppError::not_found("Connection not found"))?;

        if !connection.has_participant(ctx.user_id) {
            return Err(AppError::forbidden(
                "You are not a participant of this connection",
            ));
        }
        Ok(connection)
    }

    /// The caller's own settings, created default-false on first access.
    ///
    /// Lazy creation covers connections formed before settings existed.
    pub async fn settings(
        &self,
        ctx: &RequestContext,
        connection_id: Uuid,
    ) -> AppResult<SharingSetting> {
        self.participant_connection(ctx, connection_id).await?;

        match self.sharing.find(connection_id, ctx.user_id).await? {
            Some(settings) => Ok(settings),
            None => self.sharing.create_default(connection_id, ctx.user_id).await,
        }
    }

    /// Applies a patch to the caller's own settings row. Participants
    /// can only ever mutate their own side.
    pub async fn update_settings(
        &self,
        ctx: &RequestContext,
        connection_id: Uuid,
        patch: &SharingSettingPatch,
    ) -> AppResult<SharingSetting> {
        self.participant_connection(ctx, connection_id).await?;

        let updated = self.sharing.upsert(connection_id, ctx.user_id, patch).await?;

        info!(
            connection_id = %connection_id,
            user_id = %ctx.user_id,
            "Sharing settings updated"
        );

        Ok(updated)
    }

    /// Resolves the partner content the caller is allowed to see.
    ///
    /// Read-only: each category is fetched only when the partner's flag
    /// for it is enabled, so nothing leaks for a disabled flag.
    pub async fn resolve_visible_content(
        &self,
        ctx: &RequestContext,
        connection_id: Uuid,
    ) -> AppResult<ContentBundle> {
        let connection = self.participant_connection(ctx, connection_id).await?;
        let partner_id = connection
            .partner_of(ctx.user_id)
            .ok_or_else(|| AppError::forbidden("You are not a participant of this connection"))?;

        let Some(partner_settings) = self.sharing.find(connection_id, partner_id).await? else {
            return Ok(ContentBundle::blocked());
        };

        let inventories = if partner_settings.share_inventories {
            Some(
                self.content
                    .latest_inventories(partner_id, INVENTORY_LIMIT)
                    .await?,
            )
        } else {
            None
        };
        let questionnaires = if partner_settings.share_questionnaires {
            Some(self.content.questionnaires(partner_id).await?)
        } else {
            None
        };
        let activity_history = if partner_settings.share_activity_history {
            Some(self.content.activity_history(partner_id).await?)
        } else {
            None
        };

        Ok(ContentBundle {
            blocked: false,
            inventories,
            questionnaires,
            activity_history,
        })
    }
}
