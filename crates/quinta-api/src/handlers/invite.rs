//! Shareable invite link handlers.

use axum::Json;
use axum::extract::{Path, State};

use crate::error::ApiError;

use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/connections/generate-invite
pub async fn generate_invite(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let issued = state.link_issuer.issue(&auth).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": issued })))
}

/// GET /api/connections/validate-invite/{token}
///
/// Unauthenticated: the join page checks the token before login.
pub async fn validate_invite(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let validation = state.link_issuer.validate(&token).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": validation })))
}

/// POST /api/connections/join/{token}
pub async fn join_with_invite(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(token): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let request = state.link_issuer.consume(&auth, &token).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": request })))
}
