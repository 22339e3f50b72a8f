//! Admin moderation handlers.
//!
//! Authorization happens in the service layer against the live user
//! record, not against the token's role claim.

use axum::Json;
use axum::extract::{Path, State};
use uuid::Uuid;

use crate::error::ApiError;

use crate::dto::request::AdminCancelRequest;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/connections/pending-approvals
pub async fn pending_approvals(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let requests = state.admin_service.pending_approvals(&auth).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": requests })))
}

/// POST /api/connections/approve/{id}
pub async fn approve_request(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let connection = state.admin_service.approve(&auth, id).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": connection })))
}

/// POST /api/connections/reject/{id}
pub async fn reject_request(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let request = state.admin_service.reject(&auth, id).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": request })))
}

/// GET /api/connections/admin/all
pub async fn list_all_connections(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let connections = state.admin_service.list_all(&auth).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": connections })))
}

/// DELETE /api/connections/admin/{id}
pub async fn cancel_connection(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    body: Option<Json<AdminCancelRequest>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let reason = body.and_then(|Json(req)| req.reason);
    let cancelled = state.admin_service.cancel(&auth, id, reason).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": cancelled })))
}

/// GET /api/connections/admin/{id}/messages
pub async fn connection_messages(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let transcript = state.admin_service.transcript(&auth, id).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": transcript })))
}
