//! Participant-facing connection handlers: invites, requests, listings,
//! settings, shared content, and messaging.

use axum::Json;
use axum::extract::{Path, State};
use uuid::Uuid;
use validator::Validate;

use quinta_core::error::AppError;
use crate::error::ApiError;

use crate::dto::request::{SendInviteRequest, SendMessageRequest, UpdateSettingsRequest};
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/connections/invite
pub async fn send_invite(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<SendInviteRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let request = state
        .connection_service
        .send_invite(&auth, &req.email, req.message)
        .await?;

    Ok(Json(serde_json::json!({ "success": true, "data": request })))
}

/// GET /api/connections/requests
pub async fn pending_requests(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let requests = state.connection_service.pending_requests(&auth).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": requests })))
}

/// POST /api/connections/requests/{id}/accept
pub async fn accept_request(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let connection = state.connection_service.accept_request(&auth, id).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": connection })))
}

/// POST /api/connections/requests/{id}/reject
pub async fn reject_request(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let request = state.connection_service.reject_request(&auth, id).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": request })))
}

/// GET /api/connections
pub async fn list_connections(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let connections = state.connection_service.connections(&auth).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": connections })))
}

/// GET /api/connections/{id}
pub async fn get_connection(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let detail = state.connection_service.connection_detail(&auth, id).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": detail })))
}

/// DELETE /api/connections/{id}
pub async fn remove_connection(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let cancelled = state.connection_service.remove_connection(&auth, id).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": cancelled })))
}

/// PUT /api/connections/{id}/settings
pub async fn update_settings(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateSettingsRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let settings = state
        .sharing_policy
        .update_settings(&auth, id, &req.into_patch())
        .await?;
    Ok(Json(serde_json::json!({ "success": true, "data": settings })))
}

/// GET /api/connections/{id}/shared-content
pub async fn shared_content(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let bundle = state
        .sharing_policy
        .resolve_visible_content(&auth, id)
        .await?;
    Ok(Json(serde_json::json!({ "success": true, "data": bundle })))
}

/// POST /api/connections/{id}/messages
pub async fn send_message(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<SendMessageRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let message = state.messaging_channel.send(&auth, id, &req.content).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": message })))
}

/// GET /api/connections/{id}/messages
pub async fn list_messages(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let messages = state.messaging_channel.list(&auth, id).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": messages })))
}
