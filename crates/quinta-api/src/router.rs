//! Route definitions for the Quinta Connect HTTP API.
//!
//! All routes are mounted under `/api`. The router receives `AppState`
//! and passes it to every handler via Axum's `State` extractor.

use axum::{
    Router, middleware as axum_middleware,
    routing::{delete, get, post, put},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(connection_routes())
        .merge(invite_routes())
        .merge(admin_routes())
        .merge(health_routes());

    let cors = build_cors_layer(&state);

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(
            middleware::logging::request_logging,
        ))
        .with_state(state)
}

/// Participant endpoints: invites, requests, listings, settings,
/// shared content, messaging.
fn connection_routes() -> Router<AppState> {
    Router::new()
        .route("/connections", get(handlers::connection::list_connections))
        .route(
            "/connections/invite",
            post(handlers::connection::send_invite),
        )
        .route(
            "/connections/requests",
            get(handlers::connection::pending_requests),
        )
        .route(
            "/connections/requests/{id}/accept",
            post(handlers::connection::accept_request),
        )
        .route(
            "/connections/requests/{id}/reject",
            post(handlers::connection::reject_request),
        )
        .route(
            "/connections/{id}",
            get(handlers::connection::get_connection),
        )
        .route(
            "/connections/{id}",
            delete(handlers::connection::remove_connection),
        )
        .route(
            "/connections/{id}/settings",
            put(handlers::connection::update_settings),
        )
        .route(
            "/connections/{id}/shared-content",
            get(handlers::connection::shared_content),
        )
        .route(
            "/connections/{id}/messages",
            get(handlers::connection::list_messages),
        )
        .route(
            "/connections/{id}/messages",
            post(handlers::connection::send_message),
        )
}

/// Shareable invite link endpoints. Token validation is public.
fn invite_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/connections/generate-invite",
            post(handlers::invite::generate_invite),
        )
        .route(
            "/connections/validate-invite/{token}",
            get(handlers::invite::validate_invite),
        )
        .route(
            "/connections/join/{token}",
            post(handlers::invite::join_with_invite),
        )
}

/// Moderation endpoints behind the admin capability.
fn admin_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/connections/pending-approvals",
            get(handlers::admin::pending_approvals),
        )
        .route(
            "/connections/approve/{id}",
            post(handlers::admin::approve_request),
        )
        .route(
            "/connections/reject/{id}",
            post(handlers::admin::reject_request),
        )
        .route(
            "/connections/admin/all",
            get(handlers::admin::list_all_connections),
        )
        .route(
            "/connections/admin/{id}",
            delete(handlers::admin::cancel_connection),
        )
        .route(
            "/connections/admin/{id}/messages",
            get(handlers::admin::connection_messages),
        )
}

/// Liveness endpoint.
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}

fn build_cors_layer(state: &AppState) -> CorsLayer {
    use http::Method;
    use tower_http::cors::Any;

    let cors_config = &state.config.server.cors;

    let mut cors = CorsLayer::new();

    if cors_config.allowed_origins.contains(&"*".to_string()) {
        cors = cors.allow_origin(Any);
    } else {
        let origins: Vec<http::HeaderValue> = cors_config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        cors = cors.allow_origin(origins);
    }

    let methods: Vec<Method> = cors_config
        .allowed_methods
        .iter()
        .filter_map(|m| m.parse().ok())
        .collect();
    cors = cors.allow_methods(methods);

    if cors_config.allowed_headers.contains(&"*".to_string()) {
        cors = cors.allow_headers(Any);
    }

    cors.max_age(std::time::Duration::from_secs(cors_config.max_age_seconds))
}
