//! Quinta Connect server.
//!
//! Main entry point that wires all crates together and starts the HTTP
//! server for the peer-connection engine.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use quinta_api::AppState;
use quinta_auth::jwt::decoder::JwtDecoder;
use quinta_core::config::AppConfig;
use quinta_core::error::AppError;
use quinta_database::repositories::connection::ConnectionRepository;
use quinta_database::repositories::content::AssessmentContentProvider;
use quinta_database::repositories::invite_link::InviteLinkRepository;
use quinta_database::repositories::message::MessageRepository;
use quinta_database::repositories::request::ConnectionRequestRepository;
use quinta_database::repositories::sharing::SharingRepository;
use quinta_database::repositories::user::UserRepository;
use quinta_service::connection::{
    ConnectionAdminService, ConnectionService, InviteLinkIssuer, MessagingChannel, SharingPolicy,
};

#[tokio::main]
async fn main() {
    let env = std::env::var("QUINTA_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }
}

/// Initialize tracing output per configuration.
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Quinta Connect v{}", env!("CARGO_PKG_VERSION"));

    let db_pool = quinta_database::connection::create_pool(&config.database).await?;

    quinta_database::migration::run_migrations(&db_pool).await?;

    // Repositories, shared behind the store traits.
    let connections = Arc::new(ConnectionRepository::new(db_pool.clone()));
    let requests = Arc::new(ConnectionRequestRepository::new(db_pool.clone()));
    let links = Arc::new(InviteLinkRepository::new(db_pool.clone()));
    let sharing = Arc::new(SharingRepository::new(db_pool.clone()));
    let messages = Arc::new(MessageRepository::new(db_pool.clone()));
    let users = Arc::new(UserRepository::new(db_pool.clone()));
    let content = Arc::new(AssessmentContentProvider::new(db_pool.clone()));

    let state = AppState {
        jwt_decoder: Arc::new(JwtDecoder::new(&config.auth)),
        connection_service: ConnectionService::new(
            connections.clone(),
            requests.clone(),
            sharing.clone(),
            users.clone(),
        ),
        link_issuer: InviteLinkIssuer::new(
            links,
            connections.clone(),
            users.clone(),
            config.connect.clone(),
        ),
        sharing_policy: SharingPolicy::new(connections.clone(), sharing, content),
        messaging_channel: MessagingChannel::new(connections.clone(), messages.clone()),
        admin_service: ConnectionAdminService::new(connections, requests, messages, users),
        config: Arc::new(config),
        db_pool,
    };

    let addr = format!(
        "{}:{}",
        state.config.server.host, state.config.server.port
    );
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("Listening on {addr}");

    let router = quinta_api::build_router(state);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server failed: {e}")))?;

    tracing::info!("Server shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
