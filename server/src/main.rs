// Forbid unwrap() in production code to prevent panics at startup.
// Test code is allowed to use unwrap() for convenience.
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
use std::net::SocketAddr;
use std::sync::Arc;

use envhost::{
    AppState,
    auth::{PermitClient, TokenCodec},
    build_router,
    config::{self, ServerConfig},
    environment::EnvironmentTable,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load .env before the filter reads RUST_LOG.
    let dotenv = config::load_dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "envhost=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match dotenv {
        Ok(Some(path)) => tracing::debug!("Loaded environment variables from {}", path.display()),
        Ok(None) => tracing::debug!("No .env file found"),
        Err(e) => tracing::warn!("Failed to load .env file: {e}"),
    }

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!(
        "Loaded configuration: listen_port={}, permit_pdp_url={}",
        config.listen_port,
        config.permit_pdp_url
    );
    if config.permit_api_key.is_none() {
        tracing::warn!("PERMIT_API_KEY is not set; permission checks will fail");
    }
    if config.jwt_secret_is_fallback {
        tracing::warn!("JWT_SECRET is not set; using an insecure default secret");
    }

    let tokens = match TokenCodec::new(config.jwt_secret.as_bytes()) {
        Ok(tokens) => tokens,
        Err(e) => {
            tracing::error!("Failed to create token codec: {e}");
            std::process::exit(1);
        }
    };

    let environments = EnvironmentTable::builtin();
    // Paired assertion: the built-in table covers every level.
    assert!(
        environments.is_complete(),
        "built-in environment table must cover every level"
    );

    let authorizer = Arc::new(PermitClient::new(
        config.permit_pdp_url.clone(),
        config.permit_api_key.clone(),
    ));

    let state = AppState::new(environments, tokens, authorizer);
    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.listen_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Failed to bind: {e}");
            std::process::exit(1);
        });
    tracing::info!("Server running on port {}", config.listen_port);

    axum::serve(listener, app).await.unwrap_or_else(|e| {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    });
}
