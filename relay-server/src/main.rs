//! Messenger Relay server.
//!
//! This binary:
//! - Answers the Messenger webhook verification handshake
//! - Receives message deliveries
//! - Generates a reply for each text message with Gemini
//! - Sends the reply back through the Messenger Send API

use std::net::SocketAddr;

use anyhow::{Context, Result};
use tokio::{net::TcpListener, signal};
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use relay::{router, AppState, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine; the environment may already be populated
    let dotenv_loaded = dotenvy::dotenv().is_ok();

    // Initialize structured JSON logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();

    info!(dotenv_loaded = dotenv_loaded, "relay_server_starting");

    // Load configuration
    let config = Config::from_env();
    info!(
        port = config.port,
        verify_token_configured = config.verify_token.is_some(),
        page_access_token_configured = config.page_access_token.is_some(),
        gemini_api_key_configured = config.gemini_api_key.is_some(),
        gemini_model = %config.gemini_model,
        graph_api_base = %config.graph_api_base,
        request_timeout_ms = config.request_timeout_ms,
        "config_loaded"
    );

    let missing = config.missing_secrets();
    if !missing.is_empty() {
        warn!(missing = ?missing, "config_secrets_missing");
    }

    let port = config.port;
    let state = AppState::from_config(config).context("Failed to create HTTP client")?;
    let app = router(state);

    // Bind to address
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!(address = %addr, "relay_server_listening");

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("relay_server_shutdown_complete");

    Ok(())
}

/// Create a future that completes when a shutdown signal is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }

    info!("relay_server_shutting_down");
}
