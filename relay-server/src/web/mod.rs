//! Web server module for the Messenger webhook.
//!
//! This module provides:
//! - The verification handshake on `GET /webhook`
//! - Message relay on `POST /webhook`
//! - A health check on `GET /health`

pub mod handlers;
pub mod verify;

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

pub use handlers::{health, receive_webhook, verify_webhook, AppState, HealthResponse};
pub use verify::{verify_subscription, VerifyQuery, SUBSCRIBE_MODE};

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/webhook", get(verify_webhook).post(receive_webhook))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
