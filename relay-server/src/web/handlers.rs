//! Webhook endpoint handlers.
//!
//! - `GET /webhook` answers the verification handshake
//! - `POST /webhook` relays each delivered text message and returns once all
//!   replies have been attempted

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::gemini::{GeminiClient, ReplyGenerator};
use crate::messenger::{GraphClient, MessageSender, WebhookPayload};
use crate::relay::relay_delivery;
use crate::web::verify::{verify_subscription, VerifyQuery};
use crate::Config;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub generator: Arc<dyn ReplyGenerator>,
    pub sender: Arc<dyn MessageSender>,
}

impl AppState {
    pub fn new(
        config: Config,
        generator: Arc<dyn ReplyGenerator>,
        sender: Arc<dyn MessageSender>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            generator,
            sender,
        }
    }

    /// Build the state with the real Gemini and Send API clients.
    ///
    /// Both clients share one connection pool.
    pub fn from_config(config: Config) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;

        let generator = Arc::new(GeminiClient::new(client.clone(), &config));
        let sender = Arc::new(GraphClient::new(client, &config));

        Ok(Self::new(config, generator, sender))
    }
}

// =============================================================================
// Health Check
// =============================================================================

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

// =============================================================================
// Verification Handshake
// =============================================================================

/// Webhook verification endpoint.
///
/// Echoes `hub.challenge` with 200 when the mode is `subscribe` and the token
/// matches, otherwise 403 with an empty body.
pub async fn verify_webhook(
    State(state): State<AppState>,
    query: Result<Query<VerifyQuery>, QueryRejection>,
) -> Response {
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => {
            warn!(error = %rejection, "webhook_verification_query_invalid");
            return StatusCode::FORBIDDEN.into_response();
        }
    };

    match verify_subscription(&query, state.config.verify_token.as_deref()) {
        Some(challenge) => {
            info!(challenge_length = challenge.len(), "webhook_verified");
            (StatusCode::OK, challenge).into_response()
        }
        None => {
            warn!(
                mode = ?query.mode,
                has_token = query.verify_token.is_some(),
                verify_token_configured = state.config.verify_token.is_some(),
                "webhook_verification_rejected"
            );
            StatusCode::FORBIDDEN.into_response()
        }
    }
}

// =============================================================================
// Message Relay
// =============================================================================

/// Webhook delivery endpoint.
///
/// Deliveries that are not about a Page get 404 and trigger no outbound call.
/// Page deliveries always get 200 once processed, whatever happened to the
/// individual replies. The body only has to be JSON: malformed entries or
/// events are skipped rather than rejecting the delivery.
pub async fn receive_webhook(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> StatusCode {
    let payload = WebhookPayload::from_value(&body);

    info!(
        object = %payload.object,
        entries = payload.entry.len(),
        "webhook_delivery_received"
    );

    if !payload.is_page() {
        warn!(object = %payload.object, "webhook_delivery_unrecognized_object");
        return StatusCode::NOT_FOUND;
    }

    let summary = relay_delivery(
        state.generator.as_ref(),
        state.sender.as_ref(),
        &payload,
    )
    .await;

    info!(
        entries = summary.entries,
        relayed = summary.relayed,
        skipped = summary.skipped,
        generation_failures = summary.generation_failures,
        send_failures = summary.send_failures,
        "webhook_delivery_processed"
    );

    StatusCode::OK
}
