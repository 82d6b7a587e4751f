//! Webhook verification handshake.
//!
//! When a webhook is registered, the platform sends
//! `GET /webhook?hub.mode=subscribe&hub.verify_token=...&hub.challenge=...`
//! and expects the challenge echoed back if the token matches.

use serde::Deserialize;

/// Mode the platform sends when subscribing a webhook.
pub const SUBSCRIBE_MODE: &str = "subscribe";

/// Query parameters of the verification request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VerifyQuery {
    #[serde(default, rename = "hub.mode")]
    pub mode: Option<String>,
    #[serde(default, rename = "hub.verify_token")]
    pub verify_token: Option<String>,
    #[serde(default, rename = "hub.challenge")]
    pub challenge: Option<String>,
}

/// Check a verification request against the configured token.
///
/// Returns the challenge to echo when `mode` is `subscribe` and the token
/// matches. With no configured token nothing verifies. A missing challenge
/// echoes as an empty body.
pub fn verify_subscription(query: &VerifyQuery, expected_token: Option<&str>) -> Option<String> {
    let expected = expected_token?;

    if query.mode.as_deref() != Some(SUBSCRIBE_MODE) {
        return None;
    }

    let provided = query.verify_token.as_deref()?;
    if !constant_time_compare(provided, expected) {
        return None;
    }

    Some(query.challenge.clone().unwrap_or_default())
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}
