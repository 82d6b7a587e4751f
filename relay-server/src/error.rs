//! Errors returned by the outbound API clients.

use reqwest::StatusCode;
use thiserror::Error;
use tracing::warn;

use crate::messenger::GraphApiError;

/// Failure of a single outbound call (generation or send).
///
/// The relay never surfaces these to the platform; it logs them and either
/// substitutes a fallback reply or drops the outbound message.
#[derive(Debug, Error)]
pub enum RelayError {
    /// A secret needed for the call is not configured.
    #[error("missing secret: {0}")]
    MissingSecret(&'static str),

    /// Transport-level failure (connect, timeout, body decode).
    ///
    /// The request URL is stripped: it carries the access token.
    #[error("http error: {0}")]
    Http(#[source] reqwest::Error),

    /// The Graph API answered with its structured error object.
    #[error("graph api error ({status}): {error}")]
    Graph {
        status: StatusCode,
        error: GraphApiError,
    },

    /// Non-success status without a recognizable error body.
    #[error("unexpected status {status}: {body}")]
    UnexpectedStatus { status: StatusCode, body: String },

    /// The model refused to answer (prompt blocked or unsafe candidate).
    #[error("generation blocked: {0}")]
    Blocked(String),

    /// The generation API returned no candidate to read text from.
    #[error("generation returned no candidates")]
    EmptyResponse,
}

impl From<reqwest::Error> for RelayError {
    fn from(e: reqwest::Error) -> Self {
        RelayError::Http(e.without_url())
    }
}

/// Read the body of a failed response for error reporting.
///
/// A body that cannot be read is described instead of dropped.
pub(crate) async fn read_error_body(response: reqwest::Response) -> String {
    match response.text().await {
        Ok(body) => body,
        Err(e) => {
            let e = e.without_url();
            warn!(error = %e, "error_body_read_failed");
            format!("<unreadable response body: {}>", e)
        }
    }
}
