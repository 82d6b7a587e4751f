//! Messenger Relay - answers Messenger users with Gemini-generated replies.
//!
//! ## Architecture
//!
//! ```text
//! Messenger → POST /webhook → Gemini generateContent → Send API → Messenger
//! ```
//!
//! Every delivery is handled in a single request: each text message is
//! answered before the next one is looked at, and the platform always gets
//! 200 for Page deliveries.

pub mod config;
pub mod error;
pub mod gemini;
pub mod messenger;
pub mod relay;
pub mod web;

// Re-export commonly used types
pub use config::Config;
pub use error::RelayError;
pub use gemini::{GeminiClient, ReplyGenerator};
pub use messenger::{GraphClient, MessageSender, WebhookPayload};
pub use relay::{relay_delivery, RelaySummary, FALLBACK_REPLY};
pub use web::{router, AppState};
