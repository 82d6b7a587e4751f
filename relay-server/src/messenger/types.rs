//! Messenger platform wire types.
//!
//! This module defines the formats for:
//! - Webhook deliveries posted to `/webhook`
//! - Send API requests and error bodies

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Discriminator value of deliveries coming from a Facebook Page.
pub const PAGE_OBJECT: &str = "page";

// =============================================================================
// Webhook Delivery Types
// =============================================================================

/// Webhook delivery payload.
///
/// A single delivery may batch several entries. Fields the relay does not use
/// are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebhookPayload {
    /// Object type the delivery is about (`"page"` for Messenger)
    #[serde(default)]
    pub object: String,
    /// Batched entries
    #[serde(default)]
    pub entry: Vec<Entry>,
}

impl WebhookPayload {
    /// Decode a delivery without rejecting it for malformed parts.
    ///
    /// A non-string `object` reads as empty and a non-array `entry` as no
    /// entries. Entries are decoded one by one with [`Entry::from_value`].
    pub fn from_value(value: &Value) -> Self {
        let object = value
            .get("object")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let entry = value
            .get("entry")
            .and_then(Value::as_array)
            .map(|entries| entries.iter().map(Entry::from_value).collect())
            .unwrap_or_default();

        Self { object, entry }
    }

    /// Whether this delivery comes from a Page subscription.
    pub fn is_page(&self) -> bool {
        self.object == PAGE_OBJECT
    }
}

/// One entry of a delivery.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Entry {
    #[serde(default)]
    pub messaging: Vec<MessagingEvent>,
}

/// A messaging event inside an entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessagingEvent {
    #[serde(default)]
    pub sender: Option<Participant>,
    #[serde(default)]
    pub message: Option<Message>,
}

/// Sender or recipient of a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: String,
}

/// Message content. Attachments and quick replies carry no `text`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub text: Option<String>,
}

/// A text message the relay should answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    pub sender_id: String,
    pub message_text: String,
}

impl Entry {
    /// Decode an entry, keeping the position of every messaging event.
    ///
    /// An event that does not decode (for example a numeric `text` or
    /// `sender.id`) becomes an empty event, which carries no text message.
    pub fn from_value(value: &Value) -> Self {
        let messaging = value
            .get("messaging")
            .and_then(Value::as_array)
            .map(|events| {
                events
                    .iter()
                    .map(|event| {
                        MessagingEvent::deserialize(event).unwrap_or_else(|e| {
                            debug!(error = %e, "webhook_event_undecodable");
                            MessagingEvent::default()
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self { messaging }
    }

    /// Extract the text message of this entry, if any.
    ///
    /// Only the first messaging event is inspected; later events in the same
    /// entry are ignored. Events without a sender or with empty text yield
    /// `None`.
    pub fn inbound_event(&self) -> Option<InboundEvent> {
        let event = self.messaging.first()?;
        let text = event.message.as_ref()?.text.as_ref()?;
        if text.is_empty() {
            return None;
        }
        let sender = event.sender.as_ref()?;

        Some(InboundEvent {
            sender_id: sender.id.clone(),
            message_text: text.clone(),
        })
    }
}

// =============================================================================
// Send API Types
// =============================================================================

/// Body of a Send API call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageRequest {
    pub recipient: Participant,
    pub message: OutboundMessage,
}

/// Text payload of an outbound message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub text: String,
}

impl SendMessageRequest {
    /// Create a text reply addressed to `recipient_id`.
    pub fn text(recipient_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            recipient: Participant {
                id: recipient_id.into(),
            },
            message: OutboundMessage { text: text.into() },
        }
    }
}

/// Envelope of a Graph API error response: `{"error": {...}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphErrorEnvelope {
    pub error: GraphApiError,
}

/// Structured Graph API error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphApiError {
    #[serde(default)]
    pub message: String,
    #[serde(default, rename = "type")]
    pub error_type: Option<String>,
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub error_subcode: Option<i64>,
    #[serde(default)]
    pub fbtrace_id: Option<String>,
}

impl fmt::Display for GraphApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(error_type) = &self.error_type {
            write!(f, " [type={}]", error_type)?;
        }
        if let Some(code) = self.code {
            write!(f, " [code={}]", code)?;
        }
        if let Some(subcode) = self.error_subcode {
            write!(f, " [subcode={}]", subcode)?;
        }
        if let Some(trace) = &self.fbtrace_id {
            write!(f, " [fbtrace_id={}]", trace)?;
        }
        Ok(())
    }
}
