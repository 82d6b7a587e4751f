//! Messenger platform module.
//!
//! This module provides:
//! - Wire types for webhook deliveries and Send API calls
//! - The Send API client used to deliver replies

pub mod client;
pub mod types;

pub use client::{GraphClient, MessageSender};
pub use types::{
    Entry, GraphApiError, InboundEvent, MessagingEvent, SendMessageRequest, WebhookPayload,
    PAGE_OBJECT,
};
