//! Message relay: user text in, generated reply out.
//!
//! ## Processing Flow
//!
//! ```text
//! WebhookPayload → entry.messaging[0] → generate_reply() → deliver_reply()
//! ```
//!
//! Entries are handled strictly one after another and every outbound call is
//! awaited before the next begins. Failures of either call are absorbed here.

use tracing::{debug, error, info};

use crate::gemini::ReplyGenerator;
use crate::messenger::{InboundEvent, MessageSender, WebhookPayload};

/// Reply sent when generation fails.
pub const FALLBACK_REPLY: &str = "Sorry, I had trouble generating a reply.";

/// Outcome counters for one delivery.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelaySummary {
    /// Entries in the delivery
    pub entries: usize,
    /// Entries that produced a text message
    pub relayed: usize,
    /// Entries skipped because their first event had no text message
    pub skipped: usize,
    /// Replies generated from the fallback string
    pub generation_failures: usize,
    /// Replies the Send API did not accept
    pub send_failures: usize,
}

/// Obtain a reply for `message_text`, substituting [`FALLBACK_REPLY`] on failure.
pub async fn generate_reply(generator: &dyn ReplyGenerator, message_text: &str) -> (String, bool) {
    match generator.generate(message_text).await {
        Ok(reply) => (reply, true),
        Err(e) => {
            error!(error = %e, prompt_length = message_text.len(), "relay_generation_failed");
            (FALLBACK_REPLY.to_string(), false)
        }
    }
}

/// Send `reply` to `sender_id`, logging and dropping any failure.
pub async fn deliver_reply(sender: &dyn MessageSender, sender_id: &str, reply: &str) -> bool {
    match sender.send_text(sender_id, reply).await {
        Ok(()) => true,
        Err(e) => {
            error!(error = %e, recipient_id = %sender_id, "relay_send_failed");
            false
        }
    }
}

/// Relay one inbound text message.
pub async fn relay_event(
    generator: &dyn ReplyGenerator,
    sender: &dyn MessageSender,
    event: &InboundEvent,
) -> (bool, bool) {
    info!(
        sender_id = %event.sender_id,
        message_length = event.message_text.len(),
        "relay_event_start"
    );

    let (reply, generated) = generate_reply(generator, &event.message_text).await;
    let delivered = deliver_reply(sender, &event.sender_id, &reply).await;

    info!(
        sender_id = %event.sender_id,
        generated = generated,
        delivered = delivered,
        "relay_event_complete"
    );

    (generated, delivered)
}

/// Relay every entry of a page delivery, in order.
///
/// Only the first messaging event of each entry is considered.
pub async fn relay_delivery(
    generator: &dyn ReplyGenerator,
    sender: &dyn MessageSender,
    payload: &WebhookPayload,
) -> RelaySummary {
    let mut summary = RelaySummary {
        entries: payload.entry.len(),
        ..Default::default()
    };

    for (index, entry) in payload.entry.iter().enumerate() {
        let Some(event) = entry.inbound_event() else {
            debug!(
                entry_index = index,
                messaging_events = entry.messaging.len(),
                "relay_entry_skipped"
            );
            summary.skipped += 1;
            continue;
        };

        let (generated, delivered) = relay_event(generator, sender, &event).await;

        summary.relayed += 1;
        if !generated {
            summary.generation_failures += 1;
        }
        if !delivered {
            summary.send_failures += 1;
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RelayError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<String>>,
        fail_generation: bool,
        fail_send: bool,
    }

    #[async_trait]
    impl ReplyGenerator for Recorder {
        async fn generate(&self, prompt: &str) -> Result<String, RelayError> {
            self.calls.lock().unwrap().push(format!("generate:{}", prompt));
            if self.fail_generation {
                return Err(RelayError::EmptyResponse);
            }
            Ok(format!("re: {}", prompt))
        }
    }

    #[async_trait]
    impl MessageSender for Recorder {
        async fn send_text(&self, recipient_id: &str, text: &str) -> Result<(), RelayError> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("send:{}:{}", recipient_id, text));
            if self.fail_send {
                return Err(RelayError::MissingSecret("PAGE_ACCESS_TOKEN"));
            }
            Ok(())
        }
    }

    fn payload(json: &str) -> WebhookPayload {
        serde_json::from_str(json).unwrap()
    }

    #[tokio::test]
    async fn test_relay_delivery_interleaves_in_entry_order() {
        let recorder = Recorder::default();
        let delivery = payload(
            r#"{"object": "page", "entry": [
                {"messaging": [{"sender": {"id": "U1"}, "message": {"text": "one"}}]},
                {"messaging": [{"sender": {"id": "U2"}, "message": {"text": "two"}}]},
                {"messaging": [{"sender": {"id": "U3"}, "message": {"text": "three"}}]}
            ]}"#,
        );

        let summary = relay_delivery(&recorder, &recorder, &delivery).await;

        assert_eq!(
            *recorder.calls.lock().unwrap(),
            vec![
                "generate:one",
                "send:U1:re: one",
                "generate:two",
                "send:U2:re: two",
                "generate:three",
                "send:U3:re: three",
            ]
        );
        assert_eq!(summary.entries, 3);
        assert_eq!(summary.relayed, 3);
        assert_eq!(summary.skipped, 0);
    }

    #[tokio::test]
    async fn test_generation_failure_sends_fallback() {
        let recorder = Recorder {
            fail_generation: true,
            ..Default::default()
        };
        let delivery = payload(
            r#"{"object": "page", "entry": [
                {"messaging": [{"sender": {"id": "U1"}, "message": {"text": "hi"}}]}
            ]}"#,
        );

        let summary = relay_delivery(&recorder, &recorder, &delivery).await;

        assert_eq!(
            *recorder.calls.lock().unwrap(),
            vec![
                "generate:hi".to_string(),
                format!("send:U1:{}", FALLBACK_REPLY),
            ]
        );
        assert_eq!(summary.generation_failures, 1);
        assert_eq!(summary.send_failures, 0);
    }

    #[tokio::test]
    async fn test_send_failure_does_not_stop_later_entries() {
        let recorder = Recorder {
            fail_send: true,
            ..Default::default()
        };
        let delivery = payload(
            r#"{"object": "page", "entry": [
                {"messaging": [{"sender": {"id": "U1"}, "message": {"text": "a"}}]},
                {"messaging": [{"sender": {"id": "U2"}, "message": {"text": "b"}}]}
            ]}"#,
        );

        let summary = relay_delivery(&recorder, &recorder, &delivery).await;

        assert_eq!(recorder.calls.lock().unwrap().len(), 4);
        assert_eq!(summary.relayed, 2);
        assert_eq!(summary.send_failures, 2);
    }

    #[tokio::test]
    async fn test_entries_without_text_are_skipped() {
        let recorder = Recorder::default();
        let delivery = payload(
            r#"{"object": "page", "entry": [
                {"messaging": [{"sender": {"id": "U1"}, "read": {"watermark": 1}}]},
                {"messaging": []},
                {"messaging": [{"sender": {"id": "U2"}, "message": {"text": "ok"}}]}
            ]}"#,
        );

        let summary = relay_delivery(&recorder, &recorder, &delivery).await;

        assert_eq!(
            *recorder.calls.lock().unwrap(),
            vec!["generate:ok", "send:U2:re: ok"]
        );
        assert_eq!(summary.skipped, 2);
        assert_eq!(summary.relayed, 1);
    }

    #[tokio::test]
    async fn test_generate_reply_passes_through_empty_text() {
        struct Silent;

        #[async_trait]
        impl ReplyGenerator for Silent {
            async fn generate(&self, _prompt: &str) -> Result<String, RelayError> {
                Ok(String::new())
            }
        }

        let (reply, generated) = generate_reply(&Silent, "hello").await;

        assert_eq!(reply, "");
        assert!(generated);
    }
}
