//! In-process live-update channel backed by a tokio broadcast.
//!
//! Addressed to no one in particular: any connected client may subscribe
//! (the SSE handler does) and messages published with no subscribers are
//! simply dropped.

use lf_core::LiveChannel;
use tokio::sync::broadcast;

/// One broadcast frame: topic plus JSON payload.
#[derive(Debug, Clone)]
pub struct FeedMessage {
    pub topic: String,
    pub payload: serde_json::Value,
}

pub struct MatchFeed {
    chan: broadcast::Sender<FeedMessage>,
}

impl MatchFeed {
    pub fn new() -> Self {
        Self {
            chan: broadcast::channel(16).0,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FeedMessage> {
        self.chan.subscribe()
    }
}

impl Default for MatchFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl LiveChannel for MatchFeed {
    fn publish(&self, topic: &str, payload: serde_json::Value) {
        if self.chan.receiver_count() > 0 {
            self.chan
                .send(FeedMessage {
                    topic: topic.to_string(),
                    payload,
                })
                .ok();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscriber_receives_published_frame() {
        let feed = MatchFeed::new();
        let mut rx = feed.subscribe();
        feed.publish("match", serde_json::json!({"score": 0.9}));

        let frame = rx.recv().await.unwrap();
        assert_eq!(frame.topic, "match");
        assert_eq!(frame.payload["score"], serde_json::json!(0.9));
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_a_noop() {
        let feed = MatchFeed::new();
        feed.publish("match", serde_json::json!({}));
        // A later subscriber starts fresh, no backlog.
        let mut rx = feed.subscribe();
        assert!(matches!(
            rx.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }
}
