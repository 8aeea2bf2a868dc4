use async_trait::async_trait;
use schoolbot_models::UserIdentity;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::{DeliveryError, Notifier, OutgoingMessage};

/// Queues messages per recipient until a transport adapter drains them.
#[derive(Clone, Default)]
pub struct OutboxNotifier {
    queues: Arc<Mutex<HashMap<UserIdentity, Vec<OutgoingMessage>>>>,
}

impl OutboxNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every queued message for `identity`, oldest first.
    pub async fn drain(&self, identity: UserIdentity) -> Vec<OutgoingMessage> {
        self.queues
            .lock()
            .await
            .remove(&identity)
            .unwrap_or_default()
    }

    pub async fn pending(&self) -> usize {
        self.queues.lock().await.values().map(Vec::len).sum()
    }
}

#[async_trait]
impl Notifier for OutboxNotifier {
    async fn send(&self, to: UserIdentity, message: OutgoingMessage) -> Result<(), DeliveryError> {
        self.queues.lock().await.entry(to).or_default().push(message);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_drain_returns_messages_in_order_once() {
        let outbox = OutboxNotifier::new();
        let to = UserIdentity(7);
        outbox.send(to, OutgoingMessage::text("one")).await.unwrap();
        outbox.send(to, OutgoingMessage::text("two")).await.unwrap();
        outbox
            .send(UserIdentity(8), OutgoingMessage::text("other"))
            .await
            .unwrap();
        assert_eq!(outbox.pending().await, 3);

        let drained = outbox.drain(to).await;
        assert_eq!(
            drained.iter().map(|m| m.text.as_str()).collect::<Vec<_>>(),
            vec!["one", "two"]
        );
        assert!(outbox.drain(to).await.is_empty());
        assert_eq!(outbox.pending().await, 1);
    }
}
