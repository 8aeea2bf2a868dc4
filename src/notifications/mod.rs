//! Outbound messages and best-effort delivery.
//!
//! Replies to the actor of an event travel back with the event response.
//! Everything addressed to someone else (admin prompts, approval results,
//! announcements) goes through a [`Notifier`].

mod outbox;

pub use outbox::OutboxNotifier;

use async_trait::async_trait;
use schoolbot_core::errors::AppError;
use schoolbot_models::UserIdentity;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::conversation::callback::CallbackCommand;

/// A button attached to a message; pressing it sends `payload` back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineButton {
    pub label: String,
    pub payload: String,
}

impl InlineButton {
    pub fn new(label: impl Into<String>, command: &CallbackCommand) -> Self {
        Self {
            label: label.into(),
            payload: command.encode(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "rows", rename_all = "snake_case")]
pub enum Keyboard {
    /// Persistent menu of text labels.
    Reply(Vec<Vec<String>>),
    /// Buttons bound to one message.
    Inline(Vec<Vec<InlineButton>>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingMessage {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyboard: Option<Keyboard>,
}

impl OutgoingMessage {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: None,
        }
    }

    pub fn with_keyboard(mut self, keyboard: Keyboard) -> Self {
        self.keyboard = Some(keyboard);
        self
    }

    /// Attach inline buttons, one per row.
    pub fn with_buttons(self, buttons: Vec<InlineButton>) -> Self {
        self.with_keyboard(Keyboard::Inline(
            buttons.into_iter().map(|b| vec![b]).collect(),
        ))
    }

    /// Inline payloads carried by this message, in display order.
    pub fn payloads(&self) -> Vec<&str> {
        match &self.keyboard {
            Some(Keyboard::Inline(rows)) => rows
                .iter()
                .flatten()
                .map(|b| b.payload.as_str())
                .collect(),
            _ => Vec::new(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("recipient {0} cannot be reached")]
    Unreachable(UserIdentity),

    #[error("transport failure: {0}")]
    Transport(String),
}

/// Delivery backend for messages addressed to someone other than the actor.
///
/// Implementations can be swapped without changing the workflows.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, to: UserIdentity, message: OutgoingMessage) -> Result<(), DeliveryError>;
}

/// Outcome of a fan-out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FanOut {
    pub delivered: usize,
    pub failed: usize,
}

/// Send `message` to every recipient. Failures are logged and swallowed.
pub async fn notify_all<I>(notifier: &dyn Notifier, recipients: I, message: &OutgoingMessage) -> FanOut
where
    I: IntoIterator<Item = UserIdentity>,
{
    let mut outcome = FanOut::default();
    for to in recipients {
        match notifier.send(to, message.clone()).await {
            Ok(()) => outcome.delivered += 1,
            Err(e) => {
                warn!(recipient = %to, error = %e, "Notification not delivered");
                outcome.failed += 1;
            }
        }
    }
    debug!(delivered = outcome.delivered, failed = outcome.failed, "Fan-out finished");
    outcome
}

/// Best-effort single notification.
pub async fn notify(notifier: &dyn Notifier, to: UserIdentity, message: OutgoingMessage) {
    if let Err(e) = notifier.send(to, message).await {
        warn!(recipient = %to, error = %e, "Notification not delivered");
    }
}

/// Single-recipient send whose failure the actor must hear about.
pub async fn send_direct(
    notifier: &dyn Notifier,
    to: UserIdentity,
    message: OutgoingMessage,
) -> Result<(), AppError> {
    notifier.send(to, message).await.map_err(|e| {
        warn!(recipient = %to, error = %e, "Direct message not delivered");
        AppError::delivery(e)
    })
}
