use schoolbot_models::UserIdentity;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::conversation::event::{EventKind, InboundEvent};
use crate::notifications::OutgoingMessage;

const MAX_TEXT: usize = 4096;
const MAX_PAYLOAD: usize = 256;
const MAX_DOCUMENT: usize = 1024 * 1024;

/// Body of `POST /api/events`.
#[derive(Debug, Deserialize, Validate)]
pub struct EventRequest {
    pub from: UserIdentity,
    #[validate(length(max = 64, message = "Name must be at most 64 characters."))]
    #[serde(default)]
    pub name: Option<String>,
    #[validate(custom(function = "validate_kind"))]
    #[serde(flatten)]
    pub kind: EventKind,
}

fn validate_kind(kind: &EventKind) -> Result<(), ValidationError> {
    let (len, max, message) = match kind {
        EventKind::Text { text } => (text.len(), MAX_TEXT, "Text is too long."),
        EventKind::Callback { payload } => (payload.len(), MAX_PAYLOAD, "Payload is too long."),
        EventKind::Document { content, .. } => {
            (content.len(), MAX_DOCUMENT, "Document is too large.")
        }
    };
    if len > max {
        return Err(ValidationError::new("too_long").with_message(message.into()));
    }
    Ok(())
}

impl From<EventRequest> for InboundEvent {
    fn from(request: EventRequest) -> Self {
        InboundEvent {
            from: request.from,
            name: request.name,
            kind: request.kind,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EventResponse {
    pub replies: Vec<OutgoingMessage>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OutboxResponse {
    pub identity: UserIdentity,
    pub messages: Vec<OutgoingMessage>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(json: &str) -> EventRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_text_event_converts() {
        let req = request(r#"{"from": 7, "name": "Ann", "kind": "text", "text": "/start"}"#);
        assert!(req.validate().is_ok());
        let event: InboundEvent = req.into();
        assert_eq!(event.from, UserIdentity(7));
        assert_eq!(
            event.kind,
            EventKind::Text {
                text: "/start".into()
            }
        );
    }

    #[test]
    fn test_oversized_text_is_rejected() {
        let body = serde_json::json!({
            "from": 7,
            "kind": "text",
            "text": "x".repeat(MAX_TEXT + 1),
        });
        let req: EventRequest = serde_json::from_value(body).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_long_name_is_rejected() {
        let body = serde_json::json!({
            "from": 7,
            "name": "n".repeat(65),
            "kind": "callback",
            "payload": "cancel",
        });
        let req: EventRequest = serde_json::from_value(body).unwrap();
        assert!(req.validate().is_err());
    }
}
