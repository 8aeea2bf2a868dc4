use schoolbot_models::UserIdentity;
use serde::{Deserialize, Serialize};

/// One inbound chat event as delivered by a transport adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundEvent {
    pub from: UserIdentity,
    /// Display name as reported by the chat client.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(flatten)]
    pub kind: EventKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventKind {
    Text { text: String },
    Callback { payload: String },
    /// An uploaded file, passed through as its text content.
    Document {
        #[serde(default)]
        file_name: Option<String>,
        content: String,
    },
}

impl InboundEvent {
    pub fn text(from: UserIdentity, text: impl Into<String>) -> Self {
        Self {
            from,
            name: None,
            kind: EventKind::Text { text: text.into() },
        }
    }

    pub fn callback(from: UserIdentity, payload: impl Into<String>) -> Self {
        Self {
            from,
            name: None,
            kind: EventKind::Callback {
                payload: payload.into(),
            },
        }
    }

    pub fn document(from: UserIdentity, content: impl Into<String>) -> Self {
        Self {
            from,
            name: None,
            kind: EventKind::Document {
                file_name: None,
                content: content.into(),
            },
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().map(str::trim).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_format() {
        let event: InboundEvent = serde_json::from_str(
            r#"{"from": 42, "name": "Ann", "kind": "callback", "payload": "grade_add"}"#,
        )
        .unwrap();
        assert_eq!(
            event,
            InboundEvent::callback(UserIdentity(42), "grade_add").with_name("Ann")
        );

        let doc: InboundEvent =
            serde_json::from_str(r#"{"from": 1, "kind": "document", "content": "[]"}"#).unwrap();
        assert!(matches!(doc.kind, EventKind::Document { ref content, .. } if content == "[]"));
        assert_eq!(doc.display_name(), "");
    }
}
