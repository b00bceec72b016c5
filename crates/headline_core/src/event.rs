use serde::{Deserialize, Serialize};

use crate::message::Role;

/// Render signals sent from the session controller to the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    TurnStart { role: Role },

    TextDelta { text: String },

    ThinkingDelta { thinking: String },

    TurnEnd,

    TitlesExtracted { titles: Vec<String> },

    Status { message: String },

    Error {
        error: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        partial: Option<String>,
    },

    SessionReset,
}

impl SessionEvent {
    pub fn turn_start(role: Role) -> Self {
        SessionEvent::TurnStart { role }
    }

    pub fn text_delta(text: impl Into<String>) -> Self {
        SessionEvent::TextDelta { text: text.into() }
    }

    pub fn thinking_delta(thinking: impl Into<String>) -> Self {
        SessionEvent::ThinkingDelta {
            thinking: thinking.into(),
        }
    }

    pub fn turn_end() -> Self {
        SessionEvent::TurnEnd
    }

    pub fn titles_extracted(titles: Vec<String>) -> Self {
        SessionEvent::TitlesExtracted { titles }
    }

    pub fn status(message: impl Into<String>) -> Self {
        SessionEvent::Status {
            message: message.into(),
        }
    }

    pub fn error(error: impl Into<String>) -> Self {
        SessionEvent::Error {
            error: error.into(),
            partial: None,
        }
    }

    /// Error carrying whatever text streamed before the failure.
    pub fn error_with_partial(error: impl Into<String>, partial: impl Into<String>) -> Self {
        let partial = partial.into();
        SessionEvent::Error {
            error: error.into(),
            partial: (!partial.is_empty()).then_some(partial),
        }
    }

    pub fn session_reset() -> Self {
        SessionEvent::SessionReset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_start() {
        let event = SessionEvent::turn_start(Role::Assistant);
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"turn_start"#));
        assert!(json.contains(r#""role":"assistant"#));
    }

    #[test]
    fn test_text_delta() {
        let event = SessionEvent::text_delta("你好");
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"text_delta"#));
        assert!(json.contains("你好"));
    }

    #[test]
    fn test_turn_end() {
        let json = serde_json::to_string(&SessionEvent::turn_end()).unwrap();
        assert_eq!(json, r#"{"type":"turn_end"}"#);
    }

    #[test]
    fn test_titles_extracted() {
        let event = SessionEvent::titles_extracted(vec!["a".to_string(), "b".to_string()]);
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"titles_extracted"#));
        assert!(json.contains(r#""titles":["a","b"]"#));
    }

    #[test]
    fn test_error_without_partial_omits_field() {
        let json = serde_json::to_string(&SessionEvent::error("boom")).unwrap();
        assert!(json.contains(r#""type":"error"#));
        assert!(!json.contains("partial"));
    }

    #[test]
    fn test_error_with_partial() {
        let event = SessionEvent::error_with_partial("boom", "你好");
        if let SessionEvent::Error { partial, .. } = event {
            assert_eq!(partial.as_deref(), Some("你好"));
        } else {
            panic!("Expected Error variant");
        }
    }

    #[test]
    fn test_error_with_empty_partial_is_none() {
        let event = SessionEvent::error_with_partial("boom", "");
        assert!(matches!(event, SessionEvent::Error { partial: None, .. }));
    }

    #[test]
    fn test_event_roundtrip() {
        let event = SessionEvent::status("compressing");
        let json = serde_json::to_string(&event).unwrap();
        let decoded: SessionEvent = serde_json::from_str(&json).unwrap();
        assert!(matches!(decoded, SessionEvent::Status { message } if message == "compressing"));
    }
}
