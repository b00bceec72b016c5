use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the dialogue. Content is fixed at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "MessageRepr", into = "MessageRepr")]
pub struct ConversationMessage {
    role: Role,
    content: String,
    char_len: usize,
    timestamp: DateTime<Utc>,
}

impl ConversationMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        let content = content.into();
        let char_len = content.chars().count();
        Self {
            role,
            content,
            char_len,
            timestamp: Utc::now(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Length in characters (Unicode scalar values), the unit of the context budget.
    pub fn char_len(&self) -> usize {
        self.char_len
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn is_system(&self) -> bool {
        self.role == Role::System
    }
}

// Wire shape: the cached length is derived, never trusted from input.
#[derive(Serialize, Deserialize)]
struct MessageRepr {
    role: Role,
    content: String,
    #[serde(default = "Utc::now")]
    timestamp: DateTime<Utc>,
}

impl From<MessageRepr> for ConversationMessage {
    fn from(repr: MessageRepr) -> Self {
        let mut message = ConversationMessage::new(repr.role, repr.content);
        message.timestamp = repr.timestamp;
        message
    }
}

impl From<ConversationMessage> for MessageRepr {
    fn from(message: ConversationMessage) -> Self {
        MessageRepr {
            role: message.role,
            content: message.content,
            timestamp: message.timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serialization() {
        let role = Role::Assistant;
        let json = serde_json::to_string(&role).unwrap();
        assert_eq!(json, "\"assistant\"");

        let decoded: Role = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, Role::Assistant);
    }

    #[test]
    fn test_role_display() {
        assert_eq!(Role::System.to_string(), "system");
        assert_eq!(Role::User.to_string(), "user");
    }

    #[test]
    fn test_char_len_counts_characters_not_bytes() {
        let msg = ConversationMessage::user("生成标题");
        assert_eq!(msg.char_len(), 4);
        assert_eq!(msg.content().len(), 12);
    }

    #[test]
    fn test_factory_methods() {
        assert_eq!(ConversationMessage::system("s").role(), Role::System);
        assert_eq!(ConversationMessage::user("u").role(), Role::User);
        assert_eq!(ConversationMessage::assistant("a").role(), Role::Assistant);
        assert!(ConversationMessage::system("s").is_system());
    }

    #[test]
    fn test_deserialize_recomputes_length() {
        let json = r#"{"role":"user","content":"你好"}"#;
        let msg: ConversationMessage = serde_json::from_str(json).unwrap();
        assert_eq!(msg.role(), Role::User);
        assert_eq!(msg.char_len(), 2);
    }

    #[test]
    fn test_serialize_omits_cached_length() {
        let msg = ConversationMessage::assistant("hello");
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains(r#""role":"assistant""#));
        assert!(!json.contains("char_len"));
    }
}
