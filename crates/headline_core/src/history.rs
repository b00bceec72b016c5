use serde::Serialize;

use crate::error::{CoreError, Result};
use crate::message::{ConversationMessage, Role};

/// Ordered dialogue owned by a single session.
///
/// A system message, if any, is always at index 0 and there is at most one.
/// The only way to add one is [`ConversationHistory::seeded`]; turns appended
/// afterwards are user or assistant messages.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConversationHistory {
    messages: Vec<ConversationMessage>,
}

impl ConversationHistory {
    /// Start a conversation with a system prompt and an optional welcome turn.
    pub fn seeded(system_prompt: impl Into<String>, welcome: Option<&str>) -> Self {
        let mut messages = vec![ConversationMessage::system(system_prompt)];
        if let Some(welcome) = welcome {
            messages.push(ConversationMessage::assistant(welcome));
        }
        Self { messages }
    }

    /// Rebuild a history from raw messages, enforcing the system-at-front rule.
    pub fn from_messages(messages: Vec<ConversationMessage>) -> Result<Self> {
        for (index, message) in messages.iter().enumerate() {
            if message.is_system() && index != 0 {
                return Err(CoreError::InvalidHistory(format!(
                    "system message at index {index}; only index 0 may hold one"
                )));
            }
        }
        Ok(Self { messages })
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(ConversationMessage::user(content));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(ConversationMessage::assistant(content));
    }

    pub fn messages(&self) -> &[ConversationMessage] {
        &self.messages
    }

    pub fn system_message(&self) -> Option<&ConversationMessage> {
        self.messages.first().filter(|m| m.is_system())
    }

    /// Messages a user should see: everything except the system prompt.
    pub fn visible(&self) -> impl Iterator<Item = &ConversationMessage> {
        self.messages.iter().filter(|m| !m.is_system())
    }

    pub fn last(&self) -> Option<&ConversationMessage> {
        self.messages.last()
    }

    pub fn count_role(&self, role: Role) -> usize {
        self.messages.iter().filter(|m| m.role() == role).count()
    }

    pub fn total_chars(&self) -> usize {
        self.messages.iter().map(ConversationMessage::char_len).sum()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
