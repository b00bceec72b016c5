//! History-to-LLM message conversion and request building.

use headline_core::{ConversationMessage, Role};
use headline_llms::types::{GenerateRequest, Message, Role as LlmRole};

use super::window::TruncatedView;

fn to_llm_role(role: Role) -> LlmRole {
    match role {
        Role::System => LlmRole::System,
        Role::User => LlmRole::User,
        Role::Assistant => LlmRole::Assistant,
    }
}

/// Convert a conversation message to the wire message.
pub fn to_llm_message(message: &ConversationMessage) -> Message {
    Message::new(to_llm_role(message.role()), message.content())
}

/// Build the streaming request for one turn.
pub fn build_generate_request(
    view: &TruncatedView<'_>,
    model_id: &str,
    temperature: f32,
    max_tokens: u32,
) -> GenerateRequest {
    let messages = view.messages().iter().map(|m| to_llm_message(m)).collect();

    GenerateRequest::new(model_id, messages)
        .with_temperature(temperature)
        .with_max_tokens(max_tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::truncate;

    #[test]
    fn test_request_carries_view_in_order() {
        let history = vec![
            ConversationMessage::system("sys"),
            ConversationMessage::assistant("欢迎"),
            ConversationMessage::user("帮我生成标题"),
        ];
        let view = truncate(&history, 16000);
        let request = build_generate_request(&view, "deepseek-v3-241226", 0.7, 4096);

        assert_eq!(request.model, "deepseek-v3-241226");
        assert_eq!(request.messages.len(), 3);
        assert_eq!(request.messages[0].role, LlmRole::System);
        assert_eq!(request.messages[1].role, LlmRole::Assistant);
        assert_eq!(request.messages[2].content, "帮我生成标题");
        assert_eq!(request.options.temperature, Some(0.7));
        assert_eq!(request.options.max_tokens, Some(4096));
    }

    #[test]
    fn test_request_uses_truncated_view() {
        let history = vec![
            ConversationMessage::system("s"),
            ConversationMessage::user("a".repeat(100)),
            ConversationMessage::assistant("b".repeat(100)),
            ConversationMessage::user("c"),
            ConversationMessage::assistant("d"),
        ];
        let view = truncate(&history, 10);
        let request = build_generate_request(&view, "m", 1.0, 1000);

        let contents: Vec<_> = request.messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["s", "c", "d"]);
    }
}
