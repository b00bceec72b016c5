//! Context window management: character budget truncation.
//!
//! Length is approximated by character count. Truncation only shapes the
//! outbound request; the canonical history is never shrunk.

use headline_core::ConversationMessage;

/// Minimum number of trailing non-system messages always sent.
pub const MIN_TAIL_MESSAGES: usize = 2;

/// Read-only view of the history computed for one outbound request.
#[derive(Debug, Clone)]
pub struct TruncatedView<'a> {
    messages: Vec<&'a ConversationMessage>,
    total_chars: usize,
    dropped: usize,
}

impl<'a> TruncatedView<'a> {
    pub fn messages(&self) -> &[&'a ConversationMessage] {
        &self.messages
    }

    pub fn total_chars(&self) -> usize {
        self.total_chars
    }

    /// Number of messages left out of the view
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn is_truncated(&self) -> bool {
        self.dropped > 0
    }
}

/// Sum of character lengths.
pub fn total_chars(messages: &[ConversationMessage]) -> usize {
    messages.iter().map(ConversationMessage::char_len).sum()
}

/// Fit `messages` into `budget_chars`.
///
/// A leading system message is always kept. The oldest remaining messages are
/// dropped one at a time until the total fits or only the newest
/// [`MIN_TAIL_MESSAGES`] remain, so the result can still exceed the budget.
pub fn truncate(messages: &[ConversationMessage], budget_chars: usize) -> TruncatedView<'_> {
    let mut total = total_chars(messages);

    if total <= budget_chars {
        return TruncatedView {
            messages: messages.iter().collect(),
            total_chars: total,
            dropped: 0,
        };
    }

    let (system, removable) = match messages.split_first() {
        Some((first, rest)) if first.is_system() => (Some(first), rest),
        _ => (None, messages),
    };

    let mut start = 0;
    while total > budget_chars && removable.len() - start > MIN_TAIL_MESSAGES {
        total -= removable[start].char_len();
        start += 1;
    }

    let mut view = Vec::with_capacity(removable.len() - start + 1);
    view.extend(system);
    view.extend(removable[start..].iter());

    TruncatedView {
        messages: view,
        total_chars: total,
        dropped: start,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(n: usize) -> String {
        "字".repeat(n)
    }

    /// system(500) + welcome + 5 user/assistant exchanges
    fn long_history() -> Vec<ConversationMessage> {
        let mut messages = vec![
            ConversationMessage::system(text(500)),
            ConversationMessage::assistant(text(100)),
        ];
        for _ in 0..5 {
            messages.push(ConversationMessage::user(text(940)));
            messages.push(ConversationMessage::assistant(text(2940)));
        }
        messages
    }

    #[test]
    fn test_under_budget_returns_everything() {
        let messages = vec![
            ConversationMessage::system("s"),
            ConversationMessage::user("你好"),
        ];
        let view = truncate(&messages, 100);
        assert_eq!(view.len(), 2);
        assert_eq!(view.total_chars(), 3);
        assert!(!view.is_truncated());
    }

    #[test]
    fn test_exact_budget_is_not_truncated() {
        let messages = vec![ConversationMessage::user(text(10))];
        let view = truncate(&messages, 10);
        assert_eq!(view.dropped(), 0);
    }

    #[test]
    fn test_drops_oldest_until_within_budget() {
        let messages = long_history();
        assert_eq!(total_chars(&messages), 20000);

        let view = truncate(&messages, 16000);

        assert!(view.total_chars() <= 16000);
        assert!(view.messages()[0].is_system());
        assert_eq!(view.messages()[0].char_len(), 500);
        // welcome, first exchange, then the second user message
        assert_eq!(view.dropped(), 4);
        assert_eq!(view.total_chars(), 20000 - 100 - 940 - 2940 - 940);
        assert_eq!(view.len(), 1 + 7);
        let last = view.messages().last().unwrap();
        assert!(std::ptr::eq(*last, messages.last().unwrap()));
    }

    #[test]
    fn test_never_drops_last_two() {
        let messages = vec![
            ConversationMessage::system(text(10)),
            ConversationMessage::user(text(5000)),
            ConversationMessage::assistant(text(5000)),
            ConversationMessage::user(text(9000)),
            ConversationMessage::assistant(text(9000)),
        ];
        let view = truncate(&messages, 4000);

        assert_eq!(view.len(), 3);
        assert_eq!(view.dropped(), 2);
        assert_eq!(view.total_chars(), 18010);
        assert!(view.total_chars() > 4000);
    }

    #[test]
    fn test_without_system_message() {
        let messages = vec![
            ConversationMessage::user(text(50)),
            ConversationMessage::assistant(text(50)),
            ConversationMessage::user(text(10)),
        ];
        let view = truncate(&messages, 70);
        assert_eq!(view.len(), 2);
        assert!(!view.messages()[0].is_system());
        assert_eq!(view.total_chars(), 60);
    }

    #[test]
    fn test_char_count_not_bytes() {
        let messages = vec![ConversationMessage::user("标题标题")];
        assert_eq!(total_chars(&messages), 4);
        assert_eq!(truncate(&messages, 4).dropped(), 0);
    }
}
