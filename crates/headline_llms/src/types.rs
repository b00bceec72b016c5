//! Unified request/response types shared by every provider.

use std::collections::BTreeMap;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Chat role as understood by chat-completion endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
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

/// A single chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
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
}

/// HTTP headers sent with a provider request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Headers {
    entries: BTreeMap<String, String>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Overlay `other` on top of these headers.
    pub fn merge_with(&mut self, other: &Headers) {
        for (key, value) in &other.entries {
            self.entries.insert(key.clone(), value.clone());
        }
    }

    /// Convert to a reqwest header map, skipping entries that are not valid HTTP.
    pub fn to_reqwest_headers(&self) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (key, value) in &self.entries {
            match (
                HeaderName::from_bytes(key.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => {
                    map.insert(name, value);
                }
                _ => tracing::warn!(header = %key, "Skipping invalid header"),
            }
        }
        map
    }
}

/// Sampling and transport options
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<Headers>,
}

/// A chat completion request in provider-neutral form
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(default)]
    pub options: GenerateOptions,
}

impl GenerateRequest {
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            options: GenerateOptions::default(),
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.options.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.options.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_headers(mut self, headers: Headers) -> Self {
        self.options.headers = Some(headers);
        self
    }
}

/// Token accounting reported by the provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl Usage {
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReasonKind {
    Stop,
    Length,
    ContentFilter,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinishReason {
    pub unified: FinishReasonKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

impl FinishReason {
    pub fn new(unified: FinishReasonKind) -> Self {
        Self { unified, raw: None }
    }

    pub fn with_raw(unified: FinishReasonKind, raw: impl Into<String>) -> Self {
        Self {
            unified,
            raw: Some(raw.into()),
        }
    }

    /// Map an OpenAI-style `finish_reason` string
    pub fn parse(raw: &str) -> Self {
        let unified = match raw {
            "stop" => FinishReasonKind::Stop,
            "length" => FinishReasonKind::Length,
            "content_filter" => FinishReasonKind::ContentFilter,
            _ => FinishReasonKind::Other,
        };
        Self::with_raw(unified, raw)
    }
}

/// Result of a non-streaming completion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub id: String,
    pub model: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    pub usage: Usage,
    pub finish_reason: FinishReason,
}

/// One unit of a streamed completion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    Start { id: String },
    TextDelta { id: String, delta: String },
    ReasoningDelta { id: String, delta: String },
    Finish { usage: Usage, reason: FinishReason },
    Error { message: String },
}

impl StreamEvent {
    pub fn start(id: impl Into<String>) -> Self {
        StreamEvent::Start { id: id.into() }
    }

    pub fn text_delta(id: impl Into<String>, delta: impl Into<String>) -> Self {
        StreamEvent::TextDelta {
            id: id.into(),
            delta: delta.into(),
        }
    }

    pub fn reasoning_delta(id: impl Into<String>, delta: impl Into<String>) -> Self {
        StreamEvent::ReasoningDelta {
            id: id.into(),
            delta: delta.into(),
        }
    }

    pub fn finish(usage: Usage, reason: FinishReason) -> Self {
        StreamEvent::Finish { usage, reason }
    }

    pub fn error(message: impl Into<String>) -> Self {
        StreamEvent::Error {
            message: message.into(),
        }
    }
}

type BoxedEventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent>> + Send>>;

/// Ordered stream of [`StreamEvent`]s for one completion
pub struct GenerateStream {
    inner: BoxedEventStream,
}

impl GenerateStream {
    pub fn new(inner: BoxedEventStream) -> Self {
        Self { inner }
    }
}

impl Stream for GenerateStream {
    type Item = Result<StreamEvent>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

impl std::fmt::Debug for GenerateStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerateStream").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[test]
    fn test_role_serialization() {
        assert_eq!(serde_json::to_string(&Role::System).unwrap(), "\"system\"");
        assert_eq!(Role::Assistant.as_str(), "assistant");
    }

    #[test]
    fn test_request_builder() {
        let req = GenerateRequest::new("deepseek-v3", vec![Message::user("hi")])
            .with_temperature(0.7)
            .with_max_tokens(4096);
        assert_eq!(req.options.temperature, Some(0.7));
        assert_eq!(req.options.max_tokens, Some(4096));
        assert_eq!(req.messages[0].role, Role::User);
    }

    #[test]
    fn test_headers_merge_overrides() {
        let mut base = Headers::new();
        base.insert("Authorization", "Bearer a");
        base.insert("Content-Type", "application/json");

        let mut custom = Headers::new();
        custom.insert("Authorization", "Bearer b");
        base.merge_with(&custom);

        assert_eq!(base.get("Authorization"), Some("Bearer b"));
        assert_eq!(base.get("Content-Type"), Some("application/json"));
    }

    #[test]
    fn test_headers_to_reqwest_skips_invalid() {
        let mut headers = Headers::new();
        headers.insert("X-Ok", "yes");
        headers.insert("bad header", "value");
        let map = headers.to_reqwest_headers();
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("x-ok").unwrap(), "yes");
    }

    #[test]
    fn test_finish_reason_parse() {
        assert_eq!(FinishReason::parse("stop").unified, FinishReasonKind::Stop);
        assert_eq!(FinishReason::parse("length").unified, FinishReasonKind::Length);
        let other = FinishReason::parse("weird");
        assert_eq!(other.unified, FinishReasonKind::Other);
        assert_eq!(other.raw.as_deref(), Some("weird"));
    }

    #[test]
    fn test_usage_total() {
        assert_eq!(Usage::new(10, 5).total_tokens, 15);
    }

    #[tokio::test]
    async fn test_generate_stream_yields_in_order() {
        let events = vec![
            Ok(StreamEvent::text_delta("", "你")),
            Ok(StreamEvent::text_delta("", "好")),
        ];
        let mut stream = GenerateStream::new(Box::pin(futures::stream::iter(events)));

        let mut text = String::new();
        while let Some(Ok(StreamEvent::TextDelta { delta, .. })) = stream.next().await {
            text.push_str(&delta);
        }
        assert_eq!(text, "你好");
    }
}
