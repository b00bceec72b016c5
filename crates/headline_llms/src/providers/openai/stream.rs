//! OpenAI-compatible streaming support
//!
//! SSE format:
//! - `data: {"choices":[{"delta":{"content":"..."}}]}` for text deltas
//! - `data: {"choices":[{"delta":{"reasoning_content":"..."}}]}` for reasoning (DeepSeek-R1)
//! - `data: [DONE]` to signal stream end
//!
//! The finish event is held back until the stream ends so that a usage block
//! arriving after `finish_reason` is still reported.

use super::convert::describe_error;
use super::types::{OpenAIStreamChoice, OpenAIStreamEvent};
use crate::error::{Error, Result};
use crate::types::{FinishReason, FinishReasonKind, GenerateStream, StreamEvent, Usage};
use futures::stream::StreamExt;
use reqwest_eventsource::{Event, EventSource};

/// Per-stream bookkeeping
#[derive(Debug, Default)]
struct StreamState {
    started: bool,
    usage: Usage,
    finish_reason: Option<FinishReason>,
}

impl StreamState {
    fn finish_event(&mut self) -> StreamEvent {
        let reason = self
            .finish_reason
            .take()
            .unwrap_or_else(|| FinishReason::new(FinishReasonKind::Stop));
        StreamEvent::finish(self.usage, reason)
    }
}

/// Create a stream from an EventSource
pub async fn create_stream(mut event_source: EventSource) -> Result<GenerateStream> {
    let stream = async_stream::stream! {
        let mut state = StreamState::default();

        while let Some(event) = event_source.next().await {
            match event {
                Ok(Event::Open) => continue,
                Ok(Event::Message(message)) => {
                    if message.data.trim() == "[DONE]" {
                        break;
                    }

                    match serde_json::from_str::<OpenAIStreamEvent>(&message.data) {
                        Ok(chunk) => match process_event(chunk, &mut state) {
                            Ok(events) => {
                                for stream_event in events {
                                    yield Ok(stream_event);
                                }
                            }
                            Err(e) => {
                                yield Err(e);
                                event_source.close();
                                return;
                            }
                        },
                        Err(e) => {
                            yield Err(Error::stream_error(format!("Failed to parse chunk: {}", e)));
                            event_source.close();
                            return;
                        }
                    }
                }
                Err(reqwest_eventsource::Error::StreamEnded) => break,
                Err(reqwest_eventsource::Error::InvalidStatusCode(status, response)) => {
                    let error_body = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Unable to read error body".to_string());
                    yield Err(Error::provider_error(format!(
                        "API error {}: {}", status, error_body
                    )));
                    event_source.close();
                    return;
                }
                Err(reqwest_eventsource::Error::InvalidContentType(_, response)) => {
                    let status = response.status();
                    let error_body = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Unable to read error body".to_string());
                    yield Err(Error::provider_error(format!(
                        "Expected an event stream, got status {}: {}", status, error_body
                    )));
                    event_source.close();
                    return;
                }
                Err(e) => {
                    yield Err(Error::stream_error(format!("Stream error: {}", e)));
                    event_source.close();
                    return;
                }
            }
        }

        event_source.close();
        yield Ok(state.finish_event());
    };

    Ok(GenerateStream::new(Box::pin(stream)))
}

/// Convert one chunk into unified events, updating stream state
fn process_event(chunk: OpenAIStreamEvent, state: &mut StreamState) -> Result<Vec<StreamEvent>> {
    if let Some(error) = chunk.error {
        return Err(Error::provider_error(describe_error(&error)));
    }

    let mut events = Vec::new();

    if !state.started {
        state.started = true;
        events.push(StreamEvent::start(chunk.id.clone().unwrap_or_default()));
    }

    if let Some(usage) = chunk.usage {
        state.usage = Usage {
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
            total_tokens: usage.total_tokens,
        };
    }

    let id = chunk.id.unwrap_or_default();
    for choice in chunk.choices {
        events.extend(process_choice(&id, choice, state));
    }

    Ok(events)
}

/// Process a single choice from the stream
fn process_choice(id: &str, choice: OpenAIStreamChoice, state: &mut StreamState) -> Vec<StreamEvent> {
    let mut events = Vec::new();
    let delta = choice.delta;

    if let Some(reasoning) = delta.reasoning_content {
        if !reasoning.is_empty() {
            events.push(StreamEvent::reasoning_delta(id, reasoning));
        }
    }

    if let Some(content) = delta.content {
        if !content.is_empty() {
            events.push(StreamEvent::text_delta(id, content));
        }
    }

    if let Some(raw) = choice.finish_reason {
        state.finish_reason = Some(FinishReason::parse(&raw));
    }

    events
}
