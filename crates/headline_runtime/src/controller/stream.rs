//! Fragment consumption for one streamed reply.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use futures::StreamExt;
use headline_core::{Role, SessionEvent, SessionPhase};
use headline_llms::{GenerateRequest, Provider, StreamEvent};
use headline_observability::record_duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::SessionController;
use crate::error::{Result, RuntimeError};

impl SessionController {
    /// Stream the reply, emitting deltas, and return the accumulated text.
    ///
    /// Opening the stream and each fragment wait are raced against `cancel`
    /// and bounded by the idle timeout. Failures carry the text received so far.
    pub(super) async fn stream_response(
        &mut self,
        provider: Arc<dyn Provider>,
        request: GenerateRequest,
        context_chars: usize,
        cancel: Option<&CancellationToken>,
    ) -> Result<String> {
        if cancel.is_some_and(CancellationToken::is_cancelled) {
            return Err(RuntimeError::Cancelled);
        }

        let start = Instant::now();
        let idle_timeout = self.idle_timeout;

        let opened = until_cancelled(
            cancel,
            tokio::time::timeout(idle_timeout, provider.stream(request)),
        )
        .await?;
        let mut stream = match opened {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => return Err(RuntimeError::provider(context_chars, e.to_string(), "")),
            Err(_) => {
                return Err(RuntimeError::provider(
                    context_chars,
                    format!("no response within {}s", idle_timeout.as_secs_f32()),
                    "",
                ));
            }
        };

        self.phase = SessionPhase::Streaming;
        self.emit(SessionEvent::turn_start(Role::Assistant), cancel).await;

        let mut text = String::new();

        loop {
            let waited =
                until_cancelled(cancel, tokio::time::timeout(idle_timeout, stream.next())).await?;

            let Ok(item) = waited else {
                return Err(RuntimeError::provider(
                    context_chars,
                    format!("no data received for {}s", idle_timeout.as_secs_f32()),
                    &text,
                ));
            };
            let Some(item) = item else {
                break;
            };

            match item {
                Ok(StreamEvent::Start { id }) => debug!(generation.id = %id, "Stream started"),
                Ok(StreamEvent::TextDelta { delta, .. }) => {
                    text.push_str(&delta);
                    self.emit(SessionEvent::text_delta(delta), cancel).await;
                }
                Ok(StreamEvent::ReasoningDelta { delta, .. }) => {
                    self.emit(SessionEvent::thinking_delta(delta), cancel).await;
                }
                Ok(StreamEvent::Finish { usage, reason }) => {
                    info!(
                        prompt_tokens = usage.prompt_tokens,
                        completion_tokens = usage.completion_tokens,
                        reason = ?reason.unified,
                        "Stream finished"
                    );
                }
                Ok(StreamEvent::Error { message }) => {
                    return Err(RuntimeError::provider(context_chars, message, &text));
                }
                Err(e) => {
                    return Err(RuntimeError::provider(context_chars, e.to_string(), &text));
                }
            }
        }

        if cancel.is_some_and(CancellationToken::is_cancelled) {
            return Err(RuntimeError::Cancelled);
        }

        record_duration("duration_ms", start.elapsed());
        Ok(text)
    }
}

/// Await `fut`, giving up with `Cancelled` as soon as `cancel` fires.
async fn until_cancelled<F: Future>(cancel: Option<&CancellationToken>, fut: F) -> Result<F::Output> {
    match cancel {
        Some(c) => tokio::select! {
            biased;
            _ = c.cancelled() => Err(RuntimeError::Cancelled),
            output = fut => Ok(output),
        },
        None => Ok(fut.await),
    }
}
