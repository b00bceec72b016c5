//! Streaming session controller.
//!
//! Drives one request/response cycle at a time:
//!
//! ```text
//! Idle ──submit──▶ AwaitingResponse ──provider accepts──▶ Streaming ──▶ Finalized
//!                        │                                    │
//!                        └──────────── failure ───────────────┴──▶ Error ──acknowledge──▶ Idle
//! ```
//!
//! Split into focused submodules:
//! - **stream**: fragment consumption with cancellation and idle timeout

mod stream;

use std::sync::Arc;
use std::time::Duration;

use headline_core::{ConversationHistory, SessionEvent, SessionPhase};
use headline_llms::{Provider, ProviderRegistry};
use headline_observability::record_error;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, warn};

use crate::config::{AppConfig, ProviderCatalog};
use crate::context::{
    WELCOME_MESSAGE, build_generate_request, extract_titles, load_prompt_template, truncate,
};
use crate::error::{Result, RuntimeError};
use crate::session::{RequestSettings, SessionState};

/// Result of a successful turn
#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutcome {
    /// Full assistant reply, as committed to history
    pub response: String,
    /// Titles extracted by this turn; empty when extraction did not run or found nothing
    pub titles: Vec<String>,
    /// Characters sent upstream after truncation
    pub context_chars: usize,
    /// History messages left out of the request
    pub dropped_messages: usize,
}

/// Owns one conversation and talks to the selected provider.
pub struct SessionController {
    state: SessionState,
    phase: SessionPhase,
    catalog: ProviderCatalog,
    registry: ProviderRegistry,
    system_prompt: String,
    event_tx: mpsc::Sender<SessionEvent>,
    idle_timeout: Duration,
    last_partial: String,
}

impl SessionController {
    /// Create a controller with HTTP providers for every configured key.
    ///
    /// Reads the prompt template once from `config.prompt_path`.
    pub fn new(config: &AppConfig, event_tx: mpsc::Sender<SessionEvent>) -> Result<Self> {
        let catalog = ProviderCatalog::from_config(config);
        let registry = catalog.build_registry();
        let system_prompt = load_prompt_template(&config.prompt_path);
        Self::with_registry(config, registry, system_prompt, event_tx)
    }

    /// Create a controller over an explicit provider registry.
    pub fn with_registry(
        config: &AppConfig,
        registry: ProviderRegistry,
        system_prompt: impl Into<String>,
        event_tx: mpsc::Sender<SessionEvent>,
    ) -> Result<Self> {
        let catalog = ProviderCatalog::from_config(config);
        let provider_id = catalog.default_provider().to_string();
        let model_name = catalog.default_model(&provider_id)?.to_string();
        let system_prompt = system_prompt.into();

        let state = SessionState::new(
            ConversationHistory::seeded(system_prompt.as_str(), Some(WELCOME_MESSAGE)),
            provider_id,
            model_name,
            RequestSettings::from_app(&config.app),
        );

        info!(
            session.id = %state.id(),
            provider = %state.active_provider_id(),
            model = %state.active_model_name(),
            "Session created"
        );

        Ok(Self {
            state,
            phase: SessionPhase::Idle,
            catalog,
            registry,
            system_prompt,
            event_tx,
            idle_timeout: Duration::from_secs(config.stream_idle_timeout_secs.max(1)),
            last_partial: String::new(),
        })
    }

    /// Override the inter-fragment idle timeout.
    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn history(&self) -> &ConversationHistory {
        self.state.history()
    }

    pub fn titles(&self) -> &[String] {
        self.state.titles()
    }

    pub fn catalog(&self) -> &ProviderCatalog {
        &self.catalog
    }

    /// Text received before the last failure, until acknowledged
    pub fn last_partial(&self) -> Option<&str> {
        (!self.last_partial.is_empty()).then_some(self.last_partial.as_str())
    }

    /// Send `prompt` and stream the reply.
    ///
    /// Emits `SessionEvent`s as fragments arrive. On failure nothing is
    /// committed for the assistant and the controller stays in
    /// [`SessionPhase::Error`] until [`acknowledge`](Self::acknowledge).
    pub async fn submit(
        &mut self,
        prompt: &str,
        cancel: Option<CancellationToken>,
    ) -> Result<TurnOutcome> {
        if prompt.trim().is_empty() {
            return Err(RuntimeError::Validation("prompt is empty".to_string()));
        }
        if !self.phase.accepts_submit() {
            return Err(if self.phase.is_in_flight() {
                RuntimeError::Busy
            } else {
                RuntimeError::SessionError(
                    "the previous request failed; acknowledge it before sending another"
                        .to_string(),
                )
            });
        }

        // Resolve everything fallible before touching history
        let provider_id = self.state.active_provider_id().to_string();
        self.catalog.resolve_credentials(&provider_id)?;
        let model_id = self
            .catalog
            .resolve_model(&provider_id, self.state.active_model_name())?
            .to_string();
        let provider = self.registry.get_provider(&provider_id)?;

        let span = headline_observability::session_span!(
            self.state.id().as_str(),
            provider_id.as_str(),
            model_id.as_str()
        );

        self.run_turn(prompt, provider, &model_id, cancel)
            .instrument(span)
            .await
    }

    async fn run_turn(
        &mut self,
        prompt: &str,
        provider: Arc<dyn Provider>,
        model_id: &str,
        cancel: Option<CancellationToken>,
    ) -> Result<TurnOutcome> {
        self.last_partial.clear();
        self.state.history.push_user(prompt);
        self.phase = SessionPhase::AwaitingResponse;

        let settings = self.state.settings();
        let (request, context_chars, dropped_messages) = {
            let view = truncate(self.state.history.messages(), settings.context_budget_chars);
            let request = build_generate_request(
                &view,
                model_id,
                settings.temperature,
                settings.max_output_tokens,
            );
            (request, view.total_chars(), view.dropped())
        };

        if dropped_messages > 0 {
            info!(dropped_messages, context_chars, "Context truncated to fit budget");
            let notice = format!("上下文过长，已省略较早的 {dropped_messages} 条消息");
            self.emit(SessionEvent::status(notice), cancel.as_ref()).await;
        }
        debug!(messages = request.messages.len(), context_chars, "Sending request");

        match self
            .stream_response(provider, request, context_chars, cancel.as_ref())
            .await
        {
            Ok(response) => {
                let outcome = self
                    .finalize(prompt, response, context_chars, dropped_messages, cancel.as_ref())
                    .await;
                Ok(outcome)
            }
            Err(RuntimeError::Cancelled) => {
                info!("Request cancelled");
                self.phase = SessionPhase::Idle;
                self.emit(SessionEvent::status("已取消"), cancel.as_ref()).await;
                Err(RuntimeError::Cancelled)
            }
            Err(err) => {
                record_error(&err);
                self.phase = SessionPhase::Error;
                self.last_partial = err.partial().unwrap_or_default().to_string();
                let event = match err.partial() {
                    Some(partial) => SessionEvent::error_with_partial(err.diagnostic(), partial),
                    None => SessionEvent::error(err.diagnostic()),
                };
                self.emit(event, cancel.as_ref()).await;
                Err(err)
            }
        }
    }

    async fn finalize(
        &mut self,
        prompt: &str,
        response: String,
        context_chars: usize,
        dropped_messages: usize,
        cancel: Option<&CancellationToken>,
    ) -> TurnOutcome {
        if response.is_empty() {
            warn!("Provider returned an empty reply");
        }
        self.state.history.push_assistant(response.as_str());
        self.emit(SessionEvent::turn_end(), cancel).await;

        let mut titles = Vec::new();
        if should_extract(self.state.titles(), prompt) {
            titles = extract_titles(&response);
            if titles.is_empty() {
                debug!("No titles found in reply");
            } else {
                info!(count = titles.len(), "Titles extracted");
                self.state.last_extracted_titles = titles.clone();
                self.emit(SessionEvent::titles_extracted(titles.clone()), cancel).await;
            }
        }

        self.phase = SessionPhase::Finalized;
        TurnOutcome {
            response,
            titles,
            context_chars,
            dropped_messages,
        }
    }

    /// Leave the error phase; history is not touched.
    pub fn acknowledge(&mut self) {
        if self.phase == SessionPhase::Error {
            self.phase = SessionPhase::Idle;
            self.last_partial.clear();
        }
    }

    /// Start a new conversation with the same prompt and selection.
    ///
    /// Also recovers a controller whose previous submit was abandoned.
    pub async fn reset(&mut self) {
        self.state.restart(ConversationHistory::seeded(
            self.system_prompt.as_str(),
            Some(WELCOME_MESSAGE),
        ));
        self.phase = SessionPhase::Idle;
        self.last_partial.clear();
        info!(session.id = %self.state.id(), "Session reset");
        self.emit(SessionEvent::session_reset(), None).await;
    }

    /// Switch provider; the model falls back to that provider's default.
    pub fn select_provider(&mut self, provider_id: &str) -> Result<()> {
        let model_name = self.catalog.default_model(provider_id)?.to_string();
        self.state.active_provider_id = provider_id.to_string();
        self.state.active_model_name = model_name;
        Ok(())
    }

    /// Switch model within the active provider.
    pub fn select_model(&mut self, model_name: &str) -> Result<()> {
        self.catalog
            .resolve_model(self.state.active_provider_id(), model_name)?;
        self.state.active_model_name = model_name.to_string();
        Ok(())
    }

    pub fn set_temperature(&mut self, temperature: f32) -> Result<()> {
        self.state.set_temperature(temperature)
    }

    pub fn set_max_output_tokens(&mut self, max_output_tokens: u32) -> Result<()> {
        self.state.set_max_output_tokens(max_output_tokens)
    }

    pub fn set_context_budget(&mut self, budget_chars: usize) -> Result<()> {
        self.state.set_context_budget(budget_chars)
    }

    /// Deliver an event to the UI.
    ///
    /// A full channel waits for the consumer. With a token the wait also ends
    /// on cancellation, and the event is dropped.
    async fn emit(&self, event: SessionEvent, cancel: Option<&CancellationToken>) {
        let Some(cancel) = cancel else {
            let _ = self.event_tx.send(event).await;
            return;
        };
        match self.event_tx.try_send(event) {
            Ok(()) | Err(TrySendError::Closed(_)) => {}
            Err(TrySendError::Full(event)) => {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => debug!("Event dropped after cancellation"),
                    _ = self.event_tx.send(event) => {}
                }
            }
        }
    }
}

/// Titles are extracted once per conversation, for prompts asking to generate titles.
fn should_extract(existing: &[String], prompt: &str) -> bool {
    existing.is_empty() && prompt.contains("生成") && prompt.contains("标题")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_extract() {
        assert!(should_extract(&[], "帮我生成几个标题"));
        assert!(!should_extract(&[], "帮我生成几个名字"));
        assert!(!should_extract(&[], "标题怎么写"));
        assert!(!should_extract(&["x".to_string()], "生成标题"));
    }
}
