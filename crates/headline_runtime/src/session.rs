//! Per-conversation state owned by the session controller.

use chrono::{DateTime, Utc};
use headline_core::{ConversationHistory, SessionId};

use crate::config::{
    AppSettings, CONTEXT_BUDGET_RANGE, MAX_OUTPUT_TOKENS_RANGE, TEMPERATURE_RANGE,
};
use crate::error::{Result, RuntimeError};

/// Sampling and budget parameters for the next request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RequestSettings {
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub context_budget_chars: usize,
}

impl RequestSettings {
    pub fn from_app(app: &AppSettings) -> Self {
        Self {
            temperature: app.default_temperature,
            max_output_tokens: app.default_max_tokens,
            context_budget_chars: app.default_context_length,
        }
    }
}

impl Default for RequestSettings {
    fn default() -> Self {
        Self::from_app(&AppSettings::default())
    }
}

#[derive(Debug, Clone)]
pub struct SessionState {
    pub(crate) id: SessionId,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) history: ConversationHistory,
    pub(crate) last_extracted_titles: Vec<String>,
    pub(crate) active_provider_id: String,
    pub(crate) active_model_name: String,
    pub(crate) settings: RequestSettings,
}

impl SessionState {
    pub fn new(
        history: ConversationHistory,
        provider_id: impl Into<String>,
        model_name: impl Into<String>,
        settings: RequestSettings,
    ) -> Self {
        Self {
            id: SessionId::new(),
            created_at: Utc::now(),
            history,
            last_extracted_titles: Vec::new(),
            active_provider_id: provider_id.into(),
            active_model_name: model_name.into(),
            settings,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    pub fn titles(&self) -> &[String] {
        &self.last_extracted_titles
    }

    pub fn active_provider_id(&self) -> &str {
        &self.active_provider_id
    }

    pub fn active_model_name(&self) -> &str {
        &self.active_model_name
    }

    pub fn settings(&self) -> RequestSettings {
        self.settings
    }

    pub fn temperature(&self) -> f32 {
        self.settings.temperature
    }

    pub fn max_output_tokens(&self) -> u32 {
        self.settings.max_output_tokens
    }

    pub fn context_budget_chars(&self) -> usize {
        self.settings.context_budget_chars
    }

    pub fn set_temperature(&mut self, temperature: f32) -> Result<()> {
        if !TEMPERATURE_RANGE.contains(&temperature) {
            return Err(out_of_range("temperature", temperature, &TEMPERATURE_RANGE));
        }
        self.settings.temperature = temperature;
        Ok(())
    }

    pub fn set_max_output_tokens(&mut self, max_output_tokens: u32) -> Result<()> {
        if !MAX_OUTPUT_TOKENS_RANGE.contains(&max_output_tokens) {
            return Err(out_of_range(
                "max output tokens",
                max_output_tokens,
                &MAX_OUTPUT_TOKENS_RANGE,
            ));
        }
        self.settings.max_output_tokens = max_output_tokens;
        Ok(())
    }

    pub fn set_context_budget(&mut self, budget_chars: usize) -> Result<()> {
        if !CONTEXT_BUDGET_RANGE.contains(&budget_chars) {
            return Err(out_of_range(
                "context budget",
                budget_chars,
                &CONTEXT_BUDGET_RANGE,
            ));
        }
        self.settings.context_budget_chars = budget_chars;
        Ok(())
    }

    /// Start a new conversation, keeping provider, model and settings.
    pub(crate) fn restart(&mut self, history: ConversationHistory) {
        self.id = SessionId::new();
        self.created_at = Utc::now();
        self.history = history;
        self.last_extracted_titles.clear();
    }
}

fn out_of_range<T: std::fmt::Display>(
    what: &str,
    value: T,
    range: &std::ops::RangeInclusive<T>,
) -> RuntimeError {
    RuntimeError::Validation(format!(
        "{what} {value} is outside {}..={}",
        range.start(),
        range.end()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> SessionState {
        SessionState::new(
            ConversationHistory::seeded("sys", Some("hi")),
            "volcano",
            "DeepSeek-V3",
            RequestSettings::default(),
        )
    }

    #[test]
    fn test_defaults_from_app_settings() {
        let s = state();
        assert_eq!(s.temperature(), 0.7);
        assert_eq!(s.max_output_tokens(), 4096);
        assert_eq!(s.context_budget_chars(), 16000);
        assert!(s.titles().is_empty());
        assert_eq!(s.history().len(), 2);
    }

    #[test]
    fn test_setters_accept_bounds() {
        let mut s = state();
        s.set_temperature(0.0).unwrap();
        s.set_temperature(2.0).unwrap();
        s.set_max_output_tokens(1000).unwrap();
        s.set_max_output_tokens(16000).unwrap();
        s.set_context_budget(4000).unwrap();
        s.set_context_budget(32000).unwrap();
        assert_eq!(s.temperature(), 2.0);
        assert_eq!(s.context_budget_chars(), 32000);
    }

    #[test]
    fn test_setters_reject_out_of_range() {
        let mut s = state();
        assert!(matches!(s.set_temperature(2.1), Err(RuntimeError::Validation(_))));
        assert!(matches!(s.set_max_output_tokens(999), Err(RuntimeError::Validation(_))));
        assert!(matches!(s.set_context_budget(32001), Err(RuntimeError::Validation(_))));
        assert_eq!(s.settings(), RequestSettings::default());
    }

    #[test]
    fn test_restart_keeps_selection() {
        let mut s = state();
        let old_id = s.id().clone();
        s.last_extracted_titles.push("t".into());
        s.set_temperature(1.5).unwrap();
        s.restart(ConversationHistory::seeded("sys", None));

        assert_ne!(s.id(), &old_id);
        assert!(s.titles().is_empty());
        assert_eq!(s.history().len(), 1);
        assert_eq!(s.temperature(), 1.5);
        assert_eq!(s.active_provider_id(), "volcano");
    }
}
