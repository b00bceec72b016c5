//! Config validation: collects every problem in one pass.

use thiserror::Error;

use super::{
    AppConfig, CONTEXT_BUDGET_RANGE, DEFAULT_PROVIDER, MAX_OUTPUT_TOKENS_RANGE,
    TEMPERATURE_RANGE, api_key_env,
};

/// A config problem with the field path it concerns.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// Errors make a provider unusable; warnings are fixed up by
/// [`AppConfig::sanitize`] or only matter once that provider is selected.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    /// Emit every entry through tracing.
    pub fn log(&self) {
        for warning in &self.warnings {
            tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
        }
        for error in &self.errors {
            tracing::error!(path = %error.path, message = %error.message, "Config error");
        }
    }
}

/// Validate the config and return a report of all errors and warnings.
pub fn validate(config: &AppConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_default_provider(config, &mut report);
    validate_providers(config, &mut report);
    validate_app(config, &mut report);
    if config.stream_idle_timeout_secs == 0 {
        report.warn(
            "stream_idle_timeout_secs",
            "Idle timeout must be > 0; using the default",
        );
    }
    report
}

fn validate_default_provider(config: &AppConfig, report: &mut ValidationReport) {
    if !config.providers.contains_key(&config.default_provider) {
        report.warn(
            "default_provider",
            format!(
                "Unknown default provider '{}'; falling back to '{DEFAULT_PROVIDER}'",
                config.default_provider
            ),
        );
    }
}

fn validate_providers(config: &AppConfig, report: &mut ValidationReport) {
    for (id, provider) in &config.providers {
        let path = format!("providers.{id}");
        if provider.base_url.trim().is_empty() {
            report.error(format!("{path}.base_url"), "base_url is required");
        }
        if !provider.has_api_key() {
            report.warn(
                format!("{path}.api_key"),
                format!("No API key configured (set {})", api_key_env(id)),
            );
        }
        if provider.models.is_empty() {
            report.error(format!("{path}.models"), "Provider has no models defined");
            continue;
        }
        for model in &provider.models {
            if model.id.trim().is_empty() {
                report.error(
                    format!("{path}.models.{}", model.name),
                    "Model id cannot be empty",
                );
            }
        }
        if provider.model(&provider.default_model).is_none() {
            report.error(
                format!("{path}.default_model"),
                format!("'{}' is not in the model list", provider.default_model),
            );
        }
    }
}

fn validate_app(config: &AppConfig, report: &mut ValidationReport) {
    let app = &config.app;
    if !TEMPERATURE_RANGE.contains(&app.default_temperature) {
        report.warn(
            "app.default_temperature",
            format!(
                "{} is outside {:?}; clamping",
                app.default_temperature, TEMPERATURE_RANGE
            ),
        );
    }
    if !MAX_OUTPUT_TOKENS_RANGE.contains(&app.default_max_tokens) {
        report.warn(
            "app.default_max_tokens",
            format!(
                "{} is outside {:?}; clamping",
                app.default_max_tokens, MAX_OUTPUT_TOKENS_RANGE
            ),
        );
    }
    if !CONTEXT_BUDGET_RANGE.contains(&app.default_context_length) {
        report.warn(
            "app.default_context_length",
            format!(
                "{} is outside {:?}; clamping",
                app.default_context_length, CONTEXT_BUDGET_RANGE
            ),
        );
    }
}
