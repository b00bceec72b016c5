//! Configuration for logging/tracing output

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ObservabilityError;

/// Output format of the console layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Plain,
    /// One JSON object per line
    Json,
}

impl FromStr for LogFormat {
    type Err = ObservabilityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "plain" | "text" | "pretty" => Ok(LogFormat::Plain),
            "json" => Ok(LogFormat::Json),
            other => Err(ObservabilityError::Config(format!(
                "unknown log format '{other}' (expected plain or json)"
            ))),
        }
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Service name recorded on startup
    pub service_name: String,

    /// Enable console output (stderr)
    pub enable_console: bool,

    /// Log level filter (e.g., "info", "headline_runtime=debug")
    /// Falls back to `RUST_LOG`, then "info"
    pub log_level: Option<String>,

    pub format: LogFormat,

    /// Colorize plain output
    pub ansi: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            service_name: "headline".to_string(),
            enable_console: true,
            log_level: None,
            format: LogFormat::Plain,
            ansi: true,
        }
    }
}

impl ObservabilityConfig {
    /// Create a new configuration with service name
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            ..Default::default()
        }
    }

    /// Enable or disable console output
    pub fn with_console(mut self, enable: bool) -> Self {
        self.enable_console = enable;
        self
    }

    /// Set log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = Some(level.into());
        self
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_ansi(mut self, ansi: bool) -> Self {
        self.ansi = ansi;
        self
    }

    /// Build from environment variables
    ///
    /// Reads:
    /// - `HEADLINE_LOG` or `RUST_LOG` → log_level
    /// - `HEADLINE_LOG_FORMAT` → format (`plain` or `json`; unknown values keep plain)
    pub fn from_env() -> Self {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable lookup.
    pub fn from_env_with(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let log_level = lookup("HEADLINE_LOG")
            .or_else(|| lookup("RUST_LOG"))
            .filter(|level| !level.trim().is_empty());

        let format = lookup("HEADLINE_LOG_FORMAT")
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_default();

        Self {
            log_level,
            format,
            ansi: format == LogFormat::Plain,
            ..Default::default()
        }
    }
}
