//! Tracing subscriber initialization
//!
//! Composes an `EnvFilter` with an optional stderr fmt layer (plain or JSON).
//! Logs go to stderr so they never interleave with streamed replies on stdout.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

use crate::config::{LogFormat, ObservabilityConfig};
use crate::error::ObservabilityError;

fn env_filter(config: &ObservabilityConfig) -> Result<EnvFilter, ObservabilityError> {
    match &config.log_level {
        Some(level) => EnvFilter::try_new(level.as_str())
            .map_err(|e| ObservabilityError::Config(format!("invalid log filter '{level}': {e}"))),
        None => Ok(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))),
    }
}

/// Initialize the global subscriber with the given configuration
///
/// Fails if the filter does not parse or a global subscriber is already set.
pub fn init(config: ObservabilityConfig) -> Result<(), ObservabilityError> {
    let filter = env_filter(&config)?;

    // Build layers first (separately typed, then composed once)
    let plain_layer = (config.enable_console && config.format == LogFormat::Plain).then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(config.ansi)
            .with_target(true)
    });

    let json_layer = (config.enable_console && config.format == LogFormat::Json).then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_current_span(true)
    });

    Registry::default()
        .with(filter)
        .with(plain_layer)
        .with(json_layer)
        .try_init()
        .map_err(|e| ObservabilityError::InitFailed(e.to_string()))?;

    tracing::debug!(
        service.name = %config.service_name,
        format = ?config.format,
        "Tracing initialized"
    );

    Ok(())
}

/// Initialize with configuration from environment variables
pub fn init_from_env() -> Result<(), ObservabilityError> {
    init(ObservabilityConfig::from_env())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_filter_is_config_error() {
        let config = ObservabilityConfig::new("t").with_log_level("headline=notalevel");
        assert!(matches!(
            init(config),
            Err(ObservabilityError::Config(_))
        ));
    }

    #[test]
    fn test_second_init_fails() {
        let config = ObservabilityConfig::new("t").with_console(false);
        let _ = init(config.clone());
        assert!(matches!(init(config), Err(ObservabilityError::InitFailed(_))));
    }
}
