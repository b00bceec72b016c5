//! Error types for observability crate

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ObservabilityError {
    /// The global subscriber could not be installed
    #[error("Failed to initialize logging: {0}")]
    InitFailed(String),

    /// Invalid filter or format
    #[error("Configuration error: {0}")]
    Config(String),
}
