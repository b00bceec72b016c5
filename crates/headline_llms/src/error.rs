//! Error types for the LLM SDK

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Missing API key for provider '{0}'")]
    MissingApiKey(String),

    #[error("Provider not found: {0}")]
    ProviderNotFound(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    pub fn stream_error(message: impl Into<String>) -> Self {
        Error::Stream(message.into())
    }

    pub fn provider_error(message: impl Into<String>) -> Self {
        Error::Provider(message.into())
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Error::InvalidResponse(message.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
