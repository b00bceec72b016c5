//! headline_llms: streaming chat completions for OpenAI-compatible endpoints.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                  ProviderRegistry                    │
//! │  ┌──────────────────────────────────────────────┐   │
//! │  │  HashMap<String, Arc<dyn Provider>>           │   │
//! │  └──────────────────────────────────────────────┘   │
//! │                       │                              │
//! │             ┌─────────┴─────────┐                   │
//! │             ▼                   ▼                   │
//! │     ┌──────────────┐    ┌──────────────┐           │
//! │     │ siliconflow  │    │   volcano    │           │
//! │     │ OpenAIProv.  │    │ OpenAIProv.  │           │
//! │     └──────────────┘    └──────────────┘           │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use headline_llms::{OpenAIConfig, OpenAIProvider, ProviderRegistry};
//!
//! let provider = OpenAIProvider::new(
//!     OpenAIConfig::new("sk-...")
//!         .with_provider_id("siliconflow")
//!         .with_base_url("https://api.siliconflow.cn/v1"),
//! )
//! .unwrap();
//! let registry = ProviderRegistry::new().register("siliconflow", provider);
//! ```

pub mod error;
pub mod provider;
pub mod providers;
pub mod types;

#[cfg(test)]
mod tests;

pub use error::{Error, Result};
pub use provider::{Provider, ProviderRegistry};

pub use providers::OpenAIProvider;
pub use providers::openai::OpenAIConfig;

pub use types::{
    FinishReason, FinishReasonKind, GenerateRequest, GenerateResponse, GenerateStream, Headers,
    Message, Role, StreamEvent, Usage,
};
