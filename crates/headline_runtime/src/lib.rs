//! headline_runtime: the session core of the headline assistant.
//!
//! - [`context`]: title extraction, context window truncation, prompt template
//! - [`config`]: YAML configuration, provider catalog and validation
//! - [`session`]: per-conversation state and its validated settings
//! - [`controller`]: the streaming session controller

pub mod config;
pub mod context;
pub mod controller;
pub mod error;
pub mod session;

pub use config::{AppConfig, LoadedConfig, ModelEntry, ProviderCatalog, ValidationReport};
pub use context::{TitlePattern, TruncatedView, extract_titles, format_titles, truncate};
pub use controller::{SessionController, TurnOutcome};
pub use error::{Result, RuntimeError};
pub use session::{RequestSettings, SessionState};
