//! OpenAI-compatible chat completions
//!
//! SiliconFlow, Volcano Ark and OpenAI itself all expose the same
//! `POST {base_url}/chat/completions` contract, so one implementation serves
//! every configured endpoint; only the provider ID, key and base URL differ.

mod convert;
mod provider;
mod stream;
mod types;

pub use provider::OpenAIProvider;
pub use types::OpenAIConfig;
