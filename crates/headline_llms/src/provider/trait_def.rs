//! The `Provider` trait implemented by every backend

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{GenerateRequest, GenerateResponse, GenerateStream, Headers};

/// A chat-completion backend.
///
/// `stream` must yield events in generation order; consumers rely on that to
/// rebuild the response by concatenating text deltas.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Stable identifier, e.g. `"volcano"`.
    fn provider_id(&self) -> &str;

    /// Headers sent with each request, with `custom_headers` overlaid.
    fn build_headers(&self, custom_headers: Option<&Headers>) -> Headers;

    /// Model identifiers the backend reports. Backends without a listing
    /// endpoint return an empty list.
    async fn list_models(&self) -> Result<Vec<String>> {
        Ok(Vec::new())
    }

    /// Run a completion to the end and return the full response.
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse>;

    /// Start a streamed completion.
    async fn stream(&self, request: GenerateRequest) -> Result<GenerateStream>;
}
