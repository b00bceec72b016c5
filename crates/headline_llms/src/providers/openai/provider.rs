//! OpenAI-compatible provider implementation

use super::convert::{from_openai_response, to_openai_request};
use super::stream::create_stream;
use super::types::{OpenAIConfig, OpenAIModelList, OpenAIResponse};
use crate::error::{Error, Result};
use crate::provider::Provider;
use crate::types::{GenerateRequest, GenerateResponse, GenerateStream, Headers};
use async_trait::async_trait;
use reqwest::Client;

/// Provider for any endpoint speaking the chat/completions protocol
pub struct OpenAIProvider {
    config: OpenAIConfig,
    client: Client,
}

impl OpenAIProvider {
    /// Create a new provider; an empty key is rejected up front
    pub fn new(config: OpenAIConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(Error::MissingApiKey(config.provider_id.clone()));
        }

        let client = Client::new();
        Ok(Self { config, client })
    }

    /// Create a provider reading its key from `env_var`
    pub fn from_env(
        provider_id: impl Into<String>,
        env_var: &str,
        base_url: impl Into<String>,
    ) -> Result<Self> {
        let provider_id = provider_id.into();
        let api_key = std::env::var(env_var)
            .map_err(|_| Error::MissingApiKey(provider_id.clone()))?;

        Self::new(
            OpenAIConfig::new(api_key)
                .with_provider_id(provider_id)
                .with_base_url(base_url),
        )
    }

    pub fn config(&self) -> &OpenAIConfig {
        &self.config
    }

    async fn error_from_response(&self, response: reqwest::Response) -> Error {
        let status = response.status();
        let error_text = response.text().await.unwrap_or_default();
        Error::provider_error(format!(
            "{} API error {}: {}",
            self.config.provider_id, status, error_text
        ))
    }
}

impl std::fmt::Debug for OpenAIProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAIProvider")
            .field("provider_id", &self.config.provider_id)
            .field("base_url", &self.config.base_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Provider for OpenAIProvider {
    fn provider_id(&self) -> &str {
        &self.config.provider_id
    }

    fn build_headers(&self, custom_headers: Option<&Headers>) -> Headers {
        let mut headers = Headers::new();

        headers.insert("Authorization", format!("Bearer {}", self.config.api_key));
        headers.insert("Content-Type", "application/json");

        if let Some(custom) = custom_headers {
            headers.merge_with(custom);
        }

        headers
    }

    async fn list_models(&self) -> Result<Vec<String>> {
        let url = format!("{}/models", self.config.base_url);
        let headers = self.build_headers(None);

        let response = self
            .client
            .get(&url)
            .headers(headers.to_reqwest_headers())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(self.error_from_response(response).await);
        }

        let list: OpenAIModelList = response.json().await?;
        Ok(list.data.into_iter().map(|m| m.id).collect())
    }

    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse> {
        let url = self.config.chat_completions_url();
        let openai_req = to_openai_request(&request, false);
        let headers = self.build_headers(request.options.headers.as_ref());

        tracing::debug!(
            provider = %self.config.provider_id,
            model = %openai_req.model,
            messages = openai_req.messages.len(),
            "Sending completion request"
        );

        let response = self
            .client
            .post(&url)
            .headers(headers.to_reqwest_headers())
            .json(&openai_req)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(self.error_from_response(response).await);
        }

        let openai_resp: OpenAIResponse = response.json().await?;
        from_openai_response(openai_resp)
    }

    async fn stream(&self, request: GenerateRequest) -> Result<GenerateStream> {
        let url = self.config.chat_completions_url();
        let openai_req = to_openai_request(&request, true);
        let headers = self.build_headers(request.options.headers.as_ref());

        tracing::debug!(
            provider = %self.config.provider_id,
            model = %openai_req.model,
            messages = openai_req.messages.len(),
            "Opening completion stream"
        );

        let req_builder = self
            .client
            .post(&url)
            .headers(headers.to_reqwest_headers())
            .json(&openai_req);

        let event_source = reqwest_eventsource::EventSource::new(req_builder)
            .map_err(|e| Error::stream_error(format!("Failed to create event source: {}", e)))?;

        create_stream(event_source).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_key_rejected_with_provider_id() {
        let config = OpenAIConfig::new("  ").with_provider_id("siliconflow");
        match OpenAIProvider::new(config) {
            Err(Error::MissingApiKey(id)) => assert_eq!(id, "siliconflow"),
            other => panic!("Expected MissingApiKey, got {:?}", other),
        }
    }

    #[test]
    fn test_bearer_headers_and_custom_merge() {
        let provider = OpenAIProvider::new(
            OpenAIConfig::new("sk-test").with_provider_id("volcano"),
        )
        .unwrap();

        let mut custom = Headers::new();
        custom.insert("X-Trace", "abc");
        let headers = provider.build_headers(Some(&custom));

        assert_eq!(headers.get("Authorization"), Some("Bearer sk-test"));
        assert_eq!(headers.get("Content-Type"), Some("application/json"));
        assert_eq!(headers.get("X-Trace"), Some("abc"));
        assert_eq!(provider.provider_id(), "volcano");
    }
}
