//! Provider catalog: credentials, endpoints and model maps per provider.

use std::collections::BTreeMap;
use std::sync::Arc;

use headline_llms::{OpenAIConfig, OpenAIProvider, ProviderRegistry};
use tracing::debug;

use super::{AppConfig, ModelEntry, ProviderSettings};
use crate::error::{Result, RuntimeError};

/// Endpoint and key for one provider
#[derive(Clone)]
pub struct Credentials {
    pub endpoint: String,
    pub api_key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"***")
            .finish()
    }
}

/// Read-only view of the configured providers
#[derive(Debug, Clone)]
pub struct ProviderCatalog {
    providers: Arc<BTreeMap<String, ProviderSettings>>,
    default_provider: String,
}

impl ProviderCatalog {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            providers: Arc::new(config.providers.clone()),
            default_provider: config.default_provider.clone(),
        }
    }

    pub fn default_provider(&self) -> &str {
        &self.default_provider
    }

    /// Provider IDs in sorted order
    pub fn provider_ids(&self) -> impl Iterator<Item = &str> {
        self.providers.keys().map(String::as_str)
    }

    pub fn contains(&self, provider_id: &str) -> bool {
        self.providers.contains_key(provider_id)
    }

    pub fn get(&self, provider_id: &str) -> Result<&ProviderSettings> {
        self.providers
            .get(provider_id)
            .ok_or_else(|| RuntimeError::ConfigError(format!("unknown provider '{provider_id}'")))
    }

    pub fn resolve_credentials(&self, provider_id: &str) -> Result<Credentials> {
        let settings = self.get(provider_id)?;
        let api_key = settings
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                RuntimeError::ConfigError(format!(
                    "no API key configured for provider '{provider_id}'"
                ))
            })?;

        Ok(Credentials {
            endpoint: settings.base_url.clone(),
            api_key: api_key.to_string(),
        })
    }

    pub fn model_catalog(&self, provider_id: &str) -> Result<&[ModelEntry]> {
        Ok(&self.get(provider_id)?.models)
    }

    /// Map a model display name to the identifier sent upstream.
    pub fn resolve_model(&self, provider_id: &str, model_name: &str) -> Result<&str> {
        self.get(provider_id)?
            .model(model_name)
            .map(|entry| entry.id.as_str())
            .ok_or_else(|| {
                RuntimeError::ConfigError(format!(
                    "model '{model_name}' is not available for provider '{provider_id}'"
                ))
            })
    }

    pub fn default_model(&self, provider_id: &str) -> Result<&str> {
        let settings = self.get(provider_id)?;
        if settings.model(&settings.default_model).is_some() {
            Ok(&settings.default_model)
        } else {
            settings
                .models
                .first()
                .map(|entry| entry.name.as_str())
                .ok_or_else(|| {
                    RuntimeError::ConfigError(format!("provider '{provider_id}' has no models"))
                })
        }
    }

    /// Register an HTTP provider for every entry that has credentials.
    ///
    /// Providers without a key are left out; selecting one later fails with a
    /// configuration error from [`resolve_credentials`](Self::resolve_credentials).
    pub fn build_registry(&self) -> ProviderRegistry {
        let mut registry = ProviderRegistry::new();
        for id in self.provider_ids() {
            let Ok(credentials) = self.resolve_credentials(id) else {
                debug!(provider = %id, "Skipping provider without API key");
                continue;
            };
            let config = OpenAIConfig::new(credentials.api_key)
                .with_provider_id(id)
                .with_base_url(credentials.endpoint);
            match OpenAIProvider::new(config) {
                Ok(provider) => registry = registry.register(id, provider),
                Err(e) => debug!(provider = %id, error = %e, "Skipping provider"),
            }
        }
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use headline_llms::Provider;

    fn catalog_with_volcano_key() -> ProviderCatalog {
        let mut config = AppConfig::default();
        config.providers.get_mut("volcano").unwrap().api_key = Some("sk-volc".into());
        ProviderCatalog::from_config(&config)
    }

    #[test]
    fn test_resolve_credentials() {
        let catalog = catalog_with_volcano_key();
        let creds = catalog.resolve_credentials("volcano").unwrap();
        assert_eq!(creds.endpoint, "https://ark.cn-beijing.volces.com/api/v3");
        assert_eq!(creds.api_key, "sk-volc");
        assert!(!format!("{creds:?}").contains("sk-volc"));
    }

    #[test]
    fn test_missing_key_is_config_error() {
        let catalog = catalog_with_volcano_key();
        let err = catalog.resolve_credentials("siliconflow").unwrap_err();
        assert!(matches!(err, RuntimeError::ConfigError(ref m) if m.contains("siliconflow")));
    }

    #[test]
    fn test_unknown_provider_is_config_error() {
        let catalog = catalog_with_volcano_key();
        assert!(matches!(
            catalog.model_catalog("openai"),
            Err(RuntimeError::ConfigError(_))
        ));
    }

    #[test]
    fn test_resolve_model() {
        let catalog = catalog_with_volcano_key();
        assert_eq!(
            catalog.resolve_model("siliconflow", "Qwen-7B").unwrap(),
            "Qwen/Qwen2.5-7B-Instruct"
        );
        assert_eq!(
            catalog.resolve_model("volcano", "DeepSeek-V3").unwrap(),
            "deepseek-v3-241226"
        );
        assert!(catalog.resolve_model("volcano", "Qwen-7B").is_err());
    }

    #[test]
    fn test_default_models() {
        let catalog = catalog_with_volcano_key();
        assert_eq!(catalog.default_provider(), "volcano");
        assert_eq!(catalog.default_model("volcano").unwrap(), "DeepSeek-V3");
        assert_eq!(catalog.default_model("siliconflow").unwrap(), "DeepSeek-R1");
    }

    #[test]
    fn test_build_registry_skips_keyless() {
        let registry = catalog_with_volcano_key().build_registry();
        assert_eq!(registry.list_providers(), vec!["volcano"]);
        assert_eq!(registry.get_provider("volcano").unwrap().provider_id(), "volcano");
    }
}
