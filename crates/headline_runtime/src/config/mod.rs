//! Application configuration
//!
//! Built-in defaults cover both supported providers; an optional YAML file is
//! merged over them and `*_API_KEY` environment variables are applied last.
//!
//! ```yaml
//! default_provider: siliconflow
//! prompt_path: prompt.md
//! app:
//!   default_temperature: 0.9
//! providers:
//!   siliconflow:
//!     api_key: sk-...
//! ```

mod catalog;
mod io;
mod validation;

use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub use catalog::{Credentials, ProviderCatalog};
pub use io::{LoadedConfig, load, load_config, resolve_config_path};
pub use validation::{ConfigValidationError, ValidationReport, validate};

/// Provider used when none is configured
pub const DEFAULT_PROVIDER: &str = "volcano";

/// Environment variable selecting the active provider
pub const PROVIDER_ENV: &str = "HEADLINE_PROVIDER";

pub const TEMPERATURE_RANGE: RangeInclusive<f32> = 0.0..=2.0;
pub const MAX_OUTPUT_TOKENS_RANGE: RangeInclusive<u32> = 1000..=16000;
pub const CONTEXT_BUDGET_RANGE: RangeInclusive<usize> = 4000..=32000;

/// A selectable model: display name and the identifier sent upstream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelEntry {
    pub name: String,
    pub id: String,
}

impl ModelEntry {
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
        }
    }
}

/// One OpenAI-compatible endpoint
#[derive(Debug, Clone, Serialize)]
pub struct ProviderSettings {
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub base_url: String,
    pub models: Vec<ModelEntry>,
    pub default_model: String,
}

impl ProviderSettings {
    pub fn has_api_key(&self) -> bool {
        self.api_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty())
    }

    pub fn model(&self, name: &str) -> Option<&ModelEntry> {
        self.models.iter().find(|m| m.name == name)
    }
}

/// Presentation metadata and request defaults
#[derive(Debug, Clone, Serialize)]
pub struct AppSettings {
    pub title: String,
    pub description: String,
    pub author: String,
    pub platform: String,
    pub default_max_tokens: u32,
    pub default_temperature: f32,
    pub default_context_length: usize,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            title: "爆款标题生成助手".to_string(),
            description: "基于大模型的多角度爆款标题生成工具，从8个不同角度为您打造爆款标题方案"
                .to_string(),
            author: "筱可".to_string(),
            platform: "筱可AI研习社".to_string(),
            default_max_tokens: 4096,
            default_temperature: 0.7,
            default_context_length: 16000,
        }
    }
}

/// Fully resolved configuration
#[derive(Debug, Clone, Serialize)]
pub struct AppConfig {
    pub default_provider: String,
    pub prompt_path: PathBuf,
    /// Longest tolerated silence between stream fragments
    pub stream_idle_timeout_secs: u64,
    pub app: AppSettings,
    pub providers: BTreeMap<String, ProviderSettings>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let mut providers = BTreeMap::new();
        providers.insert(
            "siliconflow".to_string(),
            ProviderSettings {
                display_name: "硅基流动".to_string(),
                api_key: None,
                base_url: "https://api.siliconflow.cn/v1".to_string(),
                models: vec![
                    ModelEntry::new("DeepSeek-V3", "deepseek-ai/DeepSeek-V3"),
                    ModelEntry::new("DeepSeek-R1", "deepseek-ai/DeepSeek-R1"),
                    ModelEntry::new("Qwen-14B", "Qwen/Qwen2.5-14B-Instruct"),
                    ModelEntry::new("Qwen-7B", "Qwen/Qwen2.5-7B-Instruct"),
                ],
                default_model: "DeepSeek-R1".to_string(),
            },
        );
        providers.insert(
            "volcano".to_string(),
            ProviderSettings {
                display_name: "火山引擎".to_string(),
                api_key: None,
                base_url: "https://ark.cn-beijing.volces.com/api/v3".to_string(),
                models: vec![
                    ModelEntry::new("DeepSeek-R1", "deepseek-r1-250120"),
                    ModelEntry::new("DeepSeek-V3", "deepseek-v3-241226"),
                ],
                default_model: "DeepSeek-V3".to_string(),
            },
        );

        Self {
            default_provider: DEFAULT_PROVIDER.to_string(),
            prompt_path: PathBuf::from("prompt.md"),
            stream_idle_timeout_secs: 60,
            app: AppSettings::default(),
            providers,
        }
    }
}

/// On-disk shape: every field optional, merged over [`AppConfig::default`]
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    default_provider: Option<String>,
    prompt_path: Option<PathBuf>,
    stream_idle_timeout_secs: Option<u64>,
    app: AppOverrides,
    providers: BTreeMap<String, ProviderOverrides>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct AppOverrides {
    title: Option<String>,
    description: Option<String>,
    author: Option<String>,
    platform: Option<String>,
    default_max_tokens: Option<u32>,
    default_temperature: Option<f32>,
    default_context_length: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ProviderOverrides {
    display_name: Option<String>,
    api_key: Option<String>,
    base_url: Option<String>,
    models: Option<Vec<ModelEntry>>,
    default_model: Option<String>,
}

impl AppConfig {
    /// Parse YAML and merge it over the built-in defaults.
    pub fn from_yaml_str(raw: &str) -> anyhow::Result<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        let file: ConfigFile = serde_yaml::from_str(raw)?;
        Ok(Self::default().merged(file))
    }

    fn merged(mut self, file: ConfigFile) -> Self {
        if let Some(provider) = file.default_provider {
            self.default_provider = provider;
        }
        if let Some(path) = file.prompt_path {
            self.prompt_path = path;
        }
        if let Some(secs) = file.stream_idle_timeout_secs {
            self.stream_idle_timeout_secs = secs;
        }

        let app = &mut self.app;
        let overrides = file.app;
        if let Some(v) = overrides.title {
            app.title = v;
        }
        if let Some(v) = overrides.description {
            app.description = v;
        }
        if let Some(v) = overrides.author {
            app.author = v;
        }
        if let Some(v) = overrides.platform {
            app.platform = v;
        }
        if let Some(v) = overrides.default_max_tokens {
            app.default_max_tokens = v;
        }
        if let Some(v) = overrides.default_temperature {
            app.default_temperature = v;
        }
        if let Some(v) = overrides.default_context_length {
            app.default_context_length = v;
        }

        for (id, overrides) in file.providers {
            let entry = self
                .providers
                .entry(id.clone())
                .or_insert_with(|| ProviderSettings {
                    display_name: id.clone(),
                    api_key: None,
                    base_url: String::new(),
                    models: Vec::new(),
                    default_model: String::new(),
                });
            if let Some(v) = overrides.display_name {
                entry.display_name = v;
            }
            if let Some(v) = overrides.api_key {
                entry.api_key = Some(v);
            }
            if let Some(v) = overrides.base_url {
                entry.base_url = v;
            }
            if let Some(models) = overrides.models {
                entry.models = models;
            }
            if let Some(v) = overrides.default_model {
                entry.default_model = v;
            }
            if entry.default_model.is_empty() || entry.model(&entry.default_model).is_none() {
                if let Some(first) = entry.models.first() {
                    entry.default_model = first.name.clone();
                }
            }
        }

        self
    }

    /// Apply environment overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    /// Apply environment overrides using `lookup` (testable without touching
    /// the process environment).
    ///
    /// `<PROVIDER>_API_KEY` sets that provider's key; [`PROVIDER_ENV`]
    /// selects the default provider.
    pub fn apply_env_with(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        for (id, settings) in self.providers.iter_mut() {
            if let Some(key) = lookup(&api_key_env(id)).filter(|k| !k.trim().is_empty()) {
                settings.api_key = Some(key);
            }
        }
        if let Some(provider) = lookup(PROVIDER_ENV).filter(|p| !p.trim().is_empty()) {
            self.default_provider = provider.trim().to_string();
        }
    }

    /// Replace out-of-range or dangling values with usable ones.
    ///
    /// Every replacement is also reported by [`validate`].
    pub fn sanitize(&mut self) {
        if !self.providers.contains_key(&self.default_provider) {
            self.default_provider = DEFAULT_PROVIDER.to_string();
        }
        let app = &mut self.app;
        app.default_temperature = clamp(app.default_temperature, &TEMPERATURE_RANGE);
        app.default_max_tokens = clamp(app.default_max_tokens, &MAX_OUTPUT_TOKENS_RANGE);
        app.default_context_length = clamp(app.default_context_length, &CONTEXT_BUDGET_RANGE);
        if self.stream_idle_timeout_secs == 0 {
            self.stream_idle_timeout_secs = AppConfig::default().stream_idle_timeout_secs;
        }
    }

    /// Copy with API keys masked, for display
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        for settings in copy.providers.values_mut() {
            if settings.has_api_key() {
                settings.api_key = Some("***".to_string());
            }
        }
        copy
    }
}

/// Environment variable holding the API key for `provider_id`
pub fn api_key_env(provider_id: &str) -> String {
    let upper: String = provider_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("{upper}_API_KEY")
}

fn clamp<T: PartialOrd + Copy>(value: T, range: &RangeInclusive<T>) -> T {
    if value < *range.start() {
        *range.start()
    } else if value > *range.end() {
        *range.end()
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.default_provider, "volcano");
        assert_eq!(config.app.default_max_tokens, 4096);
        assert_eq!(config.app.default_temperature, 0.7);
        assert_eq!(config.app.default_context_length, 16000);
        assert_eq!(config.stream_idle_timeout_secs, 60);
        assert_eq!(config.providers["siliconflow"].models.len(), 4);
        assert_eq!(config.providers["volcano"].default_model, "DeepSeek-V3");
        assert_eq!(
            config.providers["volcano"].model("DeepSeek-R1").unwrap().id,
            "deepseek-r1-250120"
        );
    }

    #[test]
    fn test_yaml_merges_over_builtins() {
        let config = AppConfig::from_yaml_str(
            r#"
default_provider: siliconflow
app:
  default_temperature: 1.2
providers:
  siliconflow:
    api_key: sk-sf
"#,
        )
        .unwrap();

        assert_eq!(config.default_provider, "siliconflow");
        assert_eq!(config.app.default_temperature, 1.2);
        assert_eq!(config.app.default_max_tokens, 4096);
        let sf = &config.providers["siliconflow"];
        assert_eq!(sf.api_key.as_deref(), Some("sk-sf"));
        assert_eq!(sf.base_url, "https://api.siliconflow.cn/v1");
        assert_eq!(sf.models.len(), 4);
        assert!(config.providers.contains_key("volcano"));
    }

    #[test]
    fn test_yaml_adds_provider_with_first_model_as_default() {
        let config = AppConfig::from_yaml_str(
            r#"
providers:
  local:
    base_url: http://localhost:8000/v1
    models:
      - { name: Small, id: small-1 }
      - { name: Large, id: large-1 }
"#,
        )
        .unwrap();

        let local = &config.providers["local"];
        assert_eq!(local.display_name, "local");
        assert_eq!(local.default_model, "Small");
        assert_eq!(config.providers.len(), 3);
    }

    #[test]
    fn test_replacing_models_resets_stale_default() {
        let config = AppConfig::from_yaml_str(
            r#"
providers:
  volcano:
    models:
      - { name: Doubao, id: doubao-pro }
"#,
        )
        .unwrap();
        assert_eq!(config.providers["volcano"].default_model, "Doubao");
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(AppConfig::from_yaml_str("no_such_field: 1").is_err());
    }

    #[test]
    fn test_empty_yaml_is_default() {
        let config = AppConfig::from_yaml_str("  \n").unwrap();
        assert_eq!(config.default_provider, DEFAULT_PROVIDER);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("SILICONFLOW_API_KEY", "sk-env"),
            ("VOLCANO_API_KEY", "  "),
            ("HEADLINE_PROVIDER", "siliconflow"),
        ]);
        let mut config = AppConfig::default();
        config.apply_env_with(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.providers["siliconflow"].api_key.as_deref(), Some("sk-env"));
        assert!(!config.providers["volcano"].has_api_key());
        assert_eq!(config.default_provider, "siliconflow");
    }

    #[test]
    fn test_sanitize_falls_back_and_clamps() {
        let mut config = AppConfig::default();
        config.default_provider = "openai".to_string();
        config.app.default_temperature = 3.5;
        config.app.default_max_tokens = 10;
        config.app.default_context_length = 100_000;
        config.sanitize();

        assert_eq!(config.default_provider, "volcano");
        assert_eq!(config.app.default_temperature, 2.0);
        assert_eq!(config.app.default_max_tokens, 1000);
        assert_eq!(config.app.default_context_length, 32000);
    }

    #[test]
    fn test_api_key_env_name() {
        assert_eq!(api_key_env("siliconflow"), "SILICONFLOW_API_KEY");
        assert_eq!(api_key_env("my-gateway"), "MY_GATEWAY_API_KEY");
    }

    #[test]
    fn test_redacted_masks_keys() {
        let mut config = AppConfig::default();
        config.providers.get_mut("volcano").unwrap().api_key = Some("sk-secret".into());
        let shown = config.redacted();
        assert_eq!(shown.providers["volcano"].api_key.as_deref(), Some("***"));
        assert!(shown.providers["siliconflow"].api_key.is_none());
        let yaml = serde_yaml::to_string(&shown).unwrap();
        assert!(!yaml.contains("sk-secret"));
    }
}
