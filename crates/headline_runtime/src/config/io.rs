//! Config file discovery and loading.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tokio::fs;
use tracing::{debug, info};

use super::{AppConfig, ValidationReport, validate};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "HEADLINE_CONFIG";

/// Config file name looked up in the working directory.
const LOCAL_CONFIG_FILE: &str = "headline.yaml";

/// Resolve which config file to read.
///
/// Priority: `explicit` > `HEADLINE_CONFIG` > `./headline.yaml` >
/// `~/.headline/config.yaml`. The first two are returned even if the file
/// does not exist so that a typo is reported instead of ignored; the last two
/// are only returned when present.
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.is_file() {
        return Some(local);
    }

    dirs::home_dir()
        .map(|home| home.join(".headline").join("config.yaml"))
        .filter(|path| path.is_file())
}

/// Read and parse one config file, merged over the built-in defaults.
pub async fn load_config(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        bail!("Config file not found: {}", path.display());
    }

    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config = AppConfig::from_yaml_str(&raw)
        .with_context(|| format!("Failed to parse config YAML at: {}", path.display()))?;

    info!(path = %path.display(), "Loaded config");
    Ok(config)
}

/// A config ready for use, with the report produced while preparing it.
#[derive(Debug)]
pub struct LoadedConfig {
    pub config: AppConfig,
    pub report: ValidationReport,
    /// File the config was read from; `None` means built-in defaults
    pub source: Option<PathBuf>,
}

/// Locate, read, apply env overrides, validate and sanitize.
///
/// This is the main entry point for loading a config at startup.
pub async fn load(explicit: Option<&Path>) -> Result<LoadedConfig> {
    let source = resolve_config_path(explicit);

    let mut config = match &source {
        Some(path) => load_config(path).await?,
        None => {
            debug!("No config file found; using defaults");
            AppConfig::default()
        }
    };

    config.apply_env();
    let report = validate(&config);
    config.sanitize();

    Ok(LoadedConfig {
        config,
        report,
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "default_provider: siliconflow\nstream_idle_timeout_secs: 5").unwrap();

        let config = load_config(file.path()).await.unwrap();
        assert_eq!(config.default_provider, "siliconflow");
        assert_eq!(config.stream_idle_timeout_secs, 5);
    }

    #[tokio::test]
    async fn test_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(&dir.path().join("absent.yaml")).await.unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[tokio::test]
    async fn test_invalid_yaml_names_the_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "providers: [not, a, map]").unwrap();

        let err = load_config(file.path()).await.unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse config YAML"));
    }

    #[tokio::test]
    async fn test_load_explicit_sanitizes_and_reports() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "default_provider: missing\napp:\n  default_max_tokens: 99999").unwrap();

        let loaded = load(Some(file.path())).await.unwrap();
        assert_eq!(loaded.source.as_deref(), Some(file.path()));
        assert_eq!(loaded.config.default_provider, "volcano");
        assert_eq!(loaded.config.app.default_max_tokens, 16000);
        let paths: Vec<_> = loaded.report.warnings.iter().map(|w| w.path.as_str()).collect();
        assert!(paths.contains(&"default_provider"));
        assert!(paths.contains(&"app.default_max_tokens"));
    }

    #[test]
    fn test_explicit_path_wins() {
        let path = Path::new("/tmp/does-not-matter.yaml");
        assert_eq!(resolve_config_path(Some(path)).as_deref(), Some(path));
    }
}
