//! `headline config` subcommands.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use headline_runtime::AppConfig;
use headline_runtime::config::{ValidationReport, api_key_env, resolve_config_path};

use super::load_config;
use crate::cli::ConfigAction;
use crate::output;

pub async fn handle(action: ConfigAction, explicit: Option<&Path>) -> Result<()> {
    match action {
        ConfigAction::Show => show(explicit).await,
        ConfigAction::Validate => validate(explicit).await,
        ConfigAction::Path => path(explicit),
        ConfigAction::Init { path, force } => init(path, force),
        ConfigAction::Api { provider } => configure_api(provider, explicit).await,
    }
}

async fn show(explicit: Option<&Path>) -> Result<()> {
    let loaded = load_config(explicit).await?;
    let redacted = loaded.config.redacted();

    if output::is_json() {
        output::data("config", &redacted);
    } else {
        let yaml = serde_yaml::to_string(&redacted).context("failed to render config")?;
        print!("{yaml}");
    }
    Ok(())
}

async fn validate(explicit: Option<&Path>) -> Result<()> {
    let loaded = load_config(explicit).await?;
    let source = loaded
        .source
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "built-in defaults".to_string());

    output::header(&format!("Validating {source}"));
    print_report(&loaded.report);

    if !loaded.report.is_valid() {
        bail!("{} configuration error(s)", loaded.report.errors.len());
    }
    Ok(())
}

fn print_report(report: &ValidationReport) {
    for warning in &report.warnings {
        output::warning(&format!("{}: {}", warning.path, warning.message));
    }
    for error in &report.errors {
        output::error(&format!("{}: {}", error.path, error.message));
    }
    if report.warnings.is_empty() && report.is_valid() {
        output::success("No problems found");
    }
}

fn path(explicit: Option<&Path>) -> Result<()> {
    match resolve_config_path(explicit) {
        Some(path) => output::kv("config", &path.display().to_string()),
        None => output::dim("No config file found; using built-in defaults"),
    }
    Ok(())
}

fn headline_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| anyhow!("Could not find home directory"))?;
    Ok(home.join(".headline"))
}

fn init(path: Option<PathBuf>, force: bool) -> Result<()> {
    let path = match path {
        Some(path) => path,
        None => headline_dir()?.join("config.yaml"),
    };
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }

    write_default_config(&path)?;
    output::success(&format!("Wrote {}", path.display()));
    output::dim("API keys are read from <PROVIDER>_API_KEY; see `headline config api`.");
    Ok(())
}

fn write_default_config(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let yaml = serde_yaml::to_string(&AppConfig::default()).context("failed to render config")?;
    fs::write(path, yaml).with_context(|| format!("failed to write {}", path.display()))
}

async fn configure_api(provider: Option<String>, explicit: Option<&Path>) -> Result<()> {
    let loaded = load_config(explicit).await?;
    let providers: Vec<(&String, &str)> = loaded
        .config
        .providers
        .iter()
        .map(|(id, settings)| (id, settings.display_name.as_str()))
        .collect();

    let id = match provider {
        Some(p) => {
            let p_lower = p.to_lowercase();
            providers
                .iter()
                .map(|(id, _)| id.as_str())
                .find(|id| *id == p_lower)
                .ok_or_else(|| {
                    anyhow!(
                        "Unknown provider '{}'. Available: {}",
                        p,
                        providers.iter().map(|(id, _)| id.as_str()).collect::<Vec<_>>().join(", ")
                    )
                })?
                .to_string()
        }
        None => select_provider(&loaded.config, &providers)?,
    };

    let env_var = api_key_env(&id);
    output::header(&format!("Configure {id}"));

    if let Ok(current) = std::env::var(&env_var) {
        println!("  Current: {}", mask_key(&current));
        println!();
    }

    let key = prompt_api_key(&id)?;
    if key.is_empty() {
        output::warning("No key entered, cancelled.");
        return Ok(());
    }

    let env_path = headline_dir()?.join("env");
    save_api_key(&env_path, &env_var, &key)?;
    output::success(&format!("Saved {} to {}", env_var, env_path.display()));
    output::dim("The key is loaded automatically the next time headline starts.");

    Ok(())
}

fn select_provider(config: &AppConfig, providers: &[(&String, &str)]) -> Result<String> {
    println!("Select a provider to configure:\n");

    for (i, (id, name)) in providers.iter().enumerate() {
        let status = if config.providers.get(*id).is_some_and(|p| p.has_api_key()) {
            console::style("(configured)").green()
        } else {
            console::style("(not set)").dim()
        };
        println!("  {}) {} {} - {}", i + 1, id, status, name);
    }
    println!();

    print!("Enter choice [1-{}]: ", providers.len());
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    let choice: usize = input.trim().parse().map_err(|_| anyhow!("Invalid choice"))?;
    if choice < 1 || choice > providers.len() {
        bail!("Choice must be 1-{}", providers.len());
    }

    Ok(providers[choice - 1].0.clone())
}

fn prompt_api_key(provider: &str) -> Result<String> {
    println!("Enter API key for {provider}:");
    print!("> ");
    io::stdout().flush()?;

    let key = console::Term::stdout()
        .read_secure_line()
        .context("failed to read API key")?;
    Ok(key.trim().to_string())
}

fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

/// Upsert `KEY="value"` in a dotenv file, keeping other entries.
fn save_api_key(path: &Path, env_var: &str, key: &str) -> Result<()> {
    let existing = if path.exists() {
        fs::read_to_string(path)?
    } else {
        String::new()
    };

    let mut entries: BTreeMap<String, String> = existing
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            if line.starts_with('#') {
                return None;
            }
            let line = line.strip_prefix("export ").unwrap_or(line);
            let (key, value) = line.split_once('=')?;
            Some((key.trim().to_string(), value.trim().to_string()))
        })
        .collect();

    entries.insert(env_var.to_string(), format!("\"{key}\""));

    let mut content = String::from("# headline API keys, loaded at startup\n\n");
    for (k, v) in &entries {
        content.push_str(&format!("{k}={v}\n"));
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_key() {
        assert_eq!(mask_key("short"), "*****");
        assert_eq!(mask_key("sk-1234567890abcd"), "sk-1...abcd");
    }

    #[test]
    fn test_save_api_key_upserts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("env");
        fs::write(&path, "# old\nexport VOLCANO_API_KEY=\"old\"\nOTHER=1\n").unwrap();

        save_api_key(&path, "VOLCANO_API_KEY", "new").unwrap();
        save_api_key(&path, "SILICONFLOW_API_KEY", "sk").unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("VOLCANO_API_KEY=\"new\""));
        assert!(content.contains("SILICONFLOW_API_KEY=\"sk\""));
        assert!(content.contains("OTHER=1"));
        assert!(!content.contains("old"));
    }

    #[test]
    fn test_default_config_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yaml");
        write_default_config(&path).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        let parsed = AppConfig::from_yaml_str(&raw).unwrap();
        let defaults = AppConfig::default();
        assert_eq!(parsed.default_provider, defaults.default_provider);
        assert_eq!(parsed.providers.len(), defaults.providers.len());
        assert_eq!(parsed.app.default_max_tokens, 4096);
    }
}
