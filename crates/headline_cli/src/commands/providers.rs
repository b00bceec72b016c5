//! `headline providers` subcommands.

use anyhow::{Result, anyhow};
use comfy_table::{Cell, Color};
use headline_runtime::config::api_key_env;
use headline_runtime::{LoadedConfig, ProviderCatalog};
use serde::Serialize;

use crate::cli::ProvidersAction;
use crate::output;

#[derive(Serialize)]
struct ProviderRow<'a> {
    id: &'a str,
    display_name: &'a str,
    configured: bool,
    default: bool,
    models: Vec<&'a str>,
}

pub async fn handle(action: ProvidersAction, loaded: LoadedConfig) -> Result<()> {
    let catalog = ProviderCatalog::from_config(&loaded.config);
    match action {
        ProvidersAction::List => list(&catalog),
        ProvidersAction::Info { provider } => info(&catalog, &provider),
        ProvidersAction::Test { provider } => test(&catalog, &provider).await,
        ProvidersAction::Models { provider, remote } => {
            if remote {
                remote_models(&catalog, &provider).await
            } else {
                models(&catalog, &provider)
            }
        }
    }
}

fn list(catalog: &ProviderCatalog) -> Result<()> {
    let mut rows = Vec::new();
    for id in catalog.provider_ids() {
        let settings = catalog.get(id)?;
        rows.push(ProviderRow {
            id,
            display_name: &settings.display_name,
            configured: settings.has_api_key(),
            default: id == catalog.default_provider(),
            models: settings.models.iter().map(|m| m.name.as_str()).collect(),
        });
    }

    if output::is_json() {
        output::data("providers", &rows);
        return Ok(());
    }

    output::header("Configured Providers");

    let mut table = output::table();
    output::table_header(&mut table, &["Provider", "Name", "Status", "Models"]);
    for row in &rows {
        let id = if row.default {
            format!("{} (default)", row.id)
        } else {
            row.id.to_string()
        };
        let status = if row.configured {
            Cell::new("configured").fg(Color::Green)
        } else {
            Cell::new("missing API key").fg(Color::Yellow)
        };
        table.add_row(vec![
            Cell::new(id).fg(Color::Green),
            Cell::new(row.display_name),
            status,
            Cell::new(format_models(&row.models)),
        ]);
    }
    println!("{table}");

    Ok(())
}

fn format_models(models: &[&str]) -> String {
    if models.len() <= 3 {
        models.join(", ")
    } else {
        format!("{}, {}, {} (+{} more)", models[0], models[1], models[2], models.len() - 3)
    }
}

fn info(catalog: &ProviderCatalog, provider_id: &str) -> Result<()> {
    let settings = catalog.get(provider_id)?;
    let status = if settings.has_api_key() { "configured" } else { "missing API key" };

    output::header(&format!("Provider: {provider_id}"));
    output::kv("name", &settings.display_name);
    output::kv("base_url", &settings.base_url);
    output::kv("status", status);
    output::kv("key_env", &api_key_env(provider_id));
    output::kv("default_model", &settings.default_model);

    Ok(())
}

fn models(catalog: &ProviderCatalog, provider_id: &str) -> Result<()> {
    let models = catalog.model_catalog(provider_id)?;
    let default_model = catalog.default_model(provider_id)?;

    if output::is_json() {
        output::data("models", &models);
        return Ok(());
    }

    output::header(&format!("Models for {provider_id}"));
    let mut table = output::table();
    output::table_header(&mut table, &["Model", "Upstream ID"]);
    for model in models {
        let name = if model.name == default_model {
            format!("{} (default)", model.name)
        } else {
            model.name.clone()
        };
        table.add_row(vec![Cell::new(name).fg(Color::Green), Cell::new(&model.id)]);
    }
    println!("{table}");

    Ok(())
}

async fn remote_models(catalog: &ProviderCatalog, provider_id: &str) -> Result<()> {
    let registry = catalog.build_registry();
    catalog.resolve_credentials(provider_id)?;
    let provider = registry.get_provider(provider_id)?;

    let spinner = output::spinner(&format!("Fetching models for {provider_id}..."));

    match provider.list_models().await {
        Ok(models) => {
            spinner.finish_and_clear();

            if models.is_empty() {
                output::dim("No models returned (provider may not support listing)");
                return Ok(());
            }
            if output::is_json() {
                output::data("models", &models);
                return Ok(());
            }

            output::header(&format!("Models served by {provider_id}"));
            let mut table = output::table();
            output::table_header(&mut table, &["Model"]);
            for model in &models {
                table.add_row(vec![Cell::new(model).fg(Color::Green)]);
            }
            println!("{table}");
            Ok(())
        }
        Err(e) => {
            output::spinner_error(&spinner, "Failed to fetch models");
            Err(anyhow!("Failed to list models: {e}"))
        }
    }
}

async fn test(catalog: &ProviderCatalog, provider_id: &str) -> Result<()> {
    let registry = catalog.build_registry();
    catalog.resolve_credentials(provider_id)?;
    let provider = registry.get_provider(provider_id)?;

    let spinner = output::spinner(&format!("Testing {provider_id} connectivity..."));

    // Listing models is the cheapest authenticated call
    match provider.list_models().await {
        Ok(models) => {
            output::spinner_success(
                &spinner,
                &format!("{provider_id} is reachable ({} models)", models.len()),
            );
            Ok(())
        }
        Err(e) => {
            output::spinner_error(&spinner, &format!("{provider_id} connection failed"));
            Err(anyhow!("Provider test failed: {e}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_models_truncates() {
        assert_eq!(format_models(&["a", "b"]), "a, b");
        assert_eq!(format_models(&["a", "b", "c", "d", "e"]), "a, b, c (+2 more)");
    }
}
