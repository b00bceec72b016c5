//! Command dispatch.

pub mod chat;
pub mod config;
pub mod providers;

use std::path::Path;

use anyhow::Result;
use headline_runtime::LoadedConfig;

use crate::cli::{Cli, Command};

/// Load, validate and log the configuration.
pub async fn load_config(explicit: Option<&Path>) -> Result<LoadedConfig> {
    let loaded = headline_runtime::config::load(explicit).await?;
    loaded.report.log();
    Ok(loaded)
}

pub async fn handle(cli: Cli) -> Result<()> {
    let explicit = cli.config.as_deref();
    match cli.command {
        Command::Chat(args) => chat::handle(args, load_config(explicit).await?).await,
        Command::Providers { action } => providers::handle(action, load_config(explicit).await?).await,
        Command::Config { action } => config::handle(action, explicit).await,
    }
}
