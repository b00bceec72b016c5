//! CLI entry point for the headline assistant.

mod cli;
mod commands;
mod output;

use clap::Parser;
use headline_observability::ObservabilityConfig;

use crate::cli::Cli;

/// Load `KEY=VALUE` files into the environment without overriding it.
/// Order: 1) `.env` in the working directory or a parent  2) `~/.headline/env`
fn load_env_files() {
    let _ = dotenvy::dotenv();
    if let Some(home) = dirs::home_dir() {
        let env_path = home.join(".headline").join("env");
        if env_path.exists() {
            let _ = dotenvy::from_path(&env_path);
        }
    }
}

fn init_logging(verbose: bool) {
    let mut config = ObservabilityConfig::from_env();
    if verbose {
        config = config.with_log_level("info,headline_runtime=debug,headline_llms=debug");
    } else if config.log_level.is_none() {
        // Keep the transcript clean unless asked otherwise
        config = config.with_log_level("warn");
    }
    if let Err(e) = headline_observability::init(config) {
        output::warning(&e.to_string());
    }
}

#[tokio::main]
async fn main() {
    load_env_files();
    let cli = Cli::parse();
    output::init(cli.output);
    init_logging(cli.verbose);

    if let Err(e) = commands::handle(cli).await {
        output::error(&format!("{e:#}"));
        std::process::exit(1);
    }
}
