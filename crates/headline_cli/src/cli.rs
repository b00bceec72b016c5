//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Streaming headline generator for Chinese social-media content
#[derive(Parser)]
#[command(name = "headline", about, version, propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format: text (human-readable) or json (machine-readable)
    #[arg(short, long, global = true, default_value = "text")]
    pub output: OutputFormat,

    /// Config file (default: HEADLINE_CONFIG, ./headline.yaml, ~/.headline/config.yaml)
    #[arg(short, long, global = true, env = "HEADLINE_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum OutputFormat {
    /// Colored terminal output for humans
    #[default]
    Text,
    /// One JSON object per line, session events included
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start an interactive headline session
    Chat(ChatArgs),
    /// Inspect and test LLM providers
    Providers {
        #[command(subcommand)]
        action: ProvidersAction,
    },
    /// Inspect and write configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Args, Debug, Default)]
pub struct ChatArgs {
    /// Provider to use (siliconflow, volcano). Uses HEADLINE_PROVIDER if not set.
    #[arg(long)]
    pub provider: Option<String>,
    /// Model display name (e.g. DeepSeek-V3)
    #[arg(long)]
    pub model: Option<String>,
    /// Sampling temperature (0.0-2.0)
    #[arg(long)]
    pub temperature: Option<f32>,
    /// Maximum output tokens (1000-16000)
    #[arg(long)]
    pub max_tokens: Option<u32>,
    /// Context budget in characters (4000-32000)
    #[arg(long)]
    pub budget: Option<usize>,
    /// Initial message to send
    #[arg(short, long)]
    pub prompt: Option<String>,
    /// Exit after the reply to --prompt
    #[arg(long, requires = "prompt")]
    pub once: bool,
}

#[derive(Subcommand)]
pub enum ProvidersAction {
    /// List configured providers
    List,
    /// Show provider details
    Info {
        /// Provider ID
        provider: String,
    },
    /// Test provider connectivity
    Test {
        /// Provider ID
        provider: String,
    },
    /// List models (configured catalog, or the provider's own list with --remote)
    Models {
        /// Provider ID
        provider: String,
        /// Ask the provider's API instead of the configured catalog
        #[arg(long)]
        remote: bool,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration (API keys masked)
    Show,
    /// Validate the configuration and list warnings
    Validate,
    /// Print which config file is used
    Path,
    /// Write a config file populated with the built-in defaults
    Init {
        /// Destination (default: ~/.headline/config.yaml)
        #[arg(long)]
        path: Option<PathBuf>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Store an API key in ~/.headline/env
    Api {
        /// Provider to configure (siliconflow, volcano)
        #[arg(short, long)]
        provider: Option<String>,
    },
}
