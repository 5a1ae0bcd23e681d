//! # noteflow CLI
//!
//! Command-line interface for noteflow - the AI assistant engine for your
//! notes.
//!
//! ## Usage
//!
//! - `noteflow "question"` - Answer a single question over your notes
//! - `noteflow tools` - Show the tools the assistant may call

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod config;

use commands::{ask_command, tools_command, AskOptions};
use config::CliConfigLoader;

/// noteflow - an AI assistant engine for your notes
#[derive(Parser)]
#[command(name = "noteflow")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Ask questions over your notes, with tools")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// API key override
    #[arg(long, env = "NOTEFLOW_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Base URL override
    #[arg(long)]
    base_url: Option<String>,

    /// Model name override
    #[arg(long)]
    model: Option<String>,

    /// Maximum model-tool round trips per question
    #[arg(long)]
    max_iterations: Option<usize>,

    /// Acting user id
    #[arg(long, default_value = "local")]
    user: String,

    /// Id of the note to treat as currently open
    #[arg(long)]
    note: Option<String>,

    /// Workspace credential override
    #[arg(long, env = "NOTEFLOW_WORKSPACE_TOKEN", hide_env_values = true)]
    workspace_token: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// The question to answer (if provided, runs in single-question mode)
    question: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the tools the assistant may call
    Tools,
}

/// Build a configuration loader from CLI arguments
fn build_config_loader(cli: &Cli) -> CliConfigLoader {
    let mut loader = CliConfigLoader::new();

    if let Some(config_path) = &cli.config {
        loader = loader.with_config_override(config_path.clone());
    }

    if let Some(api_key) = &cli.api_key {
        loader = loader.with_api_key_override(api_key.clone());
    }

    if let Some(base_url) = &cli.base_url {
        loader = loader.with_base_url_override(base_url.clone());
    }

    if let Some(model) = &cli.model {
        loader = loader.with_model_override(model.clone());
    }

    if let Some(max_iterations) = cli.max_iterations {
        loader = loader.with_max_iterations_override(max_iterations);
    }

    loader
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "warn" };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .init();

    match (cli.question.clone(), &cli.command) {
        // If a question is provided, run in single-question mode
        (Some(question), None) => {
            let settings = build_config_loader(&cli).load()?;
            let options = AskOptions {
                user: cli.user,
                note: cli.note,
                workspace_token: cli.workspace_token,
                json: cli.json,
            };
            ask_command(question, settings, options).await
        }
        // A question together with a subcommand is an error
        (Some(_), Some(_)) => {
            eprintln!("Error: cannot specify both a question and a subcommand");
            std::process::exit(1);
        }
        (None, Some(Commands::Tools)) => tools_command(cli.json).await,
        (None, None) => {
            eprintln!("Error: no question given (try `noteflow \"summarize my notes\"`)");
            std::process::exit(1);
        }
    }
}
