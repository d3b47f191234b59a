//! RustCrew CLI: the main entry point.
//!
//! Commands:
//! - `init`: Write a starter crew manifest
//! - `agents`: List the configured agents
//! - `run`: Run every configured task, then synthesize
//! - `task`: Assign a single ad-hoc task
//! - `doctor`: Diagnose configuration and provider health

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "rustcrew",
    about = "RustCrew — a crew of goal-bound AI agents sharing one memory",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file to use instead of ~/.rustcrew/config.toml
    #[arg(short, long, global = true, env = "RUSTCREW_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a starter config with an example crew
    Init {
        /// Overwrite an existing config
        #[arg(long)]
        force: bool,
    },

    /// List the configured agents
    Agents,

    /// Assign every configured task in order, then summarize
    Run {
        /// Skip the final synthesis
        #[arg(long)]
        no_summary: bool,

        /// Also ask the crew model for the final deliverable
        #[arg(long)]
        final_response: bool,
    },

    /// Assign one task to the best-suited agent
    Task {
        /// The task text
        text: String,
    },

    /// Diagnose configuration and provider health
    Doctor,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Init { force } => commands::init::run(config_path, force)?,
        Commands::Agents => commands::agents::run(config_path)?,
        Commands::Run {
            no_summary,
            final_response,
        } => commands::run::run(config_path, !no_summary, final_response).await?,
        Commands::Task { text } => commands::task::run(config_path, &text).await?,
        Commands::Doctor => commands::doctor::run(config_path).await?,
    }

    Ok(())
}
