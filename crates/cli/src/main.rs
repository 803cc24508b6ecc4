//! # tsbs-load CLI
//!
//! Command-line entry point.
//!
//! Provides:
//! - Configuration loading, overrides and validation
//! - The load run and its final summary
//! - Non-zero exit on any fatal error

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use observability::ObservabilityConfig;
use tracing::info;

use cli::{Cli, Commands};
use commands::{run_info, run_load, run_validate};

#[tokio::main]
async fn main() {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if let Err(e) = init_logging(&cli) {
        eprintln!("{e:#}");
        std::process::exit(2);
    }

    info!(version = env!("CARGO_PKG_VERSION"), "tsbs-load starting");

    let result = match &cli.command {
        Commands::Load(args) => run_load(args).await,
        Commands::Validate(args) => run_validate(args),
        Commands::Info(args) => run_info(args),
    };

    if let Err(e) = result {
        tracing::error!(error = format!("{e:#}"), "Command failed");
        // A dispatch thread may still be blocked on its source; do not wait
        // for the runtime to drain it.
        std::process::exit(1);
    }
}

/// Initialize logging (and metrics for `load`) from CLI options
fn init_logging(cli: &Cli) -> Result<()> {
    let default_log_level = if cli.quiet {
        "warn"
    } else {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let metrics_port = match &cli.command {
        Commands::Load(args) => args.metrics_port,
        _ => None,
    };

    observability::init_with_config(ObservabilityConfig {
        log_format: cli.log_format.into(),
        metrics_port,
        default_log_level: default_log_level.to_string(),
        force_level: cli.quiet,
    })
}
