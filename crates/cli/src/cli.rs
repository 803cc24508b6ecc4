//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// tsbs-load - Time-series load harness
#[derive(Parser, Debug)]
#[command(
    name = "tsbs-load",
    author,
    version,
    about = "Bulk-load pre-generated points into a time-series database",
    long_about = "A throughput-oriented load harness.\n\n\
                  Reads pre-serialized points from a file or stdin, batches them, \n\
                  and writes them with a fixed pool of workers, backing off when \n\
                  the server reports overload."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "TSBS_LOAD_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "TSBS_LOAD_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load points into the target database
    Load(LoadArgs),

    /// Validate configuration file without loading
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `load` command
#[derive(Parser, Debug, Clone, Default)]
pub struct LoadArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(short, long, default_value = "load.toml", env = "TSBS_LOAD_CONFIG")]
    pub config: PathBuf,

    /// Override number of concurrent workers
    #[arg(long, env = "TSBS_LOAD_WORKERS")]
    pub workers: Option<usize>,

    /// Override points per batch
    #[arg(long, env = "TSBS_LOAD_BATCH_SIZE")]
    pub batch_size: Option<usize>,

    /// Stop after this many points
    #[arg(long)]
    pub limit: Option<u64>,

    /// Route points to workers by series hash
    #[arg(long)]
    pub hash_workers: bool,

    /// Batch and count points without writing them
    #[arg(long)]
    pub dry_run: bool,

    /// Override database URLs (comma-separated)
    #[arg(long, value_delimiter = ',', env = "TSBS_LOAD_URLS")]
    pub urls: Option<Vec<String>>,

    /// Read points from this file instead of the configured source
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Prometheus metrics port (disabled when unset)
    #[arg(long, env = "TSBS_LOAD_METRICS_PORT")]
    pub metrics_port: Option<u16>,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "load.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "load.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_load_overrides() {
        let cli = Cli::try_parse_from([
            "tsbs-load",
            "-v",
            "load",
            "--config",
            "bench.toml",
            "--workers",
            "8",
            "--urls",
            "http://a:8086,http://b:8086",
            "--dry-run",
            "--hash-workers",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 1);
        let Commands::Load(args) = cli.command else {
            panic!("expected load command");
        };
        assert_eq!(args.config, PathBuf::from("bench.toml"));
        assert_eq!(args.workers, Some(8));
        assert_eq!(
            args.urls,
            Some(vec!["http://a:8086".to_string(), "http://b:8086".to_string()])
        );
        assert!(args.dry_run);
        assert!(args.hash_workers);
        assert_eq!(args.batch_size, None);
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["tsbs-load", "-q", "-v", "info"]).is_err());
    }

    #[test]
    fn test_validate_json_flag() {
        let cli = Cli::try_parse_from(["tsbs-load", "validate", "--json"]).unwrap();
        match cli.command {
            Commands::Validate(args) => {
                assert!(args.json);
                assert_eq!(args.config, PathBuf::from("load.toml"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
