//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::LoaderConfig;
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    workers: usize,
    channels: usize,
    batch_size: usize,
    url_count: usize,
    database: String,
    source: String,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(config) => {
            let warnings = collect_warnings(&config);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    workers: config.workers,
                    channels: config.num_channels(),
                    batch_size: config.batch_size,
                    url_count: config.influx.urls.len(),
                    database: config.influx.database.clone(),
                    source: source_label(&config),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

pub(crate) fn source_label(config: &LoaderConfig) -> String {
    match &config.source.path {
        Some(path) => path.display().to_string(),
        None => "<stdin>".to_string(),
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(config: &LoaderConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if !config.do_load {
        warnings.push("do_load = false - batches will be counted but not written".to_string());
    }

    if config.hash_workers && config.workers == 1 {
        warnings.push("hash_workers has no effect with a single worker".to_string());
    }

    if config.influx.urls.len() > config.workers {
        warnings.push(format!(
            "{} urls configured but only {} workers - some urls receive no writes",
            config.influx.urls.len(),
            config.workers
        ));
    }

    if !config.influx.token.is_empty() && !config.influx.bearer.is_empty() {
        warnings.push("both token and bearer are set - bearer is used".to_string());
    }

    if let Some(ref path) = config.source.path {
        if !path.exists() {
            warnings.push(format!("source file does not exist yet: {}", path.display()));
        }
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Workers: {}", summary.workers);
            println!("  Channels: {}", summary.channels);
            println!("  Batch size: {}", summary.batch_size);
            println!("  URLs: {}", summary.url_count);
            println!("  Database: {}", summary.database);
            println!("  Source: {}", summary.source);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
