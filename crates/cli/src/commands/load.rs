//! `load` command implementation.

use std::sync::Arc;

use anyhow::{Context, Result};
use config_loader::ConfigLoader;
use contracts::LoaderConfig;
use loader::BenchmarkRunner;
use targets::InfluxBenchmark;
use tracing::info;

use crate::cli::LoadArgs;

/// Execute the `load` command
pub async fn run_load(args: &LoadArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let mut config = ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;
    apply_overrides(&mut config, args);
    ConfigLoader::validate(&config).context("Invalid configuration after CLI overrides")?;

    info!(
        workers = config.workers,
        batch_size = config.batch_size,
        channel_capacity = config.channel_capacity,
        hash_workers = config.hash_workers,
        do_load = config.do_load,
        urls = ?config.influx.urls,
        database = %config.influx.database,
        "Configuration loaded"
    );
    if !config.do_load {
        info!("Dry run - batches are counted but not written");
    }

    let config = Arc::new(config);
    let benchmark =
        InfluxBenchmark::new(Arc::clone(&config)).context("Failed to set up InfluxDB target")?;

    let summary = BenchmarkRunner::new(config, benchmark)
        .run()
        .await
        .context("Load failed")?;

    print!("{summary}");
    Ok(())
}

/// Apply command-line overrides on top of the file configuration
fn apply_overrides(config: &mut LoaderConfig, args: &LoadArgs) {
    if let Some(workers) = args.workers {
        info!(workers, "Overriding worker count from CLI");
        config.workers = workers;
    }
    if let Some(batch_size) = args.batch_size {
        info!(batch_size, "Overriding batch size from CLI");
        config.batch_size = batch_size;
    }
    if let Some(limit) = args.limit {
        config.limit = Some(limit);
    }
    if args.hash_workers {
        config.hash_workers = true;
    }
    if args.dry_run {
        config.do_load = false;
    }
    if let Some(ref urls) = args.urls {
        info!(urls = ?urls, "Overriding database URLs from CLI");
        config.influx.urls = urls.clone();
    }
    if let Some(ref file) = args.file {
        config.source.path = Some(file.clone());
    }
}
