//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::LoaderConfig;
use serde::Serialize;
use tracing::info;

use super::validate::source_label;
use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    load: LoadInfo,
    retry: RetryInfo,
    influx: InfluxInfo,
    source: String,
}

#[derive(Serialize)]
struct LoadInfo {
    workers: usize,
    channels: usize,
    channel_capacity: usize,
    batch_size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    limit: Option<u64>,
    batch_delay_ms: u64,
    routing: &'static str,
    do_load: bool,
    reporting_period_ms: u64,
}

#[derive(Serialize)]
struct RetryInfo {
    max_retries: u32,
    base_delay_ms: u64,
    multiplier: f64,
    max_delay_ms: u64,
    backoff_ms: u64,
}

#[derive(Serialize)]
struct InfluxInfo {
    urls: Vec<String>,
    database: String,
    consistency: &'static str,
    gzip: bool,
    no_sync: bool,
    auth: &'static str,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let config = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.json {
        let info = build_config_info(&config);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&config);
    }

    Ok(())
}

fn routing(config: &LoaderConfig) -> &'static str {
    if config.hash_workers {
        "series hash"
    } else {
        "round robin"
    }
}

fn auth_mode(config: &LoaderConfig) -> &'static str {
    if !config.influx.bearer.is_empty() {
        "bearer"
    } else if !config.influx.token.is_empty() {
        "token"
    } else {
        "none"
    }
}

fn build_config_info(config: &LoaderConfig) -> ConfigInfo {
    ConfigInfo {
        load: LoadInfo {
            workers: config.workers,
            channels: config.num_channels(),
            channel_capacity: config.channel_capacity,
            batch_size: config.batch_size,
            limit: config.limit,
            batch_delay_ms: config.batch_delay_ms,
            routing: routing(config),
            do_load: config.do_load,
            reporting_period_ms: config.reporting_period_ms,
        },
        retry: RetryInfo {
            max_retries: config.retry.max_retries,
            base_delay_ms: config.retry.base_delay_ms,
            multiplier: config.retry.multiplier,
            max_delay_ms: config.retry.max_delay_ms,
            backoff_ms: config.retry.backoff_ms,
        },
        influx: InfluxInfo {
            urls: config.influx.urls.clone(),
            database: config.influx.database.clone(),
            consistency: config.influx.consistency.as_str(),
            gzip: config.influx.gzip,
            no_sync: config.influx.no_sync,
            auth: auth_mode(config),
        },
        source: source_label(config),
    }
}

fn print_config_info(config: &LoaderConfig) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                  tsbs-load Configuration                     ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("📦 Load");
    println!("   ├─ Workers: {}", config.workers);
    println!(
        "   ├─ Channels: {} (capacity {})",
        config.num_channels(),
        config.channel_capacity
    );
    println!("   ├─ Batch size: {}", config.batch_size);
    match config.limit {
        Some(limit) => println!("   ├─ Limit: {} points", limit),
        None => println!("   ├─ Limit: none"),
    }
    println!("   ├─ Routing: {}", routing(config));
    println!("   ├─ Batch delay: {} ms", config.batch_delay_ms);
    println!("   └─ Write: {}", if config.do_load { "yes" } else { "dry run" });

    let retry = &config.retry;
    println!("\n🔁 Retry");
    println!("   ├─ Max attempts: {}", retry.max_retries);
    println!(
        "   ├─ Delay: {} ms x{} up to {} ms",
        retry.base_delay_ms, retry.multiplier, retry.max_delay_ms
    );
    println!("   └─ Overload backoff: {} ms", retry.backoff_ms);

    let influx = &config.influx;
    println!("\n🗄  InfluxDB");
    for (i, url) in influx.urls.iter().enumerate() {
        let prefix = if i == 0 { "URLs:" } else { "     " };
        println!("   ├─ {} {}", prefix, url);
    }
    println!("   ├─ Database: {}", influx.database);
    println!("   ├─ Consistency: {}", influx.consistency.as_str());
    println!("   ├─ Gzip: {}", influx.gzip);
    println!("   └─ Auth: {}", auth_mode(config));

    println!("\n📥 Source: {}", source_label(config));
    println!();
}
