//! LoaderConfig - Config Loader output
//!
//! Built once, then shared by reference with the runner, the processor
//! factory and the backoff controller.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use validator::Validate;

/// Complete load configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct LoaderConfig {
    /// Number of concurrent workers
    #[validate(range(min = 1))]
    pub workers: usize,

    /// Batches buffered per channel before the dispatch loop blocks
    #[validate(range(min = 1))]
    pub channel_capacity: usize,

    /// Points per batch
    #[validate(range(min = 1))]
    pub batch_size: usize,

    /// Stop after this many points (None = whole source)
    pub limit: Option<u64>,

    /// Minimum time between batch starts on one worker (0 = no limit)
    pub batch_delay_ms: u64,

    /// Route points by series hash, one channel per worker
    pub hash_workers: bool,

    /// Actually write batches (false = dry run)
    pub do_load: bool,

    /// Progress log period (0 = disabled)
    pub reporting_period_ms: u64,

    /// Retry and backoff tuning
    #[validate(nested)]
    pub retry: RetryConfig,

    /// Target database settings
    #[validate(nested)]
    pub influx: InfluxConfig,

    /// Where points are read from
    pub source: SourceConfig,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            workers: 1,
            channel_capacity: 100,
            batch_size: 10_000,
            limit: None,
            batch_delay_ms: 0,
            hash_workers: false,
            do_load: true,
            reporting_period_ms: 10_000,
            retry: RetryConfig::default(),
            influx: InfluxConfig::default(),
            source: SourceConfig::default(),
        }
    }
}

impl LoaderConfig {
    /// Channel count: one per worker when hashing, otherwise one shared channel
    pub fn num_channels(&self) -> usize {
        if self.hash_workers {
            self.workers
        } else {
            1
        }
    }

    pub fn batch_delay(&self) -> Option<Duration> {
        (self.batch_delay_ms > 0).then(|| Duration::from_millis(self.batch_delay_ms))
    }

    pub fn reporting_period(&self) -> Option<Duration> {
        (self.reporting_period_ms > 0).then(|| Duration::from_millis(self.reporting_period_ms))
    }
}

/// Retry policy for failed writes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct RetryConfig {
    /// Attempts before a hard failure becomes fatal
    #[validate(range(min = 1))]
    pub max_retries: u32,

    /// Lower bound of the first retry delay (ms)
    pub base_delay_ms: u64,

    /// Exponential growth factor
    #[validate(range(min = 1.0))]
    pub multiplier: f64,

    /// Ceiling for any single retry delay (ms)
    pub max_delay_ms: u64,

    /// Fixed sleep when the server signals overload (ms)
    pub backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 10,
            base_delay_ms: 5,
            multiplier: 2.0,
            max_delay_ms: 125,
            backoff_ms: 1_000,
        }
    }
}

impl RetryConfig {
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }

    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }
}

/// Write consistency requested from the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Consistency {
    Any,
    One,
    Quorum,
    #[default]
    All,
}

impl Consistency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::One => "one",
            Self::Quorum => "quorum",
            Self::All => "all",
        }
    }
}

/// InfluxDB HTTP target settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct InfluxConfig {
    /// Server URLs, assigned to workers round-robin
    #[validate(length(min = 1))]
    pub urls: Vec<String>,

    /// Target database name
    #[validate(length(min = 1))]
    pub database: String,

    pub consistency: Consistency,

    /// Gzip request bodies
    pub gzip: bool,

    /// `Token` authorization (used when no bearer token is set)
    pub token: String,

    /// `Bearer` authorization
    pub bearer: String,

    /// Ask the server to skip write sync
    pub no_sync: bool,
}

impl Default for InfluxConfig {
    fn default() -> Self {
        Self {
            urls: vec!["http://localhost:8086".to_string()],
            database: "benchmark".to_string(),
            consistency: Consistency::default(),
            gzip: true,
            token: String::new(),
            bearer: String::new(),
            no_sync: false,
        }
    }
}

impl InfluxConfig {
    /// URL assigned to a worker
    pub fn url_for_worker(&self, worker: usize) -> &str {
        &self.urls[worker % self.urls.len()]
    }
}

/// Point source location
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Data file (None = stdin)
    pub path: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = LoaderConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.num_channels(), 1);
        assert_eq!(config.batch_delay(), None);
    }

    #[test]
    fn test_num_channels_with_hashing() {
        let config = LoaderConfig {
            workers: 4,
            hash_workers: true,
            ..Default::default()
        };
        assert_eq!(config.num_channels(), 4);
    }

    #[test]
    fn test_zero_workers_rejected() {
        let config = LoaderConfig {
            workers: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.field_errors().contains_key("workers"));
    }

    #[test]
    fn test_url_for_worker_round_robin() {
        let influx = InfluxConfig {
            urls: vec!["http://a".into(), "http://b".into()],
            ..Default::default()
        };
        assert_eq!(influx.url_for_worker(0), "http://a");
        assert_eq!(influx.url_for_worker(1), "http://b");
        assert_eq!(influx.url_for_worker(2), "http://a");
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: LoaderConfig =
            serde_json::from_str(r#"{ "workers": 8, "influx": { "consistency": "quorum" } }"#)
                .unwrap();
        assert_eq!(config.workers, 8);
        assert_eq!(config.batch_size, 10_000);
        assert_eq!(config.influx.consistency, Consistency::Quorum);
        assert_eq!(config.retry.max_retries, 10);
    }
}
