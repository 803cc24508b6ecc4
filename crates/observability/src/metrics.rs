//! Load metrics
//!
//! Thin wrappers around the `metrics` facade plus an online statistics
//! accumulator used for per-worker batch latency.

use metrics::{counter, gauge, histogram};

/// Record one processed batch
///
/// Called by a worker after its processor returns.
///
/// # Example
///
/// ```ignore
/// use observability::metrics::record_batch_processed;
///
/// let counts = processor.process_batch(&batch, do_load).await?;
/// record_batch_processed(counts.points, counts.rows, took.as_secs_f64() * 1000.0);
/// ```
pub fn record_batch_processed(points: u64, rows: u64, duration_ms: f64) {
    counter!("tsbs_load_batches_total").increment(1);
    counter!("tsbs_load_points_total").increment(points);
    counter!("tsbs_load_rows_total").increment(rows);
    histogram!("tsbs_load_batch_duration_ms").record(duration_ms);
}

/// Record a worker's total backoff once it has finished
pub fn record_worker_backoff(worker: usize, seconds: f64) {
    gauge!("tsbs_load_worker_backoff_seconds", "worker" => worker.to_string()).set(seconds);
}

/// Record the current throughput rates
pub fn record_rates(points_per_sec: f64, rows_per_sec: f64) {
    gauge!("tsbs_load_points_per_second").set(points_per_sec);
    gauge!("tsbs_load_rows_per_second").set(rows_per_sec);
}

/// Statistics summary
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online statistics (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    /// Fold another accumulator into this one (Chan et al.)
    pub fn merge(&mut self, other: &RunningStats) {
        if other.count == 0 {
            return;
        }
        if self.count == 0 {
            *self = other.clone();
            return;
        }

        let count = self.count + other.count;
        let delta = other.mean - self.mean;
        self.mean += delta * other.count as f64 / count as f64;
        self.m2 += other.m2 + delta * delta * (self.count as f64 * other.count as f64) / count as f64;
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
        self.count = count;
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Sample variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn summary(&self) -> StatsSummary {
        StatsSummary::from(self)
    }
}
