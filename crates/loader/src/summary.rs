//! Final run summary

use std::fmt;
use std::time::Duration;

use contracts::SourceHeaders;
use observability::RunningStats;

use crate::worker::WorkerReport;

/// Everything a finished run reports
#[derive(Debug, Clone, Default)]
pub struct LoadSummary {
    /// Points processed by workers
    pub points: u64,
    /// Rows processed by workers
    pub rows: u64,
    /// Batches processed by workers
    pub batches: u64,
    /// Wall-clock time from start to the last worker exiting
    pub elapsed: Duration,
    /// Per-worker reports, ordered by worker ordinal
    pub workers: Vec<WorkerReport>,
    /// Batches the dispatch loop sent, per channel
    pub batches_per_channel: Vec<u64>,
    /// Source headers, if any
    pub headers: Option<SourceHeaders>,
    /// Whether the point limit ended the run
    pub limit_reached: bool,
}

impl LoadSummary {
    pub fn points_per_sec(&self) -> f64 {
        per_sec(self.points, self.elapsed)
    }

    pub fn rows_per_sec(&self) -> f64 {
        per_sec(self.rows, self.elapsed)
    }

    /// Batch latency across all workers
    pub fn latency_ms(&self) -> RunningStats {
        let mut merged = RunningStats::default();
        for report in &self.workers {
            merged.merge(&report.latency_ms);
        }
        merged
    }

    /// Sum of every worker's backoff time
    pub fn total_backoff(&self) -> Duration {
        self.workers.iter().map(|w| w.backoff).sum()
    }
}

fn per_sec(count: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 {
        count as f64 / secs
    } else {
        0.0
    }
}

impl fmt::Display for LoadSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.elapsed.as_secs_f64();
        writeln!(
            f,
            "loaded {} points in {:.3}sec with {} workers (mean rate {:.2} points/sec)",
            self.points,
            secs,
            self.workers.len(),
            self.points_per_sec()
        )?;
        writeln!(
            f,
            "loaded {} rows in {:.3}sec with {} workers (mean rate {:.2} rows/sec)",
            self.rows,
            secs,
            self.workers.len(),
            self.rows_per_sec()
        )?;
        writeln!(f, "batches: {}", self.batches)?;
        writeln!(f, "batch latency (ms): {}", self.latency_ms().summary())?;

        let backoff = self.total_backoff();
        if !backoff.is_zero() {
            writeln!(f, "total backoff: {:.3}sec", backoff.as_secs_f64())?;
            for report in self.workers.iter().filter(|w| !w.backoff.is_zero()) {
                writeln!(
                    f,
                    "  worker {}: {:.3}sec",
                    report.worker,
                    report.backoff.as_secs_f64()
                )?;
            }
        }
        Ok(())
    }
}
