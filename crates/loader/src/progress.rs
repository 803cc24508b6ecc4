//! Periodic progress reporter

use std::sync::Arc;
use std::time::{Duration, Instant};

use observability::record_rates;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, MissedTickBehavior};
use tracing::{info, warn};

use crate::stats::{LoadStats, StatsSnapshot};

/// Logs cumulative totals and per-period rates on a fixed period
pub struct ProgressReporter {
    stop: oneshot::Sender<()>,
    handle: JoinHandle<u64>,
}

impl ProgressReporter {
    /// Start reporting every `period`
    pub fn spawn(stats: Arc<LoadStats>, period: Duration) -> Self {
        let (stop, stop_rx) = oneshot::channel();
        let handle = tokio::spawn(report_progress(stats, period, stop_rx));
        Self { stop, handle }
    }

    /// Stop reporting; returns how many reports were logged
    pub async fn stop(self) -> u64 {
        let _ = self.stop.send(());
        match self.handle.await {
            Ok(reports) => reports,
            Err(e) => {
                warn!(error = %e, "Progress reporter task failed");
                0
            }
        }
    }
}

async fn report_progress(
    stats: Arc<LoadStats>,
    period: Duration,
    mut stop: oneshot::Receiver<()>,
) -> u64 {
    let start = Instant::now();
    let mut ticker = interval_at(tokio::time::Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut previous = StatsSnapshot::default();
    let mut last_tick = start;
    let mut reports = 0;

    loop {
        tokio::select! {
            _ = &mut stop => break,
            _ = ticker.tick() => {
                let now = Instant::now();
                let current = stats.snapshot();
                let window = now.duration_since(last_tick).as_secs_f64();
                let (points_rate, rows_rate) = rates(previous, current, window);

                info!(
                    elapsed_secs = format!("{:.1}", now.duration_since(start).as_secs_f64()),
                    points = current.points,
                    rows = current.rows,
                    batches = current.batches,
                    points_per_sec = format!("{:.2}", points_rate),
                    rows_per_sec = format!("{:.2}", rows_rate),
                    "Load progress"
                );
                record_rates(points_rate, rows_rate);

                previous = current;
                last_tick = now;
                reports += 1;
            }
        }
    }

    reports
}

/// Per-second rates between two snapshots
fn rates(previous: StatsSnapshot, current: StatsSnapshot, window_secs: f64) -> (f64, f64) {
    if window_secs <= 0.0 {
        return (0.0, 0.0);
    }
    (
        current.points.saturating_sub(previous.points) as f64 / window_secs,
        current.rows.saturating_sub(previous.rows) as f64 / window_secs,
    )
}
