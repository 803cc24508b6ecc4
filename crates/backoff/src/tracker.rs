//! BackoffTracker - per-worker backoff bookkeeping
//!
//! The retry loop reports `true` while it is waiting on an overloaded
//! server and `false` once a write settles. A separate task watches the
//! edges so bookkeeping never sits on the write path.

use std::time::{Duration, Instant};

use metrics::histogram;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::error::BackoffError;

/// Signal channel capacity
pub const SIGNAL_CAPACITY: usize = 100;

/// Handle to a running backoff tracker task
#[derive(Debug)]
pub struct BackoffTracker {
    worker: usize,
    tx: mpsc::Sender<bool>,
    handle: JoinHandle<Duration>,
}

impl BackoffTracker {
    /// Spawn the tracker task for one worker
    pub fn spawn(worker: usize) -> Self {
        let (tx, rx) = mpsc::channel(SIGNAL_CAPACITY);
        let handle = tokio::spawn(track_backoff(worker, rx));
        Self { worker, tx, handle }
    }

    /// Report whether the worker is currently backing off
    pub async fn signal(&self, backing_off: bool) -> Result<(), BackoffError> {
        self.tx
            .send(backing_off)
            .await
            .map_err(|_| BackoffError::TrackerClosed {
                worker: self.worker,
            })
    }

    /// Close the signal channel and wait for the total backoff time
    pub async fn finish(self) -> Duration {
        drop(self.tx);
        match self.handle.await {
            Ok(total) => total,
            Err(e) => {
                error!(worker = self.worker, error = ?e, "Backoff tracker task panicked");
                Duration::ZERO
            }
        }
    }
}

async fn track_backoff(worker: usize, mut rx: mpsc::Receiver<bool>) -> Duration {
    let mut total = Duration::ZERO;
    let mut started: Option<Instant> = None;

    while let Some(backing_off) = rx.recv().await {
        match (backing_off, started) {
            (true, None) => started = Some(Instant::now()),
            (false, Some(start)) => {
                let took = start.elapsed();
                total += took;
                started = None;
                histogram!("tsbs_load_backoff_seconds").record(took.as_secs_f64());
                debug!(worker, took_secs = took.as_secs_f64(), "Backoff finished");
            }
            _ => {}
        }
    }

    info!(
        worker,
        total_secs = total.as_secs_f64(),
        "Backoffs took a total of {:.3}s of runtime",
        total.as_secs_f64()
    );
    total
}
