//! BackoffController - retryable write wrapper
//!
//! Two nested loops around one payload:
//! - outer: overload responses sleep a fixed interval and resend, forever,
//!   without spending attempts
//! - inner: hard failures sleep a jittered delay and resend, at most
//!   `max_retries` attempts in total
//!
//! The payload is never re-encoded or copied between attempts.

use std::time::{Duration, Instant};

use bytes::Bytes;
use metrics::counter;
use tokio::time::sleep;
use tracing::{debug, instrument, warn};

use contracts::RetryConfig;

use crate::error::{BackoffError, Result};
use crate::overload::{classify, Outcome};
use crate::retry::RetryPolicy;
use crate::tracker::BackoffTracker;
use crate::transport::WriteTransport;

/// Result of the bounded inner loop
enum Attempt {
    Written(Duration),
    Overloaded,
}

/// Per-worker retry wrapper around a `WriteTransport`
#[derive(Debug)]
pub struct BackoffController<T> {
    worker: usize,
    transport: T,
    policy: RetryPolicy,
    backoff: Duration,
    tracker: BackoffTracker,
}

impl<T: WriteTransport> BackoffController<T> {
    /// Create a controller and start its backoff tracker
    ///
    /// Must be called inside a tokio runtime.
    pub fn new(worker: usize, transport: T, config: &RetryConfig) -> Self {
        Self {
            worker,
            transport,
            policy: RetryPolicy::from(config),
            backoff: config.backoff(),
            tracker: BackoffTracker::spawn(worker),
        }
    }

    pub fn worker(&self) -> usize {
        self.worker
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Write `body` until it succeeds or the retry budget is spent
    ///
    /// Returns the latency of the successful request.
    ///
    /// # Errors
    /// `RetriesExhausted` after `max_retries` hard failures in a row.
    #[instrument(
        name = "backoff_write",
        skip(self, body),
        fields(worker = self.worker, bytes = body.len())
    )]
    pub async fn write(&self, body: Bytes, gzip: bool) -> Result<Duration> {
        loop {
            match self.write_bounded(&body, gzip).await {
                Ok(Attempt::Written(latency)) => {
                    self.tracker.signal(false).await?;
                    return Ok(latency);
                }
                Ok(Attempt::Overloaded) => {
                    counter!("tsbs_load_overload_signals_total").increment(1);
                    self.tracker.signal(true).await?;
                    debug!(
                        worker = self.worker,
                        backoff_ms = self.backoff.as_millis() as u64,
                        "Server overloaded, backing off"
                    );
                    sleep(self.backoff).await;
                }
                Err(e) => {
                    self.tracker.signal(false).await?;
                    return Err(e);
                }
            }
        }
    }

    async fn write_bounded(&self, body: &Bytes, gzip: bool) -> Result<Attempt> {
        let mut attempt: u32 = 1;
        loop {
            let start = Instant::now();
            let result = self.transport.send(body.clone(), gzip).await;
            let latency = start.elapsed();

            let failure = match result {
                Ok(response) => match classify(&response) {
                    Outcome::Success => return Ok(Attempt::Written(latency)),
                    Outcome::Overload => return Ok(Attempt::Overloaded),
                    Outcome::Failure => format!(
                        "invalid write response (status {}): {}",
                        response.status,
                        response.body_text()
                    ),
                },
                Err(e) => e.to_string(),
            };

            if !self.policy.allows_retry(attempt) {
                warn!(
                    worker = self.worker,
                    attempts = attempt,
                    error = %failure,
                    "Retries exhausted"
                );
                return Err(BackoffError::retries_exhausted(attempt, failure));
            }

            let delay = self.policy.jittered_delay(attempt);
            counter!("tsbs_load_write_retries_total").increment(1);
            warn!(
                worker = self.worker,
                attempt,
                max_retries = self.policy.max_retries,
                delay_ms = delay.as_millis() as u64,
                error = %failure,
                "Write failed, retrying"
            );
            sleep(delay).await;
            attempt += 1;
        }
    }

    /// Stop the tracker and return the total time spent backing off
    pub async fn close(self) -> Duration {
        self.tracker.finish().await
    }
}
