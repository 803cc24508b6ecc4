//! # Backoff
//!
//! Retryable write path shared by every target.
//!
//! - `WriteTransport`: one request, no retries
//! - `classify`: success / server overload / hard failure
//! - `RetryPolicy`: jittered exponential delay for hard failures
//! - `BackoffTracker`: per-worker time spent waiting on an overloaded server
//! - `BackoffController`: ties them together around one payload
//!
//! ## Usage Example
//!
//! ```ignore
//! use backoff::BackoffController;
//!
//! let controller = BackoffController::new(worker, transport, &config.retry);
//! let latency = controller.write(payload, gzip).await?;
//! let backoff_total = controller.close().await;
//! ```

mod controller;
mod error;
mod overload;
mod retry;
mod tracker;
mod transport;

pub use controller::BackoffController;
pub use error::{BackoffError, Result, TransportError};
pub use overload::{classify, is_overload, Outcome, OVERLOAD_PHRASES, STATUS_SUCCESS};
pub use retry::RetryPolicy;
pub use tracker::{BackoffTracker, SIGNAL_CAPACITY};
pub use transport::{LocalWriteTransport, WriteResponse, WriteTransport};
