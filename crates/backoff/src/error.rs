//! Backoff error types

use contracts::ContractError;
use thiserror::Error;

/// Failures that escape the retry wrapper
///
/// Overload responses and individual transport failures are handled
/// inside the controller; only these reach the caller.
#[derive(Debug, Error)]
pub enum BackoffError {
    /// Every bounded attempt failed
    #[error("write failed after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: String },

    /// The backoff tracker task went away
    #[error("backoff tracker for worker {worker} stopped unexpectedly")]
    TrackerClosed { worker: usize },
}

impl BackoffError {
    pub fn retries_exhausted(attempts: u32, last: impl Into<String>) -> Self {
        Self::RetriesExhausted {
            attempts,
            last: last.into(),
        }
    }

    /// Convert to the contract error reported by a processor
    pub fn into_contract(self, worker: usize) -> ContractError {
        ContractError::write(worker, self.to_string())
    }
}

/// A single write attempt that never produced a response
#[derive(Debug, Clone, Error)]
#[error("transport error: {message}")]
pub struct TransportError {
    pub message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Backoff Result type alias
pub type Result<T> = std::result::Result<T, BackoffError>;
