//! Loader error types

use contracts::ContractError;
use ingestion::IngestionError;
use thiserror::Error;

/// Fatal run errors
#[derive(Debug, Error)]
pub enum LoaderError {
    /// Invalid runner settings
    #[error("invalid load configuration: {message}")]
    Config { message: String },

    /// Opening the point source failed
    #[error("cannot open point source: {0}")]
    Source(#[source] ContractError),

    /// The dispatch loop failed
    #[error("dispatch failed: {0}")]
    Dispatch(#[from] IngestionError),

    /// A worker's processor returned an error
    #[error("worker {worker} failed: {source}")]
    Worker {
        worker: usize,
        #[source]
        source: ContractError,
    },

    /// A task panicked or was cancelled
    #[error("{task} task failed: {message}")]
    Task { task: String, message: String },
}

impl LoaderError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn worker(worker: usize, source: ContractError) -> Self {
        Self::Worker { worker, source }
    }

    pub fn task(task: impl Into<String>, err: tokio::task::JoinError) -> Self {
        Self::Task {
            task: task.into(),
            message: err.to_string(),
        }
    }
}

/// Loader Result type alias
pub type Result<T> = std::result::Result<T, LoaderError>;
