//! Ingestion error types

use contracts::ContractError;
use thiserror::Error;

/// Dispatch loop errors
///
/// All of them are fatal: the run stops instead of loading partial data.
#[derive(Debug, Error)]
pub enum IngestionError {
    /// The point source failed or was truncated
    #[error("point source failed after {points} points: {source}")]
    Source {
        /// Points read before the failure
        points: u64,
        #[source]
        source: ContractError,
    },

    /// A point could not be appended to its batch
    #[error("point #{index} rejected: {source}")]
    Append {
        /// Zero-based position of the point in the stream
        index: u64,
        #[source]
        source: ContractError,
    },

    /// Indexer returned a channel that does not exist
    #[error("indexer returned channel {index}, but only {channels} channels exist")]
    IndexOutOfRange {
        index: usize,
        channels: usize,
    },

    /// Every reader of a channel went away before dispatch finished
    #[error("channel {channel} closed before dispatch finished")]
    ChannelClosed {
        channel: usize,
    },
}

/// Ingestion Result type alias
pub type Result<T> = std::result::Result<T, IngestionError>;
