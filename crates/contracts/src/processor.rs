//! Processor trait - the per-target write path
//!
//! One processor instance lives inside one worker for the whole run.

use std::time::Duration;

use crate::{Batch, BatchCounts, ContractError};

/// What a processor reports when it is closed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessorReport {
    /// Cumulative time spent backing off on server overload
    pub backoff: Duration,
}

/// Batch write trait
///
/// All target implementations must implement this trait.
#[trait_variant::make(Processor: Send)]
pub trait LocalProcessor {
    /// Batch type this processor consumes
    type Batch: Batch;

    /// One-time initialization with the worker ordinal
    ///
    /// `do_load = false` means dry run: batches are counted but not sent.
    async fn init(
        &mut self,
        worker: usize,
        do_load: bool,
        hash_workers: bool,
    ) -> Result<(), ContractError>;

    /// Write one batch and return what it carried
    ///
    /// # Errors
    /// Returns an error only when the write is unrecoverable; the run stops.
    async fn process_batch(
        &mut self,
        batch: &Self::Batch,
        do_load: bool,
    ) -> Result<BatchCounts, ContractError>;

    /// Optional close hook, called once after the worker's channel is drained
    fn close(
        &mut self,
        do_load: bool,
    ) -> impl std::future::Future<Output = Result<ProcessorReport, ContractError>> {
        async move {
            let _ = do_load;
            Ok(ProcessorReport::default())
        }
    }
}
