//! Benchmark descriptor - one bundle per target system

use crate::{BatchFactory, ContractError, PointIndexer, PointSource, Processor};

/// Supplies everything the runner needs for one target system
///
/// The runner is generic over this trait, so adding a target never touches
/// the dispatch loop or the worker pool.
pub trait Benchmark: Send + Sync + 'static {
    type Source: PointSource + 'static;
    type Indexer: PointIndexer + 'static;
    type Factory: BatchFactory;
    type Processor: Processor<Batch = <Self::Factory as BatchFactory>::Batch> + Send + 'static;

    /// Open the point source
    fn point_source(&self) -> Result<Self::Source, ContractError>;

    /// Build an indexer for `num_channels` channels
    fn point_indexer(&self, num_channels: usize) -> Self::Indexer;

    fn batch_factory(&self) -> Self::Factory;

    /// Create one processor; called once per worker
    fn processor(&self) -> Self::Processor;
}
