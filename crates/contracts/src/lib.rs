//! # Contracts
//!
//! Frozen interface contracts shared by every loader crate.
//! Business crates depend on this crate only; reverse dependencies are prohibited.
//!
//! ## Ownership Model
//! - A `Point` moves from the `PointSource` into exactly one open `Batch`
//! - A `Batch` is either open (owned by the dispatch loop) or in flight
//!   (owned by one worker), never both; it crosses that boundary by value
//! - Batches and request buffers are recycled through a typed `Pool`

mod batch;
mod benchmark;
mod config;
mod error;
mod indexer;
mod point;
mod pool;
mod processor;

pub use batch::*;
pub use benchmark::Benchmark;
pub use config::*;
pub use error::*;
pub use indexer::PointIndexer;
pub use point::{Point, PointSource, SourceHeaders};
pub use pool::{Pool, Pooled, Reusable};
pub use processor::{LocalProcessor, Processor, ProcessorReport};
