//! # Ingestion
//!
//! Point reading and dispatch.
//!
//! Responsibilities:
//! - Read points from a data file, stdin or memory
//! - Route each point to a channel through a `PointIndexer`
//! - Accumulate points into pooled batches and push full batches
//!   over bounded channels to the workers
//!
//! ## Usage Example
//!
//! ```ignore
//! use ingestion::{create_channels, scan, LineSource, RoundRobinIndexer, ScanConfig};
//!
//! let (senders, receivers) = create_channels(1, 100);
//! let mut source = LineSource::open(path)?;
//! let mut indexer = RoundRobinIndexer::new(1);
//! let summary = scan(&mut source, &mut indexer, &pool, &senders, ScanConfig {
//!     batch_size: 5_000,
//!     limit: None,
//! })?;
//! drop(senders);
//! ```

mod error;
mod indexer;
mod scan;
mod source;

pub use error::{IngestionError, Result};
pub use indexer::{fnv1a_32, ConstantIndexer, KeyFn, KeyHashIndexer, RoundRobinIndexer};
pub use scan::{create_channels, scan, ScanConfig, ScanSummary};
pub use source::{LineSource, MemorySource};
