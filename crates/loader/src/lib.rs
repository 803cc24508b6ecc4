//! # Loader
//!
//! Worker pool and lifecycle coordination for a load run.
//!
//! ## Flow
//!
//! ```text
//! PointSource → scan (blocking thread) → bounded channels → workers → Processor
//!                                                              ↓
//!                                                          LoadStats
//! ```
//!
//! ## Usage Example
//!
//! ```ignore
//! use loader::BenchmarkRunner;
//!
//! let summary = BenchmarkRunner::new(config, benchmark).run().await?;
//! println!("{summary}");
//! ```

mod error;
mod progress;
mod runner;
mod stats;
mod summary;
mod worker;

#[cfg(test)]
mod testing;

pub use error::{LoaderError, Result};
pub use progress::ProgressReporter;
pub use runner::BenchmarkRunner;
pub use stats::{LoadStats, StatsSnapshot};
pub use summary::LoadSummary;
pub use worker::{run_worker, WorkerReport, WorkerSettings};
