//! # Targets
//!
//! Target systems the loader can write to. Each target supplies a
//! `Benchmark` bundle: point source, indexer, batch factory and processor.
//!
//! ## Usage Example
//!
//! ```ignore
//! use targets::influx::InfluxBenchmark;
//!
//! let benchmark = InfluxBenchmark::new(Arc::new(config))?;
//! let summary = BenchmarkRunner::new(config, benchmark).run().await?;
//! ```

pub mod influx;

pub use influx::InfluxBenchmark;
