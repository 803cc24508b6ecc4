//! LoadStats - counters shared by all workers

use std::sync::atomic::{AtomicU64, Ordering};

use contracts::BatchCounts;

/// Global load counters
///
/// Updated with relaxed atomic adds only. Values read while workers run
/// are approximate; final values are read after every worker has exited.
#[derive(Debug, Default)]
pub struct LoadStats {
    points: AtomicU64,
    rows: AtomicU64,
    batches: AtomicU64,
}

impl LoadStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one processed batch
    pub fn add(&self, counts: BatchCounts) {
        self.points.fetch_add(counts.points, Ordering::Relaxed);
        self.rows.fetch_add(counts.rows, Ordering::Relaxed);
        self.batches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn points(&self) -> u64 {
        self.points.load(Ordering::Relaxed)
    }

    pub fn rows(&self) -> u64 {
        self.rows.load(Ordering::Relaxed)
    }

    pub fn batches(&self) -> u64 {
        self.batches.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            points: self.points(),
            rows: self.rows(),
            batches: self.batches(),
        }
    }
}

/// Point-in-time copy of the counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub points: u64,
    pub rows: u64,
    pub batches: u64,
}
