//! Batch - the unit of one network write

use crate::{ContractError, Point, Reusable};

/// Points and rows carried by one processed batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchCounts {
    /// Points appended
    pub points: u64,
    /// Semantic rows appended (a point may expand to several rows)
    pub rows: u64,
}

impl BatchCounts {
    pub fn new(points: u64, rows: u64) -> Self {
        Self { points, rows }
    }
}

impl std::ops::AddAssign for BatchCounts {
    fn add_assign(&mut self, other: Self) {
        self.points += other.points;
        self.rows += other.rows;
    }
}

/// Reusable container of serialized points
///
/// `reset` (from `Reusable`) must leave the batch with an empty payload
/// and zero counts.
pub trait Batch: Reusable + Send + Sync + 'static {
    /// Number of points appended
    fn len(&self) -> usize;

    /// Number of rows appended
    fn rows(&self) -> u64;

    /// Append one point
    ///
    /// # Errors
    /// Returns `MalformedPoint` when the payload cannot belong to this batch type
    fn append(&mut self, point: Point) -> Result<(), ContractError>;

    /// Accumulated serialized payload
    fn payload(&self) -> &[u8];

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn counts(&self) -> BatchCounts {
        BatchCounts::new(self.len() as u64, self.rows())
    }
}

/// Creates fresh batches for the pool
pub trait BatchFactory: Send + Sync + 'static {
    type Batch: Batch;

    fn new_batch(&self) -> Self::Batch;
}
