//! PointIndexer - routes points to channels

use crate::Point;

/// Maps a point to one of the channels it was built for
///
/// Implementations are created for a fixed channel count and must return
/// an index in `[0, num_channels)`.
pub trait PointIndexer: Send {
    fn index_of(&mut self, point: &Point) -> usize;
}

impl<I: PointIndexer + ?Sized> PointIndexer for Box<I> {
    fn index_of(&mut self, point: &Point) -> usize {
        (**self).index_of(point)
    }
}
