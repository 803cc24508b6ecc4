//! Point indexers
//!
//! Decide which channel a point is dispatched to.

use contracts::{Point, PointIndexer};

/// Cycles through channels regardless of content
#[derive(Debug, Clone)]
pub struct RoundRobinIndexer {
    channels: usize,
    next: usize,
}

impl RoundRobinIndexer {
    pub fn new(channels: usize) -> Self {
        Self {
            channels: channels.max(1),
            next: 0,
        }
    }
}

impl PointIndexer for RoundRobinIndexer {
    fn index_of(&mut self, _point: &Point) -> usize {
        let index = self.next;
        self.next = (self.next + 1) % self.channels;
        index
    }
}

/// Sends every point to the same channel
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstantIndexer {
    index: usize,
}

impl ConstantIndexer {
    pub fn new(index: usize) -> Self {
        Self { index }
    }
}

impl PointIndexer for ConstantIndexer {
    fn index_of(&mut self, _point: &Point) -> usize {
        self.index
    }
}

/// Extracts the routing key from a point payload
pub type KeyFn = fn(&[u8]) -> &[u8];

/// Hashes a key extracted from the payload
///
/// Points with equal keys always land on the same channel, so one series is
/// written by one worker in order.
#[derive(Clone, Copy)]
pub struct KeyHashIndexer {
    channels: usize,
    key: KeyFn,
}

impl KeyHashIndexer {
    pub fn new(channels: usize, key: KeyFn) -> Self {
        Self {
            channels: channels.max(1),
            key,
        }
    }
}

impl PointIndexer for KeyHashIndexer {
    fn index_of(&mut self, point: &Point) -> usize {
        fnv1a_32((self.key)(point.data())) as usize % self.channels
    }
}

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

/// 32-bit FNV-1a
pub fn fnv1a_32(data: &[u8]) -> u32 {
    data.iter().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ u32::from(*byte)).wrapping_mul(FNV_PRIME)
    })
}
