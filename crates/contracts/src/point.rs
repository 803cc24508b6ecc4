//! Point and PointSource - the load path input

use bytes::Bytes;

use crate::ContractError;

/// One opaque, already-serialized unit of input data
///
/// The loader never looks inside the payload; only the target's `Batch`
/// and `PointIndexer` interpret it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Point {
    data: Bytes,
}

impl Point {
    /// Wrap a serialized payload
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self { data: data.into() }
    }

    /// The empty sentinel point
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether this is the empty sentinel
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Payload length in bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Borrow the payload
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Take the payload
    pub fn into_bytes(self) -> Bytes {
        self.data
    }
}

impl From<&'static str> for Point {
    fn from(value: &'static str) -> Self {
        Self::new(Bytes::from_static(value.as_bytes()))
    }
}

/// Metadata a source may carry ahead of its points
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceHeaders {
    /// Raw header lines, in source order
    pub lines: Vec<String>,
}

impl SourceHeaders {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Sequential, finite stream of points
///
/// `next_point` blocks until a point is available. `Ok(None)` (or an
/// empty point) marks the end of the stream; an `Err` means the source is
/// malformed and the run must stop.
pub trait PointSource: Send {
    /// Optional metadata, consumed once before dispatch begins
    fn headers(&mut self) -> Result<Option<SourceHeaders>, ContractError> {
        Ok(None)
    }

    /// Read the next point
    fn next_point(&mut self) -> Result<Option<Point>, ContractError>;
}

impl<S: PointSource + ?Sized> PointSource for Box<S> {
    fn headers(&mut self) -> Result<Option<SourceHeaders>, ContractError> {
        (**self).headers()
    }

    fn next_point(&mut self) -> Result<Option<Point>, ContractError> {
        (**self).next_point()
    }
}
