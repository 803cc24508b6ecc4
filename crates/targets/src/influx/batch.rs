//! LineBatch - InfluxDB line-protocol batch

use contracts::{Batch, BatchFactory, ContractError, Point, Reusable};

/// Lines accumulated for one `/write` request
///
/// Each line is `series fields timestamp`. One line is one point; every
/// comma-separated field is one row.
#[derive(Debug, Default)]
pub struct LineBatch {
    buf: Vec<u8>,
    points: usize,
    rows: u64,
}

impl LineBatch {
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            buf: Vec::with_capacity(bytes),
            ..Default::default()
        }
    }
}

impl Reusable for LineBatch {
    fn reset(&mut self) {
        self.buf.clear();
        self.points = 0;
        self.rows = 0;
    }
}

impl Batch for LineBatch {
    fn len(&self) -> usize {
        self.points
    }

    fn rows(&self) -> u64 {
        self.rows
    }

    fn append(&mut self, point: Point) -> Result<(), ContractError> {
        let line = point.data();
        let rows = count_fields(line)?;

        self.buf.extend_from_slice(line);
        self.buf.push(b'\n');
        self.points += 1;
        self.rows += rows;
        Ok(())
    }

    fn payload(&self) -> &[u8] {
        &self.buf
    }
}

/// Fields in the middle section of a line
fn count_fields(line: &[u8]) -> Result<u64, ContractError> {
    let mut sections = line.split(|b| *b == b' ');
    match (sections.next(), sections.next(), sections.next(), sections.next()) {
        (Some(_), Some(fields), Some(_), None) => {
            Ok(fields.split(|b| *b == b',').count() as u64)
        }
        _ => Err(ContractError::malformed_point(format!(
            "expected 'series fields timestamp', got: {}",
            String::from_utf8_lossy(line)
        ))),
    }
}

/// Builds empty line batches with a preallocated buffer
#[derive(Debug, Clone, Copy)]
pub struct LineBatchFactory {
    buffer_capacity: usize,
}

impl LineBatchFactory {
    pub fn new(buffer_capacity: usize) -> Self {
        Self { buffer_capacity }
    }
}

impl Default for LineBatchFactory {
    fn default() -> Self {
        Self::new(4 << 20)
    }
}

impl BatchFactory for LineBatchFactory {
    type Batch = LineBatch;

    fn new_batch(&self) -> LineBatch {
        LineBatch::with_capacity(self.buffer_capacity)
    }
}
