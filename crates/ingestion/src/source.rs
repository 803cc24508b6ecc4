//! Point sources
//!
//! `LineSource` reads newline-delimited points from any `BufRead`
//! (a data file or stdin). `MemorySource` replays points held in memory.

use std::collections::VecDeque;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use bytes::Bytes;
use contracts::{ContractError, Point, PointSource, SourceHeaders};
use tracing::{debug, instrument};

/// Read buffer size for data files
const READ_BUFFER_SIZE: usize = 4 << 20;

/// Newline-delimited point source
///
/// Blank lines are skipped. Lines starting with `#` before the first point
/// form the source headers; later `#` lines are skipped as comments.
pub struct LineSource<R> {
    reader: R,
    line: Vec<u8>,
    line_no: u64,
    /// First data line, read while scanning headers
    pending: Option<Point>,
    headers: Option<SourceHeaders>,
    headers_read: bool,
}

impl LineSource<BufReader<File>> {
    /// Open a data file
    #[instrument(name = "line_source_open", fields(path = %path.display()))]
    pub fn open(path: &Path) -> Result<Self, ContractError> {
        let file = File::open(path).map_err(|e| {
            ContractError::source_read(format!("cannot open {}", path.display()), e)
        })?;
        debug!("data file opened");
        Ok(Self::new(BufReader::with_capacity(READ_BUFFER_SIZE, file)))
    }
}

impl LineSource<BufReader<io::Stdin>> {
    /// Read points from standard input
    pub fn stdin() -> Self {
        Self::new(BufReader::with_capacity(READ_BUFFER_SIZE, io::stdin()))
    }
}

impl<R: BufRead> LineSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: Vec::new(),
            line_no: 0,
            pending: None,
            headers: None,
            headers_read: false,
        }
    }

    /// Lines consumed so far, including headers and blanks
    pub fn line_no(&self) -> u64 {
        self.line_no
    }

    /// Read one raw line without its terminator; `None` at EOF
    fn read_line(&mut self) -> Result<Option<&[u8]>, ContractError> {
        self.line.clear();
        let read = self.reader.read_until(b'\n', &mut self.line).map_err(|e| {
            ContractError::source_read(format!("read failed at line {}", self.line_no + 1), e)
        })?;
        if read == 0 {
            return Ok(None);
        }
        self.line_no += 1;

        let mut end = self.line.len();
        while end > 0 && matches!(self.line[end - 1], b'\n' | b'\r') {
            end -= 1;
        }
        Ok(Some(&self.line[..end]))
    }

    fn read_headers(&mut self) -> Result<(), ContractError> {
        self.headers_read = true;
        let mut lines = Vec::new();

        while let Some(line) = self.read_line()? {
            if line.is_empty() {
                continue;
            }
            if line[0] == b'#' {
                lines.push(String::from_utf8_lossy(&line[1..]).trim().to_string());
                continue;
            }
            self.pending = Some(Point::new(Bytes::copy_from_slice(line)));
            break;
        }

        if !lines.is_empty() {
            debug!(count = lines.len(), "source headers read");
            self.headers = Some(SourceHeaders { lines });
        }
        Ok(())
    }
}

impl<R: BufRead + Send> PointSource for LineSource<R> {
    fn headers(&mut self) -> Result<Option<SourceHeaders>, ContractError> {
        if !self.headers_read {
            self.read_headers()?;
        }
        Ok(self.headers.clone())
    }

    fn next_point(&mut self) -> Result<Option<Point>, ContractError> {
        if !self.headers_read {
            self.read_headers()?;
        }
        if let Some(point) = self.pending.take() {
            return Ok(Some(point));
        }

        while let Some(line) = self.read_line()? {
            if line.is_empty() || line[0] == b'#' {
                continue;
            }
            return Ok(Some(Point::new(Bytes::copy_from_slice(line))));
        }
        Ok(None)
    }
}

/// In-memory point source
///
/// An empty point in the sequence ends the stream early, like the
/// sentinel of a live source.
#[derive(Debug, Default)]
pub struct MemorySource {
    points: VecDeque<Point>,
    headers: Option<SourceHeaders>,
}

impl MemorySource {
    pub fn new(points: impl IntoIterator<Item = Point>) -> Self {
        Self {
            points: points.into_iter().collect(),
            headers: None,
        }
    }

    /// Build from text lines, one point per line
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            lines
                .into_iter()
                .map(|line| Point::new(Bytes::from(line.into()))),
        )
    }

    pub fn with_headers(mut self, headers: SourceHeaders) -> Self {
        self.headers = Some(headers);
        self
    }

    /// Points not yet read
    pub fn remaining(&self) -> usize {
        self.points.len()
    }
}

impl PointSource for MemorySource {
    fn headers(&mut self) -> Result<Option<SourceHeaders>, ContractError> {
        Ok(self.headers.take())
    }

    fn next_point(&mut self) -> Result<Option<Point>, ContractError> {
        Ok(self.points.pop_front().filter(|point| !point.is_empty()))
    }
}
