//! In-memory doubles for worker and runner tests

use std::sync::{Arc, Mutex};

use contracts::{
    Batch, BatchCounts, BatchFactory, Benchmark, ContractError, Point, PointIndexer, Processor,
    ProcessorReport, Reusable,
};
use ingestion::{ConstantIndexer, MemorySource, RoundRobinIndexer};

/// Two rows per point; rejects the payload `bad`
#[derive(Debug, Default)]
pub struct TestBatch {
    points: usize,
    buf: Vec<u8>,
}

impl Reusable for TestBatch {
    fn reset(&mut self) {
        self.points = 0;
        self.buf.clear();
    }
}

impl Batch for TestBatch {
    fn len(&self) -> usize {
        self.points
    }

    fn rows(&self) -> u64 {
        self.points as u64 * 2
    }

    fn append(&mut self, point: Point) -> Result<(), ContractError> {
        if point.data() == b"bad" {
            return Err(ContractError::malformed_point("bad point"));
        }
        self.points += 1;
        self.buf.extend_from_slice(point.data());
        self.buf.push(b'\n');
        Ok(())
    }

    fn payload(&self) -> &[u8] {
        &self.buf
    }
}

pub fn batch_of(points: usize) -> TestBatch {
    let mut batch = TestBatch::default();
    for i in 0..points {
        batch
            .append(Point::new(format!("p{i}").into_bytes()))
            .unwrap();
    }
    batch
}

#[derive(Debug, Default)]
struct ProbeState {
    inits: Vec<(usize, bool, bool)>,
    closes: usize,
    processed: usize,
    loads: Vec<bool>,
    rows_per_worker: Vec<(usize, u64)>,
}

/// Shared record of every processor call
#[derive(Debug, Clone, Default)]
pub struct Probe(Arc<Mutex<ProbeState>>);

impl Probe {
    pub fn inits(&self) -> Vec<(usize, bool, bool)> {
        self.0.lock().unwrap().inits.clone()
    }

    pub fn closes(&self) -> usize {
        self.0.lock().unwrap().closes
    }

    pub fn processed(&self) -> usize {
        self.0.lock().unwrap().processed
    }

    pub fn loads(&self) -> Vec<bool> {
        self.0.lock().unwrap().loads.clone()
    }

    /// Rows processed by each worker that saw at least one batch
    pub fn rows_by_worker(&self) -> Vec<(usize, u64)> {
        let mut rows = self.0.lock().unwrap().rows_per_worker.clone();
        rows.sort_unstable();
        rows
    }
}

#[derive(Debug, Default)]
pub struct TestProcessor {
    probe: Probe,
    worker: usize,
    seen: usize,
    fail_at: Option<usize>,
}

impl TestProcessor {
    /// Fail on the `n`-th batch (0-based)
    pub fn failing_at(n: usize) -> Self {
        Self {
            fail_at: Some(n),
            ..Default::default()
        }
    }

    pub fn probe(&self) -> Probe {
        self.probe.clone()
    }
}

impl Processor for TestProcessor {
    type Batch = TestBatch;

    async fn init(
        &mut self,
        worker: usize,
        do_load: bool,
        hash_workers: bool,
    ) -> Result<(), ContractError> {
        self.worker = worker;
        self.probe
            .0
            .lock()
            .unwrap()
            .inits
            .push((worker, do_load, hash_workers));
        Ok(())
    }

    async fn process_batch(
        &mut self,
        batch: &TestBatch,
        do_load: bool,
    ) -> Result<BatchCounts, ContractError> {
        let seen = self.seen;
        self.seen += 1;

        let mut state = self.probe.0.lock().unwrap();
        state.processed += 1;
        state.loads.push(do_load);
        if self.fail_at == Some(seen) {
            return Err(ContractError::write(self.worker, "scripted failure"));
        }

        let counts = batch.counts();
        match state
            .rows_per_worker
            .iter_mut()
            .find(|(worker, _)| *worker == self.worker)
        {
            Some((_, rows)) => *rows += counts.rows,
            None => state.rows_per_worker.push((self.worker, counts.rows)),
        }
        Ok(counts)
    }

    async fn close(&mut self, _do_load: bool) -> Result<ProcessorReport, ContractError> {
        self.probe.0.lock().unwrap().closes += 1;
        Ok(ProcessorReport::default())
    }
}

pub struct TestFactory;

impl BatchFactory for TestFactory {
    type Batch = TestBatch;

    fn new_batch(&self) -> TestBatch {
        TestBatch::default()
    }
}

/// How the test benchmark routes points
#[derive(Debug, Clone, Copy)]
pub enum Route {
    RoundRobin,
    Constant(usize),
}

/// Benchmark over an in-memory list of lines
pub struct TestBenchmark {
    pub lines: Vec<String>,
    pub route: Route,
    pub fail_at: Option<usize>,
    pub probe: Probe,
}

impl TestBenchmark {
    pub fn with_points(count: usize) -> Self {
        Self {
            lines: (0..count).map(|i| format!("p{i}")).collect(),
            route: Route::RoundRobin,
            fail_at: None,
            probe: Probe::default(),
        }
    }
}

impl Benchmark for TestBenchmark {
    type Source = MemorySource;
    type Indexer = Box<dyn PointIndexer>;
    type Factory = TestFactory;
    type Processor = TestProcessor;

    fn point_source(&self) -> Result<MemorySource, ContractError> {
        Ok(MemorySource::from_lines(self.lines.clone()))
    }

    fn point_indexer(&self, num_channels: usize) -> Box<dyn PointIndexer> {
        match self.route {
            Route::RoundRobin => Box::new(RoundRobinIndexer::new(num_channels)),
            Route::Constant(index) => Box::new(ConstantIndexer::new(index)),
        }
    }

    fn batch_factory(&self) -> TestFactory {
        TestFactory
    }

    fn processor(&self) -> TestProcessor {
        TestProcessor {
            probe: self.probe.clone(),
            fail_at: self.fail_at,
            ..Default::default()
        }
    }
}

