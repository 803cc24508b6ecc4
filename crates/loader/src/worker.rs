//! Worker loop - drains one channel through one processor

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_channel::Receiver;
use contracts::{Batch, BatchCounts, Pool, Processor};
use observability::{record_batch_processed, record_worker_backoff, RunningStats};
use tokio::time::sleep;
use tracing::{debug, info, instrument};

use crate::error::{LoaderError, Result};
use crate::stats::LoadStats;

/// Flags every worker receives
#[derive(Debug, Clone, Copy)]
pub struct WorkerSettings {
    pub do_load: bool,
    pub hash_workers: bool,
    /// Minimum time between batch starts
    pub batch_delay: Option<Duration>,
}

/// What one worker did
#[derive(Debug, Clone, Default)]
pub struct WorkerReport {
    pub worker: usize,
    pub batches: u64,
    pub counts: BatchCounts,
    /// Per-batch processing time in milliseconds
    pub latency_ms: RunningStats,
    /// Time spent waiting on an overloaded server
    pub backoff: Duration,
}

/// Run one worker to completion
///
/// init → receive/process/recycle until the channel is closed and drained
/// → close hook.
#[instrument(name = "load_worker", skip_all, fields(worker = worker))]
pub async fn run_worker<P: Processor>(
    worker: usize,
    mut processor: P,
    rx: Receiver<P::Batch>,
    pool: Arc<Pool<P::Batch>>,
    stats: Arc<LoadStats>,
    settings: WorkerSettings,
) -> Result<WorkerReport> {
    processor
        .init(worker, settings.do_load, settings.hash_workers)
        .await
        .map_err(|e| LoaderError::worker(worker, e))?;
    debug!(worker, "Worker started");

    let mut report = WorkerReport {
        worker,
        ..Default::default()
    };

    while let Ok(batch) = rx.recv().await {
        let start = Instant::now();
        let result = processor.process_batch(&batch, settings.do_load).await;
        let took = start.elapsed();

        let counts = match result {
            Ok(counts) => counts,
            Err(e) => {
                pool.release(batch);
                return Err(LoaderError::worker(worker, e));
            }
        };

        stats.add(counts);
        report.batches += 1;
        report.counts += counts;
        report.latency_ms.push(took.as_secs_f64() * 1000.0);
        record_batch_processed(counts.points, counts.rows, took.as_secs_f64() * 1000.0);

        if let Some(delay) = settings.batch_delay {
            let elapsed = start.elapsed();
            if elapsed < delay {
                sleep(delay - elapsed).await;
            }
        }

        pool.release(batch);
    }

    let closed = processor
        .close(settings.do_load)
        .await
        .map_err(|e| LoaderError::worker(worker, e))?;
    report.backoff = closed.backoff;
    record_worker_backoff(worker, closed.backoff.as_secs_f64());

    info!(
        worker,
        batches = report.batches,
        points = report.counts.points,
        rows = report.counts.rows,
        backoff_secs = report.backoff.as_secs_f64(),
        "Worker finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{batch_of, TestBatch, TestProcessor};
    use async_channel::bounded;
    use contracts::ContractError;

    fn settings() -> WorkerSettings {
        WorkerSettings {
            do_load: true,
            hash_workers: false,
            batch_delay: None,
        }
    }

    fn pool() -> Arc<Pool<TestBatch>> {
        Arc::new(Pool::new(8, TestBatch::default))
    }

    #[tokio::test]
    async fn test_worker_drains_channel() {
        let (tx, rx) = bounded(4);
        let processor = TestProcessor::default();
        let probe = processor.probe();
        let stats = Arc::new(LoadStats::new());
        let pool = pool();

        let handle = tokio::spawn(run_worker(
            2,
            processor,
            rx,
            Arc::clone(&pool),
            Arc::clone(&stats),
            settings(),
        ));
        for n in [3, 5, 2] {
            tx.send(batch_of(n)).await.unwrap();
        }
        drop(tx);

        let report = handle.await.unwrap().unwrap();
        assert_eq!(report.worker, 2);
        assert_eq!(report.batches, 3);
        assert_eq!(report.counts, BatchCounts::new(10, 20));
        assert_eq!(report.latency_ms.count(), 3);
        assert_eq!(stats.points(), 10);

        assert_eq!(probe.inits(), vec![(2, true, false)]);
        assert_eq!(probe.closes(), 1);
        // every batch went back to the pool
        assert_eq!(pool.available(), 3);
    }

    #[tokio::test]
    async fn test_worker_with_closed_empty_channel() {
        let (tx, rx) = bounded::<TestBatch>(1);
        drop(tx);
        let processor = TestProcessor::default();
        let probe = processor.probe();

        let report = run_worker(
            0,
            processor,
            rx,
            pool(),
            Arc::new(LoadStats::new()),
            settings(),
        )
        .await
        .unwrap();

        assert_eq!(report.batches, 0);
        assert_eq!(probe.inits().len(), 1);
        assert_eq!(probe.closes(), 1);
    }

    #[tokio::test]
    async fn test_worker_stops_on_processor_error() {
        let (tx, rx) = bounded(4);
        let processor = TestProcessor::failing_at(1);
        let probe = processor.probe();
        let pool = pool();
        tx.send(batch_of(1)).await.unwrap();
        tx.send(batch_of(1)).await.unwrap();
        tx.send(batch_of(1)).await.unwrap();
        drop(tx);

        let err = run_worker(
            7,
            processor,
            rx,
            Arc::clone(&pool),
            Arc::new(LoadStats::new()),
            settings(),
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            LoaderError::Worker {
                worker: 7,
                source: ContractError::Write { .. }
            }
        ));
        assert_eq!(probe.processed(), 2);
        assert_eq!(probe.closes(), 0);
        assert_eq!(pool.available(), 2);
    }

    #[tokio::test]
    async fn test_batch_delay_rate_limits() {
        let (tx, rx) = bounded(4);
        for _ in 0..3 {
            tx.send(batch_of(1)).await.unwrap();
        }
        drop(tx);

        let start = Instant::now();
        run_worker(
            0,
            TestProcessor::default(),
            rx,
            pool(),
            Arc::new(LoadStats::new()),
            WorkerSettings {
                batch_delay: Some(Duration::from_millis(20)),
                ..settings()
            },
        )
        .await
        .unwrap();

        assert!(start.elapsed() >= Duration::from_millis(60));
    }

    #[tokio::test]
    async fn test_dry_run_flag_reaches_processor() {
        let (tx, rx) = bounded(1);
        tx.send(batch_of(4)).await.unwrap();
        drop(tx);
        let processor = TestProcessor::default();
        let probe = processor.probe();

        run_worker(
            1,
            processor,
            rx,
            pool(),
            Arc::new(LoadStats::new()),
            WorkerSettings {
                do_load: false,
                hash_workers: true,
                batch_delay: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(probe.inits(), vec![(1, false, true)]);
        assert_eq!(probe.loads(), vec![false]);
    }
}
