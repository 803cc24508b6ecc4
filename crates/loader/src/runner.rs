//! BenchmarkRunner - the lifecycle coordinator
//!
//! Creates the channels and the batch pool, starts the workers, runs the
//! dispatch loop on a blocking thread, then waits for every worker before
//! reading the final counters.

use std::sync::Arc;
use std::time::Instant;

use contracts::{BatchFactory, Benchmark, LoaderConfig, Pool};
use ingestion::{create_channels, scan, ScanConfig, ScanSummary};
use tokio::task::JoinSet;
use tracing::{error, info, instrument};

use crate::error::{LoaderError, Result};
use crate::progress::ProgressReporter;
use crate::stats::LoadStats;
use crate::summary::LoadSummary;
use crate::worker::{run_worker, WorkerReport, WorkerSettings};

type BatchOf<B> = <<B as Benchmark>::Factory as BatchFactory>::Batch;

/// Runs one benchmark to completion
pub struct BenchmarkRunner<B: Benchmark> {
    config: Arc<LoaderConfig>,
    benchmark: B,
}

impl<B: Benchmark> BenchmarkRunner<B> {
    pub fn new(config: Arc<LoaderConfig>, benchmark: B) -> Self {
        Self { config, benchmark }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Run the load
    ///
    /// Shutdown is ordered: channels close only after the dispatch loop has
    /// flushed its last batch, and counters are read only after every
    /// worker has exited. The first fatal error aborts the remaining
    /// workers.
    #[instrument(
        name = "benchmark_run",
        skip_all,
        fields(
            workers = self.config.workers,
            channels = self.config.num_channels(),
            batch_size = self.config.batch_size,
            do_load = self.config.do_load
        )
    )]
    pub async fn run(self) -> Result<LoadSummary> {
        let config = Arc::clone(&self.config);
        if config.workers == 0 {
            return Err(LoaderError::config("workers must be at least 1"));
        }
        if config.batch_size == 0 {
            return Err(LoaderError::config("batch_size must be at least 1"));
        }

        let num_channels = config.num_channels();
        let start = Instant::now();

        let mut source = self.benchmark.point_source().map_err(LoaderError::Source)?;
        let mut indexer = self.benchmark.point_indexer(num_channels);

        // Enough idle batches for full channels, one open batch per
        // channel and one in flight per worker.
        let factory = self.benchmark.batch_factory();
        let pool = Arc::new(Pool::new(
            num_channels * (config.channel_capacity + 1) + config.workers,
            move || factory.new_batch(),
        ));
        let (senders, receivers) =
            create_channels::<BatchOf<B>>(num_channels, config.channel_capacity);
        let stats = Arc::new(LoadStats::new());

        let settings = WorkerSettings {
            do_load: config.do_load,
            hash_workers: config.hash_workers,
            batch_delay: config.batch_delay(),
        };
        let mut workers = JoinSet::new();
        for worker in 0..config.workers {
            workers.spawn(run_worker(
                worker,
                self.benchmark.processor(),
                receivers[worker % num_channels].clone(),
                Arc::clone(&pool),
                Arc::clone(&stats),
                settings,
            ));
        }
        // Workers hold the only receivers from here on.
        drop(receivers);
        info!(workers = config.workers, channels = num_channels, "Workers started");

        let reporter = config
            .reporting_period()
            .map(|period| ProgressReporter::spawn(Arc::clone(&stats), period));

        let scan_config = ScanConfig {
            batch_size: config.batch_size,
            limit: config.limit,
        };
        let scan_pool = Arc::clone(&pool);
        let mut scan_task = tokio::task::spawn_blocking(move || {
            let result = scan(&mut source, &mut indexer, &scan_pool, &senders, scan_config);
            // Closing the channels is the workers' termination signal.
            drop(senders);
            result
        });

        let mut scanned: Option<ScanSummary> = None;
        let mut reports: Vec<WorkerReport> = Vec::with_capacity(config.workers);
        let outcome: Result<()> = loop {
            tokio::select! {
                joined = &mut scan_task, if scanned.is_none() => match joined {
                    Ok(Ok(summary)) => scanned = Some(summary),
                    Ok(Err(e)) => break Err(e.into()),
                    Err(e) => break Err(LoaderError::task("dispatch", e)),
                },
                joined = workers.join_next() => match joined {
                    Some(Ok(Ok(report))) => reports.push(report),
                    Some(Ok(Err(e))) => break Err(e),
                    Some(Err(e)) => break Err(LoaderError::task("worker", e)),
                    None => break Ok(()),
                },
            }
        };

        if let Err(e) = outcome {
            error!(error = %e, "Load failed, aborting workers");
            workers.shutdown().await;
            if let Some(reporter) = reporter {
                reporter.stop().await;
            }
            return Err(e);
        }

        // Every worker is done, so the dispatch loop has dropped its senders.
        let scanned = match scanned {
            Some(summary) => summary,
            None => scan_task
                .await
                .map_err(|e| LoaderError::task("dispatch", e))??,
        };
        if let Some(reporter) = reporter {
            reporter.stop().await;
        }

        let elapsed = start.elapsed();
        let totals = stats.snapshot();
        reports.sort_by_key(|report| report.worker);

        let summary = LoadSummary {
            points: totals.points,
            rows: totals.rows,
            batches: totals.batches,
            elapsed,
            workers: reports,
            batches_per_channel: scanned.batches_per_channel,
            headers: scanned.headers,
            limit_reached: scanned.limit_reached,
        };
        info!(
            points = summary.points,
            rows = summary.rows,
            batches = summary.batches,
            elapsed_secs = elapsed.as_secs_f64(),
            points_per_sec = format!("{:.2}", summary.points_per_sec()),
            "Load finished"
        );
        Ok(summary)
    }
}
