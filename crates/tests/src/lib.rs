//! # Integration Tests
//!
//! End-to-end tests across the loader crates.
//!
//! Covers:
//! - Batch pooling contracts
//! - Full runs of the InfluxDB target against an in-memory server
//! - Routing and batch-count properties of the dispatch loop

#[cfg(test)]
mod support {
    use std::collections::VecDeque;
    use std::io::Write;
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use backoff::{TransportError, WriteResponse, WriteTransport};
    use bytes::Bytes;
    use contracts::{ContractError, LoaderConfig, RetryConfig};
    use targets::influx::TransportFactory;

    /// Fields per generated point
    pub const FIELDS: u64 = 3;

    /// Write `count` line-protocol points, `FIELDS` fields each
    pub fn write_points(dir: &Path, count: usize) -> PathBuf {
        let path = dir.join("points.txt");
        let mut file = std::fs::File::create(&path).unwrap();
        for i in 0..count {
            writeln!(
                file,
                "cpu,hostname=host_{} usage_user={},usage_system=1,usage_idle=2 {}",
                i % 7,
                i,
                1_451_606_400_000_000_000u64 + i as u64
            )
            .unwrap();
        }
        path
    }

    pub fn config(source: PathBuf, workers: usize, capacity: usize, batch: usize) -> LoaderConfig {
        let mut config = LoaderConfig {
            workers,
            channel_capacity: capacity,
            batch_size: batch,
            reporting_period_ms: 0,
            retry: RetryConfig {
                max_retries: 3,
                base_delay_ms: 1,
                multiplier: 2.0,
                max_delay_ms: 4,
                backoff_ms: 20,
            },
            ..Default::default()
        };
        config.source.path = Some(source);
        config.influx.gzip = false;
        config
    }

    /// Scripted server shared by every worker's transport
    pub struct Server {
        script: Mutex<VecDeque<(u16, &'static str)>>,
        fallback: (u16, &'static str),
        calls: AtomicUsize,
        lines: AtomicUsize,
    }

    impl Server {
        pub fn new(script: Vec<(u16, &'static str)>, fallback: (u16, &'static str)) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                fallback,
                calls: AtomicUsize::new(0),
                lines: AtomicUsize::new(0),
            })
        }

        pub fn accepting() -> Arc<Self> {
            Self::new(Vec::new(), (204, ""))
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        /// Lines received in requests the server accepted
        pub fn lines(&self) -> usize {
            self.lines.load(Ordering::SeqCst)
        }
    }

    pub struct MockTransport(Arc<Server>);

    impl WriteTransport for MockTransport {
        async fn send(&self, body: Bytes, _gzip: bool) -> Result<WriteResponse, TransportError> {
            let server = &self.0;
            server.calls.fetch_add(1, Ordering::SeqCst);
            let next = server.script.lock().unwrap().pop_front();
            let (status, text) = next.unwrap_or(server.fallback);
            if status == 204 {
                let lines = body.iter().filter(|b| **b == b'\n').count();
                server.lines.fetch_add(lines, Ordering::SeqCst);
            }
            Ok(WriteResponse::new(status, text))
        }
    }

    pub struct MockFactory(pub Arc<Server>);

    impl TransportFactory for MockFactory {
        type Transport = MockTransport;

        fn connect(&self, _worker: usize) -> Result<MockTransport, ContractError> {
            Ok(MockTransport(Arc::clone(&self.0)))
        }
    }
}

#[cfg(test)]
mod contract_tests {
    use contracts::{Batch, Point, Pool};
    use targets::influx::LineBatch;

    #[test]
    fn test_released_batch_is_empty() {
        let pool = Pool::new(2, LineBatch::default);
        let mut batch = pool.acquire();
        batch
            .append(Point::from("cpu,host=a usage=1,idle=2 1"))
            .unwrap();
        assert_eq!(batch.len(), 1);
        pool.release(batch);

        let batch = pool.acquire();
        assert!(batch.is_empty());
        assert_eq!(batch.rows(), 0);
        assert!(batch.payload().is_empty());
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::sync::Arc;

    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{Benchmark, ContractError, LoaderConfig};
    use ingestion::ConstantIndexer;
    use loader::{BenchmarkRunner, LoaderError};
    use targets::influx::{InfluxBenchmark, TransportFactory};

    use crate::support::{config, write_points, MockFactory, Server, FIELDS};

    /// InfluxDB benchmark whose points all go to one channel
    struct Pinned<F: TransportFactory> {
        inner: InfluxBenchmark<F>,
        channel: usize,
    }

    impl<F: TransportFactory> Benchmark for Pinned<F> {
        type Source = <InfluxBenchmark<F> as Benchmark>::Source;
        type Indexer = ConstantIndexer;
        type Factory = <InfluxBenchmark<F> as Benchmark>::Factory;
        type Processor = <InfluxBenchmark<F> as Benchmark>::Processor;

        fn point_source(&self) -> Result<Self::Source, ContractError> {
            self.inner.point_source()
        }

        fn point_indexer(&self, _num_channels: usize) -> ConstantIndexer {
            ConstantIndexer::new(self.channel)
        }

        fn batch_factory(&self) -> Self::Factory {
            self.inner.batch_factory()
        }

        fn processor(&self) -> Self::Processor {
            self.inner.processor()
        }
    }

    fn benchmark(
        config: LoaderConfig,
        server: &Arc<Server>,
    ) -> (Arc<LoaderConfig>, InfluxBenchmark<MockFactory>) {
        let config = Arc::new(config);
        let benchmark =
            InfluxBenchmark::with_transports(Arc::clone(&config), MockFactory(Arc::clone(server)));
        (config, benchmark)
    }

    /// 1000 points, 4 workers, capacity 10, batch 25, round robin, dry run
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_e2e_round_robin_dry_run() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_points(dir.path(), 1000);
        let server = Server::accepting();
        let (config, benchmark) = benchmark(
            LoaderConfig {
                do_load: false,
                ..config(source, 4, 10, 25)
            },
            &server,
        );

        let summary = BenchmarkRunner::new(config, benchmark).run().await.unwrap();

        assert_eq!(summary.points, 1000);
        assert_eq!(summary.rows, 1000 * FIELDS);
        assert_eq!(summary.batches, 40);
        assert_eq!(summary.workers.len(), 4);
        let worker_ids: Vec<_> = summary.workers.iter().map(|w| w.worker).collect();
        assert_eq!(worker_ids, vec![0, 1, 2, 3]);
        assert_eq!(
            summary.workers.iter().map(|w| w.counts.points).sum::<u64>(),
            1000
        );
        // dry run never touches the server
        assert_eq!(server.calls(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_e2e_load_writes_every_point() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_points(dir.path(), 1000);
        let server = Server::accepting();
        let (config, benchmark) = benchmark(config(source, 4, 10, 25), &server);

        let summary = BenchmarkRunner::new(config, benchmark).run().await.unwrap();

        assert_eq!(summary.points, 1000);
        assert_eq!(server.calls(), 40);
        assert_eq!(server.lines(), 1000);
        assert_eq!(summary.total_backoff(), std::time::Duration::ZERO);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_e2e_hashed_routing_keeps_series_together() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_points(dir.path(), 700);
        let server = Server::accepting();
        let (config, benchmark) = benchmark(
            LoaderConfig {
                hash_workers: true,
                do_load: false,
                ..config(source, 3, 4, 10)
            },
            &server,
        );

        let summary = BenchmarkRunner::new(config, benchmark).run().await.unwrap();

        assert_eq!(summary.points, 700);
        assert_eq!(summary.batches_per_channel.len(), 3);
        for (channel, report) in summary.workers.iter().enumerate() {
            assert_eq!(report.batches, summary.batches_per_channel[channel]);
        }
    }

    #[tokio::test]
    async fn test_e2e_constant_indexer_routes_to_one_worker() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_points(dir.path(), 230);
        let server = Server::accepting();
        let (config, inner) = benchmark(
            LoaderConfig {
                hash_workers: true,
                do_load: false,
                ..config(source, 4, 8, 20)
            },
            &server,
        );

        let summary = BenchmarkRunner::new(config, Pinned { inner, channel: 2 })
            .run()
            .await
            .unwrap();

        assert_eq!(summary.points, 230);
        for report in &summary.workers {
            if report.worker == 2 {
                assert_eq!(report.counts.points, 230);
                assert_eq!(report.batches, 12);
            } else {
                assert_eq!(report.batches, 0);
                assert_eq!(report.counts.points, 0);
            }
        }
    }

    #[tokio::test]
    async fn test_e2e_batch_count_is_ceiling() {
        for (points, batch) in [(0usize, 5usize), (1, 5), (10, 5), (11, 5), (999, 25), (1000, 25)] {
            let dir = tempfile::tempdir().unwrap();
            let source = write_points(dir.path(), points);
            let server = Server::accepting();
            let (config, benchmark) = benchmark(
                LoaderConfig {
                    do_load: false,
                    ..config(source, 2, 4, batch)
                },
                &server,
            );

            let summary = BenchmarkRunner::new(config, benchmark).run().await.unwrap();
            assert_eq!(summary.points, points as u64);
            assert_eq!(
                summary.batches,
                (points as u64).div_ceil(batch as u64),
                "points={points} batch={batch}"
            );
        }
    }

    #[tokio::test]
    async fn test_e2e_config_file_drives_run() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_points(dir.path(), 120);
        let toml = format!(
            r#"
workers = 3
channel_capacity = 2
batch_size = 16
limit = 100
do_load = false
reporting_period_ms = 0

[influx]
urls = ["http://a:8086", "http://b:8086"]
database = "benchmark"

[source]
path = "{}"
"#,
            source.display()
        );
        let loaded = ConfigLoader::load_from_str(&toml, ConfigFormat::Toml).unwrap();
        let server = Server::accepting();
        let (config, benchmark) = benchmark(loaded, &server);

        let summary = BenchmarkRunner::new(config, benchmark).run().await.unwrap();

        assert!(summary.limit_reached);
        assert_eq!(summary.points, 100);
        assert_eq!(summary.batches, 7);
        assert_eq!(summary.workers.len(), 3);
    }

    #[tokio::test]
    async fn test_e2e_overload_backs_off_and_resends() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_points(dir.path(), 100);
        let server = Server::new(
            vec![(500, "engine: cache maximum memory size exceeded")],
            (204, ""),
        );
        let (config, benchmark) = benchmark(config(source, 1, 4, 50), &server);

        let summary = BenchmarkRunner::new(config, benchmark).run().await.unwrap();

        assert_eq!(summary.points, 100);
        // two batches plus one resend of the overloaded batch
        assert_eq!(server.calls(), 3);
        assert_eq!(server.lines(), 100);
        assert!(summary.workers[0].backoff >= std::time::Duration::from_millis(20));
    }

    #[tokio::test]
    async fn test_e2e_hard_failure_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_points(dir.path(), 10);
        let server = Server::new(Vec::new(), (400, "unable to parse"));
        let (config, benchmark) = benchmark(config(source, 1, 4, 10), &server);

        let err = BenchmarkRunner::new(config, benchmark)
            .run()
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            LoaderError::Worker {
                worker: 0,
                source: ContractError::Write { .. }
            }
        ));
        // exactly max_retries attempts, then nothing more
        assert_eq!(server.calls(), 3);
    }

    #[tokio::test]
    async fn test_e2e_malformed_line_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("points.txt");
        std::fs::write(&source, "cpu,host=a usage=1 1\nnot-line-protocol\n").unwrap();
        let server = Server::accepting();
        let (config, benchmark) = benchmark(config(source, 2, 4, 10), &server);

        let err = BenchmarkRunner::new(config, benchmark)
            .run()
            .await
            .unwrap_err();
        assert!(matches!(err, LoaderError::Dispatch(_)));
    }
}

#[cfg(test)]
mod dispatch_tests {
    use contracts::{Batch, Pool};
    use ingestion::{create_channels, scan, MemorySource, RoundRobinIndexer, ScanConfig};
    use targets::influx::LineBatch;

    #[test]
    fn test_final_batch_holds_remainder() {
        for (points, batch_size) in [(10usize, 5usize), (11, 5), (4, 5), (26, 25)] {
            let batches = points.div_ceil(batch_size);
            let pool = Pool::new(batches + 1, LineBatch::default);
            let (senders, receivers) = create_channels::<LineBatch>(1, batches + 1);
            let mut source = MemorySource::from_lines(
                (0..points).map(|i| format!("cpu,host=h{i} usage={i} {i}")),
            );
            let mut indexer = RoundRobinIndexer::new(1);

            let summary = scan(
                &mut source,
                &mut indexer,
                &pool,
                &senders,
                ScanConfig {
                    batch_size,
                    limit: None,
                },
            )
            .unwrap();
            drop(senders);

            assert_eq!(summary.batches(), batches as u64);
            let sizes: Vec<usize> = std::iter::from_fn(|| receivers[0].try_recv().ok())
                .map(|batch| batch.len())
                .collect();
            assert_eq!(sizes.len(), batches);
            let expected_last = if points % batch_size == 0 {
                batch_size
            } else {
                points % batch_size
            };
            assert_eq!(*sizes.last().unwrap(), expected_last);
        }
    }
}
