//! InfluxBenchmark - the bundle the runner drives

use std::sync::Arc;

use contracts::{Benchmark, ContractError, LoaderConfig, PointIndexer, PointSource, Pool};
use ingestion::{KeyHashIndexer, LineSource, RoundRobinIndexer};
use tracing::info;

use super::batch::LineBatchFactory;
use super::http::{HttpTransportFactory, TransportFactory};
use super::processor::InfluxProcessor;

/// Idle gzip buffers kept per worker
const BUFFERS_PER_WORKER: usize = 2;

/// Series key of a line: everything before the first space
pub fn series_key(line: &[u8]) -> &[u8] {
    line.split(|b| *b == b' ').next().unwrap_or(line)
}

/// InfluxDB line-protocol load
pub struct InfluxBenchmark<F: TransportFactory = HttpTransportFactory> {
    config: Arc<LoaderConfig>,
    transports: Arc<F>,
    buffers: Arc<Pool<Vec<u8>>>,
}

impl InfluxBenchmark<HttpTransportFactory> {
    /// Benchmark writing over HTTP to the configured servers
    pub fn new(config: Arc<LoaderConfig>) -> Result<Self, ContractError> {
        let transports = HttpTransportFactory::new(&config.influx)?;
        Ok(Self::with_transports(config, transports))
    }
}

impl<F: TransportFactory> InfluxBenchmark<F> {
    pub fn with_transports(config: Arc<LoaderConfig>, transports: F) -> Self {
        let buffers = Pool::new(config.workers * BUFFERS_PER_WORKER, Vec::new);
        Self {
            config,
            transports: Arc::new(transports),
            buffers: Arc::new(buffers),
        }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }
}

impl<F: TransportFactory> Benchmark for InfluxBenchmark<F> {
    type Source = Box<dyn PointSource>;
    type Indexer = Box<dyn PointIndexer>;
    type Factory = LineBatchFactory;
    type Processor = InfluxProcessor<F>;

    fn point_source(&self) -> Result<Self::Source, ContractError> {
        match &self.config.source.path {
            Some(path) => {
                info!(path = %path.display(), "Reading points from file");
                Ok(Box::new(LineSource::open(path)?))
            }
            None => {
                info!("Reading points from stdin");
                Ok(Box::new(LineSource::stdin()))
            }
        }
    }

    fn point_indexer(&self, num_channels: usize) -> Self::Indexer {
        if self.config.hash_workers {
            Box::new(KeyHashIndexer::new(num_channels, series_key))
        } else {
            Box::new(RoundRobinIndexer::new(num_channels))
        }
    }

    fn batch_factory(&self) -> LineBatchFactory {
        LineBatchFactory::default()
    }

    fn processor(&self) -> InfluxProcessor<F> {
        InfluxProcessor::new(
            Arc::clone(&self.config),
            Arc::clone(&self.transports),
            Arc::clone(&self.buffers),
        )
    }
}
