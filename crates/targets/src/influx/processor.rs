//! InfluxProcessor - writes line batches through the backoff controller

use std::sync::Arc;

use contracts::{
    Batch, BatchCounts, ContractError, LoaderConfig, Pool, Processor, ProcessorReport,
};
use tracing::{debug, instrument};

use backoff::BackoffController;
use bytes::Bytes;

use super::batch::LineBatch;
use super::gzip::compress_into;
use super::http::TransportFactory;

/// Per-worker line-protocol writer
///
/// Built unconnected; `init` picks the worker's URL and starts its backoff
/// tracker. In a dry run nothing is connected and batches are only counted.
pub struct InfluxProcessor<F: TransportFactory> {
    config: Arc<LoaderConfig>,
    transports: Arc<F>,
    buffers: Arc<Pool<Vec<u8>>>,
    worker: usize,
    controller: Option<BackoffController<F::Transport>>,
}

impl<F: TransportFactory> InfluxProcessor<F> {
    pub fn new(config: Arc<LoaderConfig>, transports: Arc<F>, buffers: Arc<Pool<Vec<u8>>>) -> Self {
        Self {
            config,
            transports,
            buffers,
            worker: 0,
            controller: None,
        }
    }

    pub fn worker(&self) -> usize {
        self.worker
    }

    fn controller(&self) -> Result<&BackoffController<F::Transport>, ContractError> {
        self.controller
            .as_ref()
            .ok_or(ContractError::NotInitialized {
                worker: self.worker,
            })
    }

    async fn write(&self, batch: &LineBatch) -> Result<(), ContractError> {
        let controller = self.controller()?;

        let result = if self.config.influx.gzip {
            let mut compressed = self.buffers.acquire_guard();
            compress_into(batch.payload(), &mut compressed)?;
            controller
                .write(Bytes::copy_from_slice(&compressed), true)
                .await
        } else {
            controller
                .write(Bytes::copy_from_slice(batch.payload()), false)
                .await
        };

        result
            .map(|latency| {
                debug!(
                    worker = self.worker,
                    latency_ms = latency.as_secs_f64() * 1000.0,
                    "Batch written"
                );
            })
            .map_err(|e| e.into_contract(self.worker))
    }
}

impl<F: TransportFactory> Processor for InfluxProcessor<F> {
    type Batch = LineBatch;

    #[instrument(name = "influx_processor_init", skip(self))]
    async fn init(
        &mut self,
        worker: usize,
        do_load: bool,
        hash_workers: bool,
    ) -> Result<(), ContractError> {
        self.worker = worker;
        if do_load {
            let transport = self.transports.connect(worker)?;
            self.controller = Some(BackoffController::new(
                worker,
                transport,
                &self.config.retry,
            ));
        }
        Ok(())
    }

    #[instrument(
        name = "influx_processor_batch",
        skip(self, batch),
        fields(worker = self.worker, points = batch.len())
    )]
    async fn process_batch(
        &mut self,
        batch: &LineBatch,
        do_load: bool,
    ) -> Result<BatchCounts, ContractError> {
        if do_load {
            self.write(batch).await?;
        }
        Ok(batch.counts())
    }

    #[instrument(name = "influx_processor_close", skip(self), fields(worker = self.worker))]
    async fn close(&mut self, do_load: bool) -> Result<ProcessorReport, ContractError> {
        let backoff = match self.controller.take() {
            Some(controller) => controller.close().await,
            None => Default::default(),
        };
        Ok(ProcessorReport { backoff })
    }
}
