//! Dispatch loop
//!
//! Reads points from the source, routes each through the indexer into the
//! open batch of its channel, and pushes full batches to the workers.
//! Bounded channels are the only flow control: a full channel blocks the
//! loop until its worker catches up.

use async_channel::{bounded, Receiver, Sender};
use contracts::{Batch, Pool, PointIndexer, PointSource, SourceHeaders};
use metrics::counter;
use tracing::{debug, info, instrument};

use crate::error::{IngestionError, Result};

/// Dispatch loop parameters
#[derive(Debug, Clone, Copy)]
pub struct ScanConfig {
    /// Points per batch
    pub batch_size: usize,
    /// Stop after this many points
    pub limit: Option<u64>,
}

/// What the dispatch loop did
#[derive(Debug, Clone, Default)]
pub struct ScanSummary {
    /// Points read and dispatched
    pub points: u64,
    /// Batches sent, per channel
    pub batches_per_channel: Vec<u64>,
    /// Source headers, if the source had any
    pub headers: Option<SourceHeaders>,
    /// Stopped because the point limit was reached
    pub limit_reached: bool,
}

impl ScanSummary {
    /// Total batches sent across channels
    pub fn batches(&self) -> u64 {
        self.batches_per_channel.iter().sum()
    }
}

/// Create `count` bounded batch channels of `capacity` each
pub fn create_channels<B>(count: usize, capacity: usize) -> (Vec<Sender<B>>, Vec<Receiver<B>>) {
    (0..count).map(|_| bounded(capacity.max(1))).unzip()
}

/// Run the dispatch loop to completion
///
/// Blocks the calling thread; run it on a blocking thread, not on an async
/// worker. Every non-empty open batch is flushed before returning. The
/// caller closes the channels by dropping the senders afterwards.
///
/// # Errors
/// Source failures, rejected points and closed channels are fatal.
#[instrument(
    name = "dispatch_scan",
    skip_all,
    fields(channels = channels.len(), batch_size = config.batch_size, limit = ?config.limit)
)]
pub fn scan<S, I, B>(
    source: &mut S,
    indexer: &mut I,
    pool: &Pool<B>,
    channels: &[Sender<B>],
    config: ScanConfig,
) -> Result<ScanSummary>
where
    S: PointSource + ?Sized,
    I: PointIndexer + ?Sized,
    B: Batch,
{
    let batch_size = config.batch_size.max(1);
    let mut summary = ScanSummary {
        batches_per_channel: vec![0; channels.len()],
        ..Default::default()
    };

    summary.headers = source.headers().map_err(|source| IngestionError::Source {
        points: 0,
        source,
    })?;
    if let Some(headers) = &summary.headers {
        info!(lines = headers.lines.len(), "Source headers consumed");
    }

    let mut open: Vec<Option<B>> = channels.iter().map(|_| None).collect();

    loop {
        if config.limit.is_some_and(|limit| summary.points >= limit) {
            summary.limit_reached = true;
            break;
        }

        let point = match source.next_point() {
            Ok(Some(point)) if !point.is_empty() => point,
            Ok(_) => break,
            Err(source) => {
                return Err(IngestionError::Source {
                    points: summary.points,
                    source,
                })
            }
        };

        let index = indexer.index_of(&point);
        if index >= channels.len() {
            return Err(IngestionError::IndexOutOfRange {
                index,
                channels: channels.len(),
            });
        }

        let batch = open[index].get_or_insert_with(|| pool.acquire());
        batch
            .append(point)
            .map_err(|source| IngestionError::Append {
                index: summary.points,
                source,
            })?;
        summary.points += 1;

        if batch.len() >= batch_size {
            if let Some(full) = open[index].take() {
                send_batch(channels, index, full, &mut summary)?;
            }
        }
    }

    for (index, slot) in open.iter_mut().enumerate() {
        match slot.take() {
            Some(batch) if !batch.is_empty() => send_batch(channels, index, batch, &mut summary)?,
            Some(batch) => pool.release(batch),
            None => {}
        }
    }

    info!(
        points = summary.points,
        batches = summary.batches(),
        limit_reached = summary.limit_reached,
        "Dispatch loop finished"
    );
    Ok(summary)
}

fn send_batch<B>(
    channels: &[Sender<B>],
    index: usize,
    batch: B,
    summary: &mut ScanSummary,
) -> Result<()> {
    channels[index]
        .send_blocking(batch)
        .map_err(|_| IngestionError::ChannelClosed { channel: index })?;

    summary.batches_per_channel[index] += 1;
    counter!("tsbs_load_batches_dispatched_total").increment(1);

    let sent = summary.batches();
    if sent % 1000 == 0 {
        debug!(batches = sent, points = summary.points, "Dispatch progress");
    }
    Ok(())
}
