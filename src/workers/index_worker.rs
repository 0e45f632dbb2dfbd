// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::repositories::index_repository::IndexRepository;
use crate::queue::insert_queue::InsertQueue;
use metrics::{counter, gauge};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Write-behind drain worker.
///
/// Periodically pops a batch from each insert buffer and bulk-inserts it
/// into the durable store. A failed batch is logged and dropped rather than
/// retried in-process; lost batches are an accepted failure mode. Also
/// refreshes the queue-length gauges every tick.
pub struct IndexWorker<R>
where
    R: IndexRepository + Send + Sync + 'static,
{
    queue: InsertQueue,
    repository: Arc<R>,
    interval: Duration,
    batch_size: usize,
}

impl<R> IndexWorker<R>
where
    R: IndexRepository + Send + Sync + 'static,
{
    pub fn new(queue: InsertQueue, repository: Arc<R>) -> Self {
        Self {
            queue,
            repository,
            interval: Duration::from_secs(5),
            batch_size: 1000,
        }
    }

    pub fn with_schedule(mut self, interval: Duration, batch_size: usize) -> Self {
        self.interval = interval;
        self.batch_size = batch_size.max(1);
        self
    }

    pub async fn run(&self, shutdown: CancellationToken) {
        info!("Index insert worker started");

        let mut interval = tokio::time::interval(self.interval);
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Index insert worker stopping");
                    break;
                }
                _ = interval.tick() => {
                    self.drain_once().await;
                }
            }
        }
    }

    pub fn start(self, shutdown: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            self.run(shutdown).await;
        })
    }

    pub async fn drain_once(&self) {
        self.drain_records().await;
        self.drain_domain_frequencies().await;
        self.drain_omce_signatures().await;
        self.refresh_gauges().await;
    }

    async fn drain_records(&self) {
        let batch = match self.queue.dequeue_records(self.batch_size).await {
            Ok(batch) => batch,
            Err(e) => {
                warn!("Failed to dequeue index records: {}", e);
                return;
            }
        };
        if batch.is_empty() {
            return;
        }

        let count = batch.len();
        match self.repository.insert_records(batch).await {
            Ok(()) => {
                counter!("index_records_drained_total").increment(count as u64);
            }
            Err(e) => {
                counter!("index_records_dropped_total").increment(count as u64);
                warn!("Dropping batch of {} index records: {}", count, e);
            }
        }
    }

    async fn drain_domain_frequencies(&self) {
        let batch = match self.queue.dequeue_domain_frequencies(self.batch_size).await {
            Ok(batch) => batch,
            Err(e) => {
                warn!("Failed to dequeue domain frequencies: {}", e);
                return;
            }
        };
        if batch.is_empty() {
            return;
        }

        let count = batch.len();
        if let Err(e) = self.repository.bump_domain_frequencies(batch).await {
            warn!("Dropping batch of {} domain frequency bumps: {}", count, e);
        }
    }

    async fn drain_omce_signatures(&self) {
        let batch = match self.queue.dequeue_omce_signatures(self.batch_size).await {
            Ok(batch) => batch,
            Err(e) => {
                warn!("Failed to dequeue OMCE signatures: {}", e);
                return;
            }
        };
        if batch.is_empty() {
            return;
        }

        let count = batch.len();
        if let Err(e) = self.repository.upsert_omce_signatures(batch).await {
            warn!("Dropping batch of {} OMCE signatures: {}", count, e);
        }
    }

    async fn refresh_gauges(&self) {
        gauge!("index_insert_queue_length").set(self.queue.record_queue_length().await as f64);
        gauge!("domain_frequency_queue_length")
            .set(self.queue.domain_frequency_queue_length().await as f64);
        gauge!("omce_queue_length").set(self.queue.omce_queue_length().await as f64);
    }
}
