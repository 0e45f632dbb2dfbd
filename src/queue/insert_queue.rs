// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::index_record::{
    QueuedDomainFrequency, QueuedIndexRecord, QueuedOmceSignature,
};
use crate::infrastructure::cache::redis_client::RedisClient;
use anyhow::Result;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::warn;

const INDEX_INSERT_QUEUE_KEY: &str = "index:insert-queue";
const DOMAIN_FREQUENCY_QUEUE_KEY: &str = "index:domain-frequency-queue";
const OMCE_QUEUE_KEY: &str = "index:omce-queue";

/// The three write-behind buffers decoupling the hot crawl path from durable
/// storage. Index records and domain-frequency bumps are FIFO lists; OMCE
/// signatures are a duplicate-suppressing set. Producers enqueue serialized
/// records, the drain worker pops them in batches; pops are atomic, so
/// multiple drainer instances are safe (at-least-once, not exactly-once).
#[derive(Clone)]
pub struct InsertQueue {
    redis: Arc<RedisClient>,
}

impl InsertQueue {
    pub fn new(redis: Arc<RedisClient>) -> Self {
        Self { redis }
    }

    pub async fn enqueue_record(&self, record: QueuedIndexRecord) -> Result<()> {
        let payload = serde_json::to_string(&record)?;
        self.redis.rpush(INDEX_INSERT_QUEUE_KEY, vec![payload]).await
    }

    pub async fn enqueue_domain_frequency(
        &self,
        frequency: QueuedDomainFrequency,
    ) -> Result<()> {
        let payload = serde_json::to_string(&frequency)?;
        self.redis
            .rpush(DOMAIN_FREQUENCY_QUEUE_KEY, vec![payload])
            .await
    }

    /// Duplicate enqueues of the same (domain, signature) pair collapse in
    /// the set before they ever reach the store.
    pub async fn enqueue_omce_signature(&self, signature: QueuedOmceSignature) -> Result<()> {
        let payload = serde_json::to_string(&signature)?;
        self.redis.sadd(OMCE_QUEUE_KEY, &payload).await
    }

    /// Atomically remove up to `max` queued index records, oldest first.
    pub async fn dequeue_records(&self, max: usize) -> Result<Vec<QueuedIndexRecord>> {
        let raw = self.redis.lpop_count(INDEX_INSERT_QUEUE_KEY, max).await?;
        Ok(deserialize_batch(raw, INDEX_INSERT_QUEUE_KEY))
    }

    pub async fn dequeue_domain_frequencies(
        &self,
        max: usize,
    ) -> Result<Vec<QueuedDomainFrequency>> {
        let raw = self
            .redis
            .lpop_count(DOMAIN_FREQUENCY_QUEUE_KEY, max)
            .await?;
        Ok(deserialize_batch(raw, DOMAIN_FREQUENCY_QUEUE_KEY))
    }

    /// Atomically remove up to `max` queued OMCE signatures, unordered.
    pub async fn dequeue_omce_signatures(
        &self,
        max: usize,
    ) -> Result<Vec<QueuedOmceSignature>> {
        let raw = self.redis.spop_count(OMCE_QUEUE_KEY, max).await?;
        Ok(deserialize_batch(raw, OMCE_QUEUE_KEY))
    }

    /// Queue lengths only feed observability gauges, so they never error:
    /// backing-store unavailability reads as 0.
    pub async fn record_queue_length(&self) -> u64 {
        self.redis.llen(INDEX_INSERT_QUEUE_KEY).await.unwrap_or(0)
    }

    pub async fn domain_frequency_queue_length(&self) -> u64 {
        self.redis
            .llen(DOMAIN_FREQUENCY_QUEUE_KEY)
            .await
            .unwrap_or(0)
    }

    pub async fn omce_queue_length(&self) -> u64 {
        self.redis.scard(OMCE_QUEUE_KEY).await.unwrap_or(0)
    }
}

fn deserialize_batch<T: DeserializeOwned>(raw: Vec<String>, queue: &str) -> Vec<T> {
    let mut batch = Vec::with_capacity(raw.len());
    for entry in raw {
        match serde_json::from_str(&entry) {
            Ok(value) => batch.push(value),
            Err(e) => warn!("dropping malformed entry from {}: {}", queue, e),
        }
    }
    batch
}
