// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use anyhow::Result;
use redis::AsyncCommands;
use std::num::NonZeroUsize;

/// Async Redis client backing the shared map cache and the write-behind
/// insert buffers.
#[derive(Clone)]
pub struct RedisClient {
    client: redis::Client,
}

impl RedisClient {
    pub async fn new(redis_url: &str) -> Result<Self> {
        let client = redis::Client::open(redis_url)?;
        Ok(Self { client })
    }

    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut con = self.client.get_multiplexed_async_connection().await?;
        let value: Option<String> = con.get(key).await?;
        Ok(value)
    }

    pub async fn set_ex(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<()> {
        let mut con = self.client.get_multiplexed_async_connection().await?;
        con.set_ex::<_, _, ()>(key, value, ttl_seconds).await?;
        Ok(())
    }

    /// Append entries to the tail of a list.
    pub async fn rpush(&self, key: &str, values: Vec<String>) -> Result<()> {
        if values.is_empty() {
            return Ok(());
        }
        let mut con = self.client.get_multiplexed_async_connection().await?;
        con.rpush::<_, _, ()>(key, values).await?;
        Ok(())
    }

    /// Atomically pop up to `count` entries from the head of a list.
    pub async fn lpop_count(&self, key: &str, count: usize) -> Result<Vec<String>> {
        let mut con = self.client.get_multiplexed_async_connection().await?;
        let values: Vec<String> = con.lpop(key, NonZeroUsize::new(count)).await?;
        Ok(values)
    }

    pub async fn llen(&self, key: &str) -> Result<u64> {
        let mut con = self.client.get_multiplexed_async_connection().await?;
        let len: u64 = con.llen(key).await?;
        Ok(len)
    }

    /// Add a member to a set; re-adding an existing member is a no-op.
    pub async fn sadd(&self, key: &str, member: &str) -> Result<()> {
        let mut con = self.client.get_multiplexed_async_connection().await?;
        con.sadd::<_, _, ()>(key, member).await?;
        Ok(())
    }

    /// Atomically pop up to `count` members from a set, in no particular
    /// order.
    pub async fn spop_count(&self, key: &str, count: usize) -> Result<Vec<String>> {
        let mut con = self.client.get_multiplexed_async_connection().await?;
        let values: Vec<String> = redis::cmd("SPOP")
            .arg(key)
            .arg(count)
            .query_async(&mut con)
            .await?;
        Ok(values)
    }

    pub async fn scard(&self, key: &str) -> Result<u64> {
        let mut con = self.client.get_multiplexed_async_connection().await?;
        let len: u64 = con.scard(key).await?;
        Ok(len)
    }
}
