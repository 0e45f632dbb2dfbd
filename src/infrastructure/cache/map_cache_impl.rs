// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::repositories::map_cache::MapCache;
use crate::infrastructure::cache::redis_client::RedisClient;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Redis-backed shared cache for external search fetches.
pub struct RedisMapCache {
    redis: Arc<RedisClient>,
}

impl RedisMapCache {
    pub fn new(redis: Arc<RedisClient>) -> Self {
        Self { redis }
    }
}

#[async_trait]
impl MapCache for RedisMapCache {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        self.redis.get(key).await
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> anyhow::Result<()> {
        self.redis.set_ex(key, value, ttl.as_secs()).await
    }
}
