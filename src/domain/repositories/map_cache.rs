// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use std::time::Duration;

/// Shared cache used to reuse external search fetches across map requests.
/// Concurrent requests for the same site may race to populate the same
/// entry; last-writer-wins, the payload is immutable once computed.
#[async_trait]
pub trait MapCache: Send + Sync {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>>;

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> anyhow::Result<()>;
}
