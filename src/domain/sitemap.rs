// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Options for one sitemap fetch.
#[derive(Debug, Clone)]
pub struct SitemapOptions {
    /// Stop collecting once this many URLs have been delivered.
    pub max_urls: usize,
    pub timeout: Duration,
}

impl Default for SitemapOptions {
    fn default() -> Self {
        Self {
            max_urls: 30_000,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Callback invoked once per discovered URL batch.
pub type SitemapSink<'a> = &'a (dyn Fn(Vec<String>) + Send + Sync);

/// Fetches a site's sitemap and streams discovered URLs to a sink. Returns
/// the number of URLs delivered. Parsing internals are out of scope here;
/// implementations must honor the timeout and the cancellation token.
#[async_trait]
pub trait SitemapFetcher: Send + Sync {
    async fn fetch_sitemap(
        &self,
        site_url: &str,
        options: &SitemapOptions,
        token: &CancellationToken,
        sink: SitemapSink<'_>,
    ) -> anyhow::Result<usize>;
}
