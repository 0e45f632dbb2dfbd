// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::sitemap::{SitemapFetcher, SitemapOptions, SitemapSink};
use anyhow::Context;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;

static LOC_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<loc>\s*([^<]+?)\s*</loc>").unwrap());

/// HTTP sitemap fetcher. Retrieves `/sitemap.xml`, follows one level of
/// sitemap-index nesting, and streams `<loc>` entries to the sink in batches.
pub struct HttpSitemapFetcher {
    client: Client,
}

impl HttpSitemapFetcher {
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();
        Self { client }
    }

    async fn fetch_body(&self, url: &str) -> anyhow::Result<String> {
        let body = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("sitemap request to {url} failed"))?
            .error_for_status()?
            .text()
            .await?;
        Ok(body)
    }
}

impl Default for HttpSitemapFetcher {
    fn default() -> Self {
        Self::new()
    }
}

fn extract_locs(body: &str) -> Vec<String> {
    LOC_RE
        .captures_iter(body)
        .map(|c| c[1].to_string())
        .collect()
}

fn is_sitemap_index(body: &str) -> bool {
    body.contains("<sitemapindex")
}

#[async_trait]
impl SitemapFetcher for HttpSitemapFetcher {
    async fn fetch_sitemap(
        &self,
        site_url: &str,
        options: &SitemapOptions,
        token: &CancellationToken,
        sink: SitemapSink<'_>,
    ) -> anyhow::Result<usize> {
        let base = Url::parse(site_url).context("invalid site URL")?;
        let sitemap_url = base.join("/sitemap.xml")?;

        let deadline = tokio::time::Instant::now() + options.timeout;
        let mut delivered = 0usize;

        let body = tokio::select! {
            _ = token.cancelled() => anyhow::bail!("sitemap fetch cancelled"),
            _ = tokio::time::sleep_until(deadline) => anyhow::bail!("sitemap fetch timed out"),
            body = self.fetch_body(sitemap_url.as_str()) => body?,
        };

        let mut pending = if is_sitemap_index(&body) {
            // One level of nesting only; deeper indexes are ignored.
            extract_locs(&body)
        } else {
            let urls = extract_locs(&body);
            delivered = urls.len().min(options.max_urls);
            sink(urls.into_iter().take(options.max_urls).collect());
            return Ok(delivered);
        };

        debug!("sitemap index at {} lists {} sitemaps", sitemap_url, pending.len());

        while let Some(child) = pending.pop() {
            if delivered >= options.max_urls || token.is_cancelled() {
                break;
            }
            let child_body = tokio::select! {
                _ = token.cancelled() => break,
                _ = tokio::time::sleep_until(deadline) => break,
                body = self.fetch_body(&child) => match body {
                    Ok(body) => body,
                    Err(e) => {
                        warn!("child sitemap {} failed: {}", child, e);
                        continue;
                    }
                },
            };
            if is_sitemap_index(&child_body) {
                continue;
            }
            let urls: Vec<String> = extract_locs(&child_body)
                .into_iter()
                .take(options.max_urls - delivered)
                .collect();
            delivered += urls.len();
            if !urls.is_empty() {
                sink(urls);
            }
        }

        Ok(delivered)
    }
}
