// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::SearchSettings;
use crate::domain::models::search_result::SearchResult;
use crate::domain::search::engine::SearchSource;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// 外部搜索服务的 HTTP 客户端
///
/// 调用 JSON 搜索 API 获取分页结果。任何失败（网络、状态码、
/// 解析）都降级为空结果页，调用方无需处理错误。
pub struct WebSearchSource {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResponseEntry>,
}

#[derive(Debug, Deserialize)]
struct SearchResponseEntry {
    url: String,
    #[serde(default)]
    title: String,
    description: Option<String>,
}

impl WebSearchSource {
    pub fn new(settings: &SearchSettings) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout.unwrap_or(30)))
            .build()
            .unwrap_or_default();
        Self {
            client,
            endpoint: settings.endpoint.clone(),
            api_key: settings.api_key.clone(),
        }
    }

    async fn fetch_page(
        &self,
        query: &str,
        results_per_page: u32,
        page: u32,
    ) -> Result<Vec<SearchResult>, reqwest::Error> {
        let mut request = self.client.get(&self.endpoint).query(&[
            ("q", query),
            ("num", &results_per_page.to_string()),
            ("page", &page.to_string()),
        ]);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response: SearchResponse = request
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response
            .results
            .into_iter()
            .map(|entry| SearchResult {
                url: entry.url,
                title: entry.title,
                description: entry.description,
            })
            .collect())
    }
}

#[async_trait]
impl SearchSource for WebSearchSource {
    async fn search(
        &self,
        query: &str,
        results_per_page: u32,
        page: u32,
        token: &CancellationToken,
    ) -> Vec<SearchResult> {
        if token.is_cancelled() {
            return Vec::new();
        }

        tokio::select! {
            _ = token.cancelled() => {
                debug!("search for page {} cancelled", page);
                Vec::new()
            }
            result = self.fetch_page(query, results_per_page, page) => match result {
                Ok(results) => {
                    debug!("search page {} returned {} results", page, results.len());
                    results
                }
                Err(e) => {
                    warn!("search request for page {} failed: {}", page, e);
                    Vec::new()
                }
            },
        }
    }

    fn name(&self) -> &'static str {
        "websearch"
    }
}
