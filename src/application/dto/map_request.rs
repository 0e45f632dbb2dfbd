// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Hard ceiling on the number of links one map resolution may return.
pub const MAX_MAP_LIMIT: usize = 30_000;

/// How the sitemap participates in a map resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SitemapMode {
    /// Resolve exclusively from the sitemap.
    Only,
    /// Merge the sitemap with the index and search source.
    #[default]
    Include,
    /// Ignore the sitemap entirely.
    Skip,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct MapRequestDto {
    #[validate(url)]
    pub url: String,

    /// Free-text query for relevance ranking; no query keeps pure source
    /// fusion order.
    pub search: Option<String>,

    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 30_000))]
    pub limit: usize,

    #[serde(default)]
    pub sitemap: SitemapMode,

    #[serde(default)]
    pub include_subdomains: bool,

    #[serde(default)]
    pub allow_external_links: bool,

    /// Keep only candidates under the request URL's path prefix.
    #[serde(default)]
    pub filter_by_path: bool,

    #[serde(default = "default_true")]
    pub use_index: bool,

    /// Enrich surviving URLs with stored title/description from the index.
    #[serde(default)]
    pub include_metadata: bool,

    /// Skip reading and writing the shared search cache for this request.
    #[serde(default)]
    pub zero_data_retention: bool,

    /// Overall deadline in milliseconds; when it fires the whole resolution
    /// fails with a timeout instead of returning a partial list.
    pub timeout_ms: Option<u64>,
}

fn default_limit() -> usize {
    5000
}

fn default_true() -> bool {
    true
}

impl MapRequestDto {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            search: None,
            limit: default_limit(),
            sitemap: SitemapMode::Include,
            include_subdomains: false,
            allow_external_links: false,
            filter_by_path: false,
            use_index: true,
            include_metadata: false,
            zero_data_retention: false,
            timeout_ms: None,
        }
    }

    /// Requested limit clamped to the service-wide ceiling.
    pub fn effective_limit(&self) -> usize {
        self.limit.min(MAX_MAP_LIMIT).max(1)
    }
}
