// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::search_result::SearchResult;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// External search source. One call fetches one page of results.
///
/// Failures never surface to the caller: an implementation returns an empty
/// page on any error, and must stop early when the cancellation token is
/// triggered.
#[async_trait]
pub trait SearchSource: Send + Sync {
    async fn search(
        &self,
        query: &str,
        results_per_page: u32,
        page: u32,
        token: &CancellationToken,
    ) -> Vec<SearchResult>;

    /// Name of the search source, for logging.
    fn name(&self) -> &'static str;
}
