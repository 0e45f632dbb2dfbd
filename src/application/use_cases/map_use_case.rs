// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::{
    application::dto::map_request::{MapRequestDto, SitemapMode},
    domain::{
        canonical,
        models::{
            map_candidate::{MapCandidate, MapResult},
            search_result::SearchResult,
        },
        repositories::{index_repository::IndexRepository, map_cache::MapCache},
        search::engine::SearchSource,
        services::{index_query::IndexQueryService, relevance_scorer::rank_by_similarity},
        sitemap::{SitemapFetcher, SitemapOptions},
    },
    utils::robots::{robots_allows, RobotsPolicy},
};
use futures::future::join_all;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;
use validator::Validate;

/// Most results the external search source is ever asked for.
const SEARCH_RESULT_CEILING: usize = 1000;
const SEARCH_RESULTS_PER_PAGE: u32 = 100;
/// Combined search pages are cached under the query string for two days.
const SEARCH_CACHE_TTL: Duration = Duration::from_secs(48 * 60 * 60);

/// Freshness window for whole-site (bare domain) index lookups.
const DOMAIN_LEVEL_MAX_AGE_DAYS: i64 = 14;
/// Freshness window for exact-URL index lookups.
const URL_LEVEL_MAX_AGE_DAYS: i64 = 2;

#[derive(Error, Debug)]
pub enum MapError {
    #[error("Validation failed: {0}")]
    ValidationError(String),

    #[error("Invalid site URL: {0}")]
    InvalidUrl(String),

    /// The only failure surfaced for an in-flight resolution: the overall
    /// deadline fired or the caller aborted. Every other problem degrades to
    /// a partial or empty contribution instead.
    #[error("Map resolution timed out")]
    Timeout,
}

/// Top-level map resolution: given a site URL and optional query, gathers
/// candidate URLs from the durable index, the external search source and the
/// site's sitemap, then ranks, filters, deduplicates and optionally enriches
/// them.
pub struct MapUseCase<R, C, S, F, P> {
    index_query: IndexQueryService<R>,
    repo: Arc<R>,
    cache: Arc<C>,
    search: Arc<S>,
    sitemap: Arc<F>,
    robots: Arc<P>,
}

impl<R, C, S, F, P> MapUseCase<R, C, S, F, P>
where
    R: IndexRepository + 'static,
    C: MapCache + 'static,
    S: SearchSource + 'static,
    F: SitemapFetcher + 'static,
    P: RobotsPolicy + 'static,
{
    pub fn new(
        index_query: IndexQueryService<R>,
        repo: Arc<R>,
        cache: Arc<C>,
        search: Arc<S>,
        sitemap: Arc<F>,
        robots: Arc<P>,
    ) -> Self {
        Self {
            index_query,
            repo,
            cache,
            search,
            sitemap,
            robots,
        }
    }

    /// Resolve with a fresh cancellation token, racing the optional overall
    /// timeout. A fired timeout cancels every in-flight sub-fetch and fails
    /// the whole request; partial results are never returned on timeout.
    pub async fn resolve(&self, dto: MapRequestDto) -> Result<MapResult, MapError> {
        let token = CancellationToken::new();
        self.resolve_with_token(dto, token).await
    }

    pub async fn resolve_with_token(
        &self,
        dto: MapRequestDto,
        token: CancellationToken,
    ) -> Result<MapResult, MapError> {
        dto.validate()
            .map_err(|e| MapError::ValidationError(e.to_string()))?;

        match dto.timeout_ms {
            Some(ms) => {
                let deadline = Duration::from_millis(ms);
                match tokio::time::timeout(deadline, self.resolve_inner(&dto, &token)).await {
                    Ok(result) => result,
                    Err(_) => {
                        token.cancel();
                        warn!("map resolution for {} timed out after {}ms", dto.url, ms);
                        Err(MapError::Timeout)
                    }
                }
            }
            None => self.resolve_inner(&dto, &token).await,
        }
    }

    async fn resolve_inner(
        &self,
        dto: &MapRequestDto,
        token: &CancellationToken,
    ) -> Result<MapResult, MapError> {
        let limit = dto.effective_limit();
        let site_url = canonical::map_canonicalize(&dto.url)
            .ok_or_else(|| MapError::InvalidUrl(dto.url.clone()))?;
        let site = Url::parse(&site_url).map_err(|e| MapError::InvalidUrl(e.to_string()))?;

        // Robots policy is best-effort: no policy means no filtering by it.
        let robots_body = match self.robots.fetch_robots(&site_url).await {
            Ok(body) => Some(body),
            Err(e) => {
                debug!("proceeding without robots policy for {}: {}", site_url, e);
                None
            }
        };

        let links = if dto.sitemap == SitemapMode::Only {
            let entries = self.fetch_sitemap_urls(&site_url, limit, token).await;
            if token.is_cancelled() {
                return Err(MapError::Timeout);
            }
            let canonicalized: Vec<String> = entries
                .iter()
                .filter_map(|entry| canonical::map_canonicalize(entry))
                .collect();
            // The limit was already applied to the sitemap fetch itself.
            self.filter_candidates(dto, &site, robots_body.as_deref(), canonicalized)
        } else {
            let candidates = self.gather_candidates(dto, &site_url, limit, token).await;
            if token.is_cancelled() {
                return Err(MapError::Timeout);
            }
            let canonicalized: Vec<String> = candidates
                .iter()
                .filter_map(|candidate| canonical::map_canonicalize(candidate))
                .collect();
            let mut filtered =
                self.filter_candidates(dto, &site, robots_body.as_deref(), canonicalized);
            filtered.truncate(limit);
            filtered
        };

        if token.is_cancelled() {
            return Err(MapError::Timeout);
        }

        let links = self.enrich(dto, links).await;
        Ok(MapResult { links })
    }

    /// Fan-out across the index, the external search source and the sitemap,
    /// fused in a fixed order: pinned top search result first (when a query
    /// was given), remaining search results, seed URL, index URLs, sitemap
    /// entries.
    async fn gather_candidates(
        &self,
        dto: &MapRequestDto,
        site_url: &str,
        limit: usize,
        token: &CancellationToken,
    ) -> Vec<String> {
        let mut candidates: Vec<String> = vec![site_url.to_string()];

        let site_host = Url::parse(site_url)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.to_string()))
            .unwrap_or_default();

        let search_fut = self.gather_search_results(dto, site_url, limit, token);
        let index_fut = async {
            if !dto.use_index {
                return (Vec::new(), Vec::new());
            }
            let domain_fut = async {
                if dto.include_subdomains {
                    self.index_query
                        .query_at_domain_level(
                            &site_host,
                            limit,
                            chrono::Duration::days(DOMAIN_LEVEL_MAX_AGE_DAYS),
                        )
                        .await
                } else {
                    Vec::new()
                }
            };
            let url_fut = self.index_query.query_at_url_level(
                site_url,
                limit,
                chrono::Duration::days(URL_LEVEL_MAX_AGE_DAYS),
            );
            tokio::join!(domain_fut, url_fut)
        };

        let (search_results, (domain_urls, url_urls)) = tokio::join!(search_fut, index_fut);
        candidates.extend(domain_urls);
        candidates.extend(url_urls);

        if dto.sitemap == SitemapMode::Include && !token.is_cancelled() {
            let entries = self.fetch_sitemap_urls(site_url, limit, token).await;
            candidates.extend(entries);
        }

        let mut search_links: Vec<String> = search_results
            .into_iter()
            .map(|result| result.url)
            .filter(|url| !url.is_empty())
            .take(SEARCH_RESULT_CEILING.min(limit))
            .collect();

        let mut merged = if dto.search.is_some() && !search_links.is_empty() {
            let top = search_links.remove(0);
            let mut merged = Vec::with_capacity(1 + search_links.len() + candidates.len());
            merged.push(top);
            merged.append(&mut search_links);
            merged.extend(candidates);
            merged
        } else {
            candidates.extend(search_links);
            candidates
        };

        if let Some(query) = &dto.search {
            merged = rank_by_similarity(merged, query);
        }
        merged
    }

    /// One combined search fetch per distinct query string, reused through
    /// the shared cache unless the request forbids data retention.
    async fn gather_search_results(
        &self,
        dto: &MapRequestDto,
        site_url: &str,
        limit: usize,
        token: &CancellationToken,
    ) -> Vec<SearchResult> {
        let query_string = match &dto.search {
            Some(query) if dto.allow_external_links => format!("{query} {site_url}"),
            Some(query) => format!("{query} site:{site_url}"),
            None => format!("site:{site_url}"),
        };
        let cache_key = format!("map-search:{query_string}");

        if !dto.zero_data_retention {
            match self.cache.get(&cache_key).await {
                Ok(Some(cached)) => {
                    if let Ok(results) = serde_json::from_str::<Vec<SearchResult>>(&cached) {
                        debug!("search cache hit for {}", query_string);
                        return results;
                    }
                }
                Ok(None) => {}
                Err(e) => warn!("search cache read failed: {}", e),
            }
        }

        let wanted = SEARCH_RESULT_CEILING.min(limit);
        let pages = wanted.div_ceil(SEARCH_RESULTS_PER_PAGE as usize).max(1);
        let fetches = (0..pages).map(|page| {
            self.search
                .search(&query_string, SEARCH_RESULTS_PER_PAGE, page as u32 + 1, token)
        });
        let results: Vec<SearchResult> = join_all(fetches).await.into_iter().flatten().collect();

        if !dto.zero_data_retention && !results.is_empty() && !token.is_cancelled() {
            if let Ok(payload) = serde_json::to_string(&results) {
                if let Err(e) = self.cache.set(&cache_key, &payload, SEARCH_CACHE_TTL).await {
                    warn!("search cache write failed: {}", e);
                }
            }
        }
        results
    }

    /// Best-effort sitemap collection; a failed fetch contributes nothing.
    async fn fetch_sitemap_urls(
        &self,
        site_url: &str,
        limit: usize,
        token: &CancellationToken,
    ) -> Vec<String> {
        let collected = Mutex::new(Vec::new());
        let options = SitemapOptions {
            max_urls: limit,
            ..SitemapOptions::default()
        };
        let sink = |batch: Vec<String>| {
            if let Ok(mut urls) = collected.lock() {
                urls.extend(batch);
            }
        };

        match self
            .sitemap
            .fetch_sitemap(site_url, &options, token, &sink)
            .await
        {
            Ok(count) => debug!("sitemap for {} yielded {} urls", site_url, count),
            Err(e) => debug!("proceeding without sitemap for {}: {}", site_url, e),
        }
        collected.into_inner().unwrap_or_default()
    }

    /// Domain, subdomain, path and robots filters followed by the
    /// scheme/"www." dedup. Candidates reaching this point are already
    /// map-canonicalized.
    fn filter_candidates(
        &self,
        dto: &MapRequestDto,
        site: &Url,
        robots_body: Option<&str>,
        candidates: Vec<String>,
    ) -> Vec<String> {
        let site_host = site.host_str().unwrap_or_default();
        let site_bare_host = canonical::host_without_www(site_host);
        let site_domain = canonical::registrable_domain(site_host);
        let site_path = site.path().to_string();
        let path_scoped = dto.filter_by_path
            && !dto.allow_external_links
            && site_path != "/"
            && site_path.len() > 1;
        // Prefix matching is segment-aware: "/docs" scopes "/docs/x" but not
        // "/docsfoo".
        let site_path_prefix = format!("{site_path}/");

        let kept = candidates
            .into_iter()
            .filter(|candidate| {
                let Ok(url) = Url::parse(candidate) else {
                    return false;
                };
                let Some(host) = url.host_str() else {
                    return false;
                };

                if !dto.allow_external_links {
                    if canonical::registrable_domain(host) != site_domain {
                        return false;
                    }
                    if !dto.include_subdomains
                        && canonical::host_without_www(host) != site_bare_host
                    {
                        return false;
                    }
                }
                if path_scoped
                    && url.path() != site_path
                    && !url.path().starts_with(&site_path_prefix)
                {
                    return false;
                }
                robots_allows(robots_body, candidate)
            })
            .collect();

        canonical::dedup_scheme_www(kept)
    }

    /// Per-URL metadata lookups, fanned out concurrently. A failed lookup
    /// degrades that one URL to empty title/description.
    async fn enrich(&self, dto: &MapRequestDto, links: Vec<String>) -> Vec<MapCandidate> {
        if !(dto.include_metadata && dto.use_index && self.index_query.serves_reads()) {
            return links.into_iter().map(MapCandidate::bare).collect();
        }

        let lookups = links.into_iter().map(|link| async {
            let hash = canonical::canonicalize(&link).map(|c| canonical::hash_key(&c));
            let record = match hash {
                Some(hash) => self.repo.find_record(&hash).await.unwrap_or_else(|e| {
                    warn!("metadata lookup failed for {}: {}", link, e);
                    None
                }),
                None => None,
            };
            match record {
                Some(record) => MapCandidate {
                    url: link,
                    title: record.title.unwrap_or_default(),
                    description: record.description.unwrap_or_default(),
                },
                None => MapCandidate::bare(link),
            }
        });
        join_all(lookups).await
    }
}

#[cfg(test)]
#[path = "map_use_case_test.rs"]
mod tests;
