// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::canonical;
use crate::domain::repositories::index_repository::IndexRepository;
use chrono::{Duration, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// Rows fetched per store round-trip.
const STORE_PAGE_SIZE: u64 = 1000;

/// Deployment-level capability of the durable index, resolved once at
/// startup. A deployment without an index, or one that only ingests writes,
/// serves no reads; every query short-circuits to empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndexCapability {
    pub enabled: bool,
    pub write_only: bool,
}

impl IndexCapability {
    pub fn serves_reads(&self) -> bool {
        self.enabled && !self.write_only
    }
}

/// Exit conditions of the fail-open pagination loop.
#[derive(Debug, PartialEq, Eq)]
enum PageOutcome {
    Continue,
    LimitReached,
    StoreExhausted,
    StoreError,
}

enum QueryLevel {
    Url,
    Domain,
}

/// Read path of the hierarchical index: resolves a URL or hostname to
/// previously-known URLs by walking the split hierarchy against the durable
/// store, with age filtering and convergent pagination.
pub struct IndexQueryService<R> {
    capability: IndexCapability,
    repo: Arc<R>,
}

impl<R: IndexRepository> IndexQueryService<R> {
    pub fn new(capability: IndexCapability, repo: Arc<R>) -> Self {
        Self { capability, repo }
    }

    pub fn serves_reads(&self) -> bool {
        self.capability.serves_reads()
    }

    /// Previously-known URLs under the most specific path-prefix split of
    /// `url`, newer than `max_age` ago.
    pub async fn query_at_url_level(
        &self,
        url: &str,
        limit: usize,
        max_age: Duration,
    ) -> Vec<String> {
        if !self.capability.serves_reads() {
            return Vec::new();
        }
        let chain = canonical::url_split_chain(url);
        let Some(most_specific) = chain.last() else {
            return Vec::new();
        };
        let level = (chain.len() - 1) as i16;
        let hash = canonical::hash_key(most_specific);
        self.paginate(QueryLevel::Url, level, &hash, limit, max_age)
            .await
    }

    /// Previously-known URLs for the whole site. The domain query always
    /// targets the bare registrable domain (the broadest entry of the split
    /// chain), which writers store at level 0 regardless of how many
    /// subdomain labels their host carries, so every subdomain's URLs are
    /// reachable from one lookup.
    pub async fn query_at_domain_level(
        &self,
        hostname: &str,
        limit: usize,
        max_age: Duration,
    ) -> Vec<String> {
        if !self.capability.serves_reads() {
            return Vec::new();
        }
        let chain = canonical::domain_split_chain(hostname);
        let Some(bare_domain) = chain.last() else {
            return Vec::new();
        };
        let hash = canonical::hash_key(bare_domain);
        self.paginate(QueryLevel::Domain, 0, &hash, limit, max_age)
            .await
    }

    /// Cross-encounter dedup signatures stored for the bare domain of
    /// `hostname`. Single non-paginated lookup; empty on error or absence.
    pub async fn query_omce_signatures(
        &self,
        hostname: &str,
        max_age: Duration,
    ) -> Vec<String> {
        if !self.capability.serves_reads() {
            return Vec::new();
        }
        let chain = canonical::domain_split_chain(hostname);
        let Some(bare_domain) = chain.last() else {
            return Vec::new();
        };
        let hash = canonical::hash_key(bare_domain);
        let newer_than = Utc::now() - max_age;
        match self.repo.query_omce_signatures(&hash, newer_than).await {
            Ok(signatures) => signatures,
            Err(e) => {
                warn!("OMCE signature lookup failed for {}: {}", hostname, e);
                Vec::new()
            }
        }
    }

    /// Fail-open pagination: accumulates de-duplicated URLs page by page and
    /// stops on the first terminal outcome. A store error returns what has
    /// been accumulated so far rather than raising.
    async fn paginate(
        &self,
        kind: QueryLevel,
        level: i16,
        hash: &str,
        limit: usize,
        max_age: Duration,
    ) -> Vec<String> {
        let newer_than = Utc::now() - max_age;
        let mut seen = HashSet::new();
        let mut urls = Vec::new();
        let mut range_start = 0u64;

        loop {
            let range_end = range_start + STORE_PAGE_SIZE - 1;
            let page = match kind {
                QueryLevel::Url => {
                    self.repo
                        .query_url_level(level, hash, newer_than, range_start, range_end)
                        .await
                }
                QueryLevel::Domain => {
                    self.repo
                        .query_domain_level(level, hash, newer_than, range_start, range_end)
                        .await
                }
            };

            let outcome = match page {
                Err(e) => {
                    warn!("index query failed at level {}: {}", level, e);
                    PageOutcome::StoreError
                }
                Ok(rows) => {
                    let fetched = rows.len();
                    for url in rows {
                        if seen.insert(url.clone()) {
                            urls.push(url);
                        }
                    }
                    if urls.len() >= limit {
                        PageOutcome::LimitReached
                    } else if (fetched as u64) < STORE_PAGE_SIZE {
                        PageOutcome::StoreExhausted
                    } else {
                        PageOutcome::Continue
                    }
                }
            };

            match outcome {
                PageOutcome::Continue => range_start += STORE_PAGE_SIZE,
                terminal => {
                    debug!(
                        "index query finished at level {} after {} urls ({:?})",
                        level,
                        urls.len(),
                        terminal
                    );
                    break;
                }
            }
        }

        urls.truncate(limit);
        urls
    }
}
