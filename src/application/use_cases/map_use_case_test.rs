// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::*;
use crate::domain::models::index_record::{
    IndexRecord, QueuedDomainFrequency, QueuedIndexRecord, QueuedOmceSignature,
};
use crate::domain::repositories::index_repository::RepositoryError;
use crate::domain::services::index_query::IndexCapability;
use crate::domain::sitemap::SitemapSink;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use uuid::Uuid;

#[derive(Default)]
struct FakeIndexRepo {
    url_level: Vec<String>,
    domain_level: Vec<String>,
    records: HashMap<String, IndexRecord>,
    failing_record_hashes: Vec<String>,
}

#[async_trait]
impl IndexRepository for FakeIndexRepo {
    async fn query_url_level(
        &self,
        _level: i16,
        _url_hash: &str,
        _newer_than: DateTime<Utc>,
        _range_start: u64,
        _range_end: u64,
    ) -> Result<Vec<String>, RepositoryError> {
        Ok(self.url_level.clone())
    }

    async fn query_domain_level(
        &self,
        _level: i16,
        _domain_hash: &str,
        _newer_than: DateTime<Utc>,
        _range_start: u64,
        _range_end: u64,
    ) -> Result<Vec<String>, RepositoryError> {
        Ok(self.domain_level.clone())
    }

    async fn query_omce_signatures(
        &self,
        _domain_hash: &str,
        _newer_than: DateTime<Utc>,
    ) -> Result<Vec<String>, RepositoryError> {
        Ok(Vec::new())
    }

    async fn find_record(&self, url_hash: &str) -> Result<Option<IndexRecord>, RepositoryError> {
        if self.failing_record_hashes.iter().any(|h| h == url_hash) {
            return Err(RepositoryError::DatabaseError("lookup failed".into()));
        }
        Ok(self.records.get(url_hash).cloned())
    }

    async fn insert_records(&self, _batch: Vec<QueuedIndexRecord>) -> Result<(), RepositoryError> {
        Ok(())
    }

    async fn bump_domain_frequencies(
        &self,
        _batch: Vec<QueuedDomainFrequency>,
    ) -> Result<(), RepositoryError> {
        Ok(())
    }

    async fn upsert_omce_signatures(
        &self,
        _batch: Vec<QueuedOmceSignature>,
    ) -> Result<(), RepositoryError> {
        Ok(())
    }
}

#[derive(Default)]
struct FakeCache {
    entries: Mutex<HashMap<String, String>>,
    gets: AtomicUsize,
    sets: AtomicUsize,
}

#[async_trait]
impl MapCache for FakeCache {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str, _ttl: Duration) -> anyhow::Result<()> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[derive(Default)]
struct FakeSearch {
    results: Vec<SearchResult>,
    delay: Option<Duration>,
    called: AtomicBool,
}

#[async_trait]
impl SearchSource for FakeSearch {
    async fn search(
        &self,
        _query: &str,
        _results_per_page: u32,
        page: u32,
        token: &CancellationToken,
    ) -> Vec<SearchResult> {
        self.called.store(true, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = token.cancelled() => return Vec::new(),
            }
        }
        if page == 1 {
            self.results.clone()
        } else {
            Vec::new()
        }
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

#[derive(Default)]
struct FakeSitemap {
    urls: Vec<String>,
    called: AtomicBool,
}

#[async_trait]
impl SitemapFetcher for FakeSitemap {
    async fn fetch_sitemap(
        &self,
        _site_url: &str,
        options: &SitemapOptions,
        _token: &CancellationToken,
        sink: SitemapSink<'_>,
    ) -> anyhow::Result<usize> {
        self.called.store(true, Ordering::SeqCst);
        let batch: Vec<String> = self.urls.iter().take(options.max_urls).cloned().collect();
        let count = batch.len();
        sink(batch);
        Ok(count)
    }
}

#[derive(Default)]
struct FakeRobots {
    body: Option<String>,
}

#[async_trait]
impl RobotsPolicy for FakeRobots {
    async fn fetch_robots(&self, _site_url: &str) -> anyhow::Result<String> {
        match &self.body {
            Some(body) => Ok(body.clone()),
            None => Err(anyhow::anyhow!("robots unavailable")),
        }
    }
}

type TestUseCase = MapUseCase<FakeIndexRepo, FakeCache, FakeSearch, FakeSitemap, FakeRobots>;

struct Fixture {
    use_case: TestUseCase,
    cache: Arc<FakeCache>,
    search: Arc<FakeSearch>,
    sitemap: Arc<FakeSitemap>,
}

fn fixture(repo: FakeIndexRepo, search: FakeSearch, sitemap: FakeSitemap) -> Fixture {
    fixture_with_robots(repo, search, sitemap, FakeRobots::default())
}

fn fixture_with_robots(
    repo: FakeIndexRepo,
    search: FakeSearch,
    sitemap: FakeSitemap,
    robots: FakeRobots,
) -> Fixture {
    let repo = Arc::new(repo);
    let cache = Arc::new(FakeCache::default());
    let search = Arc::new(search);
    let sitemap = Arc::new(sitemap);
    let capability = IndexCapability {
        enabled: true,
        write_only: false,
    };
    let use_case = MapUseCase::new(
        IndexQueryService::new(capability, repo.clone()),
        repo,
        cache.clone(),
        search.clone(),
        sitemap.clone(),
        Arc::new(robots),
    );
    Fixture {
        use_case,
        cache,
        search,
        sitemap,
    }
}

fn urls(result: &MapResult) -> Vec<&str> {
    result.links.iter().map(|l| l.url.as_str()).collect()
}

#[tokio::test]
async fn test_end_to_end_fusion_ranks_query_relevant_links_first() {
    let f = fixture(
        FakeIndexRepo {
            url_level: vec!["https://example.com/pricing".to_string()],
            ..Default::default()
        },
        FakeSearch {
            results: vec![SearchResult::new(
                "https://example.com/plans".to_string(),
                "Plans".to_string(),
                None,
            )],
            ..Default::default()
        },
        FakeSitemap {
            urls: vec!["https://example.com/about".to_string()],
            ..Default::default()
        },
    );

    let mut dto = MapRequestDto::new("https://example.com");
    dto.search = Some("pricing".to_string());
    let result = f.use_case.resolve(dto).await.unwrap();

    let links = urls(&result);
    assert_eq!(
        links,
        vec![
            "https://example.com/pricing",
            "https://example.com/plans",
            "https://example.com/",
            "https://example.com/about",
        ]
    );
}

#[tokio::test]
async fn test_sitemap_only_never_calls_search() {
    let f = fixture(
        FakeIndexRepo {
            url_level: vec!["https://example.com/from-index".to_string()],
            ..Default::default()
        },
        FakeSearch::default(),
        FakeSitemap {
            urls: vec![
                "https://example.com/about".to_string(),
                "https://other.com/external".to_string(),
                "not a url ???".to_string(),
            ],
            ..Default::default()
        },
    );

    let mut dto = MapRequestDto::new("https://example.com");
    dto.sitemap = SitemapMode::Only;
    let result = f.use_case.resolve(dto).await.unwrap();

    assert!(!f.search.called.load(Ordering::SeqCst));
    assert_eq!(urls(&result), vec!["https://example.com/about"]);
}

#[tokio::test]
async fn test_sitemap_skip_mode_ignores_sitemap() {
    let f = fixture(
        FakeIndexRepo::default(),
        FakeSearch::default(),
        FakeSitemap {
            urls: vec!["https://example.com/about".to_string()],
            ..Default::default()
        },
    );

    let mut dto = MapRequestDto::new("https://example.com");
    dto.sitemap = SitemapMode::Skip;
    let result = f.use_case.resolve(dto).await.unwrap();

    assert!(!f.sitemap.called.load(Ordering::SeqCst));
    assert_eq!(urls(&result), vec!["https://example.com/"]);
}

#[tokio::test]
async fn test_timeout_fails_instead_of_returning_partial_results() {
    let f = fixture(
        FakeIndexRepo::default(),
        FakeSearch {
            delay: Some(Duration::from_millis(500)),
            ..Default::default()
        },
        FakeSitemap::default(),
    );

    let mut dto = MapRequestDto::new("https://example.com");
    dto.timeout_ms = Some(50);
    let result = f.use_case.resolve(dto).await;

    assert!(matches!(result, Err(MapError::Timeout)));
}

#[tokio::test]
async fn test_no_query_keeps_source_fusion_order() {
    let f = fixture(
        FakeIndexRepo {
            url_level: vec!["https://example.com/from-index".to_string()],
            ..Default::default()
        },
        FakeSearch {
            results: vec![SearchResult::new(
                "https://example.com/from-search".to_string(),
                "Search".to_string(),
                None,
            )],
            ..Default::default()
        },
        FakeSitemap {
            urls: vec!["https://example.com/from-sitemap".to_string()],
            ..Default::default()
        },
    );

    let dto = MapRequestDto::new("https://example.com");
    let result = f.use_case.resolve(dto).await.unwrap();

    // No ranking and no pinning: seed, index, sitemap, then search results.
    assert_eq!(
        urls(&result),
        vec![
            "https://example.com/",
            "https://example.com/from-index",
            "https://example.com/from-sitemap",
            "https://example.com/from-search",
        ]
    );
}

#[tokio::test]
async fn test_scheme_and_www_variants_collapse() {
    let f = fixture(
        FakeIndexRepo {
            url_level: vec!["https://example.com/pricing".to_string()],
            ..Default::default()
        },
        FakeSearch::default(),
        FakeSitemap {
            urls: vec![
                "http://www.example.com/pricing".to_string(),
                "https://www.example.com/pricing".to_string(),
            ],
            ..Default::default()
        },
    );

    let dto = MapRequestDto::new("https://example.com");
    let result = f.use_case.resolve(dto).await.unwrap();

    let pricing: Vec<&str> = urls(&result)
        .into_iter()
        .filter(|u| u.contains("pricing"))
        .collect();
    assert_eq!(pricing, vec!["https://example.com/pricing"]);
}

#[tokio::test]
async fn test_subdomains_excluded_unless_requested() {
    let repo = FakeIndexRepo {
        domain_level: vec!["https://docs.example.com/guide".to_string()],
        url_level: vec!["https://docs.example.com/guide".to_string()],
        ..Default::default()
    };
    let f = fixture(repo, FakeSearch::default(), FakeSitemap::default());

    let mut dto = MapRequestDto::new("https://example.com");
    dto.include_subdomains = false;
    let result = f.use_case.resolve(dto).await.unwrap();
    assert_eq!(urls(&result), vec!["https://example.com/"]);

    let repo = FakeIndexRepo {
        domain_level: vec!["https://docs.example.com/guide".to_string()],
        ..Default::default()
    };
    let f = fixture(repo, FakeSearch::default(), FakeSitemap::default());
    let mut dto = MapRequestDto::new("https://example.com");
    dto.include_subdomains = true;
    let result = f.use_case.resolve(dto).await.unwrap();
    assert!(urls(&result).contains(&"https://docs.example.com/guide"));
}

#[tokio::test]
async fn test_path_filter_scopes_to_request_path() {
    let f = fixture(
        FakeIndexRepo::default(),
        FakeSearch::default(),
        FakeSitemap {
            urls: vec![
                "https://example.com/docs/tutorial".to_string(),
                "https://example.com/blog/post".to_string(),
                "https://example.com/docsfoo".to_string(),
            ],
            ..Default::default()
        },
    );

    let mut dto = MapRequestDto::new("https://example.com/docs");
    dto.filter_by_path = true;
    let result = f.use_case.resolve(dto).await.unwrap();

    // "/docsfoo" shares the byte prefix but not the path segment.
    assert_eq!(
        urls(&result),
        vec!["https://example.com/docs", "https://example.com/docs/tutorial"]
    );
}

#[tokio::test]
async fn test_robots_policy_drops_disallowed_candidates() {
    let f = fixture_with_robots(
        FakeIndexRepo::default(),
        FakeSearch::default(),
        FakeSitemap {
            urls: vec![
                "https://example.com/private/area".to_string(),
                "https://example.com/public".to_string(),
            ],
            ..Default::default()
        },
        FakeRobots {
            body: Some("User-agent: *\nDisallow: /private".to_string()),
        },
    );

    let dto = MapRequestDto::new("https://example.com");
    let result = f.use_case.resolve(dto).await.unwrap();

    let links = urls(&result);
    assert!(links.contains(&"https://example.com/public"));
    assert!(!links.iter().any(|u| u.contains("private")));
}

#[tokio::test]
async fn test_search_cache_hit_skips_the_search_source() {
    let cached = serde_json::to_string(&vec![SearchResult::new(
        "https://example.com/cached".to_string(),
        "Cached".to_string(),
        None,
    )])
    .unwrap();

    let f = fixture(
        FakeIndexRepo::default(),
        FakeSearch::default(),
        FakeSitemap::default(),
    );
    f.cache
        .entries
        .lock()
        .unwrap()
        .insert("map-search:site:https://example.com/".to_string(), cached);

    let dto = MapRequestDto::new("https://example.com");
    let result = f.use_case.resolve(dto).await.unwrap();

    assert!(!f.search.called.load(Ordering::SeqCst));
    assert!(urls(&result).contains(&"https://example.com/cached"));
}

#[tokio::test]
async fn test_zero_data_retention_bypasses_the_cache() {
    let f = fixture(
        FakeIndexRepo::default(),
        FakeSearch {
            results: vec![SearchResult::new(
                "https://example.com/hit".to_string(),
                "Hit".to_string(),
                None,
            )],
            ..Default::default()
        },
        FakeSitemap::default(),
    );

    let mut dto = MapRequestDto::new("https://example.com");
    dto.zero_data_retention = true;
    f.use_case.resolve(dto).await.unwrap();

    assert_eq!(f.cache.gets.load(Ordering::SeqCst), 0);
    assert_eq!(f.cache.sets.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_metadata_enrichment_degrades_per_url() {
    let pricing_hash =
        canonical::hash_key(&canonical::canonicalize("https://example.com/pricing").unwrap());
    let about_hash =
        canonical::hash_key(&canonical::canonicalize("https://example.com/about").unwrap());

    let mut records = HashMap::new();
    records.insert(
        pricing_hash,
        IndexRecord {
            id: Uuid::new_v4(),
            url: "https://example.com/pricing".to_string(),
            status_code: 200,
            title: Some("Pricing".to_string()),
            description: Some("Our plans".to_string()),
            has_html: true,
            error: None,
            screenshot_url: None,
            page_count: None,
            created_at: Utc::now(),
        },
    );

    let f = fixture(
        FakeIndexRepo {
            records,
            failing_record_hashes: vec![about_hash],
            ..Default::default()
        },
        FakeSearch::default(),
        FakeSitemap {
            urls: vec![
                "https://example.com/pricing".to_string(),
                "https://example.com/about".to_string(),
            ],
            ..Default::default()
        },
    );

    let mut dto = MapRequestDto::new("https://example.com");
    dto.include_metadata = true;
    let result = f.use_case.resolve(dto).await.unwrap();

    let pricing = result
        .links
        .iter()
        .find(|l| l.url.ends_with("/pricing"))
        .unwrap();
    assert_eq!(pricing.title, "Pricing");
    assert_eq!(pricing.description, "Our plans");

    let about = result
        .links
        .iter()
        .find(|l| l.url.ends_with("/about"))
        .unwrap();
    assert!(about.title.is_empty());
    assert!(about.description.is_empty());
}

#[tokio::test]
async fn test_invalid_site_url_is_rejected() {
    let f = fixture(
        FakeIndexRepo::default(),
        FakeSearch::default(),
        FakeSitemap::default(),
    );
    let mut dto = MapRequestDto::new("https://example.com");
    dto.url = "https://".to_string();
    assert!(matches!(
        f.use_case.resolve(dto).await,
        Err(MapError::ValidationError(_)) | Err(MapError::InvalidUrl(_))
    ));
}
