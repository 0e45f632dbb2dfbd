// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::canonical;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A previously-learned URL as stored by the durable index. Created by
/// write-behind queue drains, read-only to the query path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexRecord {
    pub id: Uuid,
    /// Original resolved URL, as fetched.
    pub url: String,
    pub status_code: i32,
    pub title: Option<String>,
    pub description: Option<String>,
    pub has_html: bool,
    pub error: Option<String>,
    pub screenshot_url: Option<String>,
    pub page_count: Option<i32>,
    pub created_at: DateTime<Utc>,
}

/// One level of a split hierarchy: the hash key under which a record is
/// findable at that level.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SplitHash {
    pub level: i16,
    pub hash: String,
}

/// A serialized index insert awaiting durable storage. Carries the hash
/// hierarchy pre-computed from the canonical URL so writes and reads agree
/// on identity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueuedIndexRecord {
    pub record: IndexRecord,
    pub url_hash: String,
    pub url_splits: Vec<SplitHash>,
    pub domain_splits: Vec<SplitHash>,
}

impl QueuedIndexRecord {
    /// Build the queued form of a record, deriving every hash from the
    /// canonical URL and hostname. Returns `None` when the record URL cannot
    /// be canonicalized.
    pub fn from_record(record: IndexRecord) -> Option<Self> {
        let canonical = canonical::canonicalize(&record.url)?;
        let url_hash = canonical::hash_key(&canonical);

        let url_splits = canonical::url_split_chain(&record.url)
            .iter()
            .enumerate()
            .map(|(level, split)| SplitHash {
                level: level as i16,
                hash: canonical::hash_key(split),
            })
            .collect();

        // Domain levels count from the hierarchy root: the bare registrable
        // domain is level 0 no matter how many subdomain labels a record's
        // host carries, so every record is reachable by a bare-domain read.
        let host = url::Url::parse(&canonical).ok()?.host_str()?.to_string();
        let domain_splits = canonical::domain_split_chain(&host)
            .iter()
            .rev()
            .enumerate()
            .map(|(level, split)| SplitHash {
                level: level as i16,
                hash: canonical::hash_key(split),
            })
            .collect();

        Some(Self {
            record,
            url_hash,
            url_splits,
            domain_splits,
        })
    }
}

/// A pending per-domain request-frequency bump.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueuedDomainFrequency {
    pub domain: String,
    pub domain_hash: String,
    pub hits: i64,
}

impl QueuedDomainFrequency {
    pub fn for_host(hostname: &str) -> Option<Self> {
        let domain = canonical::registrable_domain(hostname)?;
        let domain_hash = canonical::hash_key(&domain);
        Some(Self {
            domain,
            domain_hash,
            hits: 1,
        })
    }
}

/// A cross-encounter dedup marker, keyed by (bare-domain hash, signature).
/// Duplicate enqueues of the same pair are cheap no-ops at drain time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct QueuedOmceSignature {
    pub domain_hash: String,
    pub signature: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(url: &str) -> IndexRecord {
        IndexRecord {
            id: Uuid::new_v4(),
            url: url.to_string(),
            status_code: 200,
            title: Some("Title".to_string()),
            description: None,
            has_html: true,
            error: None,
            screenshot_url: None,
            page_count: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_queued_record_hashes_derive_from_canonical_form() {
        let a = QueuedIndexRecord::from_record(record("HTTP://WWW.Example.com/a/b/")).unwrap();
        let b = QueuedIndexRecord::from_record(record("https://example.com/a/b")).unwrap();
        assert_eq!(a.url_hash, b.url_hash);
        assert_eq!(a.url_splits, b.url_splits);
        assert_eq!(a.domain_splits, b.domain_splits);
    }

    #[test]
    fn test_queued_record_levels_are_contiguous() {
        let queued = QueuedIndexRecord::from_record(record("https://a.b.example.com/x/y")).unwrap();
        let url_levels: Vec<i16> = queued.url_splits.iter().map(|s| s.level).collect();
        assert_eq!(url_levels, vec![0, 1, 2]);
        let domain_levels: Vec<i16> = queued.domain_splits.iter().map(|s| s.level).collect();
        assert_eq!(domain_levels, vec![0, 1, 2]);
    }

    #[test]
    fn test_bare_domain_split_sits_at_level_zero_for_any_depth() {
        let bare_hash = canonical::hash_key("example.com");
        for url in [
            "https://example.com/pricing",
            "https://docs.example.com/guide",
            "https://a.b.example.com/x",
        ] {
            let queued = QueuedIndexRecord::from_record(record(url)).unwrap();
            let level_zero = queued
                .domain_splits
                .iter()
                .find(|s| s.level == 0)
                .unwrap();
            assert_eq!(level_zero.hash, bare_hash, "bare split of {url}");
        }
    }

    #[test]
    fn test_queued_record_rejects_unparsable_url() {
        assert!(QueuedIndexRecord::from_record(record("not a url")).is_none());
    }
}
