// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use once_cell::sync::Lazy;
use regex::Regex;
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};
use url::Url;

/// Well-known index documents that are equivalent to their parent directory.
static INDEX_DOCUMENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/(?:index|default)\.(?:html?|php|aspx?|jsp|shtml)$").unwrap());

/// Normalize a URL into the identity form used by the index.
///
/// Scheme is forced to https, the host is lowercased, default ports are
/// stripped, a leading "www." is removed, well-known index documents are
/// stripped from the path, the fragment is dropped and a trailing slash is
/// removed unless the path is the root. Idempotent: canonicalizing an
/// already-canonical URL is a no-op.
pub fn canonicalize(raw: &str) -> Option<String> {
    let mut url = Url::parse(raw.trim()).ok()?;

    match url.scheme() {
        "https" => {}
        "http" => url.set_scheme("https").ok()?,
        _ => return None,
    }
    if url.port() == Some(443) {
        url.set_port(None).ok()?;
    }

    let host = url.host_str()?.to_ascii_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host).to_string();
    if host.is_empty() {
        return None;
    }
    url.set_host(Some(&host)).ok()?;

    url.set_fragment(None);

    let path = INDEX_DOCUMENT_RE.replace(url.path(), "").into_owned();
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        url.set_path("/");
    } else {
        url.set_path(trimmed);
    }

    Some(url.to_string())
}

/// Tolerant normalization for map candidates coming from search results and
/// sitemaps. Accepts scheme-less input, only requires a plausible host, and
/// keeps the URL otherwise as-is apart from the fragment.
pub fn map_canonicalize(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    let mut url = Url::parse(&with_scheme).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    let host = url.host_str()?;
    if !host.contains('.') {
        return None;
    }
    url.set_fragment(None);

    Some(url.to_string())
}

/// Cumulative path-prefix hierarchy for a URL, from the site root (first)
/// down to the full URL (last). Every element is canonical and the sequence
/// is de-duplicated preserving first-seen order, so the final element always
/// equals `canonicalize(raw)`.
pub fn url_split_chain(raw: &str) -> Vec<String> {
    let Ok(base) = Url::parse(raw.trim()) else {
        return Vec::new();
    };

    let segments: Vec<String> = base
        .path_segments()
        .map(|s| {
            s.filter(|p| !p.is_empty())
                .map(|p| p.to_string())
                .collect()
        })
        .unwrap_or_default();

    let mut variants = Vec::with_capacity(segments.len() + 2);
    for depth in 0..=segments.len() {
        let mut prefix = base.clone();
        prefix.set_query(None);
        prefix.set_fragment(None);
        prefix.set_path(&format!("/{}", segments[..depth].join("/")));
        variants.push(prefix.to_string());
    }
    variants.push(raw.trim().to_string());

    let mut seen = HashSet::new();
    let mut chain = Vec::new();
    for variant in variants {
        if let Some(canonical) = canonicalize(&variant) {
            if seen.insert(canonical.clone()) {
                chain.push(canonical);
            }
        }
    }
    chain
}

/// Subdomain-chain hierarchy for a hostname, from the most specific
/// subdomain (first) down to the bare registrable domain (last), derived via
/// the public-suffix database. An unparsable hostname yields an empty chain;
/// a hostname whose only subdomain label is "www" collapses to the bare
/// domain.
pub fn domain_split_chain(hostname: &str) -> Vec<String> {
    let host = hostname
        .trim()
        .trim_end_matches('.')
        .to_ascii_lowercase();
    let Some(domain) = psl::domain_str(&host) else {
        return Vec::new();
    };
    let domain = domain.to_string();

    let labels: Vec<&str> = match host.strip_suffix(&domain) {
        Some(sub) => {
            let sub = sub.trim_end_matches('.');
            if sub.is_empty() {
                Vec::new()
            } else {
                sub.split('.').collect()
            }
        }
        None => Vec::new(),
    };

    if labels == ["www"] {
        return vec![domain];
    }

    let mut chain = Vec::with_capacity(labels.len() + 1);
    for start in 0..labels.len() {
        chain.push(format!("{}.{}", labels[start..].join("."), domain));
    }
    chain.push(domain);
    chain
}

/// Deterministic fixed-length digest of a canonical URL or hostname, used as
/// the lookup key at a given hierarchy level.
pub fn hash_key(canonical: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    hex::encode(hasher.finalize())
}

/// Public-suffix-aware base domain of a hostname.
pub fn registrable_domain(hostname: &str) -> Option<String> {
    psl::domain_str(&hostname.trim().trim_end_matches('.').to_ascii_lowercase())
        .map(|d| d.to_string())
}

pub fn host_without_www(hostname: &str) -> String {
    let host = hostname.to_ascii_lowercase();
    host.strip_prefix("www.").unwrap_or(&host).to_string()
}

/// Collapse candidates that differ only by scheme or "www." presence,
/// preferring https over http and then a bare host over "www.". The
/// surviving URL keeps the position of the first variant seen.
pub fn dedup_scheme_www(urls: Vec<String>) -> Vec<String> {
    let mut kept: Vec<String> = Vec::new();
    let mut best: HashMap<String, (usize, u8)> = HashMap::new();

    for raw in urls {
        let Ok(url) = Url::parse(&raw) else {
            continue;
        };
        let Some(host) = url.host_str() else {
            continue;
        };
        let bare_host = host_without_www(host);
        let key = format!(
            "{}{}{}",
            bare_host,
            url.path(),
            url.query().map(|q| format!("?{q}")).unwrap_or_default()
        );

        let https = url.scheme() == "https";
        let www = host.to_ascii_lowercase().starts_with("www.");
        let rank = ((https as u8) << 1) | (!www as u8);

        match best.get(&key) {
            Some(&(slot, existing)) if rank > existing => {
                kept[slot] = raw;
                best.insert(key, (slot, rank));
            }
            Some(_) => {}
            None => {
                best.insert(key, (kept.len(), rank));
                kept.push(raw);
            }
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonicalize_normalizes_equivalent_urls() {
        assert_eq!(
            canonicalize("HTTP://WWW.EX.COM:80/a/"),
            canonicalize("https://ex.com/a")
        );
        assert_eq!(
            canonicalize("https://example.com/docs/index.html"),
            Some("https://example.com/docs".to_string())
        );
        assert_eq!(
            canonicalize("https://example.com/page#section"),
            Some("https://example.com/page".to_string())
        );
    }

    #[test]
    fn test_canonicalize_is_idempotent() {
        let once = canonicalize("HTTP://WWW.Example.COM:80/a/b/").unwrap();
        assert_eq!(canonicalize(&once), Some(once.clone()));
    }

    #[test]
    fn test_canonicalize_keeps_root_slash() {
        assert_eq!(
            canonicalize("http://www.example.com"),
            Some("https://example.com/".to_string())
        );
    }

    #[test]
    fn test_canonicalize_rejects_non_http_schemes() {
        assert_eq!(canonicalize("ftp://example.com/file"), None);
        assert_eq!(canonicalize("mailto:user@example.com"), None);
    }

    #[test]
    fn test_url_split_chain_root_first_full_url_last() {
        let chain = url_split_chain("https://a.b.com/x/y");
        assert_eq!(chain.first().unwrap(), "https://a.b.com/");
        assert_eq!(
            chain.last().unwrap(),
            &canonicalize("https://a.b.com/x/y").unwrap()
        );
        assert_eq!(chain, vec![
            "https://a.b.com/",
            "https://a.b.com/x",
            "https://a.b.com/x/y",
        ]);
    }

    #[test]
    fn test_url_split_chain_deduplicates() {
        // Trailing slash collapses the full URL into the last prefix.
        let chain = url_split_chain("https://example.com/a/");
        assert_eq!(chain, vec!["https://example.com/", "https://example.com/a"]);
        let deduped: HashSet<_> = chain.iter().collect();
        assert_eq!(deduped.len(), chain.len());
    }

    #[test]
    fn test_domain_split_chain_www_collapses() {
        assert_eq!(domain_split_chain("www.example.com"), vec!["example.com"]);
    }

    #[test]
    fn test_domain_split_chain_most_specific_first() {
        assert_eq!(
            domain_split_chain("a.b.example.com"),
            vec!["a.b.example.com", "b.example.com", "example.com"]
        );
        assert_eq!(domain_split_chain("example.com"), vec!["example.com"]);
    }

    #[test]
    fn test_domain_split_chain_unparsable_is_empty() {
        assert!(domain_split_chain("not a hostname").is_empty());
    }

    #[test]
    fn test_hash_key_deterministic_and_collision_free() {
        assert_eq!(hash_key("https://example.com/"), hash_key("https://example.com/"));

        let mut seen = HashSet::new();
        for i in 0..10_000 {
            let key = hash_key(&format!("https://example.com/page/{i}"));
            assert!(seen.insert(key), "collision at input {i}");
        }
    }

    #[test]
    fn test_map_canonicalize_tolerates_missing_scheme() {
        assert_eq!(
            map_canonicalize("example.com/pricing"),
            Some("https://example.com/pricing".to_string())
        );
        assert_eq!(map_canonicalize("   "), None);
        assert_eq!(map_canonicalize("javascript:void(0)"), None);
    }

    #[test]
    fn test_dedup_scheme_www_prefers_https_and_bare_host() {
        let urls = vec![
            "http://www.example.com/a".to_string(),
            "https://example.com/a".to_string(),
            "https://example.com/b".to_string(),
            "http://example.com/b".to_string(),
        ];
        assert_eq!(
            dedup_scheme_www(urls),
            vec!["https://example.com/a", "https://example.com/b"]
        );
    }
}
