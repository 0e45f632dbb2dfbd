// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use once_cell::sync::Lazy;
use regex::Regex;

static WORD_SPLIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\W+").unwrap());

/// Ranks candidate URLs against a free-text query by cosine similarity of
/// per-token frequency vectors. Ranking is a quality enhancement, never a
/// correctness requirement: with no usable query tokens the input order is
/// returned unmodified.
pub struct RelevanceScorer {
    tokens: Vec<String>,
    query_vector: Vec<f64>,
}

impl RelevanceScorer {
    pub fn new(query: &str) -> Self {
        let query_lower = query.to_lowercase();
        let mut tokens: Vec<String> = Vec::new();
        for token in WORD_SPLIT_RE.split(&query_lower) {
            if !token.is_empty() && !tokens.iter().any(|t| t == token) {
                tokens.push(token.to_string());
            }
        }

        let query_vector = Self::text_to_vector(&tokens, &query_lower);
        Self {
            tokens,
            query_vector,
        }
    }

    /// Per-token frequency vector: occurrences of each query token in the
    /// text, normalized by text length. Both sides are indexed by the same
    /// token set, so the vectors are comparable.
    fn text_to_vector(tokens: &[String], text: &str) -> Vec<f64> {
        if text.is_empty() {
            return vec![0.0; tokens.len()];
        }
        let len = text.len() as f64;
        tokens
            .iter()
            .map(|token| text.matches(token.as_str()).count() as f64 / len)
            .collect()
    }

    fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
        let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
        let mag_a: f64 = a.iter().map(|x| x * x).sum::<f64>().sqrt();
        let mag_b: f64 = b.iter().map(|x| x * x).sum::<f64>().sqrt();
        if mag_a == 0.0 || mag_b == 0.0 {
            return 0.0;
        }
        dot / (mag_a * mag_b)
    }

    pub fn score(&self, candidate: &str) -> f64 {
        let vector = Self::text_to_vector(&self.tokens, &candidate.to_lowercase());
        Self::cosine_similarity(&vector, &self.query_vector)
    }

    /// Stable descending sort of the candidates by score; ties keep their
    /// relative input order.
    pub fn rank(&self, urls: Vec<String>) -> Vec<String> {
        if self.tokens.is_empty() {
            return urls;
        }
        let mut scored: Vec<(f64, String)> =
            urls.into_iter().map(|u| (self.score(&u), u)).collect();
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.into_iter().map(|(_, u)| u).collect()
    }
}

pub fn rank_by_similarity(urls: Vec<String>, query: &str) -> Vec<String> {
    RelevanceScorer::new(query).rank(urls)
}
