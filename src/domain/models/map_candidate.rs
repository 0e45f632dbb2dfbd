// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};

/// A discovered URL produced by one map resolution, merged from the index,
/// the external search source and the sitemap. Transient: lives only for the
/// duration of the request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MapCandidate {
    pub url: String,
    pub title: String,
    pub description: String,
}

impl MapCandidate {
    pub fn bare(url: String) -> Self {
        Self {
            url,
            title: String::new(),
            description: String::new(),
        }
    }
}

/// Ordered outcome of one map resolution.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MapResult {
    pub links: Vec<MapCandidate>,
}
