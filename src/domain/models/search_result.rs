// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};

/// One hit from the external search source.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    pub url: String,
    pub title: String,
    pub description: Option<String>,
}

impl SearchResult {
    pub fn new(url: String, title: String, description: Option<String>) -> Self {
        Self {
            url,
            title,
            description,
        }
    }
}
