// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use robotstxt::DefaultMatcher;
use std::time::Duration;
use url::Url;

pub const MAP_USER_AGENT: &str = "maprs";

/// Fetches a site's robots.txt body. The map resolution applies it
/// best-effort: a fetch failure means proceeding without a policy.
#[async_trait]
pub trait RobotsPolicy: Send + Sync {
    async fn fetch_robots(&self, site_url: &str) -> Result<String>;
}

/// Whether a robots.txt body allows our agent to visit `url`. With no body
/// at hand everything is allowed.
pub fn robots_allows(robots_body: Option<&str>, url: &str) -> bool {
    let Some(body) = robots_body else {
        return true;
    };
    let mut matcher = DefaultMatcher::default();
    matcher.one_agent_allowed_by_robots(body, MAP_USER_AGENT, url)
}

/// HTTP robots.txt fetcher.
pub struct HttpRobotsFetcher {
    client: Client,
}

impl Default for HttpRobotsFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpRobotsFetcher {
    pub fn new() -> Self {
        let client = Client::builder()
            .user_agent(MAP_USER_AGENT)
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client }
    }
}

#[async_trait]
impl RobotsPolicy for HttpRobotsFetcher {
    async fn fetch_robots(&self, site_url: &str) -> Result<String> {
        let robots_url = Url::parse(site_url)?.join("/robots.txt")?;
        let response = self.client.get(robots_url).send().await?;
        let body = response.error_for_status()?.text().await?;
        Ok(body)
    }
}
