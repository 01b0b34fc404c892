//! Vertex AI Reasoning Engine REST client

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use super::pagination::{collect_pages, Page, PageLimits, PageSource, Paged};
use crate::tools::TokenProvider;

/// A deployed agent as reported by the Reasoning Engine API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReasoningEngine {
    /// Full resource name `projects/../locations/../reasoningEngines/ID`
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub create_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub update_time: Option<DateTime<Utc>>,
}

impl ReasoningEngine {
    /// Trailing ID segment of the resource name
    pub fn id(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(default)]
    reasoning_engines: Vec<ReasoningEngine>,
    #[serde(default)]
    next_page_token: Option<String>,
}

pub struct ReasoningEngineClient {
    http_client: Client,
    base_url: String,
    parent: String,
    tokens: TokenProvider,
}

impl ReasoningEngineClient {
    /// Client for the regional endpoint of `location`
    pub fn new(project_id: &str, location: &str, tokens: TokenProvider) -> Result<Self> {
        let base_url = format!("https://{}-aiplatform.googleapis.com/v1", location);
        Self::with_base_url(&base_url, project_id, location, tokens)
    }

    pub fn with_base_url(
        base_url: &str,
        project_id: &str,
        location: &str,
        tokens: TokenProvider,
    ) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            parent: format!("projects/{}/locations/{}", project_id, location),
            tokens,
        })
    }

    /// List every reasoning engine under the project and location
    pub async fn list(&self, limits: PageLimits) -> Result<Paged<ReasoningEngine>> {
        let paged = collect_pages(self, limits).await?;
        info!(
            count = paged.items.len(),
            pages = paged.pages_fetched,
            truncated = paged.truncated,
            "Listed reasoning engines"
        );
        Ok(paged)
    }
}

#[async_trait]
impl PageSource for ReasoningEngineClient {
    type Item = ReasoningEngine;

    async fn fetch_page(&self, page_token: Option<&str>, page_size: u32) -> Result<Page<ReasoningEngine>> {
        let token = self.tokens.access_token().await?;
        let url = format!("{}/{}/reasoningEngines", self.base_url, self.parent);

        let mut request = self
            .http_client
            .get(&url)
            .bearer_auth(&token)
            .query(&[("pageSize", page_size.to_string())]);
        if let Some(page_token) = page_token {
            request = request.query(&[("pageToken", page_token)]);
        }

        debug!(url = %url, "Listing reasoning engines");
        let response = request
            .send()
            .await
            .context("Failed to list reasoning engines")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            bail!("Reasoning Engine API error {}: {}", status, body);
        }

        let data: ListResponse = response
            .json()
            .await
            .context("Failed to parse reasoning engine list")?;

        Ok(Page {
            items: data.reasoning_engines,
            next_page_token: data.next_page_token,
        })
    }
}
