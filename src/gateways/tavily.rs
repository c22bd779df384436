//! Tavily web search
//!
//! Fetches a handful of search results and formats them as markdown links
//! followed by their content snippet, ready to be pasted into the prompt.

use super::{GatewayResult, Unavailable, WebSearcher};
use crate::config::SearchConfig;
use crate::error::{EcoInsightError, Result};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const SERVICE: &str = "tavily";

/// Tavily search gateway
pub struct TavilyGateway {
    client: Client,
    config: SearchConfig,
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    search_depth: &'a str,
    max_results: usize,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: String,
}

impl TavilyGateway {
    /// Create a new Tavily gateway
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn new(config: SearchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("ecoinsight/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| EcoInsightError::Config(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!(
            "Initialized Tavily gateway: max_results={}, configured={}",
            config.max_results,
            config.api_key.is_some()
        );

        Ok(Self { client, config })
    }

    async fn request(&self, api_key: &str, query: &str) -> GatewayResult {
        let url = format!("{}/search", self.config.api_base.trim_end_matches('/'));
        let body = SearchRequest {
            api_key,
            query,
            search_depth: &self.config.search_depth,
            max_results: self.config.max_results,
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| Unavailable::Upstream(format!("Tavily request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(Unavailable::Upstream(format!(
                "Tavily returned error {}: {}",
                status, error_text
            )));
        }

        let parsed: SearchResponse = response.json().await.map_err(|e| {
            Unavailable::MalformedResponse(format!("Failed to parse Tavily response: {}", e))
        })?;

        if parsed.results.is_empty() {
            return Err(Unavailable::MalformedResponse(
                "Tavily returned no results".to_string(),
            ));
        }

        Ok(format_results(&parsed.results, self.config.max_results))
    }
}

fn format_results(hits: &[SearchHit], limit: usize) -> String {
    hits.iter()
        .take(limit)
        .map(|hit| format!("[{}]({}): {}", hit.title, hit.url, hit.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[async_trait]
impl WebSearcher for TavilyGateway {
    fn is_configured(&self) -> bool {
        self.config.api_key.is_some()
    }

    async fn search(&self, query: &str) -> GatewayResult {
        let Some(api_key) = self.config.api_key.as_deref() else {
            tracing::warn!("Tavily API key missing, skipping web search");
            return Err(Unavailable::MissingCredential(SERVICE));
        };

        tracing::debug!("Searching the web: {}", query);
        let result = self.request(api_key, query).await;
        if let Err(reason) = &result {
            tracing::warn!("Web search unavailable: {}", reason);
        }
        result
    }
}
