//! HTTP client for the EcoInsight API
//!
//! Used by the terminal chat to post messages to a running server.

use crate::chat::ChatResult;
use crate::config::ClientConfig;
use crate::error::{EcoInsightError, Result};

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Client for `POST /api/chat`
pub struct ChatClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

impl ChatClient {
    /// Create a client for the configured server
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    ///
    /// # Examples
    ///
    /// ```
    /// use ecoinsight::client::ChatClient;
    /// use ecoinsight::config::ClientConfig;
    ///
    /// let client = ChatClient::new(&ClientConfig {
    ///     server_url: "http://localhost:3000/".to_string(),
    ///     ..Default::default()
    /// }).unwrap();
    /// assert_eq!(client.base_url(), "http://localhost:3000");
    /// ```
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("ecoinsight/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| EcoInsightError::Client(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.server_url.trim_end_matches('/').to_string(),
        })
    }

    /// Server base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send a chat message and return the server's answer
    ///
    /// # Errors
    ///
    /// Returns `EcoInsightError::Client` when the server is unreachable,
    /// answers with an error status, or returns an unexpected body
    pub async fn send(&self, message: &str) -> Result<ChatResult> {
        let url = format!("{}/api/chat", self.base_url);
        tracing::debug!("Posting chat message to {}", url);

        let response = self
            .client
            .post(&url)
            .json(&ChatRequest { message })
            .send()
            .await
            .map_err(|e| EcoInsightError::Client(format!("Request to {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .json::<ErrorBody>()
                .await
                .map(|body| body.error)
                .unwrap_or_default();
            return Err(EcoInsightError::Client(format!(
                "Server returned error {}: {}",
                status, detail
            ))
            .into());
        }

        response
            .json::<ChatResult>()
            .await
            .map_err(|e| EcoInsightError::Client(format!("Invalid chat response: {}", e)).into())
    }
}
