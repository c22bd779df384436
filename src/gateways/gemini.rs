//! Gemini answer generation
//!
//! Calls the Gemini `generateContent` endpoint with the analyst prompt and
//! returns the text of the first candidate.

use super::{AnswerGenerator, GatewayResult, Unavailable};
use crate::config::GeminiConfig;
use crate::error::{EcoInsightError, Result};
use crate::prompts::build_analyst_prompt;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const SERVICE: &str = "gemini";

/// Gemini API gateway
///
/// # Examples
///
/// ```
/// use ecoinsight::config::GeminiConfig;
/// use ecoinsight::gateways::{AnswerGenerator, GeminiGateway};
///
/// let gateway = GeminiGateway::new(GeminiConfig::default()).unwrap();
/// assert!(!gateway.is_configured());
/// ```
pub struct GeminiGateway {
    client: Client,
    config: GeminiConfig,
}

/// Request body for `generateContent`
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

/// Response body from `generateContent`
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GeminiGateway {
    /// Create a new Gemini gateway
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("ecoinsight/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| EcoInsightError::Config(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!(
            "Initialized Gemini gateway: model={}, configured={}",
            config.model,
            config.api_key.is_some()
        );

        Ok(Self { client, config })
    }

    /// The configured model name
    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.api_base.trim_end_matches('/'),
            self.config.model
        )
    }

    async fn request(&self, api_key: &str, prompt: &str) -> GatewayResult {
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await
            .map_err(|e| Unavailable::Upstream(format!("Gemini request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(Unavailable::Upstream(format!(
                "Gemini returned error {}: {}",
                status, error_text
            )));
        }

        let parsed: GenerateResponse = response.json().await.map_err(|e| {
            Unavailable::MalformedResponse(format!("Failed to parse Gemini response: {}", e))
        })?;

        first_candidate_text(parsed).ok_or_else(|| {
            Unavailable::MalformedResponse("Gemini response has no candidate text".to_string())
        })
    }
}

fn first_candidate_text(response: GenerateResponse) -> Option<String> {
    response
        .candidates
        .into_iter()
        .next()?
        .content?
        .parts
        .into_iter()
        .next()?
        .text
}

#[async_trait]
impl AnswerGenerator for GeminiGateway {
    fn is_configured(&self) -> bool {
        self.config.api_key.is_some()
    }

    async fn generate(&self, question: &str, context: Option<String>) -> GatewayResult {
        let Some(api_key) = self.config.api_key.as_deref() else {
            tracing::warn!("Gemini API key missing, skipping answer generation");
            return Err(Unavailable::MissingCredential(SERVICE));
        };

        let prompt = build_analyst_prompt(question, context.as_deref());
        tracing::debug!(
            "Sending Gemini request: model={}, prompt_chars={}",
            self.config.model,
            prompt.len()
        );

        let result = self.request(api_key, &prompt).await;
        match &result {
            Ok(text) => tracing::debug!("Gemini answered with {} chars", text.len()),
            Err(reason) => tracing::warn!("Gemini unavailable: {}", reason),
        }
        result
    }
}
