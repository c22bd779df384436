//! Gateways to external HTTP services
//!
//! Each gateway wraps exactly one outbound dependency:
//!
//! - [`GeminiGateway`] generates the assistant answer
//! - [`TavilyGateway`] fetches web search context
//!
//! Gateways never return errors to the orchestrator. Every failure becomes an
//! [`Unavailable`] reason so callers can tell a missing credential apart from
//! an upstream failure while still degrading the same way.

pub mod gemini;
pub mod tavily;

pub use gemini::GeminiGateway;
pub use tavily::TavilyGateway;

use async_trait::async_trait;
use thiserror::Error;

/// Why a gateway could not produce text
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Unavailable {
    /// The service has no credential configured
    #[error("no credential configured for {0}")]
    MissingCredential(&'static str),

    /// The request failed or the service answered with a non-success status
    #[error("upstream request failed: {0}")]
    Upstream(String),

    /// The service answered, but not in the expected shape
    #[error("unexpected response shape: {0}")]
    MalformedResponse(String),
}

/// Outcome of a gateway call
pub type GatewayResult = std::result::Result<String, Unavailable>;

/// Generates assistant answers for a question
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    /// Whether a credential is available for the service
    fn is_configured(&self) -> bool;

    /// Answer `question`, optionally grounded on search `context`
    async fn generate(&self, question: &str, context: Option<String>) -> GatewayResult;
}

/// Looks up web context for a query
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WebSearcher: Send + Sync {
    /// Whether a credential is available for the service
    fn is_configured(&self) -> bool;

    /// Search the web and format the results as markdown snippets
    async fn search(&self, query: &str) -> GatewayResult;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_display() {
        assert_eq!(
            Unavailable::MissingCredential("gemini").to_string(),
            "no credential configured for gemini"
        );
        assert_eq!(
            Unavailable::Upstream("status 503".to_string()).to_string(),
            "upstream request failed: status 503"
        );
        assert_eq!(
            Unavailable::MalformedResponse("no candidates".to_string()).to_string(),
            "unexpected response shape: no candidates"
        );
    }
}
