//! Chat orchestration
//!
//! Answers one chat message by searching the web for context and asking the
//! generative AI service. Whenever the live path is unavailable, a canned
//! answer is returned after a fixed delay. No error ever leaves
//! [`ChatOrchestrator::handle`].

use super::ChatResult;
use crate::config::Config;
use crate::error::Result;
use crate::gateways::{AnswerGenerator, GeminiGateway, TavilyGateway, WebSearcher};

use std::sync::Arc;
use std::time::Duration;

/// Answer returned when the live path is unavailable
pub const DEFAULT_ANSWER: &str = "I can help you visualize and understand emissions data. Try asking about specific sectors like 'Transport' or 'Energy', or ask for global trends.";

/// Source label for answers generated without search context
pub const SOURCE_LIVE_AI: &str = "Live AI";

/// Source label for answers generated with search context
pub const SOURCE_LIVE_AI_WITH_SEARCH: &str = "Live AI + Web Search";

/// Source label for the canned answer
pub const SOURCE_SYSTEM: &str = "System";

/// Sequences the search and answer gateways for a single message
pub struct ChatOrchestrator {
    generator: Arc<dyn AnswerGenerator>,
    searcher: Arc<dyn WebSearcher>,
    fallback_delay: Duration,
}

impl ChatOrchestrator {
    /// Create an orchestrator from explicit collaborators
    pub fn new(
        generator: Arc<dyn AnswerGenerator>,
        searcher: Arc<dyn WebSearcher>,
        fallback_delay: Duration,
    ) -> Self {
        Self {
            generator,
            searcher,
            fallback_delay,
        }
    }

    /// Build the Gemini and Tavily gateways from configuration
    ///
    /// # Errors
    ///
    /// Returns error if an HTTP client cannot be created
    pub fn from_config(config: &Config) -> Result<Self> {
        let generator = GeminiGateway::new(config.gemini.clone())?;
        let searcher = TavilyGateway::new(config.search.clone())?;
        Ok(Self::new(
            Arc::new(generator),
            Arc::new(searcher),
            Duration::from_millis(config.chat.fallback_delay_ms),
        ))
    }

    /// Answer a chat message
    ///
    /// The live path runs only when both services are configured: search
    /// first, then generation with the search text (if any) as context.
    /// Anything else ends in the canned answer labelled `System`.
    pub async fn handle(&self, message: &str) -> ChatResult {
        if self.generator.is_configured() && self.searcher.is_configured() {
            let search = self.searcher.search(message).await;
            let searched = search.is_ok();

            match self.generator.generate(message, search.ok()).await {
                Ok(answer) => {
                    let source = if searched {
                        SOURCE_LIVE_AI_WITH_SEARCH
                    } else {
                        SOURCE_LIVE_AI
                    };
                    tracing::info!("Answered with live AI: source={}", source);
                    return ChatResult {
                        answer,
                        source: source.to_string(),
                    };
                }
                Err(reason) => {
                    tracing::warn!("Falling back to default answer: {}", reason);
                }
            }
        } else {
            tracing::warn!(
                "Falling back to default answer: ai_configured={}, search_configured={}",
                self.generator.is_configured(),
                self.searcher.is_configured()
            );
        }

        tokio::time::sleep(self.fallback_delay).await;

        ChatResult {
            answer: DEFAULT_ANSWER.to_string(),
            source: SOURCE_SYSTEM.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateways::{MockAnswerGenerator, MockWebSearcher, Unavailable};
    use std::time::Instant;

    fn orchestrator(
        generator: MockAnswerGenerator,
        searcher: MockWebSearcher,
    ) -> ChatOrchestrator {
        ChatOrchestrator::new(Arc::new(generator), Arc::new(searcher), Duration::ZERO)
    }

    fn configured_searcher() -> MockWebSearcher {
        let mut searcher = MockWebSearcher::new();
        searcher.expect_is_configured().return_const(true);
        searcher
    }

    fn configured_generator() -> MockAnswerGenerator {
        let mut generator = MockAnswerGenerator::new();
        generator.expect_is_configured().return_const(true);
        generator
    }

    #[tokio::test]
    async fn test_live_answer_with_search_context() {
        let mut searcher = configured_searcher();
        searcher
            .expect_search()
            .withf(|query| query.to_string() == "Compare sectors")
            .times(1)
            .returning(|_| Ok("[IEA](https://iea.org): energy".to_string()));

        let mut generator = configured_generator();
        generator
            .expect_generate()
            .withf(|question, context| {
                question.to_string() == "Compare sectors"
                    && context.as_deref() == Some("[IEA](https://iea.org): energy")
            })
            .times(1)
            .returning(|_, _| Ok("Energy leads.".to_string()));

        let result = orchestrator(generator, searcher)
            .handle("Compare sectors")
            .await;
        assert_eq!(
            result,
            ChatResult {
                answer: "Energy leads.".to_string(),
                source: "Live AI + Web Search".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_live_answer_when_search_fails() {
        let mut searcher = configured_searcher();
        searcher
            .expect_search()
            .times(1)
            .returning(|_| Err(Unavailable::Upstream("status 500".to_string())));

        let mut generator = configured_generator();
        generator
            .expect_generate()
            .withf(|_, context| context.is_none())
            .times(1)
            .returning(|_, _| Ok("Answer without context.".to_string()));

        let result = orchestrator(generator, searcher).handle("Trends?").await;
        assert_eq!(result.source, "Live AI");
        assert_eq!(result.answer, "Answer without context.");
    }

    #[tokio::test]
    async fn test_generation_failure_falls_back() {
        let mut searcher = configured_searcher();
        searcher
            .expect_search()
            .returning(|_| Ok("context".to_string()));

        let mut generator = configured_generator();
        generator.expect_generate().times(1).returning(|_, _| {
            Err(Unavailable::MalformedResponse("no candidates".to_string()))
        });

        let result = orchestrator(generator, searcher).handle("Trends?").await;
        assert_eq!(result.answer, DEFAULT_ANSWER);
        assert_eq!(result.source, "System");
    }

    #[tokio::test]
    async fn test_missing_search_credential_skips_both_calls() {
        let mut searcher = MockWebSearcher::new();
        searcher.expect_is_configured().return_const(false);
        searcher.expect_search().never();

        let mut generator = configured_generator();
        generator.expect_generate().never();

        let result = orchestrator(generator, searcher).handle("Trends?").await;
        assert_eq!(result.answer, DEFAULT_ANSWER);
        assert_eq!(result.source, "System");
    }

    #[tokio::test]
    async fn test_fallback_waits_for_delay() {
        let mut searcher = MockWebSearcher::new();
        searcher.expect_is_configured().return_const(false);
        let mut generator = MockAnswerGenerator::new();
        generator.expect_is_configured().return_const(false);

        let orchestrator = ChatOrchestrator::new(
            Arc::new(generator),
            Arc::new(searcher),
            Duration::from_millis(30),
        );

        let started = Instant::now();
        let result = orchestrator.handle("hello").await;
        assert!(started.elapsed() >= Duration::from_millis(30));
        assert_eq!(result.source, "System");
    }

    #[tokio::test]
    async fn test_from_config_without_credentials_uses_fallback() {
        let mut config = Config::default();
        config.chat.fallback_delay_ms = 0;

        let orchestrator = ChatOrchestrator::from_config(&config).unwrap();
        let result = orchestrator.handle("What about transport?").await;
        assert_eq!(result.answer, DEFAULT_ANSWER);
        assert_eq!(result.source, "System");
    }
}
