//! Client-side chat session state
//!
//! A session owns the conversation log and the chart currently shown on the
//! dashboard. Sends follow a small state machine (`Idle -> Sending -> Idle`);
//! a second send while one is in flight is rejected.

use super::{ChatMessage, ChatResult};
use crate::chart::{extract, normalize, NormalizedChart};
use crate::error::{EcoInsightError, Result};

/// First bot message of every session
pub const GREETING: &str = "Hello! Ask me about specific sectors, trends, or global policies.";

/// Bot message shown when the server cannot be reached
pub const CONNECTION_APOLOGY: &str =
    "Sorry, I'm having trouble connecting to the Knowledge Base right now.";

/// Whether a request is in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SendState {
    /// Ready to accept a message
    #[default]
    Idle,
    /// Waiting for the server's answer
    Sending,
}

/// What a completed turn changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnOutcome {
    /// The reply carried a chart and replaced the current one
    pub chart_updated: bool,
}

/// Conversation log plus the chart currently on display
#[derive(Debug, Clone)]
pub struct ChatSession {
    messages: Vec<ChatMessage>,
    chart: Option<NormalizedChart>,
    state: SendState,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSession {
    /// Start a session with the greeting message
    pub fn new() -> Self {
        Self {
            messages: vec![ChatMessage::bot(GREETING, None)],
            chart: None,
            state: SendState::Idle,
        }
    }

    /// Conversation log in insertion order
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Chart currently on display
    pub fn chart(&self) -> Option<&NormalizedChart> {
        self.chart.as_ref()
    }

    /// Current send state
    pub fn state(&self) -> SendState {
        self.state
    }

    /// Start sending a message
    ///
    /// Appends the user message and moves to `Sending`.
    ///
    /// # Returns
    ///
    /// The trimmed message to send, or `None` when the input is blank
    ///
    /// # Errors
    ///
    /// Returns `EcoInsightError::Session` while another send is in flight
    pub fn begin_send(&mut self, input: &str) -> Result<Option<String>> {
        if self.state == SendState::Sending {
            return Err(EcoInsightError::Session(
                "a message is already being sent".to_string(),
            )
            .into());
        }

        let message = input.trim();
        if message.is_empty() {
            return Ok(None);
        }

        self.messages.push(ChatMessage::user(message));
        self.state = SendState::Sending;
        Ok(Some(message.to_string()))
    }

    /// Finish the in-flight send with the server's reply
    ///
    /// A successful reply is run through the chart extractor; a decoded chart
    /// replaces the current one, otherwise the current chart is kept. A failed
    /// request appends [`CONNECTION_APOLOGY`]. The session returns to `Idle`
    /// either way.
    ///
    /// # Errors
    ///
    /// Returns `EcoInsightError::Session` when no send is in flight
    pub fn finish_send(&mut self, reply: Result<ChatResult>) -> Result<TurnOutcome> {
        if self.state != SendState::Sending {
            return Err(EcoInsightError::Session("no message is being sent".to_string()).into());
        }
        self.state = SendState::Idle;

        let reply = match reply {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!("Chat request failed: {:#}", e);
                self.messages.push(ChatMessage::bot(CONNECTION_APOLOGY, None));
                return Ok(TurnOutcome {
                    chart_updated: false,
                });
            }
        };

        let extraction = extract(&reply.answer);
        let chart_updated = match extraction.payload {
            Some(payload) => {
                self.chart = Some(normalize(&payload));
                true
            }
            None => false,
        };

        self.messages
            .push(ChatMessage::bot(extraction.text, Some(reply.source)));
        Ok(TurnOutcome { chart_updated })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::Role;

    fn reply(answer: &str, source: &str) -> Result<ChatResult> {
        Ok(ChatResult {
            answer: answer.to_string(),
            source: source.to_string(),
        })
    }

    const SNAPSHOT_ANSWER: &str = "Here you go:\n```json\n{\"response_text\":\"Transport leads.\",\"chart_type\":\"snapshot\",\"chart_data\":[{\"label\":\"Transport\",\"value\":4500,\"color\":\"#ef4444\"},{\"label\":\"Energy\",\"value\":8000,\"color\":\"#f59e0b\"}]}\n```";

    #[test]
    fn test_new_session_starts_with_greeting() {
        let session = ChatSession::new();
        assert_eq!(session.messages().len(), 1);
        assert_eq!(session.messages()[0].role, Role::Bot);
        assert_eq!(session.messages()[0].text, GREETING);
        assert_eq!(session.state(), SendState::Idle);
        assert!(session.chart().is_none());
    }

    #[test]
    fn test_blank_input_is_ignored() {
        let mut session = ChatSession::new();
        assert_eq!(session.begin_send("   ").unwrap(), None);
        assert_eq!(session.messages().len(), 1);
        assert_eq!(session.state(), SendState::Idle);
    }

    #[test]
    fn test_second_send_while_sending_is_rejected() {
        let mut session = ChatSession::new();
        assert_eq!(
            session.begin_send(" hello ").unwrap(),
            Some("hello".to_string())
        );
        assert_eq!(session.state(), SendState::Sending);

        let err = session.begin_send("again").unwrap_err();
        assert!(err.to_string().contains("already being sent"));
        assert_eq!(session.messages().len(), 2);
    }

    #[test]
    fn test_finish_without_send_is_rejected() {
        let mut session = ChatSession::new();
        assert!(session.finish_send(reply("x", "System")).is_err());
    }

    #[test]
    fn test_reply_with_chart_updates_dashboard() {
        let mut session = ChatSession::new();
        session.begin_send("Compare sectors").unwrap();
        let outcome = session
            .finish_send(reply(SNAPSHOT_ANSWER, "Live AI + Web Search"))
            .unwrap();

        assert!(outcome.chart_updated);
        assert_eq!(session.state(), SendState::Idle);

        let last = session.messages().last().unwrap();
        assert_eq!(last.text, "Transport leads.");
        assert_eq!(last.source.as_deref(), Some("Live AI + Web Search"));

        let chart = session.chart().unwrap();
        assert_eq!(chart.summary.top_sector.as_deref(), Some("Energy"));
        assert_eq!(chart.summary.total_co2, 12500.0);
    }

    #[test]
    fn test_reply_without_chart_keeps_previous_chart() {
        let mut session = ChatSession::new();
        session.begin_send("Compare sectors").unwrap();
        session
            .finish_send(reply(SNAPSHOT_ANSWER, "Live AI"))
            .unwrap();

        session.begin_send("Thanks").unwrap();
        let outcome = session
            .finish_send(reply("You're welcome.", "Live AI"))
            .unwrap();

        assert!(!outcome.chart_updated);
        assert!(session.chart().is_some());
        assert_eq!(session.messages().last().unwrap().text, "You're welcome.");
    }

    #[test]
    fn test_failed_request_appends_apology() {
        let mut session = ChatSession::new();
        session.begin_send("hello").unwrap();
        let outcome = session
            .finish_send(Err(anyhow::anyhow!("connection refused")))
            .unwrap();

        assert!(!outcome.chart_updated);
        assert_eq!(session.state(), SendState::Idle);
        let last = session.messages().last().unwrap();
        assert_eq!(last.text, CONNECTION_APOLOGY);
        assert_eq!(last.source, None);
    }
}
