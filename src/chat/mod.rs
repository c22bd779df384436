//! Chat domain types, orchestration and session state
//!
//! - [`ChatOrchestrator`] answers one message on the server side
//! - [`ChatSession`] holds the client-side conversation and current chart

pub mod orchestrator;
pub mod session;

pub use orchestrator::{ChatOrchestrator, DEFAULT_ANSWER};
pub use session::{ChatSession, SendState, TurnOutcome, CONNECTION_APOLOGY, GREETING};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The person asking questions
    User,
    /// The assistant
    Bot,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Bot => write!(f, "bot"),
        }
    }
}

/// One entry of the conversation log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Who wrote the message
    pub role: Role,
    /// Display text
    pub text: String,
    /// Provenance label for bot answers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// When the message was appended
    pub at: DateTime<Utc>,
}

impl ChatMessage {
    /// A message typed by the user
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            source: None,
            at: Utc::now(),
        }
    }

    /// A bot message, optionally labelled with where the answer came from
    pub fn bot(text: impl Into<String>, source: Option<String>) -> Self {
        Self {
            role: Role::Bot,
            text: text.into(),
            source,
            at: Utc::now(),
        }
    }
}

/// Answer returned by `POST /api/chat`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResult {
    /// Raw assistant text, possibly with an embedded chart payload
    pub answer: String,
    /// Human-readable provenance label
    pub source: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_value(Role::Bot).unwrap(), "bot");
        assert_eq!(serde_json::to_value(Role::User).unwrap(), "user");
        assert_eq!(Role::User.to_string(), "user");
    }

    #[test]
    fn test_message_constructors() {
        let user = ChatMessage::user("hi");
        assert_eq!(user.role, Role::User);
        assert_eq!(user.source, None);

        let bot = ChatMessage::bot("hello", Some("System".to_string()));
        assert_eq!(bot.role, Role::Bot);
        assert_eq!(bot.source.as_deref(), Some("System"));
    }

    #[test]
    fn test_chat_result_wire_format() {
        let result: ChatResult =
            serde_json::from_str(r#"{"answer":"text","source":"Live AI"}"#).unwrap();
        assert_eq!(
            result,
            ChatResult {
                answer: "text".to_string(),
                source: "Live AI".to_string(),
            }
        );
    }
}
