//! Error types for EcoInsight
//!
//! This module defines the error types used throughout the application,
//! using `thiserror` for ergonomic error handling. Gateway degradation is
//! modelled separately by [`crate::gateways::Unavailable`] because it is an
//! expected outcome rather than a failure.

use thiserror::Error;

/// Main error type for EcoInsight operations
///
/// Covers configuration loading, chart payload decoding, HTTP client calls
/// made by the terminal chat, chat session state violations, command input,
/// and reading or serializing rendered answers.
#[derive(Error, Debug)]
pub enum EcoInsightError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Chart payload could not be mapped onto a known chart shape
    #[error("Chart payload error: {0}")]
    ChartPayload(String),

    /// Errors talking to the EcoInsight server from the terminal client
    #[error("Client error: {0}")]
    Client(String),

    /// Chat session state violations (for example a send while busy)
    #[error("Session error: {0}")]
    Session(String),

    /// Invalid command input (for example a blank question)
    #[error("Invalid input: {0}")]
    Input(String),

    /// HTTP server errors (bind failures and the like)
    #[error("Server error: {0}")]
    Server(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for EcoInsight operations
///
/// Uses `anyhow::Error` so callers can attach context while the concrete
/// [`EcoInsightError`] stays downcastable.
pub type Result<T> = anyhow::Result<T>;
