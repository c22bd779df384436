//! EcoInsight - emissions Q&A chat backend and terminal dashboard
//!
//! This library answers questions about greenhouse-gas emissions using a
//! generative AI service grounded with web search results, and turns the
//! chart descriptions embedded in those answers into dashboard-ready series.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `chart`: Chart payload extraction and normalization
//! - `chat`: Message orchestration and client-side session state
//! - `gateways`: Gemini and Tavily HTTP gateways
//! - `prompts`: Analyst prompt construction
//! - `server`: HTTP API (`POST /api/chat`)
//! - `client`: HTTP client for the API
//! - `dashboard`: Terminal rendering of normalized charts
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```
//! use ecoinsight::chart::{extract, normalize};
//!
//! let answer = "Energy leads.\n```json\n{\"chart_type\":\"snapshot\",\"chart_data\":[{\"label\":\"Energy\",\"value\":8000}]}\n```";
//! let extraction = extract(answer);
//! assert_eq!(extraction.text, "Energy leads.");
//!
//! let chart = normalize(&extraction.payload.unwrap());
//! assert_eq!(chart.summary.top_sector.as_deref(), Some("Energy"));
//! ```

pub mod chart;
pub mod chat;
pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod gateways;
pub mod prompts;
pub mod server;

// Re-export commonly used types
pub use chart::{extract, normalize, ChartPayload, Extraction, NormalizedChart};
pub use chat::{ChatOrchestrator, ChatResult, ChatSession};
pub use config::Config;
pub use error::{EcoInsightError, Result};
