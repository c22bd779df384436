//! Configuration management for EcoInsight
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.
//! Credentials end up in explicit config structs that are handed to the
//! gateways at construction time.

use crate::error::{EcoInsightError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for EcoInsight
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Generative AI (Gemini) settings
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// Web search (Tavily) settings
    #[serde(default)]
    pub search: SearchConfig,

    /// Chat orchestration settings
    #[serde(default)]
    pub chat: ChatConfig,

    /// Terminal client settings
    #[serde(default)]
    pub client: ClientConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Gemini generative AI configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// API key; the gateway reports itself unconfigured without one
    #[serde(default)]
    pub api_key: Option<String>,

    /// API base URL (useful for tests and local mocks)
    #[serde(default = "default_gemini_api_base")]
    pub api_base: String,

    /// Model used for `generateContent`
    #[serde(default = "default_gemini_model")]
    pub model: String,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub timeout_seconds: u64,
}

fn default_gemini_api_base() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_gemini_model() -> String {
    "gemini-flash-latest".to_string()
}

fn default_request_timeout() -> u64 {
    120
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: default_gemini_api_base(),
            model: default_gemini_model(),
            timeout_seconds: default_request_timeout(),
        }
    }
}

/// Tavily web search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// API key; the gateway reports itself unconfigured without one
    #[serde(default)]
    pub api_key: Option<String>,

    /// API base URL (useful for tests and local mocks)
    #[serde(default = "default_search_api_base")]
    pub api_base: String,

    /// Maximum number of results folded into the prompt
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Tavily search depth ("basic" or "advanced")
    #[serde(default = "default_search_depth")]
    pub search_depth: String,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub timeout_seconds: u64,
}

fn default_search_api_base() -> String {
    "https://api.tavily.com".to_string()
}

fn default_max_results() -> usize {
    3
}

fn default_search_depth() -> String {
    "basic".to_string()
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: default_search_api_base(),
            max_results: default_max_results(),
            search_depth: default_search_depth(),
            timeout_seconds: default_request_timeout(),
        }
    }
}

/// Chat orchestration configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Delay before the canned answer is returned (milliseconds)
    #[serde(default = "default_fallback_delay_ms")]
    pub fallback_delay_ms: u64,
}

fn default_fallback_delay_ms() -> u64 {
    1000
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            fallback_delay_ms: default_fallback_delay_ms(),
        }
    }
}

/// Terminal client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the EcoInsight server
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub timeout_seconds: u64,
}

fn default_server_url() -> String {
    "http://localhost:3000".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            timeout_seconds: default_request_timeout(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// A missing file is not an error: defaults are used and a warning is
    /// logged. Environment variables override the file, and CLI flags
    /// override both.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the YAML configuration file
    /// * `cli` - Parsed command line, used for overrides
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| EcoInsightError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| EcoInsightError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an environment lookup
    ///
    /// Empty credential values are treated as absent.
    fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("GEMINI_API_KEY").filter(|k| !k.trim().is_empty()) {
            self.gemini.api_key = Some(key);
        }

        if let Some(key) = lookup("TAVILY_API_KEY").filter(|k| !k.trim().is_empty()) {
            self.search.api_key = Some(key);
        }

        if let Some(port) = lookup("PORT") {
            match port.parse() {
                Ok(value) => self.server.port = value,
                Err(_) => tracing::warn!("Invalid PORT: {}", port),
            }
        }

        if let Some(host) = lookup("ECOINSIGHT_HOST") {
            self.server.host = host;
        }

        if let Some(model) = lookup("ECOINSIGHT_GEMINI_MODEL") {
            self.gemini.model = model;
        }

        if let Some(api_base) = lookup("ECOINSIGHT_GEMINI_API_BASE") {
            self.gemini.api_base = api_base;
        }

        if let Some(api_base) = lookup("ECOINSIGHT_SEARCH_API_BASE") {
            self.search.api_base = api_base;
        }

        if let Some(delay) = lookup("ECOINSIGHT_FALLBACK_DELAY_MS") {
            match delay.parse() {
                Ok(value) => self.chat.fallback_delay_ms = value,
                Err(_) => tracing::warn!("Invalid ECOINSIGHT_FALLBACK_DELAY_MS: {}", delay),
            }
        }

        if let Some(server_url) = lookup("ECOINSIGHT_SERVER_URL") {
            self.client.server_url = server_url;
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        use crate::cli::Commands;

        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }

        match &cli.command {
            Commands::Serve { host, port } => {
                if let Some(host) = host {
                    self.server.host = host.clone();
                }
                if let Some(port) = port {
                    self.server.port = *port;
                }
            }
            Commands::Chat {
                server_url: Some(server_url),
            } => {
                self.client.server_url = server_url.clone();
            }
            _ => {}
        }
    }

    /// Validate the configuration
    ///
    /// Ensures all configuration values are within acceptable ranges.
    /// Missing credentials are valid: they select the fallback answer path.
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        if self.server.host.trim().is_empty() {
            return Err(EcoInsightError::Config("server.host cannot be empty".to_string()).into());
        }

        if self.server.port == 0 {
            return Err(
                EcoInsightError::Config("server.port must be greater than 0".to_string()).into(),
            );
        }

        if self.gemini.model.trim().is_empty() {
            return Err(EcoInsightError::Config("gemini.model cannot be empty".to_string()).into());
        }

        if self.gemini.timeout_seconds == 0
            || self.search.timeout_seconds == 0
            || self.client.timeout_seconds == 0
        {
            return Err(EcoInsightError::Config(
                "timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.search.max_results == 0 {
            return Err(EcoInsightError::Config(
                "search.max_results must be greater than 0".to_string(),
            )
            .into());
        }

        for (name, value) in [
            ("gemini.api_base", &self.gemini.api_base),
            ("search.api_base", &self.search.api_base),
            ("client.server_url", &self.client.server_url),
        ] {
            validate_http_url(name, value)?;
        }

        Ok(())
    }
}

fn validate_http_url(name: &str, value: &str) -> Result<()> {
    let parsed = url::Url::parse(value)
        .map_err(|e| EcoInsightError::Config(format!("{} is not a valid URL: {}", name, e)))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(EcoInsightError::Config(format!(
            "{} must use http or https, found {}",
            name, other
        ))
        .into()),
    }
}
