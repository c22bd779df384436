//! Command-line interface definition for EcoInsight
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for serving the HTTP API, chatting against it,
//! asking one-off questions, and rendering saved assistant answers.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// EcoInsight - emissions Q&A with generated charts
///
/// Ask natural-language questions about emissions data and get answers
/// with charts extracted from the model's reply.
#[derive(Parser, Debug, Clone)]
#[command(name = "ecoinsight")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for EcoInsight
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the HTTP API server
    Serve {
        /// Address to bind (overrides config and ECOINSIGHT_HOST)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config and PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Start an interactive chat session against a running server
    Chat {
        /// Base URL of the EcoInsight server
        #[arg(short, long)]
        server_url: Option<String>,
    },

    /// Ask a single question without a server and print the dashboard
    Ask {
        /// The question to ask
        message: String,
    },

    /// Extract and render the chart embedded in a saved assistant answer
    Render {
        /// File containing the answer text (reads stdin when omitted)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Print the normalized chart as JSON instead of tables
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            command: Commands::Serve {
                host: None,
                port: None,
            },
        }
    }
}
