/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

It exposes four top-level command modules:

- `serve`: Run the HTTP API
- `chat`: Interactive chat against a running server
- `ask`: Answer a single question in-process
- `render`: Render a saved assistant answer as a dashboard
*/

use crate::chart::{extract, normalize, Extraction};
use crate::chat::{ChatOrchestrator, ChatSession, Role};
use crate::client::ChatClient;
use crate::config::Config;
use crate::dashboard::render_dashboard;
use crate::error::{EcoInsightError, Result};
use colored::Colorize;
use serde_json::json;
use std::sync::Arc;

// HTTP server command handler
pub mod serve {
    //! Serve the chat API until interrupted.

    use super::*;

    /// Start the HTTP API
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    ///
    /// # Errors
    ///
    /// Returns error if the gateways cannot be built or the address cannot
    /// be bound
    pub async fn run_serve(config: Config) -> Result<()> {
        tracing::info!(
            "Gemini model: {}, AI configured: {}, search configured: {}",
            config.gemini.model,
            config.gemini.api_key.is_some(),
            config.search.api_key.is_some()
        );

        let orchestrator = Arc::new(ChatOrchestrator::from_config(&config)?);
        crate::server::serve(&config.server, orchestrator).await
    }
}

// Chat command handler
pub mod chat {
    //! Interactive chat mode handler.
    //!
    //! Runs a readline loop that posts each message to the server and keeps
    //! the dashboard in sync with the charts found in the answers.

    use super::*;
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;

    /// Commands understood by the chat prompt
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum ChatCommand {
        /// Show the current dashboard
        Dashboard,
        /// Show the conversation so far
        History,
        /// Show available commands
        Help,
        /// Leave the chat
        Quit,
        /// Anything else is sent to the server
        Message(String),
    }

    /// Classify a line typed at the chat prompt
    ///
    /// # Examples
    ///
    /// ```
    /// use ecoinsight::commands::chat::{parse_chat_command, ChatCommand};
    ///
    /// assert_eq!(parse_chat_command("/quit"), ChatCommand::Quit);
    /// assert_eq!(
    ///     parse_chat_command("Show transport"),
    ///     ChatCommand::Message("Show transport".to_string())
    /// );
    /// ```
    pub fn parse_chat_command(line: &str) -> ChatCommand {
        match line.trim() {
            "/dashboard" => ChatCommand::Dashboard,
            "/history" => ChatCommand::History,
            "/help" => ChatCommand::Help,
            "/quit" | "/exit" | "exit" | "quit" => ChatCommand::Quit,
            other => ChatCommand::Message(other.to_string()),
        }
    }

    /// Start interactive chat mode
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client or the line editor cannot be created,
    /// or if the line editor history cannot be updated
    pub async fn run_chat(config: Config) -> Result<()> {
        let client = ChatClient::new(&config.client)?;
        let mut session = ChatSession::new();
        let mut rl = DefaultEditor::new()?;

        print_welcome_banner(client.base_url());
        if let Some(greeting) = session.messages().first() {
            println!("{} {}\n", "bot>".green(), greeting.text);
        }

        loop {
            match rl.readline("you> ") {
                Ok(line) => {
                    let message = match parse_chat_command(&line) {
                        ChatCommand::Dashboard => {
                            println!("{}\n", render_dashboard(session.chart()));
                            continue;
                        }
                        ChatCommand::History => {
                            print_history(&session);
                            continue;
                        }
                        ChatCommand::Help => {
                            print_help();
                            continue;
                        }
                        ChatCommand::Quit => break,
                        ChatCommand::Message(message) => message,
                    };

                    let Some(message) = session.begin_send(&message)? else {
                        continue;
                    };
                    rl.add_history_entry(message.as_str())?;

                    println!("{}", "Analyzing data...".dimmed());
                    let reply = client.send(&message).await;
                    let outcome = session.finish_send(reply)?;

                    if let Some(last) = session.messages().last() {
                        print_bot_message(&last.text, last.source.as_deref());
                    }
                    if outcome.chart_updated {
                        println!("{}\n", render_dashboard(session.chart()));
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("CTRL-C");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    println!("CTRL-D");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {:?}", err);
                    break;
                }
            }
        }

        println!("Goodbye!");
        Ok(())
    }

    fn print_welcome_banner(server_url: &str) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║              EcoInsight Emissions Analyst                    ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        println!("Server: {}", server_url.cyan());
        println!("Type '/help' for available commands, '/quit' to leave\n");
    }

    fn print_help() {
        println!("\nCommands:");
        println!("  /dashboard  Show the current dashboard");
        println!("  /history    Show the conversation so far");
        println!("  /help       Show this help");
        println!("  /quit       Leave the chat\n");
    }

    fn print_history(session: &ChatSession) {
        println!();
        for message in session.messages() {
            let who = match message.role {
                Role::User => "you>".blue(),
                Role::Bot => "bot>".green(),
            };
            println!(
                "{} {} {}",
                message.at.format("%H:%M:%S").to_string().dimmed(),
                who,
                message.text
            );
        }
        println!();
    }

    fn print_bot_message(text: &str, source: Option<&str>) {
        println!("\n{} {}", "bot>".green(), text);
        if let Some(source) = source {
            println!("{}", format!("Source: {}", source).dimmed());
        }
        println!();
    }

}

// One-shot question handler
pub mod ask {
    //! Answer one question without a server.

    use super::*;

    /// Answer a single question and print the prose and dashboard
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    /// * `message` - The question to ask
    ///
    /// # Errors
    ///
    /// Returns error if the message is blank or the gateways cannot be built
    pub async fn run_ask(config: Config, message: &str) -> Result<()> {
        let message = validate_question(message)?;

        let orchestrator = ChatOrchestrator::from_config(&config)?;
        let result = orchestrator.handle(message).await;
        let extraction = extract(&result.answer);

        println!("{}\n", extraction.text);
        println!("{}", format!("Source: {}", result.source).dimmed());

        if let Some(payload) = &extraction.payload {
            let chart = normalize(payload);
            println!("\n{}", render_dashboard(Some(&chart)));
        }
        Ok(())
    }

    /// Trimmed question, rejecting blank input
    ///
    /// # Errors
    ///
    /// Returns `EcoInsightError::Input` when the question is blank
    pub fn validate_question(message: &str) -> Result<&str> {
        let message = message.trim();
        if message.is_empty() {
            return Err(EcoInsightError::Input("Message required".to_string()).into());
        }
        Ok(message)
    }

}

// Saved answer renderer
pub mod render {
    //! Render an assistant answer read from a file or stdin.

    use super::*;
    use std::io::Read;
    use std::path::Path;

    /// Render a saved answer
    ///
    /// # Arguments
    ///
    /// * `file` - Answer file; stdin when `None`
    /// * `json` - Print the extraction and normalized chart as JSON
    ///
    /// # Errors
    ///
    /// Returns error if the input cannot be read
    pub fn run_render(file: Option<&Path>, json: bool) -> Result<()> {
        let raw = match file {
            Some(path) => std::fs::read_to_string(path).map_err(EcoInsightError::Io)?,
            None => {
                let mut buffer = String::new();
                std::io::stdin()
                    .read_to_string(&mut buffer)
                    .map_err(EcoInsightError::Io)?;
                buffer
            }
        };

        let extraction = extract(&raw);
        if json {
            println!("{}", render_json(&extraction)?);
        } else {
            println!("{}\n", extraction.text);
            let chart = extraction.payload.as_ref().map(normalize);
            println!("{}", render_dashboard(chart.as_ref()));
        }
        Ok(())
    }

    /// JSON document with the prose, the raw payload and the normalized chart
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails
    pub fn render_json(extraction: &Extraction) -> Result<String> {
        let chart = extraction.payload.as_ref().map(normalize);
        let document = json!({
            "text": extraction.text,
            "payload": extraction.payload,
            "chart": chart,
        });
        Ok(serde_json::to_string_pretty(&document).map_err(EcoInsightError::Serialization)?)
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use std::io::Write;

        #[test]
        fn test_render_json_with_snapshot() {
            let extraction = extract(
                "Energy leads.\n```json\n{\"chart_type\":\"snapshot\",\"chart_data\":[{\"label\":\"Energy\",\"value\":8000}]}\n```",
            );
            let rendered = render_json(&extraction).unwrap();
            let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();

            assert_eq!(value["text"], "Energy leads.");
            assert_eq!(value["payload"]["chart_type"], "snapshot");
            assert_eq!(value["chart"]["summary"]["top_sector"], "Energy");
            assert_eq!(value["chart"]["summary"]["label"], "Current");
        }

        #[test]
        fn test_render_json_without_payload() {
            let extraction = extract("Just prose.");
            let rendered = render_json(&extraction).unwrap();
            let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();

            assert_eq!(value["text"], "Just prose.");
            assert!(value["payload"].is_null());
            assert!(value["chart"].is_null());
        }

        #[test]
        fn test_run_render_reads_file() {
            let mut file = tempfile::NamedTempFile::new().unwrap();
            write!(file, "No chart here.").unwrap();
            assert!(run_render(Some(file.path()), true).is_ok());
        }

        #[test]
        fn test_run_render_missing_file_fails() {
            let err = run_render(Some(Path::new("/nonexistent/answer.txt")), false).unwrap_err();
            assert!(matches!(
                err.downcast_ref::<EcoInsightError>(),
                Some(EcoInsightError::Io(_))
            ));
        }
    }
}
