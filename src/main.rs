//! EcoInsight - emissions Q&A chat backend
//!
#![doc = "EcoInsight - emissions Q&A chat backend"]
#![doc = "Main entry point for the EcoInsight application."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ecoinsight::cli::{Cli, Commands};
use ecoinsight::commands;
use ecoinsight::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Credentials may live in a local .env file
    let dotenv_loaded = dotenvy::dotenv().is_ok();

    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);
    if dotenv_loaded {
        tracing::debug!("Loaded environment from .env");
    }

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Serve { .. } => {
            tracing::info!("Starting HTTP server");
            commands::serve::run_serve(config).await?;
            Ok(())
        }
        Commands::Chat { .. } => {
            tracing::info!("Starting interactive chat mode");
            commands::chat::run_chat(config).await?;
            Ok(())
        }
        Commands::Ask { message } => {
            tracing::debug!("Answering one-off question");
            commands::ask::run_ask(config, &message).await?;
            Ok(())
        }
        Commands::Render { file, json } => {
            if let Some(path) = &file {
                tracing::debug!("Rendering answer from: {}", path.display());
            }
            commands::render::run_render(file.as_deref(), json)?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
fn init_tracing(verbose: bool) {
    let default_level = if verbose {
        "ecoinsight=debug"
    } else {
        "ecoinsight=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
