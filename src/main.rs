//! MiguelBot - EXANI-II diagnostic chat in the terminal
//!
#![doc = "Main entry point for the MiguelBot terminal client."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use miguelbot::cli::{Cli, Commands};
use miguelbot::commands;
use miguelbot::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    match cli.command_or_default() {
        Commands::Chat { model } => {
            if let Some(m) = &model {
                tracing::debug!("Using model override: {}", m);
            }
            commands::chat::run_chat(config).await?;
            Ok(())
        }
        Commands::Reset { yes } => {
            tracing::info!("Resetting saved transcript");
            commands::reset::run_reset(&config, yes)?;
            Ok(())
        }
        Commands::Transcript { json } => {
            commands::transcript::run_transcript(&config, json)?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
///
/// Logs go to stderr so the conversation on stdout stays clean.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "miguelbot=debug"
    } else {
        "miguelbot=warn"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
