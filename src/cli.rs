//! Command-line interface definition for MiguelBot
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for the interactive chat and for managing the
//! stored transcript.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// MiguelBot - EXANI-II diagnostic chat in the terminal
///
/// Chat with MiguelBot through the Gemini API. Progress is saved on this
/// device after every message and resumed automatically on the next launch.
#[derive(Parser, Debug, Clone)]
#[command(name = "miguelbot")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Override the transcript database path
    #[arg(long)]
    pub storage_path: Option<PathBuf>,

    /// Command to execute (defaults to `chat`)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands for MiguelBot
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Start or resume the interactive chat
    Chat {
        /// Override the Gemini model from config
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Erase saved progress so the next chat starts from scratch
    Reset {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Print the saved transcript
    Transcript {
        /// Output raw JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// The command to run, falling back to `chat`
    pub fn command_or_default(&self) -> Commands {
        self.command
            .clone()
            .unwrap_or(Commands::Chat { model: None })
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            storage_path: None,
            command: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default() {
        let cli = Cli::default();
        assert_eq!(cli.config, Some("config/config.yaml".to_string()));
        assert!(!cli.verbose);
        assert_eq!(cli.command_or_default(), Commands::Chat { model: None });
    }

    #[test]
    fn test_cli_parse_without_command_defaults_to_chat() {
        let cli = Cli::try_parse_from(["miguelbot"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.command_or_default(), Commands::Chat { model: None });
    }

    #[test]
    fn test_cli_parse_chat_with_model() {
        let cli = Cli::try_parse_from(["miguelbot", "chat", "--model", "gemini-2.5-pro"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::Chat {
                model: Some("gemini-2.5-pro".to_string())
            })
        );
    }

    #[test]
    fn test_cli_parse_reset() {
        let cli = Cli::try_parse_from(["miguelbot", "reset"]).unwrap();
        assert_eq!(cli.command, Some(Commands::Reset { yes: false }));

        let cli = Cli::try_parse_from(["miguelbot", "reset", "--yes"]).unwrap();
        assert_eq!(cli.command, Some(Commands::Reset { yes: true }));
    }

    #[test]
    fn test_cli_parse_transcript_json() {
        let cli = Cli::try_parse_from(["miguelbot", "transcript", "--json"]).unwrap();
        assert_eq!(cli.command, Some(Commands::Transcript { json: true }));
    }

    #[test]
    fn test_cli_parse_global_flags() {
        let cli = Cli::try_parse_from([
            "miguelbot",
            "-v",
            "--config",
            "custom.yaml",
            "--storage-path",
            "/tmp/t.db",
            "transcript",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, Some("custom.yaml".to_string()));
        assert_eq!(cli.storage_path, Some(PathBuf::from("/tmp/t.db")));
    }

    #[test]
    fn test_cli_parse_invalid_command() {
        assert!(Cli::try_parse_from(["miguelbot", "invalid"]).is_err());
    }
}
