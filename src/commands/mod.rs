/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

It exposes three top-level commands:

- `chat`        — Interactive MiguelBot session
- `reset`       — Erase the saved transcript
- `transcript`  — Print the saved transcript

The handlers are small and lean on the library components: the transcript
store, the provider and the chat controller.
*/

use crate::chat::{ChatController, ChatOptions};
use crate::config::{Config, API_KEY_ENV, API_KEY_FALLBACK_ENV};
use crate::error::{MiguelbotError, Result};
use crate::markup;
use crate::providers::{create_provider, Message, Speaker};
use crate::storage::{SqliteBackend, TranscriptStore};
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::sync::Arc;

// Special commands parser for the chat loop
pub mod special_commands;

// Saved transcript listing
pub mod transcript;

/// Open the transcript store described by the configuration
///
/// # Errors
///
/// Returns error if the database cannot be created or opened
pub fn open_store(config: &Config) -> Result<TranscriptStore> {
    let backend = match &config.storage.path {
        Some(path) => SqliteBackend::new_with_path(path)?,
        None => SqliteBackend::new()?,
    };
    tracing::debug!("Using transcript database {}", backend.db_path().display());
    Ok(TranscriptStore::with_key(
        Arc::new(backend),
        config.storage.key.clone(),
    ))
}

/// Build the chat controller for this configuration
///
/// A missing API key does not fail here: the controller is created in the
/// unconfigured state so the session can explain what to set.
///
/// # Errors
///
/// Returns error if the store cannot be opened, the system instruction
/// cannot be read, or the provider fails for any other reason
pub fn build_controller(config: &Config) -> Result<ChatController> {
    let store = open_store(config)?;
    let options = ChatOptions::from_config(config)?;

    match create_provider(&config.provider) {
        Ok(provider) => Ok(ChatController::new(store, provider, options)),
        Err(e) => match e.downcast_ref::<MiguelbotError>() {
            Some(MiguelbotError::MissingCredentials(_)) => {
                tracing::warn!("No API key configured");
                Ok(ChatController::unconfigured(
                    store,
                    format!("{} is not set", API_KEY_ENV),
                    options,
                ))
            }
            _ => Err(e),
        },
    }
}

/// Ask a yes/no question on the terminal
///
/// Interrupts and end of input count as "no".
fn confirm(rl: &mut DefaultEditor, question: &str) -> Result<bool> {
    match rl.readline(&format!("{} [s/N] ", question.yellow())) {
        Ok(answer) => Ok(is_affirmative(&answer)),
        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(false),
        Err(err) => Err(err.into()),
    }
}

fn is_affirmative(answer: &str) -> bool {
    matches!(
        answer.trim().to_lowercase().as_str(),
        "s" | "si" | "sí" | "y" | "yes"
    )
}

/// Format one transcript message for the terminal
pub fn format_message(message: &Message) -> String {
    match message.speaker {
        Speaker::User => format!("{} {}", "Tú:".cyan().bold(), message.content),
        Speaker::Assistant => format!(
            "{}\n{}",
            "MiguelBot:".green().bold(),
            markup::to_ansi(&message.content)
        ),
    }
}

/// Full-screen explanation shown when no API key is configured
pub fn unconfigured_screen(reason: &str) -> String {
    format!(
        "\n╔══════════════════════════════════════════════════════════════╗\n\
         ║                 MiguelBot: configuración requerida           ║\n\
         ╚══════════════════════════════════════════════════════════════╝\n\n\
         MiguelBot necesita una clave de la API de Gemini para funcionar.\n\n\
         Define la variable de entorno {} (o {}) y vuelve a ejecutar:\n\n\
         \x20   export {}=\"tu-clave\"\n\n\
         Detalle: {}\n",
        API_KEY_ENV, API_KEY_FALLBACK_ENV, API_KEY_ENV, reason
    )
}

// Chat command handler
pub mod chat {
    //! Interactive MiguelBot session.
    //!
    //! Builds the controller, restores or starts the conversation, and runs
    //! a readline loop that submits answers and handles special commands.

    use super::*;
    use crate::chat::{ChatState, InitOutcome, SubmitOutcome};
    use crate::commands::special_commands::{parse_special_command, print_help, SpecialCommand};
    use crate::prompts;
    use std::io::Write;

    /// Start the interactive session
    ///
    /// Returns `Ok(())` after showing the configuration screen when no API
    /// key is set.
    ///
    /// # Examples
    ///
    /// ```
    /// use miguelbot::commands::chat;
    /// use miguelbot::config::Config;
    ///
    /// // In application code:
    /// // chat::run_chat(Config::default()).await?;
    /// ```
    pub async fn run_chat(config: Config) -> Result<()> {
        tracing::info!("Starting interactive chat");

        let controller = build_controller(&config)?;

        // A resumed transcript shows up with no loading state.
        let bootstrapping = controller.needs_bootstrap()?;
        if bootstrapping {
            show_typing();
        }
        let outcome = controller.initialize().await;
        if bootstrapping {
            clear_typing();
        }

        if let InitOutcome::Unconfigured(reason) = outcome? {
            println!("{}", unconfigured_screen(&reason));
            return Ok(());
        }

        print_welcome_banner(controller.provider_label().as_deref());
        for message in controller.transcript().await {
            println!("{}\n", format_message(&message));
        }

        let mut rl = DefaultEditor::new()?;

        loop {
            let prompt = format!("{} ", "Tú ›".cyan().bold());
            match rl.readline(&prompt) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }

                    let command = match parse_special_command(trimmed) {
                        Ok(command) => command,
                        Err(e) => {
                            eprintln!("{}\n", e.to_string().red());
                            continue;
                        }
                    };

                    match command {
                        SpecialCommand::Help => {
                            print_help();
                            continue;
                        }
                        SpecialCommand::ShowStatus => {
                            print_status_display(&controller).await?;
                            continue;
                        }
                        SpecialCommand::Reset => {
                            handle_reset(&controller, &mut rl).await;
                            continue;
                        }
                        SpecialCommand::Exit => break,
                        SpecialCommand::None => {}
                    }

                    let _ = rl.add_history_entry(trimmed);

                    show_typing();
                    let result = controller.submit(trimmed).await;
                    clear_typing();

                    match result {
                        Ok(SubmitOutcome::Replied(text)) | Ok(SubmitOutcome::Failed(text)) => {
                            println!("\n{}\n", format_message(&Message::assistant(text)));
                        }
                        Ok(SubmitOutcome::Ignored(reason)) => {
                            tracing::debug!("Submission ignored: {:?}", reason);
                        }
                        Err(e) => {
                            eprintln!("{} {:#}\n", "Error:".red().bold(), e);
                            if let Some(last) = controller.transcript().await.last() {
                                if !last.is_user() {
                                    println!("\n{}\n", format_message(last));
                                }
                            }
                        }
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

        println!("¡Hasta pronto! Tu progreso quedó guardado.");
        Ok(())
    }

    async fn handle_reset(controller: &ChatController, rl: &mut DefaultEditor) {
        match confirm(rl, prompts::RESET_CONFIRMATION) {
            Ok(true) => {}
            Ok(false) => {
                println!("Tu progreso sigue guardado.\n");
                return;
            }
            Err(e) => {
                eprintln!("{} {:#}\n", "Error:".red().bold(), e);
                return;
            }
        }

        show_typing();
        let outcome = controller.reset().await;
        clear_typing();

        match outcome {
            Ok(_) => {
                println!("\n{}\n", "── Nueva sesión ──".dimmed());
                for message in controller.transcript().await {
                    println!("{}\n", format_message(&message));
                }
            }
            Err(e) => eprintln!("{} {:#}\n", "Error:".red().bold(), e),
        }
    }

    fn show_typing() {
        print!("{}", prompts::TYPING_INDICATOR.italic().dimmed());
        let _ = std::io::stdout().flush();
    }

    fn clear_typing() {
        print!("\r\x1b[2K");
        let _ = std::io::stdout().flush();
    }

    /// Display welcome banner at the start of the session
    fn print_welcome_banner(provider: Option<&str>) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║        MiguelBot - Diagnóstico EXANI-II 2026                 ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        if let Some(provider) = provider {
            println!("Modelo: {}", provider.cyan());
        }
        println!("Escribe '/help' para ver la guía, '/salir' para terminar\n");
    }

    /// Display session status for `/status`
    async fn print_status_display(controller: &ChatController) -> Result<()> {
        let state = match controller.state().await {
            ChatState::Initializing => "initializing".to_string(),
            ChatState::Idle => "idle".to_string(),
            ChatState::Submitting => "submitting".to_string(),
            ChatState::Unconfigured(reason) => format!("unconfigured ({})", reason),
        };
        let last_saved = controller
            .store()
            .last_saved()?
            .map(|at| at.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| "-".to_string());

        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                    MiguelBot Session Status                  ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        println!(
            "Model:             {}",
            controller.provider_label().unwrap_or_else(|| "-".to_string())
        );
        println!("State:             {}", state);
        println!("Transcript:        {} messages", controller.transcript().await.len());
        println!(
            "Model context:     {} messages",
            controller
                .session_len()
                .await
                .map(|n| n.to_string())
                .unwrap_or_else(|| "-".to_string())
        );
        println!("Storage key:       {}", controller.store().key());
        println!("Last saved:        {}", last_saved);
        println!();
        Ok(())
    }
}

// Reset command handler
pub mod reset {
    //! Erase the saved transcript from the command line.

    use super::*;
    use crate::prompts;

    /// Clear the stored transcript, asking first unless `yes` is set
    pub fn run_reset(config: &Config, yes: bool) -> Result<()> {
        let store = open_store(config)?;

        if !yes {
            let mut rl = DefaultEditor::new()?;
            if !confirm(&mut rl, prompts::RESET_CONFIRMATION)? {
                println!("Tu progreso sigue guardado.");
                return Ok(());
            }
        }

        store.clear()?;
        println!("{}", "Progreso borrado.".green());
        Ok(())
    }
}
