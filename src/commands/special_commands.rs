//! Special commands parser for interactive chat mode
//!
//! Lines starting with `/` are commands rather than answers for MiguelBot.
//! Commands are case-insensitive and most have a Spanish alias. `exit` and
//! `quit` are accepted without the slash.

use crate::markup;
use crate::prompts;
use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Comando desconocido: {0}\n\nEscribe '/help' para ver los comandos disponibles")]
    UnknownCommand(String),
}

/// Special commands that can be executed during interactive chat
///
/// These commands act on the session instead of being sent to MiguelBot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Show the quick guide and the command list
    Help,

    /// Erase all progress and start over, after confirmation
    Reset,

    /// Show model, transcript size and last save time
    ShowStatus,

    /// Leave the session; progress stays saved
    Exit,

    /// Not a special command
    ///
    /// The input is an answer for MiguelBot.
    None,
}

/// Parse a user input string into a special command
///
/// # Errors
///
/// Returns `CommandError::UnknownCommand` if the input starts with `/` but
/// is not a known command
///
/// # Examples
///
/// ```
/// use miguelbot::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// assert_eq!(parse_special_command("/ayuda").unwrap(), SpecialCommand::Help);
/// assert_eq!(parse_special_command("1-A, 2-C").unwrap(), SpecialCommand::None);
/// assert!(parse_special_command("/foo").is_err());
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    if !trimmed.starts_with('/') && lower != "exit" && lower != "quit" {
        return Ok(SpecialCommand::None);
    }

    match lower.as_str() {
        "/help" | "/ayuda" | "/?" => Ok(SpecialCommand::Help),
        "/reset" | "/reiniciar" => Ok(SpecialCommand::Reset),
        "/status" | "/estado" => Ok(SpecialCommand::ShowStatus),
        "exit" | "quit" | "/exit" | "/quit" | "/salir" => Ok(SpecialCommand::Exit),
        _ => Err(CommandError::UnknownCommand(trimmed.to_string())),
    }
}

/// Command reference appended to the quick guide
const COMMAND_REFERENCE: &str = "
**Comandos:**
  /help, /ayuda       Muestra esta guía
  /status, /estado    Modelo, mensajes guardados y último guardado
  /reset, /reiniciar  Borra tu progreso y empieza de nuevo
  /salir, exit, quit  Termina la sesión (tu progreso se conserva)";

/// Text shown by `/help`
pub fn help_text() -> String {
    format!("{}\n{}", prompts::HELP_GUIDE, COMMAND_REFERENCE)
}

/// Print the quick guide and the command list
pub fn print_help() {
    println!("\n{}\n", markup::to_ansi(&help_text()));
}
