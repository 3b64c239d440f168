//! MiguelBot - terminal chat client library
//!
//! This library provides the pieces behind the `miguelbot` binary: a
//! resumable conversation with the Gemini API whose transcript is saved
//! locally after every message.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `chat`: Conversation session and the controller state machine
//! - `storage`: Persisted transcript store and its backends
//! - `providers`: Completion provider abstraction and the Gemini client
//! - `markup`: Bold markup rendering for assistant messages
//! - `prompts`: System instruction, trigger utterance and fixed texts
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli` / `commands`: Command-line interface and its handlers
//!
//! # Example
//!
//! ```no_run
//! use miguelbot::chat::{ChatController, ChatOptions};
//! use miguelbot::providers::create_provider;
//! use miguelbot::storage::{SqliteBackend, TranscriptStore};
//! use miguelbot::Config;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let store = TranscriptStore::new(Arc::new(SqliteBackend::new()?));
//!     let provider = create_provider(&config.provider)?;
//!     let controller = ChatController::new(store, provider, ChatOptions::from_config(&config)?);
//!     controller.initialize().await?;
//!     controller.submit("Ana López").await?;
//!     Ok(())
//! }
//! ```

pub mod chat;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod markup;
pub mod prompts;
pub mod providers;
pub mod storage;

// Re-export commonly used types
pub use chat::{ChatController, ChatOptions};
pub use config::Config;
pub use error::{MiguelbotError, Result};
pub use storage::TranscriptStore;

#[cfg(test)]
pub mod test_utils;
