//! Persisted transcript storage
//!
//! The transcript lives in a single record under a fixed key. Every save
//! replaces the whole record, so a crash can lose at most the message being
//! written, never older ones. [`TranscriptStore`] owns the record's JSON
//! shape and the fail-soft load contract; a [`RecordBackend`] does the raw
//! string I/O.

use crate::error::{MiguelbotError, Result};
use crate::providers::Message;
use chrono::{DateTime, Utc};
use std::sync::Arc;

pub mod memory;
pub mod sqlite;

pub use memory::MemoryBackend;
pub use sqlite::SqliteBackend;

/// Key of the transcript record unless configured otherwise
pub const DEFAULT_STORAGE_KEY: &str = "miguelbot_chat_session";

/// Raw key/value storage for serialized records
///
/// Implementations must make `put` atomic: a reader sees either the old
/// value or the new one, never a mix.
pub trait RecordBackend: Send + Sync {
    /// Read the raw value stored under `key`
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value stored under `key`
    fn put(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`; removing a missing key is not an error
    fn remove(&self, key: &str) -> Result<()>;

    /// When `key` was last written
    fn updated_at(&self, key: &str) -> Result<Option<DateTime<Utc>>>;
}

/// Durable home of the conversation transcript
///
/// Cloning is cheap and clones share the same backend.
///
/// # Examples
///
/// ```
/// use miguelbot::providers::Message;
/// use miguelbot::storage::{MemoryBackend, TranscriptStore};
/// use std::sync::Arc;
///
/// let store = TranscriptStore::new(Arc::new(MemoryBackend::new()));
/// store.save(&[Message::assistant("¡Hola!")]).unwrap();
/// assert_eq!(store.load().unwrap().unwrap().len(), 1);
/// ```
#[derive(Clone)]
pub struct TranscriptStore {
    backend: Arc<dyn RecordBackend>,
    key: String,
}

impl TranscriptStore {
    /// Create a store using [`DEFAULT_STORAGE_KEY`]
    pub fn new(backend: Arc<dyn RecordBackend>) -> Self {
        Self::with_key(backend, DEFAULT_STORAGE_KEY)
    }

    /// Create a store bound to a specific record key
    pub fn with_key(backend: Arc<dyn RecordBackend>, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
        }
    }

    /// The record key this store reads and writes
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Load the stored transcript
    ///
    /// Returns `Ok(None)` when nothing is stored. A record that does not
    /// parse as a message list is treated the same way: it is logged,
    /// removed, and reported as absent.
    ///
    /// # Errors
    ///
    /// Returns error only if the backend itself fails
    pub fn load(&self) -> Result<Option<Vec<Message>>> {
        let raw = match self.backend.get(&self.key)? {
            Some(raw) => raw,
            None => return Ok(None),
        };

        match serde_json::from_str::<Vec<Message>>(&raw) {
            Ok(messages) => {
                tracing::debug!(
                    "Loaded transcript '{}' with {} messages",
                    self.key,
                    messages.len()
                );
                Ok(Some(messages))
            }
            Err(e) => {
                tracing::warn!(
                    "Discarding unreadable transcript record '{}': {}",
                    self.key,
                    e
                );
                self.backend.remove(&self.key)?;
                Ok(None)
            }
        }
    }

    /// Overwrite the stored transcript with a full snapshot
    ///
    /// # Errors
    ///
    /// Returns error if serialization or the backend write fails
    pub fn save(&self, transcript: &[Message]) -> Result<()> {
        let raw = serde_json::to_string(transcript)
            .map_err(|e| MiguelbotError::Storage(format!("Failed to serialize transcript: {}", e)))?;
        self.backend.put(&self.key, &raw)?;
        tracing::debug!(
            "Saved transcript '{}' ({} messages)",
            self.key,
            transcript.len()
        );
        Ok(())
    }

    /// Remove the stored transcript entirely
    pub fn clear(&self) -> Result<()> {
        self.backend.remove(&self.key)?;
        tracing::info!("Cleared transcript '{}'", self.key);
        Ok(())
    }

    /// When the transcript was last saved, if it exists
    pub fn last_saved(&self) -> Result<Option<DateTime<Utc>>> {
        self.backend.updated_at(&self.key)
    }
}
