use crate::error::{MiguelbotError, Result};
use crate::storage::RecordBackend;
use anyhow::Context;
use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};

/// SQLite-backed record storage
///
/// Each operation opens its own connection; writes run inside a
/// transaction so a record is always replaced as a whole.
pub struct SqliteBackend {
    db_path: PathBuf,
}

impl SqliteBackend {
    /// Create a new storage instance
    ///
    /// Initializes the database file in the user's data directory, unless
    /// `MIGUELBOT_STORAGE_DB` points somewhere else.
    pub fn new() -> Result<Self> {
        if let Ok(override_path) = std::env::var("MIGUELBOT_STORAGE_DB") {
            return Self::new_with_path(override_path);
        }

        let proj_dirs = ProjectDirs::from("mx", "miguelneftali", "miguelbot")
            .ok_or_else(|| MiguelbotError::Storage("Could not determine data directory".into()))?;

        Self::new_with_path(proj_dirs.data_dir().join("transcript.db"))
    }

    /// Create a new storage instance that uses the specified database path.
    ///
    /// # Examples
    ///
    /// ```
    /// use miguelbot::storage::SqliteBackend;
    ///
    /// let dir = std::env::temp_dir().join("miguelbot-doc");
    /// let backend = SqliteBackend::new_with_path(dir.join("transcript.db")).unwrap();
    /// ```
    pub fn new_with_path<P: Into<PathBuf>>(db_path: P) -> Result<Self> {
        let db_path = db_path.into();

        // Ensure parent directory exists so opening the DB file succeeds.
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create parent directory for database")
                .map_err(|e| MiguelbotError::Storage(e.to_string()))?;
        }

        let storage = Self { db_path };
        storage.init()?;
        Ok(storage)
    }

    /// Path of the database file
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    fn open(&self) -> Result<Connection> {
        Connection::open(&self.db_path)
            .context("Failed to open database")
            .map_err(|e| MiguelbotError::Storage(e.to_string()).into())
    }

    /// Initialize the database schema
    fn init(&self) -> Result<()> {
        let conn = self.open()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS records (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )
        .context("Failed to create tables")
        .map_err(|e| MiguelbotError::Storage(e.to_string()))?;

        Ok(())
    }
}

impl RecordBackend for SqliteBackend {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.open()?;

        let value = conn
            .query_row(
                "SELECT value FROM records WHERE key = ?",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .context("Failed to query record")
            .map_err(|e| MiguelbotError::Storage(e.to_string()))?;

        Ok(value)
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        let mut conn = self.open()?;
        let now = Utc::now().to_rfc3339();

        let tx = conn
            .transaction()
            .context("Failed to start transaction")
            .map_err(|e| MiguelbotError::Storage(e.to_string()))?;

        tx.execute(
            "INSERT INTO records (key, value, updated_at) VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, now],
        )
        .context("Failed to write record")
        .map_err(|e| MiguelbotError::Storage(e.to_string()))?;

        tx.commit()
            .context("Failed to commit transaction")
            .map_err(|e| MiguelbotError::Storage(e.to_string()))?;

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let conn = self.open()?;

        conn.execute("DELETE FROM records WHERE key = ?", params![key])
            .context("Failed to delete record")
            .map_err(|e| MiguelbotError::Storage(e.to_string()))?;

        Ok(())
    }

    fn updated_at(&self, key: &str) -> Result<Option<DateTime<Utc>>> {
        let conn = self.open()?;

        let raw = conn
            .query_row(
                "SELECT updated_at FROM records WHERE key = ?",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .context("Failed to query record timestamp")
            .map_err(|e| MiguelbotError::Storage(e.to_string()))?;

        Ok(raw.and_then(|s| {
            DateTime::parse_from_rfc3339(&s)
                .map(|dt| dt.with_timezone(&Utc))
                .ok()
        }))
    }
}
