//! Error types for MiguelBot
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use std::time::Duration;
use thiserror::Error;

/// Main error type for MiguelBot operations
///
/// Covers configuration loading, the remote completion service, transcript
/// storage, and the chat controller's own guard rails.
#[derive(Error, Debug)]
pub enum MiguelbotError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// The service access credential is not set
    #[error("Missing credentials for provider: {0}")]
    MissingCredentials(String),

    /// Provider-related errors (API calls, malformed responses, etc.)
    #[error("Provider error: {0}")]
    Provider(String),

    /// Authentication errors (e.g., 401 Unauthorized, 403 Forbidden)
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// The completion call did not finish in time
    #[error("Completion request timed out after {0:?}")]
    Timeout(Duration),

    /// A submission is already pending
    #[error("A submission is already in progress")]
    SubmissionInProgress,

    /// Transcript storage errors (database operations)
    #[error("Storage error: {0}")]
    Storage(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for MiguelBot operations
///
/// Uses `anyhow::Error` so callers can attach context while still being able
/// to downcast to [`MiguelbotError`] where the variant matters.
pub type Result<T> = anyhow::Result<T>;
