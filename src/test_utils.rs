//! Test utilities for MiguelBot
//!
//! This module provides a scripted fake provider, temporary directory
//! helpers, and a sample configuration used by the unit tests.

use crate::error::{MiguelbotError, Result};
use crate::providers::{CompletionResponse, Message, Provider};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

/// One recorded call to a [`ScriptedProvider`]
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub system_instruction: String,
    pub history: Vec<Message>,
    pub utterance: String,
}

/// Provider that replays a fixed script of replies
///
/// `Ok(text)` entries are returned as replies and `Err(reason)` entries as
/// provider errors. An exhausted script fails every further call.
pub struct ScriptedProvider {
    script: Mutex<VecDeque<std::result::Result<String, String>>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    delay: Option<Duration>,
}

impl ScriptedProvider {
    /// Create a provider with the given script
    pub fn new(script: Vec<std::result::Result<String, String>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: Arc::new(Mutex::new(Vec::new())),
            delay: None,
        }
    }

    /// Sleep this long before answering each call
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Shared log of every call received
    pub fn calls(&self) -> Arc<Mutex<Vec<RecordedCall>>> {
        self.calls.clone()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    async fn complete(
        &self,
        system_instruction: &str,
        history: &[Message],
        utterance: &str,
    ) -> Result<CompletionResponse> {
        self.calls.lock().unwrap().push(RecordedCall {
            system_instruction: system_instruction.to_string(),
            history: history.to_vec(),
            utterance: utterance.to_string(),
        });

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Ok(text)) => Ok(CompletionResponse::new(text)),
            Some(Err(reason)) => Err(MiguelbotError::Provider(reason).into()),
            None => Err(MiguelbotError::Provider("script exhausted".to_string()).into()),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> String {
        "scripted-model".to_string()
    }
}

/// Create a temporary directory for testing
pub fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// Create a test file with the given content
///
/// # Panics
///
/// Panics if file creation or writing fails
pub fn create_test_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("Failed to write test file");
    path
}

/// Assert that an error contains the expected message
///
/// # Panics
///
/// Panics if the result is Ok or if the error doesn't contain the expected message
pub fn assert_error_contains<T>(result: Result<T>, expected: &str) {
    match result {
        Ok(_) => panic!("Expected error containing '{}' but got Ok", expected),
        Err(e) => {
            let error_msg = format!("{:#}", e);
            assert!(
                error_msg.contains(expected),
                "Error message '{}' does not contain '{}'",
                error_msg,
                expected
            );
        }
    }
}

/// Create a test configuration YAML string
pub fn test_config_yaml() -> String {
    r#"
provider:
  timeout_seconds: 30
  gemini:
    model: gemini-2.5-flash
    api_base: http://localhost:8089
chat:
  trigger_message: "Hola, empecemos"
storage:
  key: test_session
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assert_error_contains_success() {
        let result: Result<()> = Err(MiguelbotError::Config("test error message".to_string()).into());
        assert_error_contains(result, "test error");
    }

    #[test]
    #[should_panic(expected = "Expected error containing")]
    fn test_assert_error_contains_ok() {
        assert_error_contains(Ok(()), "error");
    }

    #[tokio::test]
    async fn test_scripted_provider_replays_then_fails() {
        let provider = ScriptedProvider::new(vec![Ok("uno".to_string()), Err("dos".to_string())]);

        assert_eq!(provider.complete("s", &[], "a").await.unwrap().text, "uno");
        assert_error_contains(provider.complete("s", &[], "b").await, "dos");
        assert_error_contains(provider.complete("s", &[], "c").await, "exhausted");
        assert_eq!(provider.calls().lock().unwrap().len(), 3);
    }
}
