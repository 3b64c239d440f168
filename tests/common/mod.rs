use async_trait::async_trait;
use std::collections::VecDeque;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::Notify;

use miguelbot::chat::{ChatController, ChatOptions};
use miguelbot::error::{MiguelbotError, Result};
use miguelbot::providers::{CompletionResponse, Message, Provider};
use miguelbot::storage::{MemoryBackend, SqliteBackend, TranscriptStore};

/// What a [`FakeProvider`] received on one call
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct Call {
    pub history: Vec<Message>,
    pub utterance: String,
}

/// Provider replaying scripted replies, optionally held at a gate
///
/// With a gate, each call records itself, signals `started`, and waits for
/// `release` before answering.
#[allow(dead_code)]
pub struct FakeProvider {
    replies: Mutex<VecDeque<std::result::Result<String, String>>>,
    calls: Arc<Mutex<Vec<Call>>>,
    gate: Option<Gate>,
    delay: Option<Duration>,
}

#[allow(dead_code)]
#[derive(Clone)]
pub struct Gate {
    pub started: Arc<Notify>,
    pub release: Arc<Notify>,
}

#[allow(dead_code)]
impl FakeProvider {
    pub fn new(replies: Vec<std::result::Result<String, String>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            calls: Arc::new(Mutex::new(Vec::new())),
            gate: None,
            delay: None,
        }
    }

    pub fn replying(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| Ok(t.to_string())).collect())
    }

    pub fn gated(mut self) -> (Self, Gate) {
        let gate = Gate {
            started: Arc::new(Notify::new()),
            release: Arc::new(Notify::new()),
        };
        self.gate = Some(gate.clone());
        (self, gate)
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Arc<Mutex<Vec<Call>>> {
        self.calls.clone()
    }
}

#[async_trait]
impl Provider for FakeProvider {
    async fn complete(
        &self,
        _system_instruction: &str,
        history: &[Message],
        utterance: &str,
    ) -> Result<CompletionResponse> {
        self.calls.lock().unwrap().push(Call {
            history: history.to_vec(),
            utterance: utterance.to_string(),
        });

        if let Some(gate) = &self.gate {
            gate.started.notify_one();
            gate.release.notified().await;
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let next = self.replies.lock().unwrap().pop_front();
        match next {
            Some(Ok(text)) => Ok(CompletionResponse::new(text)),
            Some(Err(reason)) => Err(MiguelbotError::Provider(reason).into()),
            None => Err(MiguelbotError::Provider("no scripted reply left".to_string()).into()),
        }
    }

    fn name(&self) -> &str {
        "fake"
    }
}

#[allow(dead_code)]
pub const TRIGGER: &str = "Hola MiguelBot, estoy listo para iniciar el diagnóstico.";

#[allow(dead_code)]
pub fn options() -> ChatOptions {
    ChatOptions {
        system_instruction: "Eres MiguelBot.".to_string(),
        trigger_message: TRIGGER.to_string(),
        request_timeout: Duration::from_secs(5),
    }
}

#[allow(dead_code)]
pub fn memory_store() -> TranscriptStore {
    TranscriptStore::new(Arc::new(MemoryBackend::new()))
}

#[allow(dead_code)]
pub fn sqlite_store(dir: &TempDir) -> TranscriptStore {
    let backend = SqliteBackend::new_with_path(dir.path().join("transcript.db"))
        .expect("failed to create sqlite storage with path");
    TranscriptStore::new(Arc::new(backend))
}

#[allow(dead_code)]
pub fn controller(store: &TranscriptStore, provider: FakeProvider) -> ChatController {
    ChatController::new(store.clone(), Arc::new(provider), options())
}

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}
