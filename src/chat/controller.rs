//! Chat controller state machine
//!
//! The controller ties the transcript store to a [`ChatSession`] and
//! enforces the presentation rules: resume without a network call,
//! bootstrap with a hidden trigger, one submission at a time, and a full
//! reset on request.

use crate::chat::ChatSession;
use crate::config::Config;
use crate::error::{MiguelbotError, Result};
use crate::prompts;
use crate::providers::{Message, Provider};
use crate::storage::TranscriptStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Fixed inputs of a conversation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatOptions {
    /// Persona and flow sent with every completion call
    pub system_instruction: String,
    /// Hidden utterance used to obtain the greeting on a fresh start
    pub trigger_message: String,
    /// Upper bound for one completion call
    pub request_timeout: Duration,
}

impl Default for ChatOptions {
    fn default() -> Self {
        Self {
            system_instruction: prompts::SYSTEM_INSTRUCTION.to_string(),
            trigger_message: prompts::DEFAULT_TRIGGER_MESSAGE.to_string(),
            request_timeout: Duration::from_secs(120),
        }
    }
}

impl ChatOptions {
    /// Builds options from a loaded configuration
    ///
    /// # Errors
    ///
    /// Returns error if the system instruction override file cannot be read
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            system_instruction: config.system_instruction()?,
            trigger_message: config.chat.trigger_message.clone(),
            request_timeout: config.provider.timeout(),
        })
    }
}

/// Where the controller is in its lifecycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatState {
    /// Created, `initialize` has not finished
    Initializing,
    /// Ready for input
    Idle,
    /// A completion call is in flight
    Submitting,
    /// The completion service cannot be used; carries the reason
    Unconfigured(String),
}

/// Result of `initialize` or `reset`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitOutcome {
    /// No credential; nothing else will happen
    Unconfigured(String),
    /// The stored transcript was restored without contacting the service
    Resumed { messages: Vec<Message> },
    /// A fresh session was started and greeted
    Bootstrapped { greeting: String },
    /// A fresh session could not obtain its greeting
    BootstrapFailed { message: String },
}

/// Why a submission was not attempted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The input was empty or whitespace
    EmptyInput,
    /// Another submission is in flight
    Busy,
    /// The controller is not initialized or not configured
    NotReady,
}

/// Result of `submit`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Nothing happened
    Ignored(IgnoreReason),
    /// The model replied with this text
    Replied(String),
    /// The call failed; this apology was recorded instead
    Failed(String),
}

enum Backend {
    Ready(Arc<dyn Provider>),
    Unconfigured(String),
}

struct Inner {
    state: ChatState,
    transcript: Vec<Message>,
    /// Index of the first message that belongs in the store; earlier ones are
    /// display-only notices
    persisted_from: usize,
    /// Taken out while a call is in flight
    session: Option<ChatSession>,
}

impl Inner {
    fn persisted(&self) -> &[Message] {
        &self.transcript[self.persisted_from..]
    }
}

/// Drives one conversation from startup to reset
///
/// The controller is `Send + Sync`; share it through an `Arc` to submit from
/// several tasks. At most one submission is in flight at any time and the
/// state lock is never held across the completion call.
///
/// Completion calls run on their own task. A caller that stops waiting
/// (a dropped future, an outer timeout) does not abandon the call: its reply
/// is still recorded and saved, and the controller returns to `Idle`.
pub struct ChatController {
    store: TranscriptStore,
    backend: Backend,
    options: ChatOptions,
    inner: Arc<Mutex<Inner>>,
}

impl ChatController {
    /// Creates a controller backed by `provider`
    pub fn new(store: TranscriptStore, provider: Arc<dyn Provider>, options: ChatOptions) -> Self {
        Self::with_backend(store, Backend::Ready(provider), options)
    }

    /// Creates a controller that has no usable provider
    ///
    /// `initialize` will report `Unconfigured(reason)` and never touch the
    /// store.
    pub fn unconfigured(
        store: TranscriptStore,
        reason: impl Into<String>,
        options: ChatOptions,
    ) -> Self {
        Self::with_backend(store, Backend::Unconfigured(reason.into()), options)
    }

    fn with_backend(store: TranscriptStore, backend: Backend, options: ChatOptions) -> Self {
        Self {
            store,
            backend,
            options,
            inner: Arc::new(Mutex::new(Inner {
                state: ChatState::Initializing,
                transcript: Vec::new(),
                persisted_from: 0,
                session: None,
            })),
        }
    }

    /// Returns true if `initialize` will have to contact the service
    ///
    /// False when unconfigured or when a non-empty transcript is stored.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the store cannot be read
    pub fn needs_bootstrap(&self) -> Result<bool> {
        if let Backend::Unconfigured(_) = self.backend {
            return Ok(false);
        }
        Ok(!matches!(self.store.load()?, Some(messages) if !messages.is_empty()))
    }

    /// Restores or starts the conversation
    ///
    /// # Errors
    ///
    /// Returns `SubmissionInProgress` if a call is in flight, or a storage
    /// error if the store cannot be read or written
    pub async fn initialize(&self) -> Result<InitOutcome> {
        let provider = match &self.backend {
            Backend::Unconfigured(reason) => {
                let mut inner = self.inner.lock().await;
                inner.state = ChatState::Unconfigured(reason.clone());
                info!("Chat is unconfigured: {}", reason);
                return Ok(InitOutcome::Unconfigured(reason.clone()));
            }
            Backend::Ready(provider) => provider.clone(),
        };

        let session = {
            let mut inner = self.inner.lock().await;
            if inner.state == ChatState::Submitting {
                return Err(MiguelbotError::SubmissionInProgress.into());
            }
            inner.state = ChatState::Initializing;
            inner.transcript.clear();
            inner.persisted_from = 0;
            inner.session = None;

            match self.store.load()? {
                Some(messages) if !messages.is_empty() => {
                    info!("Resuming conversation with {} messages", messages.len());
                    inner.session = Some(ChatSession::new(
                        provider,
                        self.options.system_instruction.clone(),
                        messages.clone(),
                        self.options.request_timeout,
                    ));
                    inner.transcript = messages.clone();
                    inner.state = ChatState::Idle;
                    return Ok(InitOutcome::Resumed { messages });
                }
                _ => {}
            }

            inner.state = ChatState::Submitting;
            ChatSession::new(
                provider,
                self.options.system_instruction.clone(),
                Vec::new(),
                self.options.request_timeout,
            )
        };

        info!("Starting a new conversation");
        let task = tokio::spawn(finish_bootstrap(
            self.inner.clone(),
            self.store.clone(),
            session,
            self.options.trigger_message.clone(),
        ));
        self.join(task).await
    }

    /// Sends one user message
    ///
    /// The user message is recorded and saved before the call. Afterwards
    /// the reply, or a fixed apology if the call failed, is recorded and
    /// saved too. The controller is back in `Idle` whatever happens.
    ///
    /// # Errors
    ///
    /// Returns a storage error if a save fails. The state has already been
    /// restored by then.
    pub async fn submit(&self, input: &str) -> Result<SubmitOutcome> {
        if input.trim().is_empty() {
            return Ok(SubmitOutcome::Ignored(IgnoreReason::EmptyInput));
        }

        let session = {
            let mut inner = self.inner.lock().await;
            match inner.state {
                ChatState::Idle => {}
                ChatState::Submitting => {
                    debug!("Ignoring submission while another is in flight");
                    return Ok(SubmitOutcome::Ignored(IgnoreReason::Busy));
                }
                _ => return Ok(SubmitOutcome::Ignored(IgnoreReason::NotReady)),
            }
            let session = match inner.session.take() {
                Some(session) => session,
                None => return Ok(SubmitOutcome::Ignored(IgnoreReason::NotReady)),
            };

            inner.transcript.push(Message::user(input));
            if let Err(e) = self.store.save(inner.persisted()) {
                error!("Failed to save transcript: {:#}", e);
                inner.transcript.pop();
                inner.session = Some(session);
                return Err(e);
            }
            inner.state = ChatState::Submitting;
            session
        };

        let task = tokio::spawn(finish_submit(
            self.inner.clone(),
            self.store.clone(),
            session,
            input.to_string(),
        ));
        self.join(task).await
    }

    /// Erases all progress and starts over
    ///
    /// # Errors
    ///
    /// Returns `SubmissionInProgress` while a call is in flight, or a
    /// storage error
    pub async fn reset(&self) -> Result<InitOutcome> {
        {
            let mut inner = self.inner.lock().await;
            if inner.state == ChatState::Submitting {
                return Err(MiguelbotError::SubmissionInProgress.into());
            }
            if let Backend::Ready(_) = self.backend {
                self.store.clear()?;
            }
            inner.transcript.clear();
            inner.persisted_from = 0;
            inner.session = None;
            inner.state = ChatState::Initializing;
        }
        info!("Conversation reset");
        self.initialize().await
    }

    /// Current lifecycle state
    pub async fn state(&self) -> ChatState {
        self.inner.lock().await.state.clone()
    }

    /// Messages shown to the user, in order
    pub async fn transcript(&self) -> Vec<Message> {
        self.inner.lock().await.transcript.clone()
    }

    /// Size of the model-side history, or `None` while no session is held
    pub async fn session_len(&self) -> Option<usize> {
        self.inner.lock().await.session.as_ref().map(ChatSession::len)
    }

    /// The store this controller persists to
    pub fn store(&self) -> &TranscriptStore {
        &self.store
    }

    /// Name and model of the provider, if configured
    pub fn provider_label(&self) -> Option<String> {
        match &self.backend {
            Backend::Ready(provider) => Some(format!("{} ({})", provider.name(), provider.model())),
            Backend::Unconfigured(_) => None,
        }
    }

    /// Waits for a completion task
    ///
    /// A task that panicked loses its session; the state still leaves
    /// `Submitting` so `reset` can recover.
    async fn join<T>(&self, task: JoinHandle<Result<T>>) -> Result<T> {
        match task.await {
            Ok(result) => result,
            Err(e) => {
                error!("Completion task failed: {}", e);
                let mut inner = self.inner.lock().await;
                if inner.state == ChatState::Submitting {
                    inner.state = ChatState::Idle;
                }
                Err(MiguelbotError::Provider(format!("completion task failed: {}", e)).into())
            }
        }
    }
}

async fn finish_bootstrap(
    inner: Arc<Mutex<Inner>>,
    store: TranscriptStore,
    mut session: ChatSession,
    trigger: String,
) -> Result<InitOutcome> {
    let result = session.submit(&trigger).await;

    let mut inner = inner.lock().await;
    inner.session = Some(session);
    inner.state = ChatState::Idle;

    match result {
        Ok(greeting) => {
            inner.transcript.push(Message::assistant(greeting.clone()));
            store.save(inner.persisted())?;
            Ok(InitOutcome::Bootstrapped { greeting })
        }
        Err(e) => {
            warn!("Failed to obtain greeting: {:#}", e);
            let message = prompts::BOOTSTRAP_FAILURE_MESSAGE.to_string();
            inner.transcript.push(Message::assistant(message.clone()));
            inner.persisted_from = inner.transcript.len();
            Ok(InitOutcome::BootstrapFailed { message })
        }
    }
}

async fn finish_submit(
    inner: Arc<Mutex<Inner>>,
    store: TranscriptStore,
    mut session: ChatSession,
    input: String,
) -> Result<SubmitOutcome> {
    let result = session.submit(&input).await;

    let mut inner = inner.lock().await;
    inner.session = Some(session);
    inner.state = ChatState::Idle;

    let outcome = match result {
        Ok(reply) => {
            inner.transcript.push(Message::assistant(reply.clone()));
            SubmitOutcome::Replied(reply)
        }
        Err(e) => {
            warn!("Submission failed: {:#}", e);
            let apology = prompts::SUBMIT_FAILURE_MESSAGE.to_string();
            inner.transcript.push(Message::assistant(apology.clone()));
            SubmitOutcome::Failed(apology)
        }
    };

    if let Err(e) = store.save(inner.persisted()) {
        error!("Failed to save transcript: {:#}", e);
        return Err(e);
    }
    Ok(outcome)
}
