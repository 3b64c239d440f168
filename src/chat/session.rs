//! Live conversation context with the completion service

use crate::error::{MiguelbotError, Result};
use crate::providers::{Message, Provider};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// A conversation with the remote model
///
/// The session owns the role-tagged history the model has seen. The
/// provider itself is stateless, so every call carries the system
/// instruction and the full history.
///
/// # Examples
///
/// ```no_run
/// use miguelbot::chat::ChatSession;
/// use std::time::Duration;
///
/// # async fn example(provider: std::sync::Arc<dyn miguelbot::providers::Provider>) -> miguelbot::error::Result<()> {
/// let mut session = ChatSession::new(provider, "Eres MiguelBot.", Vec::new(), Duration::from_secs(30));
/// let _reply = session.submit("Hola").await?;
/// assert_eq!(session.len(), 2);
/// # Ok(())
/// # }
/// ```
pub struct ChatSession {
    provider: Arc<dyn Provider>,
    system_instruction: String,
    history: Vec<Message>,
    timeout: Duration,
}

impl ChatSession {
    /// Creates a session primed with `prior_history`
    ///
    /// No network call is made; a resumed session starts from the stored
    /// transcript exactly as it was saved.
    ///
    /// # Arguments
    ///
    /// * `provider` - Completion service
    /// * `system_instruction` - Fixed persona and flow sent with every call
    /// * `prior_history` - Messages the model should treat as already said
    /// * `timeout` - Upper bound for a single completion call
    pub fn new(
        provider: Arc<dyn Provider>,
        system_instruction: impl Into<String>,
        prior_history: Vec<Message>,
        timeout: Duration,
    ) -> Self {
        Self {
            provider,
            system_instruction: system_instruction.into(),
            history: prior_history,
            timeout,
        }
    }

    /// Sends `utterance` and returns the model's reply
    ///
    /// On success the utterance and the reply are appended to the session
    /// history. On failure the history is left untouched and the caller
    /// decides what to show; nothing is retried here.
    ///
    /// # Errors
    ///
    /// Returns the provider's error, or `MiguelbotError::Timeout` if the
    /// call does not finish within the session timeout
    pub async fn submit(&mut self, utterance: &str) -> Result<String> {
        debug!(
            "Submitting utterance ({} chars) with {} prior messages",
            utterance.chars().count(),
            self.history.len()
        );

        let call = self
            .provider
            .complete(&self.system_instruction, &self.history, utterance);

        let response = match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result?,
            Err(_) => {
                warn!("Completion timed out after {:?}", self.timeout);
                return Err(MiguelbotError::Timeout(self.timeout).into());
            }
        };

        self.history.push(Message::user(utterance));
        self.history.push(Message::assistant(response.text.clone()));

        Ok(response.text)
    }

    /// Messages the model has seen so far
    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// Number of messages in the session history
    pub fn len(&self) -> usize {
        self.history.len()
    }

    /// Returns true if the session has no history yet
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}
