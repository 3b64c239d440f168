//! Base provider trait and common types for MiguelBot
//!
//! This module defines the Provider trait implemented by the remote
//! completion service, along with the transcript message type and the
//! response structures it returns.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Who authored a message
///
/// Serialized as `"user"` / `"assistant"`. Records written by the original
/// browser widget used `"model"` for the assistant, which is still accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    /// The person taking the diagnostic
    User,
    /// The remote model speaking as MiguelBot
    #[serde(alias = "model")]
    Assistant,
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

/// One turn in the conversation
///
/// Messages are append-only: once created they are never mutated.
///
/// # Examples
///
/// ```
/// use miguelbot::providers::{Message, Speaker};
///
/// let msg = Message::user("Hola");
/// assert_eq!(msg.speaker, Speaker::User);
/// assert_eq!(msg.content, "Hola");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Author of the message
    #[serde(alias = "role")]
    pub speaker: Speaker,
    /// Message text, possibly with light markup from the assistant
    #[serde(alias = "text")]
    pub content: String,
}

impl Message {
    /// Creates a new user message
    ///
    /// # Arguments
    ///
    /// * `content` - The message content
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::User,
            content: content.into(),
        }
    }

    /// Creates a new assistant message
    ///
    /// # Arguments
    ///
    /// * `content` - The message content
    ///
    /// # Examples
    ///
    /// ```
    /// use miguelbot::providers::{Message, Speaker};
    ///
    /// let msg = Message::assistant("¡Hola!");
    /// assert_eq!(msg.speaker, Speaker::Assistant);
    /// ```
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Assistant,
            content: content.into(),
        }
    }

    /// Returns true if this message was written by the user
    pub fn is_user(&self) -> bool {
        self.speaker == Speaker::User
    }
}

/// Token usage information from a completion
///
/// Tracks the number of tokens used in prompts and completions,
/// as reported by the AI provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Number of tokens in the prompt
    pub prompt_tokens: usize,
    /// Number of tokens in the completion
    pub completion_tokens: usize,
    /// Total tokens used (prompt + completion)
    pub total_tokens: usize,
}

impl TokenUsage {
    /// Create a new TokenUsage instance
    ///
    /// # Examples
    ///
    /// ```
    /// use miguelbot::providers::TokenUsage;
    ///
    /// let usage = TokenUsage::new(100, 50);
    /// assert_eq!(usage.total_tokens, 150);
    /// ```
    pub fn new(prompt_tokens: usize, completion_tokens: usize) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

/// Completion response with generated text and optional token usage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionResponse {
    /// The generated text
    pub text: String,
    /// Optional token usage information
    pub usage: Option<TokenUsage>,
}

impl CompletionResponse {
    /// Create a new CompletionResponse without usage data
    ///
    /// # Examples
    ///
    /// ```
    /// use miguelbot::providers::CompletionResponse;
    ///
    /// let response = CompletionResponse::new("¡Hola!");
    /// assert!(response.usage.is_none());
    /// ```
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            usage: None,
        }
    }

    /// Create a new CompletionResponse with token usage
    pub fn with_usage(text: impl Into<String>, usage: TokenUsage) -> Self {
        Self {
            text: text.into(),
            usage: Some(usage),
        }
    }
}

/// Provider trait for the remote completion service
///
/// A provider receives the fixed system instruction, the role-tagged
/// history accumulated so far, and the new utterance, and returns the
/// generated reply. It keeps no conversation state of its own; the
/// [`ChatSession`](crate::chat::ChatSession) owns the history.
///
/// # Examples
///
/// ```no_run
/// use miguelbot::providers::{CompletionResponse, Message, Provider};
/// use miguelbot::error::Result;
/// use async_trait::async_trait;
///
/// struct EchoProvider;
///
/// #[async_trait]
/// impl Provider for EchoProvider {
///     async fn complete(
///         &self,
///         _system_instruction: &str,
///         _history: &[Message],
///         utterance: &str,
///     ) -> Result<CompletionResponse> {
///         Ok(CompletionResponse::new(utterance))
///     }
/// }
/// ```
#[async_trait]
pub trait Provider: Send + Sync {
    /// Generates the assistant's reply to `utterance`
    ///
    /// # Arguments
    ///
    /// * `system_instruction` - Behavioral instruction sent with every call
    /// * `history` - Prior turns, oldest first
    /// * `utterance` - The new user utterance
    ///
    /// # Errors
    ///
    /// Returns error if the API call fails or the response carries no text
    async fn complete(
        &self,
        system_instruction: &str,
        history: &[Message],
        utterance: &str,
    ) -> Result<CompletionResponse>;

    /// Short provider identifier used in logs and status output
    fn name(&self) -> &str {
        "unknown"
    }

    /// Name of the model this provider talks to
    fn model(&self) -> String {
        String::from("unknown")
    }
}
