//! Provider module for MiguelBot
//!
//! This module contains the completion provider abstraction and the
//! Gemini implementation.

pub mod base;
pub mod gemini;

pub use base::{CompletionResponse, Message, Provider, Speaker, TokenUsage};
pub use gemini::GeminiProvider;

use crate::config::ProviderConfig;
use crate::error::Result;
use std::sync::Arc;

/// Create a provider instance based on configuration
///
/// # Arguments
///
/// * `config` - Provider configuration
///
/// # Returns
///
/// Returns a shared provider instance
///
/// # Errors
///
/// Returns `MissingCredentials` if no API key is configured, or a provider
/// error if the HTTP client cannot be initialized
///
/// # Examples
///
/// ```
/// use miguelbot::config::ProviderConfig;
/// use miguelbot::providers::create_provider;
///
/// let mut config = ProviderConfig::default();
/// config.gemini.api_key = Some("key".to_string());
/// let provider = create_provider(&config).unwrap();
/// assert_eq!(provider.name(), "gemini");
/// ```
pub fn create_provider(config: &ProviderConfig) -> Result<Arc<dyn Provider>> {
    Ok(Arc::new(GeminiProvider::new(
        config.gemini.clone(),
        config.timeout(),
    )?))
}
