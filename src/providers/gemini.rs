//! Gemini provider implementation for MiguelBot
//!
//! This module implements the Provider trait for Google's Gemini
//! `generateContent` endpoint. Each call is stateless: the system
//! instruction and the full history travel with every request.

use crate::config::GeminiConfig;
use crate::error::{MiguelbotError, Result};
use crate::providers::{CompletionResponse, Message, Provider, Speaker, TokenUsage};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Gemini API provider
///
/// # Examples
///
/// ```no_run
/// use miguelbot::config::GeminiConfig;
/// use miguelbot::providers::{GeminiProvider, Provider};
/// use std::time::Duration;
///
/// # async fn example() -> miguelbot::error::Result<()> {
/// let config = GeminiConfig {
///     api_key: Some("my-key".to_string()),
///     ..Default::default()
/// };
/// let provider = GeminiProvider::new(config, Duration::from_secs(60))?;
/// let reply = provider.complete("Eres MiguelBot.", &[], "Hola").await?;
/// println!("{}", reply.text);
/// # Ok(())
/// # }
/// ```
pub struct GeminiProvider {
    client: Client,
    config: GeminiConfig,
    api_key: String,
}

/// Request body for `generateContent`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    system_instruction: GeminiContent,
    contents: Vec<GeminiContent>,
}

/// A role-tagged block of parts
#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

/// One part of a content block
#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: String,
    /// Set on reasoning parts emitted by thinking models
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    thought: bool,
}

/// Response body from `generateContent`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    usage_metadata: Option<GeminiUsage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    #[serde(default)]
    prompt_token_count: usize,
    #[serde(default)]
    candidates_token_count: usize,
}

impl GeminiContent {
    fn text(role: Option<&str>, text: &str) -> Self {
        Self {
            role: role.map(str::to_string),
            parts: vec![GeminiPart {
                text: text.to_string(),
                thought: false,
            }],
        }
    }
}

/// Wire role for a transcript speaker
fn gemini_role(speaker: Speaker) -> &'static str {
    match speaker {
        Speaker::User => "user",
        Speaker::Assistant => "model",
    }
}

impl GeminiProvider {
    /// Create a new Gemini provider
    ///
    /// # Arguments
    ///
    /// * `config` - Gemini configuration; `api_key` must be set
    /// * `timeout` - HTTP timeout for each request
    ///
    /// # Errors
    ///
    /// Returns `MissingCredentials` if no API key is configured, or a
    /// provider error if the HTTP client cannot be built
    pub fn new(config: GeminiConfig, timeout: Duration) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| MiguelbotError::MissingCredentials("gemini".to_string()))?;

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("miguelbot/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| MiguelbotError::Provider(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!(
            "Initialized Gemini provider: api_base={}, model={}",
            config.api_base,
            config.model
        );

        Ok(Self {
            client,
            config,
            api_key,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.api_base.trim_end_matches('/'),
            self.config.model
        )
    }

    /// Build the request body from the session state
    fn build_request(
        &self,
        system_instruction: &str,
        history: &[Message],
        utterance: &str,
    ) -> GeminiRequest {
        let mut contents: Vec<GeminiContent> = history
            .iter()
            .map(|m| GeminiContent::text(Some(gemini_role(m.speaker)), &m.content))
            .collect();
        contents.push(GeminiContent::text(Some("user"), utterance));

        GeminiRequest {
            system_instruction: GeminiContent::text(None, system_instruction),
            contents,
        }
    }

    /// Extract the reply text and usage from a parsed response
    fn convert_response(response: GeminiResponse) -> Result<CompletionResponse> {
        let candidate = response.candidates.into_iter().next().ok_or_else(|| {
            MiguelbotError::Provider("Gemini response contained no candidates".to_string())
        })?;

        let text: String = candidate
            .content
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter(|part| !part.thought)
                    .map(|part| part.text)
                    .collect()
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(MiguelbotError::Provider(format!(
                "Gemini response contained no text (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            ))
            .into());
        }

        Ok(match response.usage_metadata {
            Some(usage) => CompletionResponse::with_usage(
                text,
                TokenUsage::new(usage.prompt_token_count, usage.candidates_token_count),
            ),
            None => CompletionResponse::new(text),
        })
    }
}

#[async_trait]
impl Provider for GeminiProvider {
    async fn complete(
        &self,
        system_instruction: &str,
        history: &[Message],
        utterance: &str,
    ) -> Result<CompletionResponse> {
        let request = self.build_request(system_instruction, history, utterance);

        tracing::debug!(
            "Sending Gemini request: {} contents, model={}",
            request.contents.len(),
            self.config.model
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Gemini request failed: {}", e);
                MiguelbotError::Provider(format!("Gemini request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Gemini returned error {}: {}", status, error_text);
            if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                return Err(MiguelbotError::Authentication(format!(
                    "Gemini rejected the API key ({})",
                    status
                ))
                .into());
            }
            return Err(MiguelbotError::Provider(format!(
                "Gemini returned error {}: {}",
                status, error_text
            ))
            .into());
        }

        let gemini_response: GeminiResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse Gemini response: {}", e);
            MiguelbotError::Provider(format!("Failed to parse Gemini response: {}", e))
        })?;

        let completion = Self::convert_response(gemini_response)?;
        if let Some(usage) = completion.usage {
            tracing::debug!(
                "Gemini usage: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens,
                usage.completion_tokens
            );
        }

        Ok(completion)
    }

    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> String {
        self.config.model.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> GeminiConfig {
        GeminiConfig {
            model: "gemini-test".to_string(),
            api_base: "http://localhost:9999/".to_string(),
            api_key: Some("test-key".to_string()),
        }
    }

    fn provider() -> GeminiProvider {
        GeminiProvider::new(test_config(), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_new_requires_api_key() {
        let mut config = test_config();
        config.api_key = None;
        let err = GeminiProvider::new(config, Duration::from_secs(5))
            .err()
            .expect("missing key must fail");
        assert!(matches!(
            err.downcast_ref::<MiguelbotError>(),
            Some(MiguelbotError::MissingCredentials(_))
        ));
    }

    #[test]
    fn test_new_rejects_blank_api_key() {
        let mut config = test_config();
        config.api_key = Some("  ".to_string());
        assert!(GeminiProvider::new(config, Duration::from_secs(5)).is_err());
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        assert_eq!(
            provider().endpoint(),
            "http://localhost:9999/v1beta/models/gemini-test:generateContent"
        );
    }

    #[test]
    fn test_build_request_maps_roles_and_appends_utterance() {
        let history = vec![Message::assistant("¡Hola!"), Message::user("Ana")];
        let request = provider().build_request("sys", &history, "CBTis 168");
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["systemInstruction"]["parts"][0]["text"], "sys");
        assert!(json["systemInstruction"].get("role").is_none());
        assert_eq!(json["contents"][0]["role"], "model");
        assert_eq!(json["contents"][1]["role"], "user");
        assert_eq!(json["contents"][2]["role"], "user");
        assert_eq!(json["contents"][2]["parts"][0]["text"], "CBTis 168");
        assert!(json["contents"][0]["parts"][0].get("thought").is_none());
    }

    #[test]
    fn test_convert_response_joins_text_and_skips_thoughts() {
        let response: GeminiResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        {"text": "pensando...", "thought": true},
                        {"text": "¡Hola! "},
                        {"text": "Soy MiguelBot."}
                    ]
                },
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 5, "totalTokenCount": 17}
        }))
        .unwrap();

        let completion = GeminiProvider::convert_response(response).unwrap();
        assert_eq!(completion.text, "¡Hola! Soy MiguelBot.");
        assert_eq!(completion.usage, Some(TokenUsage::new(12, 5)));
    }

    #[test]
    fn test_convert_response_without_candidates_fails() {
        let response: GeminiResponse = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(GeminiProvider::convert_response(response).is_err());
    }

    #[test]
    fn test_convert_response_with_empty_text_fails() {
        let response: GeminiResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{"finishReason": "SAFETY"}]
        }))
        .unwrap();
        let err = GeminiProvider::convert_response(response).unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }

    #[test]
    fn test_provider_identity() {
        let provider = provider();
        assert_eq!(provider.name(), "gemini");
        assert_eq!(provider.model(), "gemini-test");
    }
}
