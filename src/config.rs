//! Configuration management for MiguelBot
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{MiguelbotError, Result};
use crate::prompts;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable holding the Gemini API key
pub const API_KEY_ENV: &str = "API_KEY";

/// Fallback environment variable for the Gemini API key
pub const API_KEY_FALLBACK_ENV: &str = "GEMINI_API_KEY";

/// Main configuration structure for MiguelBot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Remote completion service settings
    #[serde(default)]
    pub provider: ProviderConfig,
    /// Chat flow settings
    #[serde(default)]
    pub chat: ChatConfig,
    /// Transcript storage settings
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Upper bound for a single completion call (seconds)
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Gemini API configuration
    #[serde(default)]
    pub gemini: GeminiConfig,
}

fn default_timeout() -> u64 {
    120
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            gemini: GeminiConfig::default(),
        }
    }
}

impl ProviderConfig {
    /// Completion timeout as a `Duration`
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Gemini provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// Model to use
    #[serde(default = "default_gemini_model")]
    pub model: String,

    /// API base URL (overridable for tests and proxies)
    #[serde(default = "default_gemini_api_base")]
    pub api_base: String,

    /// API key, only ever populated from the environment
    #[serde(skip)]
    pub api_key: Option<String>,
}

fn default_gemini_model() -> String {
    "gemini-3-pro-preview".to_string()
}

fn default_gemini_api_base() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            model: default_gemini_model(),
            api_base: default_gemini_api_base(),
            api_key: None,
        }
    }
}

/// Chat flow configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Hidden utterance sent once to obtain the greeting on a fresh start
    #[serde(default = "default_trigger_message")]
    pub trigger_message: String,

    /// Optional file replacing the built-in system instruction
    #[serde(default)]
    pub system_instruction_file: Option<PathBuf>,
}

fn default_trigger_message() -> String {
    prompts::DEFAULT_TRIGGER_MESSAGE.to_string()
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            trigger_message: default_trigger_message(),
            system_instruction_file: None,
        }
    }
}

/// Transcript storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Database file; defaults to the user's data directory
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Key of the single transcript record
    #[serde(default = "default_storage_key")]
    pub key: String,
}

fn default_storage_key() -> String {
    crate::storage::DEFAULT_STORAGE_KEY.to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: None,
            key: default_storage_key(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// A missing file is not an error: defaults are used and a warning is
    /// logged.
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| MiguelbotError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| MiguelbotError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        let api_key = std::env::var(API_KEY_ENV)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .or_else(|| {
                std::env::var(API_KEY_FALLBACK_ENV)
                    .ok()
                    .filter(|key| !key.trim().is_empty())
            });
        if api_key.is_some() {
            tracing::debug!("Gemini API key found in environment");
        }
        self.provider.gemini.api_key = api_key;

        if let Ok(model) = std::env::var("MIGUELBOT_MODEL") {
            self.provider.gemini.model = model;
        }

        if let Ok(api_base) = std::env::var("MIGUELBOT_API_BASE") {
            self.provider.gemini.api_base = api_base;
        }

        if let Ok(timeout) = std::env::var("MIGUELBOT_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse() {
                self.provider.timeout_seconds = value;
            } else {
                tracing::warn!("Invalid MIGUELBOT_TIMEOUT_SECONDS: {}", timeout);
            }
        }

        if let Ok(db_path) = std::env::var("MIGUELBOT_STORAGE_DB") {
            self.storage.path = Some(PathBuf::from(db_path));
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }

        if let Some(path) = &cli.storage_path {
            tracing::info!("Using storage DB override from CLI: {}", path.display());
            self.storage.path = Some(path.clone());
        }

        if let Some(crate::cli::Commands::Chat {
            model: Some(model), ..
        }) = &cli.command
        {
            self.provider.gemini.model = model.clone();
        }
    }

    /// Validate the configuration
    ///
    /// The API key is deliberately not checked here: its absence is
    /// reported by the chat controller as an unconfigured session.
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        if self.provider.gemini.model.trim().is_empty() {
            return Err(MiguelbotError::Config("Model name cannot be empty".to_string()).into());
        }

        match url::Url::parse(&self.provider.gemini.api_base) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
            Ok(url) => {
                return Err(MiguelbotError::Config(format!(
                    "api_base must use http or https, got: {}",
                    url.scheme()
                ))
                .into());
            }
            Err(e) => {
                return Err(MiguelbotError::Config(format!(
                    "Invalid api_base '{}': {}",
                    self.provider.gemini.api_base, e
                ))
                .into());
            }
        }

        if self.provider.timeout_seconds == 0 {
            return Err(
                MiguelbotError::Config("timeout_seconds must be greater than 0".to_string()).into(),
            );
        }

        if self.provider.timeout_seconds > 600 {
            return Err(MiguelbotError::Config(
                "timeout_seconds must be less than or equal to 600".to_string(),
            )
            .into());
        }

        if self.chat.trigger_message.trim().is_empty() {
            return Err(
                MiguelbotError::Config("chat.trigger_message cannot be empty".to_string()).into(),
            );
        }

        if self.storage.key.trim().is_empty() {
            return Err(MiguelbotError::Config("storage.key cannot be empty".to_string()).into());
        }

        Ok(())
    }

    /// The system instruction to send with every completion
    ///
    /// # Errors
    ///
    /// Returns error if a configured instruction file cannot be read
    pub fn system_instruction(&self) -> Result<String> {
        match &self.chat.system_instruction_file {
            Some(path) => std::fs::read_to_string(path).map_err(|e| {
                MiguelbotError::Config(format!(
                    "Failed to read system instruction file {}: {}",
                    path.display(),
                    e
                ))
                .into()
            }),
            None => Ok(prompts::SYSTEM_INSTRUCTION.to_string()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: ProviderConfig::default(),
            chat: ChatConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{assert_error_contains, create_test_file, temp_dir, test_config_yaml};
    use serial_test::serial;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.provider.gemini.model, "gemini-3-pro-preview");
        assert_eq!(config.provider.timeout_seconds, 120);
        assert_eq!(config.storage.key, "miguelbot_chat_session");
        assert!(config.provider.gemini.api_key.is_none());
    }

    #[test]
    fn test_config_validation_success() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_config_validation_empty_model() {
        let mut config = Config::default();
        config.provider.gemini.model = "  ".to_string();
        assert_error_contains(config.validate(), "Model name cannot be empty");
    }

    #[test]
    fn test_config_validation_bad_api_base() {
        let mut config = Config::default();
        config.provider.gemini.api_base = "not a url".to_string();
        assert_error_contains(config.validate(), "Invalid api_base");

        config.provider.gemini.api_base = "ftp://example.com".to_string();
        assert_error_contains(config.validate(), "must use http or https");
    }

    #[test]
    fn test_config_validation_timeout_bounds() {
        let mut config = Config::default();
        config.provider.timeout_seconds = 0;
        assert_error_contains(config.validate(), "greater than 0");

        config.provider.timeout_seconds = 601;
        assert_error_contains(config.validate(), "less than or equal to 600");

        config.provider.timeout_seconds = 600;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_empty_trigger() {
        let mut config = Config::default();
        config.chat.trigger_message = String::new();
        assert_error_contains(config.validate(), "trigger_message cannot be empty");
    }

    #[test]
    fn test_config_validation_empty_storage_key() {
        let mut config = Config::default();
        config.storage.key = String::new();
        assert_error_contains(config.validate(), "storage.key cannot be empty");
    }

    #[test]
    #[serial]
    fn test_load_reads_yaml_file() {
        std::env::remove_var(API_KEY_ENV);
        std::env::remove_var(API_KEY_FALLBACK_ENV);
        std::env::remove_var("MIGUELBOT_MODEL");
        std::env::remove_var("MIGUELBOT_API_BASE");
        std::env::remove_var("MIGUELBOT_TIMEOUT_SECONDS");
        std::env::remove_var("MIGUELBOT_STORAGE_DB");
        let dir = temp_dir();
        let path = create_test_file(&dir, "config.yaml", &test_config_yaml());

        let config = Config::load(path.to_str().unwrap(), &crate::cli::Cli::default()).unwrap();

        assert_eq!(config.provider.timeout_seconds, 30);
        assert_eq!(config.provider.gemini.model, "gemini-2.5-flash");
        assert_eq!(config.provider.gemini.api_base, "http://localhost:8089");
        assert_eq!(config.chat.trigger_message, "Hola, empecemos");
        assert_eq!(config.storage.key, "test_session");
        assert!(config.provider.gemini.api_key.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_file_rejects_malformed_yaml() {
        let dir = temp_dir();
        let path = create_test_file(&dir, "config.yaml", "provider: [unclosed");
        assert!(Config::from_file(path.to_str().unwrap()).is_err());
    }

    #[test]
    fn test_config_from_partial_yaml_uses_defaults() {
        let config: Config = serde_yaml::from_str("chat:\n  trigger_message: Hola\n").unwrap();
        assert_eq!(config.provider.gemini.model, "gemini-3-pro-preview");
        assert_eq!(config.storage.key, "miguelbot_chat_session");
    }

    #[test]
    fn test_api_key_never_serialized() {
        let mut config = Config::default();
        config.provider.gemini.api_key = Some("secret".to_string());
        let yaml = serde_yaml::to_string(&config).unwrap();
        assert!(!yaml.contains("secret"));
    }

    #[test]
    fn test_system_instruction_defaults_to_builtin() {
        let config = Config::default();
        let instruction = config.system_instruction().unwrap();
        assert!(instruction.contains("MiguelBot"));
    }

    #[test]
    fn test_system_instruction_from_file() {
        let dir = temp_dir();
        let path = create_test_file(&dir, "prompt.txt", "Eres un bot de prueba.");

        let mut config = Config::default();
        config.chat.system_instruction_file = Some(path);
        assert_eq!(config.system_instruction().unwrap(), "Eres un bot de prueba.");
    }

    #[test]
    fn test_system_instruction_missing_file_errors() {
        let mut config = Config::default();
        config.chat.system_instruction_file = Some(PathBuf::from("/nonexistent/prompt.txt"));
        assert_error_contains(
            config.system_instruction(),
            "Failed to read system instruction file",
        );
    }

    #[test]
    #[serial]
    fn test_load_nonexistent_file_uses_defaults() {
        std::env::remove_var(API_KEY_ENV);
        std::env::remove_var(API_KEY_FALLBACK_ENV);
        let cli = crate::cli::Cli::default();

        let config = Config::load("nonexistent.yaml", &cli).unwrap();
        assert_eq!(config.provider.gemini.model, "gemini-3-pro-preview");
        assert!(config.provider.gemini.api_key.is_none());
    }

    #[test]
    #[serial]
    fn test_apply_env_vars_reads_api_key_and_fallback() {
        std::env::remove_var(API_KEY_ENV);
        std::env::set_var(API_KEY_FALLBACK_ENV, "fallback-key");
        let mut config = Config::default();
        config.apply_env_vars();
        assert_eq!(config.provider.gemini.api_key.as_deref(), Some("fallback-key"));

        std::env::set_var(API_KEY_ENV, "primary-key");
        config.apply_env_vars();
        assert_eq!(config.provider.gemini.api_key.as_deref(), Some("primary-key"));

        std::env::remove_var(API_KEY_ENV);
        std::env::remove_var(API_KEY_FALLBACK_ENV);
    }

    #[test]
    #[serial]
    fn test_apply_env_vars_ignores_blank_api_key() {
        std::env::set_var(API_KEY_ENV, "   ");
        std::env::remove_var(API_KEY_FALLBACK_ENV);
        let mut config = Config::default();
        config.apply_env_vars();
        assert!(config.provider.gemini.api_key.is_none());
        std::env::remove_var(API_KEY_ENV);
    }

    #[test]
    #[serial]
    fn test_apply_env_vars_overrides_provider_fields() {
        std::env::set_var("MIGUELBOT_MODEL", "gemini-2.5-pro");
        std::env::set_var("MIGUELBOT_TIMEOUT_SECONDS", "45");
        std::env::set_var("MIGUELBOT_STORAGE_DB", "/tmp/miguelbot-test.db");

        let mut config = Config::default();
        config.apply_env_vars();
        assert_eq!(config.provider.gemini.model, "gemini-2.5-pro");
        assert_eq!(config.provider.timeout_seconds, 45);
        assert_eq!(
            config.storage.path,
            Some(PathBuf::from("/tmp/miguelbot-test.db"))
        );

        std::env::remove_var("MIGUELBOT_MODEL");
        std::env::remove_var("MIGUELBOT_TIMEOUT_SECONDS");
        std::env::remove_var("MIGUELBOT_STORAGE_DB");
    }

    #[test]
    #[serial]
    fn test_apply_env_vars_invalid_timeout_keeps_default() {
        std::env::set_var("MIGUELBOT_TIMEOUT_SECONDS", "soon");
        let mut config = Config::default();
        config.apply_env_vars();
        assert_eq!(config.provider.timeout_seconds, 120);
        std::env::remove_var("MIGUELBOT_TIMEOUT_SECONDS");
    }

    #[test]
    fn test_cli_overrides_storage_path_and_model() {
        let cli = crate::cli::Cli {
            config: None,
            verbose: false,
            storage_path: Some(PathBuf::from("/tmp/override.db")),
            command: Some(crate::cli::Commands::Chat {
                model: Some("gemini-2.5-flash".to_string()),
            }),
        };

        let mut config = Config::default();
        config.apply_cli_overrides(&cli);
        assert_eq!(config.storage.path, Some(PathBuf::from("/tmp/override.db")));
        assert_eq!(config.provider.gemini.model, "gemini-2.5-flash");
    }
}
