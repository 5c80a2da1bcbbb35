//! Configuration management for Topika
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{Result, TopikaError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

/// Main configuration structure for Topika
///
/// Holds everything the client needs: the knowledge collection endpoint,
/// the completion provider settings, chat behavior, and the optional
/// speech synthesis endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Knowledge collection endpoint configuration
    #[serde(default)]
    pub knowledge: KnowledgeConfig,

    /// Completion provider configuration (openai, relay)
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Chat behavior configuration
    #[serde(default)]
    pub chat: ChatConfig,

    /// Speech synthesis configuration
    #[serde(default)]
    pub speech: SpeechConfig,
}

/// Knowledge collection endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    /// Base URL of the service exposing `/api/knowledge`
    #[serde(default = "default_knowledge_base_url")]
    pub base_url: String,
}

fn default_knowledge_base_url() -> String {
    "http://localhost:5001".to_string()
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            base_url: default_knowledge_base_url(),
        }
    }
}

/// Completion provider configuration
///
/// Specifies which completion client to use and its settings. The
/// `openai` client speaks the provider-native message-array protocol
/// directly; the `relay` client posts `{message, api_key}` to an
/// application endpoint that performs retrieval server-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Type of provider to use ("openai" or "relay")
    #[serde(rename = "type", default = "default_provider_type")]
    pub provider_type: String,

    /// Direct provider configuration
    #[serde(default)]
    pub openai: OpenAiConfig,

    /// Application relay configuration
    #[serde(default)]
    pub relay: RelayConfig,
}

fn default_provider_type() -> String {
    "openai".to_string()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider_type: default_provider_type(),
            openai: OpenAiConfig::default(),
            relay: RelayConfig::default(),
        }
    }
}

/// Direct completion provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    /// API base URL (override for tests and local mocks)
    #[serde(default = "default_openai_api_base")]
    pub api_base: String,

    /// Model identifier sent with every completion request
    #[serde(default = "default_model")]
    pub model: String,
}

fn default_openai_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_base: default_openai_api_base(),
            model: default_model(),
        }
    }
}

/// Application relay endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Base URL of the service exposing `/api/chat`
    #[serde(default = "default_knowledge_base_url")]
    pub base_url: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            base_url: default_knowledge_base_url(),
        }
    }
}

/// Chat behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Maximum tokens requested per completion
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature for completions
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Number of retained history entries sent with each request
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Maximum knowledge entries retrieved as context per message
    #[serde(default = "default_max_context_entries")]
    pub max_context_entries: usize,
}

fn default_max_tokens() -> u32 {
    1000
}

fn default_temperature() -> f32 {
    0.7
}

fn default_history_limit() -> usize {
    10
}

fn default_max_context_entries() -> usize {
    3
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            history_limit: default_history_limit(),
            max_context_entries: default_max_context_entries(),
        }
    }
}

/// Speech synthesis configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// Base URL of the service exposing `/api/voices` and `/api/speech`
    #[serde(default = "default_knowledge_base_url")]
    pub base_url: String,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            base_url: default_knowledge_base_url(),
        }
    }
}

impl Config {
    /// Load configuration from a file with environment and CLI overrides
    ///
    /// Falls back to defaults when the file does not exist. Environment
    /// variables are applied after the file, CLI overrides last.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the YAML configuration file
    /// * `cli` - Parsed CLI arguments used for overrides
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
            .map_err(|e| TopikaError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| TopikaError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(provider_type) = std::env::var("TOPIKA_PROVIDER") {
            self.provider.provider_type = provider_type;
        }
        if let Ok(base_url) = std::env::var("TOPIKA_KNOWLEDGE_URL") {
            self.knowledge.base_url = base_url;
        }
        if let Ok(api_base) = std::env::var("TOPIKA_OPENAI_API_BASE") {
            self.provider.openai.api_base = api_base;
        }
        if let Ok(model) = std::env::var("TOPIKA_MODEL") {
            self.provider.openai.model = model;
        }
        if let Ok(base_url) = std::env::var("TOPIKA_RELAY_URL") {
            self.provider.relay.base_url = base_url;
        }
        if let Ok(base_url) = std::env::var("TOPIKA_SPEECH_URL") {
            self.speech.base_url = base_url;
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(url) = &cli.knowledge_url {
            self.knowledge.base_url = url.clone();
        }
    }

    /// Validate the configuration
    ///
    /// Checks the provider type, endpoint URLs, and numeric ranges before
    /// any command runs.
    ///
    /// # Errors
    ///
    /// Returns `TopikaError::Config` describing the first invalid field.
    pub fn validate(&self) -> Result<()> {
        match self.provider.provider_type.as_str() {
            "openai" | "relay" => {}
            other => {
                return Err(TopikaError::Config(format!(
                    "Unknown provider type: {} (expected \"openai\" or \"relay\")",
                    other
                ))
                .into());
            }
        }

        for (name, value) in [
            ("knowledge.base_url", &self.knowledge.base_url),
            ("provider.openai.api_base", &self.provider.openai.api_base),
            ("provider.relay.base_url", &self.provider.relay.base_url),
            ("speech.base_url", &self.speech.base_url),
        ] {
            Url::parse(value)
                .map_err(|e| TopikaError::Config(format!("Invalid {}: {}", name, e)))?;
        }

        if self.provider.openai.model.trim().is_empty() {
            return Err(TopikaError::Config("provider.openai.model is empty".to_string()).into());
        }
        if self.chat.max_tokens == 0 {
            return Err(TopikaError::Config("chat.max_tokens must be positive".to_string()).into());
        }
        if !(0.0..=2.0).contains(&self.chat.temperature) {
            return Err(TopikaError::Config(
                "chat.temperature must be between 0.0 and 2.0".to_string(),
            )
            .into());
        }
        if self.chat.history_limit == 0 {
            return Err(
                TopikaError::Config("chat.history_limit must be positive".to_string()).into(),
            );
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            knowledge: KnowledgeConfig::default(),
            provider: ProviderConfig::default(),
            chat: ChatConfig::default(),
            speech: SpeechConfig::default(),
        }
    }
}
