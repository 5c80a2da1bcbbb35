//! Direct completion provider speaking the provider-native protocol
//!
//! Sends the full message array (system instruction + retained history) to
//! `{api_base}/chat/completions` with bearer authentication and the fixed
//! request configuration `{model, max_tokens, temperature}`.

use crate::config::OpenAiConfig;
use crate::error::{Result, TopikaError};
use crate::providers::base::CompletionEnvelope;
use crate::providers::{ChatMessage, Completion, CompletionProvider};

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

/// Provider-native completion client
pub struct OpenAiProvider {
    client: Client,
    config: OpenAiConfig,
    max_tokens: u32,
    temperature: f32,
}

/// Request structure for the chat completions endpoint
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    temperature: f32,
}

impl OpenAiProvider {
    /// Create a new provider instance
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("topika/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TopikaError::Provider(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!(
            "Initialized openai provider: api_base={}, model={}",
            config.api_base,
            config.model
        );

        Ok(Self {
            client,
            config,
            max_tokens: 1000,
            temperature: 0.7,
        })
    }

    /// Override the request configuration (max_tokens, temperature)
    pub fn with_request_options(mut self, max_tokens: u32, temperature: f32) -> Self {
        self.max_tokens = max_tokens;
        self.temperature = temperature;
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.api_base.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    async fn complete(&self, api_key: &str, messages: &[ChatMessage]) -> Result<Completion> {
        let request = ChatCompletionRequest {
            model: &self.config.model,
            messages,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let url = self.endpoint();
        tracing::debug!("Requesting completion from {} ({} messages)", url, messages.len());

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Completion request failed: {}", e);
                TopikaError::Provider(format!("Failed to reach completion endpoint: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Completion endpoint returned {}: {}", status, body);
            return Err(
                TopikaError::Provider(format!("Completion endpoint returned {}", status)).into(),
            );
        }

        let envelope: CompletionEnvelope = response.json().await.map_err(|e| {
            TopikaError::Provider(format!("Failed to parse completion response: {}", e))
        })?;

        envelope.into_completion()
    }
}
