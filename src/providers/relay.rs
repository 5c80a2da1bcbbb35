//! Application-relay completion provider
//!
//! Posts `{message, api_key}` to the application's `/api/chat` endpoint.
//! The relay performs its own knowledge retrieval server-side, so only the
//! newest user message is transmitted; the response envelope is the
//! provider response forwarded verbatim.

use crate::config::RelayConfig;
use crate::error::{Result, TopikaError};
use crate::providers::base::CompletionEnvelope;
use crate::providers::{ChatMessage, Completion, CompletionProvider};

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

/// Relay completion client
pub struct RelayProvider {
    client: Client,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct RelayRequest<'a> {
    message: &'a str,
    api_key: &'a str,
}

impl RelayProvider {
    /// Create a new relay provider
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn new(config: RelayConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("topika/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TopikaError::Provider(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!("Initialized relay provider: base_url={}", config.base_url);

        Ok(Self {
            client,
            base_url: config.base_url,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/api/chat", self.base_url.trim_end_matches('/'))
    }

    /// Extract the newest user message from the message array
    fn latest_user_message(messages: &[ChatMessage]) -> Result<&str> {
        messages
            .iter()
            .rev()
            .find(|m| m.role == "user")
            .map(|m| m.content.as_str())
            .ok_or_else(|| {
                TopikaError::Provider("No user message to relay".to_string()).into()
            })
    }
}

#[async_trait]
impl CompletionProvider for RelayProvider {
    async fn complete(&self, api_key: &str, messages: &[ChatMessage]) -> Result<Completion> {
        let message = Self::latest_user_message(messages)?;
        let url = self.endpoint();
        tracing::debug!("Relaying message to {}", url);

        let response = self
            .client
            .post(&url)
            .json(&RelayRequest { message, api_key })
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Relay request failed: {}", e);
                TopikaError::Provider(format!("Failed to reach relay endpoint: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Relay endpoint returned {}: {}", status, body);
            return Err(
                TopikaError::Provider(format!("Relay endpoint returned {}", status)).into(),
            );
        }

        let envelope: CompletionEnvelope = response.json().await.map_err(|e| {
            TopikaError::Provider(format!("Failed to parse relay response: {}", e))
        })?;

        envelope.into_completion()
    }
}
