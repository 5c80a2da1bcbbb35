//! Base provider trait and common types for completion clients
//!
//! Two completion endpoint shapes exist: the provider-native message-array
//! protocol spoken directly, and an application relay accepting a single
//! `{message, api_key}` payload. Both sit behind [`CompletionProvider`].

use crate::config::ProviderConfig;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Message structure for completion requests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender (system, user, assistant)
    pub role: String,
    /// Content of the message
    pub content: String,
}

impl ChatMessage {
    /// Creates a new system message
    ///
    /// # Examples
    ///
    /// ```
    /// use topika::providers::ChatMessage;
    ///
    /// let msg = ChatMessage::system("You are a helpful assistant");
    /// assert_eq!(msg.role, "system");
    /// ```
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    /// Creates a new user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    /// Creates a new assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// Token usage information from a completion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Number of tokens in the prompt
    pub prompt_tokens: u32,
    /// Number of tokens in the completion
    pub completion_tokens: u32,
}

impl TokenUsage {
    /// Create a new TokenUsage instance
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
        }
    }
}

/// A successful completion: reply text plus optional token usage
#[derive(Debug, Clone)]
pub struct Completion {
    /// The assistant's reply text
    pub content: String,
    /// Token usage when the endpoint reports it
    pub usage: Option<TokenUsage>,
}

/// Provider trait for completion clients
///
/// The message slice is one system instruction (embedding the retrieved
/// context block) followed by the retained history, which already ends
/// with the newest user message.
///
/// # Errors
///
/// `complete` must surface transport failures, non-success statuses, and
/// application-level error payloads as errors, never silently.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Request a completion for the given messages
    async fn complete(&self, api_key: &str, messages: &[ChatMessage]) -> Result<Completion>;
}

/// Create a provider instance by type name
///
/// The direct provider picks up the chat request options (`max_tokens`,
/// `temperature`); the relay carries no request configuration of its own.
///
/// # Arguments
///
/// * `provider_type` - "openai" or "relay"
/// * `config` - Provider configuration section
/// * `chat` - Chat behavior configuration
///
/// # Errors
///
/// Returns error for unknown provider types
pub fn create_provider(
    provider_type: &str,
    config: &ProviderConfig,
    chat: &crate::config::ChatConfig,
) -> Result<Box<dyn CompletionProvider>> {
    match provider_type {
        "openai" => Ok(Box::new(
            crate::providers::OpenAiProvider::new(config.openai.clone())?
                .with_request_options(chat.max_tokens, chat.temperature),
        )),
        "relay" => Ok(Box::new(crate::providers::RelayProvider::new(
            config.relay.clone(),
        )?)),
        other => Err(crate::error::TopikaError::Provider(format!(
            "Unknown provider type: {}",
            other
        ))
        .into()),
    }
}

/// Wire format of the completion response envelope
///
/// Shared by both providers: the relay forwards the provider response
/// verbatim, so `{choices, usage}` and the body-level `{error}` field
/// parse identically.
#[derive(Debug, Deserialize)]
pub(crate) struct CompletionEnvelope {
    #[serde(default)]
    pub choices: Vec<CompletionChoice>,
    #[serde(default)]
    pub usage: Option<TokenUsage>,
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CompletionChoice {
    pub message: CompletionChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CompletionChoiceMessage {
    #[serde(default)]
    pub content: String,
}

impl CompletionEnvelope {
    /// Convert the envelope into a [`Completion`], surfacing error payloads
    pub(crate) fn into_completion(self) -> Result<Completion> {
        if let Some(error) = self.error {
            let detail = error
                .get("message")
                .and_then(|m| m.as_str())
                .map(String::from)
                .unwrap_or_else(|| error.to_string());
            return Err(crate::error::TopikaError::Provider(detail).into());
        }

        let choice = self.choices.into_iter().next().ok_or_else(|| {
            crate::error::TopikaError::Provider("No completion choices in response".to_string())
        })?;

        Ok(Completion {
            content: choice.message.content,
            usage: self.usage,
        })
    }
}
