//! Session record types for the persistent chat store

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role of a stored chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Message typed by the user
    User,
    /// Reply from the assistant
    Assistant,
    /// Error bubble surfaced in the chat
    Error,
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Per-message token counts, present on assistant replies carrying usage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageTokens {
    /// Prompt-side tokens for the exchange
    pub input: u32,
    /// Completion-side tokens for the exchange
    pub output: u32,
}

/// One entry in a session's message log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredMessage {
    /// Who produced the message
    pub role: MessageRole,
    /// Message text
    pub content: String,
    /// Token usage, when reported for this message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens: Option<MessageTokens>,
}

impl StoredMessage {
    /// Create a message without token counts
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tokens: None,
        }
    }

    /// Create a message with token counts
    pub fn with_tokens(role: MessageRole, content: impl Into<String>, tokens: MessageTokens) -> Self {
        Self {
            role,
            content: content.into(),
            tokens: Some(tokens),
        }
    }
}

/// A chat session: ordered message log plus running usage counters
///
/// `message_count` counts completed exchanges (assistant replies that
/// carried usage), not raw log length. The legacy persistence layout was a
/// bare message array; [`ChatSession::from_value`] upgrades it in place
/// with zeroed counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSession {
    /// Session identifier (the storage row key, not persisted in the value)
    #[serde(skip)]
    pub id: String,

    /// Ordered message log
    #[serde(default)]
    pub messages: Vec<StoredMessage>,

    /// Running prompt-token total
    #[serde(default)]
    pub total_input_tokens: u64,

    /// Running completion-token total
    #[serde(default)]
    pub total_output_tokens: u64,

    /// Number of completed exchanges
    #[serde(default)]
    pub message_count: u64,
}

impl ChatSession {
    /// Create a new empty session with a fresh id
    pub fn new() -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            messages: Vec::new(),
            total_input_tokens: 0,
            total_output_tokens: 0,
            message_count: 0,
        }
    }

    /// Parse a persisted session value, upgrading the legacy layout
    ///
    /// A bare JSON array (the old layout) becomes a structured session
    /// with the same messages and zeroed counters. Returns the session and
    /// whether an upgrade happened (so the caller can persist it back).
    pub fn from_value(id: impl Into<String>, value: serde_json::Value) -> serde_json::Result<(Self, bool)> {
        let upgraded = value.is_array();
        let mut session = if upgraded {
            let messages: Vec<StoredMessage> = serde_json::from_value(value)?;
            Self {
                id: String::new(),
                messages,
                total_input_tokens: 0,
                total_output_tokens: 0,
                message_count: 0,
            }
        } else {
            serde_json::from_value(value)?
        };
        session.id = id.into();
        Ok((session, upgraded))
    }

    /// Append a message and fold its usage into the running counters
    ///
    /// Assistant messages carrying token counts complete an exchange:
    /// totals grow and `message_count` increments.
    pub fn push_message(&mut self, message: StoredMessage) {
        if message.role == MessageRole::Assistant {
            if let Some(tokens) = message.tokens {
                self.total_input_tokens += u64::from(tokens.input);
                self.total_output_tokens += u64::from(tokens.output);
                self.message_count += 1;
            }
        }
        self.messages.push(message);
    }

    /// Recompute the counters from the message log
    ///
    /// Used after loading legacy data or when counters drift from the log.
    pub fn recompute_totals(&mut self) {
        self.total_input_tokens = 0;
        self.total_output_tokens = 0;
        self.message_count = 0;
        for message in &self.messages {
            if message.role == MessageRole::Assistant {
                if let Some(tokens) = message.tokens {
                    self.total_input_tokens += u64::from(tokens.input);
                    self.total_output_tokens += u64::from(tokens.output);
                    self.message_count += 1;
                }
            }
        }
    }

    /// Average prompt tokens per exchange, zero when no exchanges exist
    pub fn average_input_tokens(&self) -> u64 {
        if self.message_count == 0 {
            0
        } else {
            self.total_input_tokens / self.message_count
        }
    }

    /// Average completion tokens per exchange, zero when no exchanges exist
    pub fn average_output_tokens(&self) -> u64 {
        if self.message_count == 0 {
            0
        } else {
            self.total_output_tokens / self.message_count
        }
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Metadata row for the session listing
#[derive(Debug, Clone)]
pub struct SessionSummary {
    /// Session identifier
    pub id: String,
    /// When the session was created
    pub created_at: DateTime<Utc>,
    /// When the session was last written
    pub updated_at: DateTime<Utc>,
    /// Number of entries in the message log
    pub message_total: usize,
    /// Running prompt-token total
    pub total_input_tokens: u64,
    /// Running completion-token total
    pub total_output_tokens: u64,
}
