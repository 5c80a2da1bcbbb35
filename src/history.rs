//! Retained conversation history for completion requests
//!
//! The full message log lives in the session store; completion requests
//! carry only a sliding window of the most recent entries. Trimming is
//! oldest-first and happens after each exchange, so the window used for
//! the next request never exceeds the limit.

use crate::providers::ChatMessage;
use crate::storage::{ChatSession, MessageRole};

/// Sliding window of conversation entries sent with each completion
#[derive(Debug, Clone)]
pub struct RetainedHistory {
    entries: Vec<ChatMessage>,
    limit: usize,
}

impl RetainedHistory {
    /// Create an empty history with the given entry limit
    pub fn new(limit: usize) -> Self {
        Self {
            entries: Vec::new(),
            limit,
        }
    }

    /// Seed the window from a persisted session
    ///
    /// Error bubbles never enter the retained history; only user and
    /// assistant entries are eligible, and only the most recent `limit`
    /// of them survive.
    pub fn from_session(session: &ChatSession, limit: usize) -> Self {
        let mut history = Self::new(limit);
        for message in &session.messages {
            match message.role {
                MessageRole::User => history.push_user(&message.content),
                MessageRole::Assistant => history.push_assistant(&message.content),
                MessageRole::Error => {}
            }
        }
        history.trim();
        history
    }

    /// Append a user entry
    pub fn push_user(&mut self, content: &str) {
        self.entries.push(ChatMessage::user(content));
    }

    /// Append an assistant entry
    pub fn push_assistant(&mut self, content: &str) {
        self.entries.push(ChatMessage::assistant(content));
    }

    /// Drop oldest entries until the window fits the limit
    ///
    /// Called after each exchange, matching the ported trim point.
    pub fn trim(&mut self) {
        if self.entries.len() > self.limit {
            let excess = self.entries.len() - self.limit;
            self.entries.drain(..excess);
        }
    }

    /// The retained entries, oldest first
    pub fn entries(&self) -> &[ChatMessage] {
        &self.entries
    }

    /// Number of retained entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when nothing is retained
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
