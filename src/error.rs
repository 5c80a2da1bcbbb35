//! Error types for Topika
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for Topika operations
///
/// This enum encompasses all possible errors that can occur while loading
/// the knowledge collection, talking to completion or speech endpoints,
/// persisting chat sessions, and validating user input.
#[derive(Error, Debug)]
pub enum TopikaError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Knowledge collection errors (load, bulk replace, lookup)
    #[error("Knowledge error: {0}")]
    Knowledge(String),

    /// Completion provider errors (API calls, error payloads)
    #[error("Provider error: {0}")]
    Provider(String),

    /// Speech synthesis errors (voice catalog, audio synthesis)
    #[error("Speech error: {0}")]
    Speech(String),

    /// Session storage errors (database operations)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Local validation failures (empty message, missing API key)
    #[error("Validation error: {0}")]
    Validation(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for Topika operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;
