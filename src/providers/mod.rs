//! Completion provider abstraction and implementations
//!
//! - `base`: common types, the `CompletionProvider` trait, and the factory
//! - `openai`: direct provider-native client (message-array protocol)
//! - `relay`: application relay client (`{message, api_key}` protocol)

pub mod base;
pub mod openai;
pub mod relay;

pub use base::{
    create_provider, ChatMessage, Completion, CompletionProvider, TokenUsage,
};
pub use openai::OpenAiProvider;
pub use relay::RelayProvider;
