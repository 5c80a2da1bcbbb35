//! Speech synthesis client: voice catalog and audio synthesis
//!
//! Synthesized audio arrives as a raw byte stream and is persisted as a
//! replayable file by the caller. Failures are surfaced to the user as
//! transient warnings and must never touch the message log.

use crate::error::{Result, TopikaError};
use bytes::Bytes;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// One entry of the voice catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceInfo {
    /// Accent descriptor (e.g. "british")
    #[serde(default)]
    pub accent: String,
    /// Voice gender descriptor
    #[serde(default)]
    pub gender: String,
    /// Human-readable voice name
    #[serde(default)]
    pub name: String,
}

/// The voice catalog returned by the synthesis service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceCatalog {
    /// Voice id to descriptor map
    pub voices: HashMap<String, VoiceInfo>,
    /// Id of the service's default voice
    #[serde(rename = "default")]
    pub default_voice: String,
}

#[derive(Debug, Serialize)]
struct SynthesisRequest<'a> {
    text: &'a str,
    voice: &'a str,
}

/// Client for the speech synthesis service
pub struct SpeechClient {
    client: Client,
    base_url: String,
}

impl SpeechClient {
    /// Create a new client for the given base URL
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .user_agent(concat!("topika/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TopikaError::Speech(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Fetch the voice catalog
    pub async fn list_voices(&self) -> Result<VoiceCatalog> {
        let url = self.endpoint("/api/voices");
        tracing::debug!("Fetching voice catalog from {}", url);

        let response = self.client.get(&url).send().await.map_err(|e| {
            TopikaError::Speech(format!("Failed to reach voice catalog: {}", e))
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TopikaError::Speech(format!("Voice catalog returned {}", status)).into());
        }

        let catalog: VoiceCatalog = response.json().await.map_err(|e| {
            TopikaError::Speech(format!("Failed to parse voice catalog: {}", e))
        })?;
        Ok(catalog)
    }

    /// Synthesize speech for the given text with the given voice
    ///
    /// Returns the raw audio byte stream.
    pub async fn synthesize(&self, text: &str, voice: &str) -> Result<Bytes> {
        let url = self.endpoint("/api/speech");
        tracing::debug!("Synthesizing {} chars with voice {}", text.len(), voice);

        let response = self
            .client
            .post(&url)
            .json(&SynthesisRequest { text, voice })
            .send()
            .await
            .map_err(|e| TopikaError::Speech(format!("Failed to reach synthesis endpoint: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Synthesis endpoint returned {}: {}", status, body);
            return Err(TopikaError::Speech(format!("Synthesis endpoint returned {}", status)).into());
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| TopikaError::Speech(format!("Failed to read audio stream: {}", e)))?;

        if audio.is_empty() {
            return Err(TopikaError::Speech("Synthesis returned an empty audio stream".to_string()).into());
        }

        Ok(audio)
    }
}
