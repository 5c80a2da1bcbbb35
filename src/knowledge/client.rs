//! HTTP client for the knowledge collection endpoint
//!
//! One read call and one admin bulk-replace call. There is deliberately no
//! retry and no partial load: a failed fetch surfaces an error and callers
//! degrade to an empty collection.

use crate::error::{Result, TopikaError};
use crate::knowledge::TopicRecord;
use reqwest::Client;
use std::time::Duration;

/// Client for the knowledge collection service
pub struct KnowledgeClient {
    client: Client,
    base_url: String,
}

impl KnowledgeClient {
    /// Create a new client for the given base URL
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("topika/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TopikaError::Knowledge(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/api/knowledge", self.base_url.trim_end_matches('/'))
    }

    /// Fetch the full topic collection
    ///
    /// Issues a single GET request. Non-success status, transport failure,
    /// or malformed JSON is an error; callers must tolerate the resulting
    /// empty collection.
    pub async fn fetch_all(&self) -> Result<Vec<TopicRecord>> {
        let url = self.endpoint();
        tracing::debug!("Fetching knowledge collection from {}", url);

        let response = self.client.get(&url).send().await.map_err(|e| {
            tracing::warn!("Failed to reach knowledge endpoint: {}", e);
            TopikaError::Knowledge(format!("Failed to reach knowledge endpoint: {}", e))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Knowledge endpoint returned {}: {}", status, body);
            return Err(
                TopikaError::Knowledge(format!("Knowledge endpoint returned {}", status)).into(),
            );
        }

        let records: Vec<TopicRecord> = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse knowledge collection: {}", e);
            TopikaError::Knowledge(format!("Failed to parse knowledge collection: {}", e))
        })?;

        tracing::info!("Loaded {} knowledge records", records.len());
        Ok(records)
    }

    /// Replace the stored collection with the given records
    ///
    /// Admin-only bulk update; the service accepts the full replacement
    /// array with no partial patch semantics.
    pub async fn replace_all(&self, records: &[TopicRecord]) -> Result<()> {
        let url = self.endpoint();
        tracing::debug!("Replacing knowledge collection ({} records)", records.len());

        let response = self
            .client
            .put(&url)
            .json(records)
            .send()
            .await
            .map_err(|e| {
                TopikaError::Knowledge(format!("Failed to reach knowledge endpoint: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Knowledge update returned {}: {}", status, body);
            return Err(
                TopikaError::Knowledge(format!("Knowledge update returned {}", status)).into(),
            );
        }

        tracing::info!("Knowledge collection replaced ({} records)", records.len());
        Ok(())
    }
}
