//! OpenAI-compatible embedding API client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use super::Embedder;
use crate::config::AppConfig;
use crate::errors::FolioRagError;
use crate::errors::Result;
use crate::models::EmbeddingVector;

const SERVICE: &str = "embeddings";

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    input: &'a str,
    model: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// Client for the `/embeddings` endpoint of an OpenAI-compatible service
#[derive(Clone)]
pub struct EmbeddingClient {
    model: String,
    endpoint: String,
    api_key: Option<String>,
    client: Client,
}

impl EmbeddingClient {
    /// Create a new embedding client
    ///
    /// # Errors
    /// - HTTP client build errors (invalid configuration)
    pub fn new(model: String, endpoint: String, api_key: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .pool_idle_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| FolioRagError::ConfigError(format!("embedding HTTP client: {e}")))?;

        Ok(Self {
            model,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
            client,
        })
    }

    pub fn from_app_config(config: &AppConfig) -> Result<Self> {
        let api_key = Some(config.embeddings.api_key.clone()).filter(|key| !key.is_empty());
        Self::new(
            config.embedding_model().to_string(),
            config.embeddings.endpoint.clone(),
            api_key,
        )
    }

    /// Get the model name
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl Embedder for EmbeddingClient {
    async fn embed(&self, text: &str) -> Result<EmbeddingVector> {
        let url = format!("{}/embeddings", self.endpoint);
        debug!("Calling embeddings API: {} ({} chars)", url, text.len());

        let request = EmbeddingRequest {
            input: text,
            model: &self.model,
        };

        let mut builder = self.client.post(&url).json(&request);
        if let Some(api_key) = &self.api_key {
            builder = builder.bearer_auth(api_key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| FolioRagError::upstream(SERVICE, &e))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(FolioRagError::UpstreamUnavailable(format!(
                "{SERVICE} API error ({status}): {error_text}"
            )));
        }

        let result: EmbeddingResponse = response.json().await.map_err(|e| {
            FolioRagError::MalformedUpstreamResponse(format!(
                "{SERVICE}: failed to parse response: {e}"
            ))
        })?;

        // Only the first result is used; a single input yields a single result
        result
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| {
                FolioRagError::MalformedUpstreamResponse(format!(
                    "{SERVICE}: no embedding in response"
                ))
            })
    }
}
