//! OpenAI-compatible embedding endpoint client

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::EmbeddingConfig;
use crate::error::{Error, Result};

use super::embedding::EmbeddingProvider;

/// Client for any OpenAI-compatible `/embeddings` endpoint.
///
/// The handle owns one HTTP client for the process lifetime and is passed by
/// reference wherever embeddings are needed.
pub struct OpenAiCompatEmbedder {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    dimensions: usize,
    batch_size: usize,
    max_retries: u32,
}

#[derive(Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Deserialize)]
struct EmbeddingItem {
    embedding: Vec<f32>,
}

impl OpenAiCompatEmbedder {
    /// Build a client from configuration, reading the API key from the
    /// configured environment variable
    pub fn from_config(config: &EmbeddingConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            Error::embedding(format!(
                "API key environment variable '{}' is not set",
                config.api_key_env
            ))
        })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
            dimensions: config.dimensions,
            batch_size: config.batch_size.max(1),
            max_retries: config.max_retries,
        })
    }

    async fn request_batch(&self, batch: &[String]) -> Result<Vec<Vec<f32>>> {
        let url = format!("{}/embeddings", self.base_url);
        let body = EmbeddingsRequest {
            model: &self.model,
            input: batch,
        };

        let mut attempt = 0u32;
        loop {
            let result = self
                .client
                .post(&url)
                .bearer_auth(&self.api_key)
                .json(&body)
                .send()
                .await
                .and_then(|response| response.error_for_status());

            match result {
                Ok(response) => {
                    let parsed: EmbeddingsResponse = response.json().await?;
                    let embeddings: Vec<Vec<f32>> =
                        parsed.data.into_iter().map(|item| item.embedding).collect();

                    if embeddings.len() != batch.len() {
                        return Err(Error::embedding(format!(
                            "endpoint returned {} embeddings for {} inputs",
                            embeddings.len(),
                            batch.len()
                        )));
                    }
                    if let Some(first) = embeddings.first() {
                        if first.len() != self.dimensions {
                            return Err(Error::embedding(format!(
                                "dimension mismatch: expected {}, got {}",
                                self.dimensions,
                                first.len()
                            )));
                        }
                    }
                    return Ok(embeddings);
                }
                Err(error) if attempt < self.max_retries => {
                    attempt += 1;
                    tracing::warn!(%error, attempt, "embedding request failed, retrying");
                    tokio::time::sleep(Duration::from_millis(500 * u64::from(attempt))).await;
                }
                Err(error) => return Err(error.into()),
            }
        }
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiCompatEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let batch = [text.to_string()];
        let mut embeddings = self.request_batch(&batch).await?;
        embeddings
            .pop()
            .ok_or_else(|| Error::embedding("endpoint returned no embedding"))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            embeddings.extend(self.request_batch(batch).await?);
            tracing::debug!(embedded = embeddings.len(), total = texts.len(), "embedding batches");
        }
        Ok(embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "openai-compat"
    }
}
