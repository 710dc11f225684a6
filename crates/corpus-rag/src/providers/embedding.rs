//! Embedding provider trait for generating text embeddings

use async_trait::async_trait;

use crate::error::Result;

/// Trait for generating text embeddings.
///
/// Implementations:
/// - [`OpenAiCompatEmbedder`](super::OpenAiCompatEmbedder): any
///   OpenAI-compatible `/embeddings` endpoint
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding for a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for multiple texts.
    ///
    /// Default implementation calls `embed` sequentially; implementations
    /// should override with real batching.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed(text).await?);
        }
        Ok(embeddings)
    }

    /// Embedding dimensions (e.g. 1536 for text-embedding-3-small)
    fn dimensions(&self) -> usize;

    /// Provider name for logging
    fn name(&self) -> &str;
}
