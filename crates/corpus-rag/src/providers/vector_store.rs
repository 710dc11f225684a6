//! Vector store provider trait for persisting and searching chunk embeddings

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{DocumentKind, ProcessedChunk};

/// Search result from the vector store
#[derive(Debug, Clone)]
pub struct VectorSearchResult {
    /// The matched chunk
    pub chunk: ProcessedChunk,
    /// Similarity score (0.0 to 1.0, higher is more similar)
    pub similarity: f32,
}

impl VectorSearchResult {
    /// Citation string for this result, derived from chunk metadata alone
    pub fn citation(&self) -> String {
        self.chunk.citation()
    }
}

/// Trait for vector storage and similarity search.
///
/// Upserts are keyed by `chunk_id`: re-indexing unchanged content overwrites
/// rather than duplicates, which is what the deterministic identifiers are
/// for.
#[async_trait]
pub trait VectorStoreProvider: Send + Sync {
    /// Insert or overwrite chunks with their embeddings, keyed by chunk id
    async fn upsert(&self, items: &[(ProcessedChunk, Vec<f32>)]) -> Result<()>;

    /// Search for the `top_k` most similar chunks, optionally filtered by
    /// document kind
    async fn search(
        &self,
        query_embedding: &[f32],
        top_k: usize,
        filter: Option<DocumentKind>,
    ) -> Result<Vec<VectorSearchResult>>;

    /// Remove every stored vector
    async fn clear(&self) -> Result<()>;

    /// Number of vectors stored
    async fn len(&self) -> Result<usize>;

    /// Check if the store is empty
    async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }

    /// Provider name for logging
    fn name(&self) -> &str;
}
