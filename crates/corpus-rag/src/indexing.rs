//! Indexing and retrieval over the processed chunk sequence
//!
//! Thin orchestration over the provider traits: embed every chunk text,
//! clear the index, and upsert `(chunk_id, vector, metadata)` triples.
//! Because chunk identifiers are deterministic, re-running the pipeline over
//! unchanged sources upserts the same ids instead of duplicating entries.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::providers::{EmbeddingProvider, VectorSearchResult, VectorStoreProvider};
use crate::types::{DocumentKind, ProcessedChunk};

/// Summary of one indexing run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexSummary {
    pub uploaded: usize,
    pub total_in_index: usize,
}

/// Embeds chunks and maintains the vector index
pub struct IndexingPipeline<'a> {
    embedder: &'a dyn EmbeddingProvider,
    store: &'a dyn VectorStoreProvider,
}

impl<'a> IndexingPipeline<'a> {
    pub fn new(embedder: &'a dyn EmbeddingProvider, store: &'a dyn VectorStoreProvider) -> Self {
        Self { embedder, store }
    }

    /// Embed and index the full chunk sequence.
    ///
    /// The index is cleared first so a re-run over a changed corpus never
    /// leaves stale entries behind.
    pub async fn index_chunks(&self, chunks: &[ProcessedChunk]) -> Result<IndexSummary> {
        tracing::info!(
            chunks = chunks.len(),
            embedder = self.embedder.name(),
            store = self.store.name(),
            "indexing chunks"
        );

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;
        if embeddings.len() != chunks.len() {
            return Err(Error::embedding(format!(
                "chunk/embedding count mismatch: {} chunks, {} embeddings",
                chunks.len(),
                embeddings.len()
            )));
        }

        self.store.clear().await?;
        let items: Vec<(ProcessedChunk, Vec<f32>)> = chunks
            .iter()
            .cloned()
            .zip(embeddings)
            .collect();
        self.store.upsert(&items).await?;

        let total_in_index = self.store.len().await?;
        tracing::info!(uploaded = items.len(), total_in_index, "indexing complete");
        Ok(IndexSummary {
            uploaded: items.len(),
            total_in_index,
        })
    }

    /// Retrieve the most similar chunks for a query
    pub async fn retrieve(
        &self,
        query: &str,
        top_k: usize,
        filter: Option<DocumentKind>,
    ) -> Result<Vec<VectorSearchResult>> {
        let query_embedding = self.embedder.embed(query).await?;
        self.store.search(&query_embedding, top_k, filter).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::InMemoryVectorStore;
    use crate::types::LocatorMeta;
    use async_trait::async_trait;

    /// Deterministic embedder keyed on text length, good enough to exercise
    /// the orchestration without a network
    struct StubEmbedder;

    #[async_trait]
    impl EmbeddingProvider for StubEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            let len = text.chars().count() as f32;
            Ok(vec![len, 1.0 / (len + 1.0)])
        }

        fn dimensions(&self) -> usize {
            2
        }

        fn name(&self) -> &str {
            "stub"
        }
    }

    fn chunk(text: &str, index: u32) -> ProcessedChunk {
        ProcessedChunk::assemble(
            text.to_string(),
            "paper.pdf",
            "attention",
            index,
            LocatorMeta::Pdf { page: 1 },
        )
    }

    #[tokio::test]
    async fn index_then_retrieve_round_trips() {
        let embedder = StubEmbedder;
        let store = InMemoryVectorStore::new();
        let pipeline = IndexingPipeline::new(&embedder, &store);

        let chunks = vec![chunk("short text", 0), chunk("a considerably longer chunk body", 1)];
        let summary = pipeline.index_chunks(&chunks).await.unwrap();
        assert_eq!(summary.uploaded, 2);
        assert_eq!(summary.total_in_index, 2);

        let results = pipeline.retrieve("short text", 1, None).await.unwrap();
        assert_eq!(results[0].chunk.text, "short text");
        assert_eq!(results[0].citation(), "paper.pdf (page 1)");
    }

    #[tokio::test]
    async fn reindexing_does_not_duplicate() {
        let embedder = StubEmbedder;
        let store = InMemoryVectorStore::new();
        let pipeline = IndexingPipeline::new(&embedder, &store);

        let chunks = vec![chunk("stable content", 0)];
        pipeline.index_chunks(&chunks).await.unwrap();
        let summary = pipeline.index_chunks(&chunks).await.unwrap();
        assert_eq!(summary.total_in_index, 1);
    }
}
