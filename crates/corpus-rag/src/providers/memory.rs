//! In-process vector store with brute-force cosine search
//!
//! Good for tests and small fixed corpora; the provider trait keeps the
//! pipeline decoupled from whichever hosted index replaces this in a larger
//! deployment.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::error::{Error, Result};
use crate::types::{DocumentKind, ProcessedChunk};

use super::vector_store::{VectorSearchResult, VectorStoreProvider};

/// Brute-force in-memory vector store keyed by chunk id
#[derive(Default)]
pub struct InMemoryVectorStore {
    entries: RwLock<HashMap<String, (ProcessedChunk, Vec<f32>)>>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[async_trait]
impl VectorStoreProvider for InMemoryVectorStore {
    async fn upsert(&self, items: &[(ProcessedChunk, Vec<f32>)]) -> Result<()> {
        let mut entries = self.entries.write();
        for (chunk, embedding) in items {
            if embedding.is_empty() {
                return Err(Error::vector_store(format!(
                    "chunk '{}' has an empty embedding",
                    chunk.chunk_id
                )));
            }
            entries.insert(chunk.chunk_id.clone(), (chunk.clone(), embedding.clone()));
        }
        Ok(())
    }

    async fn search(
        &self,
        query_embedding: &[f32],
        top_k: usize,
        filter: Option<DocumentKind>,
    ) -> Result<Vec<VectorSearchResult>> {
        let entries = self.entries.read();
        let mut results: Vec<VectorSearchResult> = entries
            .values()
            .filter(|(chunk, _)| filter.map_or(true, |kind| chunk.metadata.doc_type() == kind))
            .map(|(chunk, embedding)| VectorSearchResult {
                chunk: chunk.clone(),
                similarity: cosine_similarity(query_embedding, embedding),
            })
            .collect();

        // Deterministic ordering: similarity descending, chunk id as the
        // tie-break.
        results.sort_by(|a, b| {
            b.similarity
                .total_cmp(&a.similarity)
                .then_with(|| a.chunk.chunk_id.cmp(&b.chunk.chunk_id))
        });
        results.truncate(top_k);
        Ok(results)
    }

    async fn clear(&self) -> Result<()> {
        self.entries.write().clear();
        Ok(())
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.entries.read().len())
    }

    fn name(&self) -> &str {
        "in-memory"
    }
}
