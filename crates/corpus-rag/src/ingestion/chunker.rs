//! Document-type aware chunking
//!
//! Dispatches each raw unit to its kind's splitter configuration, filters out
//! sub-floor fragments, and assembles the surviving spans into processed
//! chunks with deterministic identifiers.

use crate::config::ChunkingConfig;
use crate::types::{DocumentKind, ProcessedChunk, RawUnit};

use super::normalize::Normalizer;
use super::splitter::RecursiveSplitter;

/// Splits raw units into processed chunks, one configuration per document
/// kind
#[derive(Debug)]
pub struct DocumentChunker {
    normalizer: Normalizer,
    pdf: RecursiveSplitter,
    legal: RecursiveSplitter,
    tabular: RecursiveSplitter,
    config: ChunkingConfig,
}

impl DocumentChunker {
    pub fn new(config: &ChunkingConfig) -> Self {
        Self {
            normalizer: Normalizer::new(),
            pdf: RecursiveSplitter::new(&config.pdf),
            legal: RecursiveSplitter::new(&config.legal),
            tabular: RecursiveSplitter::new(&config.tabular),
            config: config.clone(),
        }
    }

    /// Chunk one document's raw units in order.
    ///
    /// The chunk index starts at 0 and increments per emitted chunk, so the
    /// indices of a document's chunks are always `{0, 1, ..., n-1}`.
    pub fn chunk_units(&self, units: &[RawUnit], doc_name: &str) -> Vec<ProcessedChunk> {
        let mut chunks = Vec::new();
        let mut chunk_index = 0u32;

        for unit in units {
            let kind = unit.kind();
            let type_config = self.config.for_kind(kind);
            let text = self.normalizer.normalize(&unit.text);

            let spans = match kind {
                DocumentKind::Pdf => self.pdf.split(&text),
                DocumentKind::LegalDoc => self.legal.split(&text),
                // A tabular row or rollup is already a coherent unit; it is
                // only split when it overruns the target on its own.
                DocumentKind::Tabular => {
                    if text.chars().count() > type_config.target_chars {
                        self.tabular.split(&text)
                    } else {
                        vec![text]
                    }
                }
            };

            for span in spans {
                if span.trim().chars().count() < type_config.min_chars {
                    continue;
                }
                chunks.push(ProcessedChunk::assemble(
                    span,
                    &unit.source,
                    doc_name,
                    chunk_index,
                    unit.locator.clone().into(),
                ));
                chunk_index += 1;
            }
        }

        tracing::info!(doc_name, chunks = chunks.len(), "created chunks");
        chunks
    }
}
