//! Pipeline orchestration: load every registered document, chunk it, and
//! aggregate the ordered chunk sequence with processing statistics

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::RagConfig;
use crate::error::Result;
use crate::types::{DocumentKind, ProcessedChunk};

use super::chunker::DocumentChunker;
use super::legal::LegalDocLoader;
use super::pdf::PdfLoader;
use super::tabular::TabularLoader;

/// Per-document processing statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentStats {
    pub doc_type: Option<DocumentKind>,
    pub chunks: usize,
    pub avg_chars: usize,
    /// Set when the document's loader failed; the document contributed zero
    /// chunks but the pipeline continued
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Aggregate statistics over one pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineStats {
    pub total_chunks: usize,
    pub avg_chars: usize,
    pub min_chars: usize,
    pub max_chars: usize,
    pub by_document: BTreeMap<String, DocumentStats>,
    pub completed_at: chrono::DateTime<chrono::Utc>,
}

impl PipelineStats {
    fn from_chunks(chunks: &[ProcessedChunk], by_document: BTreeMap<String, DocumentStats>) -> Self {
        let sizes: Vec<usize> = chunks.iter().map(|c| c.metadata.char_count).collect();
        let total: usize = sizes.iter().sum();
        Self {
            total_chunks: chunks.len(),
            avg_chars: if chunks.is_empty() { 0 } else { total / chunks.len() },
            min_chars: sizes.iter().copied().min().unwrap_or(0),
            max_chars: sizes.iter().copied().max().unwrap_or(0),
            by_document,
            completed_at: chrono::Utc::now(),
        }
    }

    /// Human-readable summary of the run
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("Total chunks: {}\n", self.total_chunks));
        out.push_str(&format!(
            "Chunk size: avg {} chars, range {} - {}\n",
            self.avg_chars, self.min_chars, self.max_chars
        ));
        out.push_str("By document:\n");
        for (name, doc) in &self.by_document {
            match (&doc.error, doc.doc_type) {
                (Some(error), _) => out.push_str(&format!("  {name}: failed to load ({error})\n")),
                (None, Some(doc_type)) => out.push_str(&format!(
                    "  {name} ({doc_type}): {} chunks, avg {} chars\n",
                    doc.chunks, doc.avg_chars
                )),
                (None, None) => out.push_str(&format!("  {name}: no chunks\n")),
            }
        }
        out
    }
}

/// Output of a full pipeline run: the ordered chunk sequence plus advisory
/// statistics
#[derive(Debug, Clone)]
pub struct ProcessedCorpus {
    pub chunks: Vec<ProcessedChunk>,
    pub stats: PipelineStats,
}

/// Complete document processing pipeline: loaders, splitters and assembly
#[derive(Debug)]
pub struct DocumentPipeline {
    config: RagConfig,
    chunker: DocumentChunker,
}

impl DocumentPipeline {
    /// Validate the configuration eagerly and build the pipeline.
    ///
    /// Every configuration problem is reported at once; nothing is loaded
    /// until the registry checks out.
    pub fn new(config: RagConfig) -> Result<Self> {
        config.validate()?;
        let chunker = DocumentChunker::new(&config.chunking);
        Ok(Self { config, chunker })
    }

    /// Run loaders, splitters and assembly over every registered document.
    ///
    /// Documents are processed in registration order, chunk indices reset per
    /// document, and the output order is registration order then chunk index.
    /// A document whose loader fails is recorded with zero chunks and
    /// processing continues.
    pub fn process_documents(&self) -> ProcessedCorpus {
        let mut all_chunks = Vec::new();
        let mut by_document = BTreeMap::new();

        for entry in &self.config.documents {
            let path = self.config.document_path(entry);
            // validate() already rejected undeterminable kinds
            let Some(kind) = entry.resolve_kind() else {
                continue;
            };

            let loaded = match kind {
                DocumentKind::Pdf => PdfLoader::load(&path, self.config.chunking.pdf.min_chars),
                DocumentKind::LegalDoc => {
                    LegalDocLoader::load(&path, self.config.chunking.section_flush_chars)
                }
                DocumentKind::Tabular => {
                    TabularLoader::load(&path, self.config.chunking.tabular.min_chars)
                }
            };

            match loaded {
                Ok(units) => {
                    let chunks = self.chunker.chunk_units(&units, &entry.name);
                    let total: usize = chunks.iter().map(|c| c.metadata.char_count).sum();
                    by_document.insert(
                        entry.name.clone(),
                        DocumentStats {
                            doc_type: Some(kind),
                            chunks: chunks.len(),
                            avg_chars: if chunks.is_empty() { 0 } else { total / chunks.len() },
                            error: None,
                        },
                    );
                    all_chunks.extend(chunks);
                }
                Err(error) => {
                    tracing::warn!(document = %entry.name, %error, "failed to load document");
                    by_document.insert(
                        entry.name.clone(),
                        DocumentStats {
                            doc_type: Some(kind),
                            chunks: 0,
                            avg_chars: 0,
                            error: Some(error.to_string()),
                        },
                    );
                }
            }
        }

        let stats = PipelineStats::from_chunks(&all_chunks, by_document);
        tracing::info!(
            total_chunks = stats.total_chunks,
            documents = stats.by_document.len(),
            "chunking complete"
        );
        ProcessedCorpus {
            chunks: all_chunks,
            stats,
        }
    }

    pub fn config(&self) -> &RagConfig {
        &self.config
    }
}

/// Persist the ordered chunk sequence as pretty-printed JSON, the
/// intermediate artifact between chunking and embedding
pub fn save_chunks(chunks: &[ProcessedChunk], path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(chunks)?;
    fs::write(path, json)?;
    tracing::info!(path = %path.display(), count = chunks.len(), "saved chunks");
    Ok(())
}

/// Load a previously saved chunk artifact
pub fn load_chunks(path: &Path) -> Result<Vec<ProcessedChunk>> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}
