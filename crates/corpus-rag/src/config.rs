//! Configuration for the RAG pipeline

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::types::DocumentKind;

/// Main pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RagConfig {
    /// Directory holding the corpus documents
    pub data_dir: PathBuf,
    /// Document registry, in processing order
    pub documents: Vec<DocumentEntry>,
    /// Per-type chunking configuration
    pub chunking: ChunkingConfig,
    /// Embedding endpoint configuration
    pub embedding: EmbeddingConfig,
    /// Retrieval configuration
    pub retrieval: RetrievalConfig,
}

/// One registered corpus document: logical name, path and declared kind
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentEntry {
    /// Logical document name used in chunk metadata
    pub name: String,
    /// Path relative to `data_dir`
    pub path: PathBuf,
    /// Declared kind; inferred from the file extension when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<DocumentKind>,
}

impl DocumentEntry {
    /// Resolve the declared or extension-inferred document kind
    pub fn resolve_kind(&self) -> Option<DocumentKind> {
        self.kind.or_else(|| {
            self.path
                .extension()
                .and_then(|ext| ext.to_str())
                .and_then(DocumentKind::from_extension)
        })
    }
}

/// Chunking tunables for one document kind
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeChunking {
    /// Target chunk length in characters
    pub target_chars: usize,
    /// Overlap between adjacent chunks in characters
    pub overlap_chars: usize,
    /// Minimum length floor for emitted chunks and extracted units
    pub min_chars: usize,
    /// Ordered separator preference, most structural first; the empty string
    /// is the hard character cut of last resort
    pub separators: Vec<String>,
}

impl Default for TypeChunking {
    fn default() -> Self {
        ChunkingConfig::default().pdf
    }
}

/// Per-document-type chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Technical papers need more context
    pub pdf: TypeChunking,
    /// Legal documents, standard chunking
    pub legal: TypeChunking,
    /// Tabular rows are already coherent units, smaller chunks
    pub tabular: TypeChunking,
    /// A legal section is flushed only when its joined text exceeds this
    pub section_flush_chars: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            pdf: TypeChunking {
                target_chars: 1800,
                overlap_chars: 200,
                min_chars: 50,
                separators: seps(&["\n\n", "\nFigure", "\nReferences", "\n", ". ", " ", ""]),
            },
            legal: TypeChunking {
                target_chars: 1500,
                overlap_chars: 200,
                min_chars: 50,
                separators: seps(&["\n", ". ", " ", ""]),
            },
            tabular: TypeChunking {
                target_chars: 500,
                overlap_chars: 50,
                min_chars: 20,
                separators: seps(&["\n", ", ", " ", ""]),
            },
            section_flush_chars: 100,
        }
    }
}

fn seps(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl ChunkingConfig {
    /// Chunking tunables for the given document kind
    pub fn for_kind(&self, kind: DocumentKind) -> &TypeChunking {
        match kind {
            DocumentKind::Pdf => &self.pdf,
            DocumentKind::LegalDoc => &self.legal,
            DocumentKind::Tabular => &self.tabular,
        }
    }
}

/// Embedding endpoint configuration (OpenAI-compatible API)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Base URL of the embeddings endpoint
    pub base_url: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Embedding model name
    pub model: String,
    /// Expected embedding dimensions
    pub dimensions: usize,
    /// Texts per API call
    pub batch_size: usize,
    /// Retries for failed requests
    pub max_retries: u32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            base_url: "https://models.inference.ai.azure.com".to_string(),
            api_key_env: "GITHUB_TOKEN".to_string(),
            model: "text-embedding-3-small".to_string(),
            dimensions: 1536,
            batch_size: 50,
            max_retries: 2,
            timeout_secs: 60,
        }
    }
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Number of chunks to retrieve per query
    pub top_k: usize,
    /// Minimum similarity for a result to be reported
    pub similarity_threshold: f32,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 4,
            similarity_threshold: 0.5,
        }
    }
}

impl RagConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        toml::from_str(&raw)
            .map_err(|e| Error::config(vec![format!("invalid config file: {e}")]))
    }

    /// The default registry for the challenge corpus
    pub fn with_default_corpus(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            documents: vec![
                DocumentEntry {
                    name: "eu_ai_act".into(),
                    path: "EU AI Act Doc.docx".into(),
                    kind: None,
                },
                DocumentEntry {
                    name: "attention".into(),
                    path: "Attention_is_all_you_need.pdf".into(),
                    kind: None,
                },
                DocumentEntry {
                    name: "deepseek".into(),
                    path: "Deepseek-r1.pdf".into(),
                    kind: None,
                },
                DocumentEntry {
                    name: "inflation".into(),
                    path: "Inflation Calculator.xlsx".into(),
                    kind: None,
                },
            ],
            ..Self::default()
        }
    }

    /// Absolute path of a registered document
    pub fn document_path(&self, entry: &DocumentEntry) -> PathBuf {
        self.data_dir.join(&entry.path)
    }

    /// Validate the whole configuration eagerly, reporting every problem
    /// found in one aggregated error
    pub fn validate(&self) -> Result<()> {
        let mut issues = Vec::new();

        if self.documents.is_empty() {
            issues.push("document registry is empty".to_string());
        }
        if !self.data_dir.is_dir() {
            issues.push(format!("data directory not found: {}", self.data_dir.display()));
        }

        for entry in &self.documents {
            if entry.name.trim().is_empty() {
                issues.push(format!("document '{}' has an empty name", entry.path.display()));
            }
            if entry.resolve_kind().is_none() {
                issues.push(format!(
                    "cannot determine document type for '{}': declare `kind` or use a known extension",
                    entry.path.display()
                ));
            }
            let path = self.document_path(entry);
            if !path.is_file() {
                issues.push(format!("missing document '{}': {}", entry.name, path.display()));
            }
        }

        for (label, type_cfg) in [
            ("pdf", &self.chunking.pdf),
            ("legal", &self.chunking.legal),
            ("tabular", &self.chunking.tabular),
        ] {
            if type_cfg.target_chars == 0 {
                issues.push(format!("chunking.{label}: target_chars must be positive"));
            }
            if type_cfg.overlap_chars >= type_cfg.target_chars {
                issues.push(format!(
                    "chunking.{label}: overlap_chars ({}) must be smaller than target_chars ({})",
                    type_cfg.overlap_chars, type_cfg.target_chars
                ));
            }
            if type_cfg.min_chars > type_cfg.target_chars {
                issues.push(format!(
                    "chunking.{label}: min_chars ({}) must not exceed target_chars ({})",
                    type_cfg.min_chars, type_cfg.target_chars
                ));
            }
            if type_cfg.separators.is_empty() {
                issues.push(format!("chunking.{label}: separator list is empty"));
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(Error::config(issues))
        }
    }
}
