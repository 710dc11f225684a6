//! corpus-rag: retrieval-augmented QA pipeline over a fixed corpus of
//! heterogeneous documents.
//!
//! The core converts page-oriented technical PDFs, section-oriented legal
//! DOCX prose and row-oriented spreadsheet tables into one uniform sequence
//! of retrievable chunks with stable identifiers and citation-preserving
//! metadata:
//!
//! ```text
//! registry ──► ingestion::{PdfLoader, LegalDocLoader, TabularLoader}
//!                  │ RawUnit (page / section / sheet-row granularity)
//!                  ▼
//!              ingestion::DocumentChunker (normalize, split, assemble)
//!                  │ ProcessedChunk (chunk_id, text, metadata)
//!                  ▼
//!              DocumentPipeline output ──► quality::QualityAnalyzer
//!                                     └──► indexing::IndexingPipeline
//!                                              (EmbeddingProvider + VectorStoreProvider)
//! ```
//!
//! Chunk identifiers are pure functions of content, source and index, so
//! re-running the pipeline over unchanged sources reproduces the identical
//! sequence and downstream indexing can upsert by id.

pub mod config;
pub mod error;
pub mod indexing;
pub mod ingestion;
pub mod providers;
pub mod quality;
pub mod types;

pub use config::{ChunkingConfig, DocumentEntry, RagConfig, TypeChunking};
pub use error::{Error, Result};
pub use ingestion::{DocumentPipeline, PipelineStats, ProcessedCorpus};
pub use types::{ChunkMetadata, DocumentKind, LocatorMeta, ProcessedChunk, RawUnit};
