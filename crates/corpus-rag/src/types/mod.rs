//! Core types for the RAG pipeline

pub mod chunk;
pub mod document;

pub use chunk::{chunk_id, ChunkMetadata, LocatorMeta, ProcessedChunk};
pub use document::{DocumentKind, Locator, RawUnit, RowRef};
