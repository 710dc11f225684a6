//! Processed chunks with deterministic identity and citation metadata

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::document::{DocumentKind, Locator, RowRef};

/// Type-specific locator payload carried by every chunk, tagged by document
/// kind so citation generation stays exhaustive
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "doc_type", rename_all = "snake_case")]
pub enum LocatorMeta {
    Pdf {
        page: u32,
    },
    LegalDoc {
        section: u32,
    },
    Tabular {
        sheet: String,
        row: RowRef,
        #[serde(skip_serializing_if = "Option::is_none")]
        year: Option<i32>,
        #[serde(skip_serializing_if = "Option::is_none")]
        decade: Option<i32>,
    },
}

impl From<Locator> for LocatorMeta {
    fn from(locator: Locator) -> Self {
        match locator {
            Locator::Page { page } => Self::Pdf { page },
            Locator::Section { section } => Self::LegalDoc { section },
            Locator::Row {
                sheet,
                row,
                year,
                decade,
            } => Self::Tabular {
                sheet,
                row,
                year,
                decade,
            },
        }
    }
}

impl LocatorMeta {
    pub fn kind(&self) -> DocumentKind {
        match self {
            Self::Pdf { .. } => DocumentKind::Pdf,
            Self::LegalDoc { .. } => DocumentKind::LegalDoc,
            Self::Tabular { .. } => DocumentKind::Tabular,
        }
    }
}

/// Metadata envelope attached to every processed chunk
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChunkMetadata {
    /// Originating document file name
    pub source: String,
    /// Logical document name from the registry
    pub doc_name: String,
    /// Running index within the document, contiguous from 0
    pub chunk_index: u32,
    /// Character count of the chunk text at assembly time
    pub char_count: usize,
    /// Type-specific locator fields, flattened into the record
    #[serde(flatten)]
    pub locator: LocatorMeta,
}

impl ChunkMetadata {
    /// Document kind of this chunk
    pub fn doc_type(&self) -> DocumentKind {
        self.locator.kind()
    }

    /// One-line citation derived from metadata alone, without re-reading the
    /// source document
    pub fn citation(&self) -> String {
        match &self.locator {
            LocatorMeta::Pdf { page } => format!("{} (page {page})", self.source),
            LocatorMeta::LegalDoc { section } => format!("{} (section {section})", self.source),
            LocatorMeta::Tabular { sheet, row, .. } => {
                format!("{} (sheet: {sheet}, row: {row})", self.source)
            }
        }
    }
}

/// The unit that crosses the boundary into embedding and indexing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProcessedChunk {
    /// Unique, deterministic identifier
    pub chunk_id: String,
    /// Chunk text
    pub text: String,
    /// Citation-preserving metadata
    pub metadata: ChunkMetadata,
}

impl ProcessedChunk {
    /// Assemble a chunk: stamp the deterministic identifier and the metadata
    /// envelope onto one splitter output span
    pub fn assemble(
        text: String,
        source: &str,
        doc_name: &str,
        chunk_index: u32,
        locator: LocatorMeta,
    ) -> Self {
        let chunk_id = chunk_id(&text, source, chunk_index);
        let char_count = text.chars().count();
        Self {
            chunk_id,
            text,
            metadata: ChunkMetadata {
                source: source.to_string(),
                doc_name: doc_name.to_string(),
                chunk_index,
                char_count,
                locator,
            },
        }
    }

    /// One-line citation for this chunk
    pub fn citation(&self) -> String {
        self.metadata.citation()
    }
}

/// Compute the deterministic chunk identifier
/// `{sanitized_source}_{index}_{hash8}`.
///
/// The hash is the first 8 hex characters of the SHA-256 digest of the chunk
/// text; identifiers are stable across runs over unchanged content so
/// re-indexing can upsert by id instead of creating duplicates.
pub fn chunk_id(text: &str, source: &str, index: u32) -> String {
    let digest = Sha256::digest(text.as_bytes());
    let hash = &hex::encode(digest)[..8];
    format!("{}_{index}_{hash}", sanitize_source(source))
}

/// Replace every character outside `[A-Za-z0-9_-]` (dots included) with an
/// underscore so identifiers stay shell- and URL-safe
fn sanitize_source(source: &str) -> String {
    source
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_id_is_deterministic() {
        let a = chunk_id("some chunk text", "report.pdf", 3);
        let b = chunk_id("some chunk text", "report.pdf", 3);
        assert_eq!(a, b);
        assert!(a.starts_with("report_pdf_3_"));
        // 8 hex characters of content hash
        let hash = a.rsplit('_').next().unwrap();
        assert_eq!(hash.len(), 8);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn chunk_id_changes_with_content_and_index() {
        let base = chunk_id("text", "a.pdf", 0);
        assert_ne!(base, chunk_id("text!", "a.pdf", 0));
        assert_ne!(base, chunk_id("text", "a.pdf", 1));
        assert_ne!(base, chunk_id("text", "b.pdf", 0));
    }

    #[test]
    fn sanitize_replaces_non_word_characters() {
        assert_eq!(sanitize_source("EU AI Act Doc.docx"), "EU_AI_Act_Doc_docx");
        assert_eq!(sanitize_source("already_clean-1"), "already_clean-1");
    }

    #[test]
    fn assemble_records_char_count() {
        let chunk = ProcessedChunk::assemble(
            "Hello there".to_string(),
            "a.pdf",
            "attention",
            0,
            LocatorMeta::Pdf { page: 2 },
        );
        assert_eq!(chunk.metadata.char_count, 11);
        assert_eq!(chunk.metadata.doc_type(), DocumentKind::Pdf);
    }

    #[test]
    fn citations_cover_every_kind() {
        let pdf = ChunkMetadata {
            source: "attention.pdf".into(),
            doc_name: "attention".into(),
            chunk_index: 0,
            char_count: 10,
            locator: LocatorMeta::Pdf { page: 4 },
        };
        assert_eq!(pdf.citation(), "attention.pdf (page 4)");

        let legal = ChunkMetadata {
            locator: LocatorMeta::LegalDoc { section: 7 },
            ..pdf.clone()
        };
        assert_eq!(legal.citation(), "attention.pdf (section 7)");

        let tabular = ChunkMetadata {
            locator: LocatorMeta::Tabular {
                sheet: "CPI".into(),
                row: RowRef::Decade(1950),
                year: None,
                decade: Some(1950),
            },
            ..pdf
        };
        assert_eq!(tabular.citation(), "attention.pdf (sheet: CPI, row: decade_1950)");
    }

    #[test]
    fn metadata_serializes_flat_with_doc_type_tag() {
        let chunk = ProcessedChunk::assemble(
            "body".to_string(),
            "act.docx",
            "eu_ai_act",
            2,
            LocatorMeta::LegalDoc { section: 5 },
        );
        let value = serde_json::to_value(&chunk.metadata).unwrap();
        assert_eq!(value["doc_type"], "legal_doc");
        assert_eq!(value["section"], 5);
        assert_eq!(value["chunk_index"], 2);
        assert_eq!(value["char_count"], 4);

        let back: ChunkMetadata = serde_json::from_value(value).unwrap();
        assert_eq!(back, chunk.metadata);
    }
}
