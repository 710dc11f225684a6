//! Error types for the RAG system

use thiserror::Error;

/// Result type alias for RAG operations
pub type Result<T> = std::result::Result<T, Error>;

/// RAG system errors
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration problems, collected eagerly before any loading begins
    #[error("configuration errors: {}", .issues.join("; "))]
    Config { issues: Vec<String> },

    /// File parsing error
    #[error("failed to parse file '{filename}': {message}")]
    FileParse { filename: String, message: String },

    /// Unsupported file type
    #[error("unsupported file type: {0}")]
    UnsupportedFileType(String),

    /// Embedding error
    #[error("embedding generation failed: {0}")]
    Embedding(String),

    /// Vector store error
    #[error("vector store error: {0}")]
    VectorStore(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
}

impl Error {
    /// Create a file parse error
    pub fn file_parse(filename: impl Into<String>, message: impl Into<String>) -> Self {
        Self::FileParse {
            filename: filename.into(),
            message: message.into(),
        }
    }

    /// Create an aggregated configuration error
    pub fn config(issues: Vec<String>) -> Self {
        Self::Config { issues }
    }

    /// Create an embedding error
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding(message.into())
    }

    /// Create a vector store error
    pub fn vector_store(message: impl Into<String>) -> Self {
        Self::VectorStore(message.into())
    }
}
