use std::path::PathBuf;

use crate::doc::CommentId;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),
    #[error("Text not found in document: {0:?}")]
    TextNotFound(String),
    #[error("Comment not found: {0}")]
    CommentNotFound(CommentId),
    #[error("Malformed document package at {path}: {source}")]
    MalformedPackage {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Orphaned reference: {0}")]
    OrphanReference(String),
    #[error("Invalid document structure: {0}")]
    InvalidDocument(String),
    #[error("Failed to encode document: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
