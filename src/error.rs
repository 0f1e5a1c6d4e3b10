//! Error types for document operations and persistence.

use std::path::PathBuf;

use thiserror::Error;

/// Failure of a single document operation.
///
/// Every variant leaves the document untouched: no partial edit, no version bump.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    #[error("index {index} is out of range (document length {len})")]
    OutOfRange { index: usize, len: usize },

    #[error("invalid range {start}..{end} (document length {len})")]
    InvalidRange { start: usize, end: usize, len: usize },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("cannot deserialize document: {0}")]
    Deserialization(String),
}

impl From<serde_json::Error> for DocumentError {
    fn from(e: serde_json::Error) -> Self {
        Self::Deserialization(e.to_string())
    }
}

/// Failure while saving or loading a document on disk.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("invalid save name '{0}'")]
    InvalidName(String),

    #[error("no saved document at {}", .0.display())]
    NotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Document(#[from] DocumentError),
}

/// Failure of one console command.
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("usage: {0}")]
    Usage(String),

    #[error("{0}")]
    Document(#[from] DocumentError),

    #[error("{0}")]
    Store(#[from] StoreError),
}
