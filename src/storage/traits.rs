//! Storage traits and error types
//!
//! This module defines the trait interface for result sinks and
//! associated error types.

use crate::state::PageResult;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while saving crawl results
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to create {path}: {source}")]
    Create {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// A destination for the results of a finished crawl
///
/// The coordinator calls `save` once, after every worker has stopped, with
/// the results in completion order. Implementations must be shareable across
/// threads because the coordinator itself may be.
pub trait ResultSink: Send + Sync {
    /// Writes all results, replacing any previous output
    fn save(&self, results: &[PageResult]) -> StorageResult<()>;

    /// Human-readable destination, used in log and summary lines
    fn destination(&self) -> String;
}
