//! Error types for file ingestion.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while turning raw file buffers into tables.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Input file not found.
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to read file from disk.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === Validation Errors ===
    /// Declared size exceeds the configured ceiling. Checked before parsing.
    #[error("file '{name}' exceeds the maximum allowed size of {max_megabytes}MB")]
    FileTooLarge {
        name: String,
        size: u64,
        max_megabytes: u64,
    },

    /// Extension does not map to a supported format.
    #[error("unsupported file format: '{extension}'. Supported formats: csv, xlsx, xls, json")]
    UnsupportedFormat { extension: String },

    /// Parsed table has no rows or no columns.
    #[error("file '{name}' is empty or could not be read")]
    EmptyTable { name: String },

    // === Parsing Errors ===
    /// Parser rejected the buffer contents.
    #[error("failed to parse {name}: {message}")]
    Parse { name: String, message: String },

    /// JSON document shape is not one of the supported layouts.
    #[error("unsupported JSON structure in {name}: {reason}")]
    JsonShape { name: String, reason: String },

    // === DataFrame Errors ===
    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for IngestError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
