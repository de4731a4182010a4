//! Error types for table merging.

use std::fmt;

use thiserror::Error;

/// One table that lacks the requested join key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyProblem {
    pub label: String,
    pub key: String,
    /// Close column names from the same table, best match first.
    pub suggestions: Vec<String>,
}

impl fmt::Display for KeyProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "File '{}' is missing the key column '{}'",
            self.label, self.key
        )?;
        if !self.suggestions.is_empty() {
            let quoted: Vec<String> = self.suggestions.iter().map(|s| format!("'{s}'")).collect();
            write!(f, ". Similar columns found: {}", quoted.join(", "))?;
        }
        Ok(())
    }
}

/// Errors that abort a merge. No partial result is produced.
#[derive(Debug, Error)]
pub enum MergeError {
    /// Empty input batch.
    #[error("no tables to merge")]
    NoTables,

    /// Join strategy selected without a key column.
    #[error("please specify a key column for joining")]
    KeyRequired,

    /// The join key is absent from one or more tables.
    #[error("{}", problems.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))]
    MissingKeyColumns { problems: Vec<KeyProblem> },

    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for MergeError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for merge operations.
pub type Result<T> = std::result::Result<T, MergeError>;
