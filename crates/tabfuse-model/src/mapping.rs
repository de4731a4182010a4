//! Column-name mappings proposed by the reconciler.

use serde::{Deserialize, Serialize};

/// A proposed rename aligning a source column with a target column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMatch {
    /// Column name as it appears in the table being aligned.
    pub source: String,
    /// Column name it should be renamed to.
    pub target: String,
    /// Similarity score in 0.0-1.0 that produced the match.
    pub score: f64,
}

/// Advisory set of column renames.
///
/// A mapping has no effect until a caller applies it by renaming; every
/// applied rename is surfaced as a diagnostic so the user sees what moved.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub matches: Vec<ColumnMatch>,
}

impl ColumnMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: ColumnMatch) {
        self.matches.push(entry);
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ColumnMatch> {
        self.matches.iter()
    }

    /// Target name for a source column, if the mapping contains one.
    pub fn target_for(&self, source: &str) -> Option<&str> {
        self.matches
            .iter()
            .find(|entry| entry.source == source)
            .map(|entry| entry.target.as_str())
    }
}
