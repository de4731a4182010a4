//! Configuration options for merge requests.

use serde::{Deserialize, Serialize};

/// Strategy used to combine the input tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeStrategy {
    /// Stack rows vertically over the union of all columns.
    #[default]
    Append,
    /// Sequential key-based join across all tables.
    Join,
    /// Detect a shared key column and outer-join on it, else append.
    Smart,
}

/// How unmatched rows are treated during a key-based join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinKind {
    /// Keep rows from both sides, filling non-matches with missing values.
    #[default]
    Outer,
    /// Keep only rows whose key appears on both sides.
    Inner,
    /// Keep every row of the accumulated left side.
    Left,
}

/// Missing-value fill method applied to each table before merging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillStrategy {
    /// Leave missing cells untouched.
    #[default]
    None,
    /// Fill with 0 (numeric columns) or "0" (text columns).
    Zero,
    /// Column mean; non-numeric columns are left untouched.
    Mean,
    /// Column median; non-numeric columns are left untouched.
    Median,
    /// First mode of the column; applies to every column type.
    Mode,
    /// Propagate the previous non-missing value downward.
    ForwardFill,
    /// Propagate the next non-missing value upward.
    BackwardFill,
    /// A caller-supplied literal, parsed as a number when possible.
    Custom,
}

/// Options controlling one merge request.
///
/// Constructed once per request and never mutated mid-merge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeOptions {
    pub strategy: MergeStrategy,
    /// Column used to align rows for [`MergeStrategy::Join`].
    pub join_key: Option<String>,
    pub join_kind: JoinKind,
    /// Rename similarly named columns to match before joining.
    pub fuzzy_matching: bool,
    /// Similarity floor for fuzzy matches, in 0.0-1.0.
    pub fuzzy_threshold: f64,
    /// Lower-case all column names (and the join key) before merging.
    pub ignore_case: bool,
    /// Drop duplicate rows from each table before merging.
    pub drop_duplicates: bool,
    pub fill_strategy: FillStrategy,
    /// Literal for [`FillStrategy::Custom`].
    pub fill_value: Option<String>,
    /// Base name for exported artifacts.
    pub output_name: String,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            strategy: MergeStrategy::Append,
            join_key: None,
            join_kind: JoinKind::Outer,
            fuzzy_matching: false,
            fuzzy_threshold: 0.8,
            ignore_case: true,
            drop_duplicates: false,
            fill_strategy: FillStrategy::None,
            fill_value: None,
            output_name: "merged_data".to_string(),
        }
    }
}

impl MergeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_strategy(mut self, strategy: MergeStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_join_key(mut self, key: impl Into<String>) -> Self {
        self.join_key = Some(key.into());
        self
    }

    pub fn with_join_kind(mut self, kind: JoinKind) -> Self {
        self.join_kind = kind;
        self
    }

    /// Enable fuzzy column matching at the given similarity floor.
    pub fn with_fuzzy_matching(mut self, threshold: f64) -> Self {
        self.fuzzy_matching = true;
        self.fuzzy_threshold = threshold;
        self
    }

    pub fn with_ignore_case(mut self, enabled: bool) -> Self {
        self.ignore_case = enabled;
        self
    }

    pub fn with_drop_duplicates(mut self, enabled: bool) -> Self {
        self.drop_duplicates = enabled;
        self
    }

    pub fn with_fill(mut self, strategy: FillStrategy, value: Option<String>) -> Self {
        self.fill_strategy = strategy;
        self.fill_value = value;
        self
    }

    pub fn with_output_name(mut self, name: impl Into<String>) -> Self {
        self.output_name = name.into();
        self
    }
}

/// Resource ceilings applied while reading input files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestLimits {
    /// Files whose declared size exceeds this are rejected before parsing.
    pub max_file_bytes: u64,
}

impl Default for IngestLimits {
    fn default() -> Self {
        Self::from_megabytes(100)
    }
}

impl IngestLimits {
    pub fn from_megabytes(megabytes: u64) -> Self {
        Self {
            max_file_bytes: megabytes * 1024 * 1024,
        }
    }

    pub fn max_megabytes(&self) -> u64 {
        self.max_file_bytes / (1024 * 1024)
    }
}
