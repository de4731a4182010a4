//! Column-name reconciliation for fuzzy joins and join-key diagnostics.
//!
//! Similarity between names is the longest-common-subsequence ratio
//! `2 * lcs / (len_a + len_b)` over case-normalized input, so `0.0` means no
//! shared characters and `1.0` means equal after normalization. Suggestions
//! are advisory; callers decide whether to apply them and surface every
//! applied rename as a diagnostic.

pub mod score;

pub use score::{Suggestion, similarity, suggest_for, suggest_mapping};
