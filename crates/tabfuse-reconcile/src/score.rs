//! Similarity scoring between column names.

use std::cmp::Ordering;

use rapidfuzz::distance::indel;
use tabfuse_model::{ColumnMapping, ColumnMatch};

/// A candidate column ranked against a single source name.
#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    pub name: String,
    pub score: f64,
}

/// Similarity between two column names in 0.0-1.0.
///
/// Names are compared case-insensitively; the score is the normalized indel
/// similarity, `2 * lcs / (len_a + len_b)`.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = normalize(a);
    let b = normalize(b);
    indel::normalized_similarity(a.chars(), b.chars())
}

/// Rank `candidates` against one source name, most similar first.
///
/// Only candidates at or above `threshold` are returned. Ties keep the
/// candidates' input order.
pub fn suggest_for(name: &str, candidates: &[String], threshold: f64) -> Vec<Suggestion> {
    let mut suggestions: Vec<Suggestion> = candidates
        .iter()
        .map(|candidate| Suggestion {
            name: candidate.clone(),
            score: similarity(name, candidate),
        })
        .filter(|suggestion| suggestion.score >= threshold)
        .collect();

    suggestions.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    suggestions
}

/// Map each source name to its best candidate at or above `threshold`.
///
/// Every source name is scored independently; there is no one-to-one
/// constraint. A strictly-greater comparison picks the winner, so equally
/// scored candidates resolve to the first one seen.
///
/// The produced [`ColumnMatch`] entries are oriented for renaming: `source`
/// is the candidate column (the one a caller would rename) and `target` is
/// the name it aligns with.
pub fn suggest_mapping(names: &[String], candidates: &[String], threshold: f64) -> ColumnMapping {
    let mut mapping = ColumnMapping::new();

    for name in names {
        let mut best: Option<(&String, f64)> = None;
        for candidate in candidates {
            let score = similarity(name, candidate);
            if score < threshold {
                continue;
            }
            if best.is_none_or(|(_, best_score)| score > best_score) {
                best = Some((candidate, score));
            }
        }

        if let Some((candidate, score)) = best {
            mapping.push(ColumnMatch {
                source: candidate.clone(),
                target: name.clone(),
                score,
            });
        }
    }

    mapping
}

/// Normalize a name for comparison: trim and lowercase.
fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}
