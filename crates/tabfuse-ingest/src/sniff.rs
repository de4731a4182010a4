//! Column delimiter sniffing for character-separated text.

/// Number of leading bytes sampled when sniffing the delimiter.
const SNIFF_SAMPLE_BYTES: usize = 4096;

/// A candidate must occur more than this many times to be chosen.
const MIN_OCCURRENCES: usize = 5;

/// Candidate delimiters. Order breaks ties towards the earlier entry.
const CANDIDATES: [u8; 4] = [b',', b';', b'\t', b'|'];

/// Pick the most frequent candidate delimiter in the leading sample.
///
/// Comma is the fallback when no candidate occurs often enough to be
/// convincing, which covers single-column files and short fragments.
pub fn detect_delimiter(text: &str) -> u8 {
    let bytes = text.as_bytes();
    let sample = &bytes[..bytes.len().min(SNIFF_SAMPLE_BYTES)];

    let mut best = b',';
    let mut best_count = 0usize;
    for candidate in CANDIDATES {
        let count = sample.iter().filter(|&&b| b == candidate).count();
        if count > best_count {
            best = candidate;
            best_count = count;
        }
    }

    if best_count > MIN_OCCURRENCES { best } else { b',' }
}
