//! Character encoding detection for raw byte buffers.

use chardet::charset2encoding;
use encoding_rs::{Encoding, UTF_8};

/// Number of leading bytes sampled for encoding detection.
const DETECTION_SAMPLE_BYTES: usize = 10_000;

/// Minimum detector confidence before a detected label is trusted.
const MIN_CONFIDENCE: f32 = 0.7;

/// Detect the encoding of a buffer from its leading bytes.
///
/// Falls back to UTF-8 when the detector is unsure or reports a label
/// that no decoder exists for.
pub fn detect_encoding(bytes: &[u8]) -> &'static Encoding {
    let sample = &bytes[..bytes.len().min(DETECTION_SAMPLE_BYTES)];
    let (charset, confidence, _language) = chardet::detect(sample);

    if confidence >= MIN_CONFIDENCE
        && let Some(encoding) = Encoding::for_label(charset2encoding(&charset).as_bytes())
    {
        return encoding;
    }

    UTF_8
}

/// Decode a buffer to text, detecting the encoding unless a label is given.
///
/// Returns the decoded text and the name of the encoding that was used.
/// Malformed sequences are replaced rather than rejected, and a leading
/// byte order mark is stripped.
pub fn decode_text(bytes: &[u8], label: Option<&str>) -> (String, &'static str) {
    let encoding = label
        .and_then(|l| Encoding::for_label(l.as_bytes()))
        .unwrap_or_else(|| detect_encoding(bytes));

    let (text, used, _had_errors) = encoding.decode(bytes);
    (text.into_owned(), used.name())
}
