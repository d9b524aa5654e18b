//! Response alignment: reconcile raw model text with the requested count.
//!
//! The model is asked to join one explanation per line with a delimiter, but
//! real responses drift: stray whitespace inside the sentinel, missing
//! separators, extra trailing ones. This module guarantees the caller always
//! receives exactly `expected` non-empty explanations in line order,
//! whatever the raw text looked like. It never fails — mismatches are
//! silently repaired.
//!
//! ## Repair rules
//!
//! 1. Default sentinel: split on the exact token, then absorb the one known
//!    mangling (`<<<SEP >>>`, a space before the closing bracket) by
//!    re-splitting each fragment, re-joining on the canonical token, and
//!    splitting again. Idempotent on well-formed input. This is a narrow
//!    text-repair heuristic, not a parser — it corrects one observed model
//!    failure mode and nothing else.
//! 2. Custom delimiter: a single direct split. Callers overriding the
//!    delimiter are expected to pick simple tokens and accept the risk.
//! 3. Trim every fragment.
//! 4. Too few fragments: pad with empties at the end (missing explanations
//!    land at the end of the range, never interleaved). Too many: drop the
//!    tail.
//! 5. Any fragment empty after trimming is replaced by the deterministic
//!    stub for its index-aligned source line, so no element of the result
//!    is ever empty.

use crate::prompts::{stub_explanation, DEFAULT_DELIMITER, DEFAULT_DELIMITER_SPACED};

/// Split raw model text into exactly `source_lines.len()` explanations.
///
/// `source_lines` is the requested sub-range of the chunk: fragment `i`
/// corresponds to `source_lines[i]` and supplies its stub text when the
/// fragment is missing or empty.
pub fn align_response(raw: &str, delimiter: &str, source_lines: &[String]) -> Vec<String> {
    let expected = source_lines.len();

    let fragments: Vec<String> = if delimiter == DEFAULT_DELIMITER {
        tolerant_split(raw)
    } else {
        raw.split(delimiter).map(|s| s.trim().to_string()).collect()
    };

    let mut explanations = fragments;
    if explanations.len() < expected {
        explanations.resize(expected, String::new());
    } else if explanations.len() > expected {
        explanations.truncate(expected);
    }

    for (i, explanation) in explanations.iter_mut().enumerate() {
        if explanation.is_empty() {
            *explanation = stub_explanation(&source_lines[i]);
        }
    }

    explanations
}

/// Two-pass split for the default sentinel, tolerating the spaced variant.
fn tolerant_split(raw: &str) -> Vec<String> {
    let pieces: Vec<&str> = raw
        .split(DEFAULT_DELIMITER)
        .flat_map(|piece| piece.split(DEFAULT_DELIMITER_SPACED))
        .collect();
    // Re-join on the canonical token and split once more so the result is
    // identical to a single split over a repaired input string.
    pieces
        .join(DEFAULT_DELIMITER)
        .split(DEFAULT_DELIMITER)
        .map(|s| s.trim().to_string())
        .collect()
}
