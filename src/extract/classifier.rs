//! Page classification: decide whether a page's embedded text layer is
//! usable or the page must go through OCR fallback.
//!
//! Scanned pages frequently carry a technically-present but near-empty text
//! layer (a stray control character, a few artifacts from a bad producer),
//! so presence alone proves nothing - a length heuristic is required.

use crate::models::Classification;

/// Classify a page from its direct-extraction result.
///
/// Pure and synchronous: the trimmed text must be at least `min_chars`
/// characters long to count as sufficient. Callers map per-page extraction
/// errors to an empty string before classifying, so a failed page lands in
/// `NeedsOcr` rather than failing the request.
pub fn classify(direct_text: &str, min_chars: usize) -> Classification {
    if direct_text.trim().chars().count() >= min_chars {
        Classification::Sufficient
    } else {
        Classification::NeedsOcr
    }
}
