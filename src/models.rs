//! Core data model for a single extraction request.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A PDF document opened for extraction.
///
/// Created once per request by the loader; `page_count` is immutable after
/// creation and `pages` always holds exactly `page_count` entries.
#[derive(Debug)]
pub struct Document {
    /// Path to the PDF file on disk.
    pub path: PathBuf,
    /// Total number of pages reported by the PDF container.
    pub page_count: u32,
    /// Per-page state, indexed 0-based.
    pub pages: Vec<Page>,
}

/// Whether a page's embedded text layer is usable on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// The embedded text layer is long enough to report as-is.
    Sufficient,
    /// The text layer is missing or too sparse; the page needs OCR.
    NeedsOcr,
}

/// Per-page extraction state.
#[derive(Debug, Clone)]
pub struct Page {
    /// 0-based index, stable identity within the document.
    pub index: usize,
    /// Trimmed embedded text, empty if direct extraction failed.
    pub direct_text: String,
    /// Set by the classifier before any fallback work is scheduled.
    pub classification: Classification,
    /// OCR output, present only for pages that went through fallback.
    pub ocr_text: Option<String>,
    /// The text actually reported for this page. Set exactly once on every
    /// path before aggregation: the direct text for sufficient pages, OCR
    /// output or a sentinel for everything else.
    pub final_text: String,
}

impl Page {
    /// Create a page from its direct-extraction result. Starts as
    /// `NeedsOcr`; the classifier settles the classification.
    pub fn new(index: usize, direct_text: String) -> Self {
        Self {
            index,
            direct_text,
            classification: Classification::NeedsOcr,
            ocr_text: None,
            final_text: String::new(),
        }
    }
}

/// One page of the final result, 1-based for external consumers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageText {
    pub page_number: u32,
    pub text: String,
}

/// The aggregate returned to the caller: complete, ordered, immutable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Total pages in the document; `pages` has exactly this many entries.
    pub page_count: u32,
    /// True iff at least one page was classified as needing OCR, regardless
    /// of whether each individual fallback attempt succeeded.
    pub ocr_used: bool,
    /// Per-page text in ascending page order.
    pub pages: Vec<PageText>,
    /// All page texts joined with a blank line, in page order.
    pub full_text: String,
}
