//! Request-level error types.
//!
//! Only failures that invalidate the whole extraction surface here. Anything
//! scoped to a single page (failed text extraction, OCR timeout, missing
//! rasterized image) degrades to a sentinel text value instead - see the
//! `extract` module.

use thiserror::Error;

/// Fatal errors that reject the whole extraction request.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The input could not be opened as a PDF container.
    #[error("not a valid PDF: {0}")]
    InvalidPdf(String),

    /// A required external tool is not installed.
    #[error("external tool not found: {0}")]
    ToolNotFound(String),

    /// Failed to read configuration.
    #[error("invalid configuration in {path}: {message}")]
    Config { path: String, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
