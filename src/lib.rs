//! pdftext - PDF text extraction with per-page OCR fallback.
//!
//! Extracts the embedded text layer from a PDF using Poppler's `pdftotext`,
//! then falls back to Tesseract OCR for pages whose text layer is missing or
//! too sparse to be useful (scanned documents, image-only pages). OCR runs
//! concurrently across pages under a bounded worker pool, and the final
//! result is always complete and in page order regardless of how individual
//! pages fared.
//!
//! External tools (all invoked as child processes):
//! - `pdfinfo` for page counts and input validation
//! - `pdftotext` for the embedded text layer
//! - `pdftoppm` for rasterizing pages to images
//! - `tesseract` for OCR

pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod models;

pub use config::ExtractConfig;
pub use error::ExtractError;
pub use extract::Extractor;
pub use models::{ExtractionResult, PageText};
