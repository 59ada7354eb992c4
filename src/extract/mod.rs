//! The extraction pipeline.
//!
//! One `Extractor` is an explicitly constructed per-request context: load
//! the document and attempt direct extraction, classify each page, and only
//! if some page needs fallback, rasterize the document once and fan OCR out
//! over a bounded worker pool. The aggregate result is always complete -
//! every page reports either its embedded text, genuine OCR output, or a
//! sentinel describing how its fallback degraded.

mod classifier;
mod loader;
mod ocr;
mod raster;
mod scheduler;
pub mod tools;

use std::path::Path;
use std::sync::Arc;

pub use classifier::classify;
pub use loader::DocumentLoader;
pub use ocr::{OcrEngine, TesseractEngine, OCR_EMPTY, OCR_ERROR_PREFIX, OCR_TIMEOUT};
pub use raster::{rasterize, PageImages};
pub use scheduler::{FallbackScheduler, NO_IMAGE, OCR_FAILED_PREFIX};

use crate::config::ExtractConfig;
use crate::error::ExtractError;
use crate::models::{Classification, Document, ExtractionResult, PageText};

/// The per-request pipeline context.
pub struct Extractor {
    config: ExtractConfig,
    loader: DocumentLoader,
    scheduler: FallbackScheduler,
}

impl Extractor {
    /// Build an extractor backed by the system Tesseract binary.
    pub fn new(config: ExtractConfig) -> Self {
        let engine = Arc::new(TesseractEngine::new(&config.language, config.ocr_timeout()));
        Self::with_engine(config, engine)
    }

    /// Build an extractor with a custom OCR engine.
    pub fn with_engine(config: ExtractConfig, engine: Arc<dyn OcrEngine>) -> Self {
        let scheduler = FallbackScheduler::new(engine, config.workers);
        Self {
            config,
            loader: DocumentLoader::new(),
            scheduler,
        }
    }

    /// Extract text from a PDF file on disk.
    ///
    /// Fails only if the PDF container itself cannot be opened; every
    /// page-scoped problem degrades to a sentinel in the result.
    pub async fn extract(&self, pdf: &Path) -> Result<ExtractionResult, ExtractError> {
        let mut doc = self.loader.load(pdf).await?;
        Ok(self.process(&mut doc).await)
    }

    /// Extract text from raw PDF bytes.
    ///
    /// The bytes are persisted to a request-scoped temp file for the
    /// external tools, reclaimed when extraction finishes on any path.
    pub async fn extract_bytes(&self, bytes: &[u8]) -> Result<ExtractionResult, ExtractError> {
        let mut file = tempfile::Builder::new().suffix(".pdf").tempfile()?;
        std::io::Write::write_all(&mut file, bytes)?;
        self.extract(file.path()).await
    }

    /// Run classification, fallback, and aggregation over a loaded document.
    pub async fn process(&self, doc: &mut Document) -> ExtractionResult {
        for page in doc.pages.iter_mut() {
            page.classification = classify(&page.direct_text, self.config.min_direct_chars);
            if page.classification == Classification::Sufficient {
                page.final_text = page.direct_text.clone();
            }
        }

        let any_needs_ocr = doc
            .pages
            .iter()
            .any(|p| p.classification == Classification::NeedsOcr);

        // Rasterization is skipped entirely when no page needs fallback.
        let ocr_used = if any_needs_ocr {
            let images = rasterize(&doc.path, self.config.dpi, self.config.raster_timeout()).await;
            self.scheduler.run(&mut doc.pages, &images).await
        } else {
            false
        };

        aggregate(doc, ocr_used)
    }
}

/// Merge per-page final texts into the ordered aggregate.
///
/// Iterates by index, so the result is in page order no matter how the
/// fallback tasks completed. Produces exactly `page_count` entries.
fn aggregate(doc: &Document, ocr_used: bool) -> ExtractionResult {
    let pages: Vec<PageText> = doc
        .pages
        .iter()
        .map(|p| PageText {
            page_number: p.index as u32 + 1,
            text: p.final_text.clone(),
        })
        .collect();

    let full_text = doc
        .pages
        .iter()
        .map(|p| p.final_text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    ExtractionResult {
        page_count: doc.page_count,
        ocr_used,
        pages,
        full_text,
    }
}
