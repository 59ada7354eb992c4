//! Extraction pipeline configuration.
//!
//! All knobs have working defaults; a TOML file can override any subset and
//! CLI flags override the file. The defaults mirror the tuning the pipeline
//! shipped with, not discovered invariants - treat them as tunable.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ExtractError;

/// Minimum trimmed character count for a page's embedded text layer to be
/// reported without OCR.
pub const DEFAULT_MIN_DIRECT_CHARS: usize = 20;

/// Rasterization resolution handed to pdftoppm.
pub const DEFAULT_DPI: u32 = 200;

/// Wall-clock budget for rasterizing the whole document, in seconds.
pub const DEFAULT_RASTER_TIMEOUT_SECS: u64 = 40;

/// Per-page OCR budget, in seconds.
pub const DEFAULT_OCR_TIMEOUT_SECS: u64 = 8;

/// Concurrent OCR workers.
pub const DEFAULT_WORKERS: usize = 4;

/// Configuration for one extraction pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Pages with fewer trimmed characters of embedded text than this are
    /// sent to OCR fallback.
    pub min_direct_chars: usize,
    /// Resolution for page rasterization.
    pub dpi: u32,
    /// Timeout for the single whole-document pdftoppm invocation.
    pub raster_timeout_secs: u64,
    /// Timeout for each per-page tesseract invocation.
    pub ocr_timeout_secs: u64,
    /// Size of the OCR worker pool.
    pub workers: usize,
    /// Tesseract language setting.
    pub language: String,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            min_direct_chars: DEFAULT_MIN_DIRECT_CHARS,
            dpi: DEFAULT_DPI,
            raster_timeout_secs: DEFAULT_RASTER_TIMEOUT_SECS,
            ocr_timeout_secs: DEFAULT_OCR_TIMEOUT_SECS,
            workers: DEFAULT_WORKERS,
            language: "eng".to_string(),
        }
    }
}

impl ExtractConfig {
    /// Load configuration from a TOML file, filling unset keys from defaults.
    pub fn from_file(path: &Path) -> Result<Self, ExtractError> {
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw).map_err(|e| ExtractError::Config {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Whole-document rasterization budget.
    pub fn raster_timeout(&self) -> Duration {
        Duration::from_secs(self.raster_timeout_secs)
    }

    /// Per-page OCR budget.
    pub fn ocr_timeout(&self) -> Duration {
        Duration::from_secs(self.ocr_timeout_secs)
    }
}
