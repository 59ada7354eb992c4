//! Document loading: PDF validation, page counts, and the embedded text
//! layer, all via Poppler command-line tools.

use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;

use crate::error::ExtractError;
use crate::models::{Document, Page};

/// Opens a PDF and reports its pages with their direct-extraction results.
pub struct DocumentLoader;

impl DocumentLoader {
    pub fn new() -> Self {
        Self
    }

    /// Open a PDF and attempt direct text extraction for every page.
    ///
    /// A container that cannot be opened is a request-level error; a single
    /// page whose text extraction fails degrades to empty text and is left
    /// for the classifier to route into OCR fallback.
    pub async fn load(&self, path: &Path) -> Result<Document, ExtractError> {
        let page_count = self.page_count(path).await?;
        tracing::info!("{} has {} pages", path.display(), page_count);

        let mut pages = Vec::with_capacity(page_count as usize);
        for index in 0..page_count as usize {
            let text = match self.page_text(path, index as u32 + 1).await {
                Ok(text) => text,
                Err(e) => {
                    tracing::debug!("pdftotext failed on page {}: {}", index + 1, e);
                    String::new()
                }
            };
            pages.push(Page::new(index, text.trim().to_string()));
        }

        Ok(Document {
            path: path.to_path_buf(),
            page_count,
            pages,
        })
    }

    /// Get the page count via pdfinfo. Failure here means the input is not
    /// an openable PDF and rejects the whole request.
    pub async fn page_count(&self, path: &Path) -> Result<u32, ExtractError> {
        let output = Command::new("pdfinfo")
            .arg(path)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await;

        let output = match output {
            Ok(output) => output,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ExtractError::ToolNotFound(
                    "pdfinfo (install poppler-utils)".to_string(),
                ));
            }
            Err(e) => return Err(ExtractError::Io(e)),
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExtractError::InvalidPdf(stderr.trim().to_string()));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_page_count(&stdout).ok_or_else(|| {
            ExtractError::InvalidPdf("pdfinfo reported no page count".to_string())
        })
    }

    /// Run pdftotext on a single page (1-based, as the tool expects).
    async fn page_text(&self, path: &Path, page: u32) -> Result<String, ExtractError> {
        let page_str = page.to_string();
        let output = Command::new("pdftotext")
            .args(["-layout", "-enc", "UTF-8", "-f", &page_str, "-l", &page_str])
            .arg(path)
            .arg("-") // Output to stdout
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await;

        match output {
            Ok(output) if output.status.success() => {
                Ok(String::from_utf8_lossy(&output.stdout).to_string())
            }
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                Err(ExtractError::InvalidPdf(format!(
                    "pdftotext failed on page {}: {}",
                    page,
                    stderr.trim()
                )))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(ExtractError::ToolNotFound(
                "pdftotext (install poppler-utils)".to_string(),
            )),
            Err(e) => Err(ExtractError::Io(e)),
        }
    }
}

impl Default for DocumentLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse the `Pages:` line out of pdfinfo output.
fn parse_page_count(stdout: &str) -> Option<u32> {
    for line in stdout.lines() {
        if line.starts_with("Pages:") {
            return line.split_whitespace().nth(1).and_then(|s| s.parse().ok());
        }
    }
    None
}
