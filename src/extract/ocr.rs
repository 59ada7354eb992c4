//! OCR adapter: Tesseract behind a best-effort, never-failing interface.
//!
//! OCR is inherently best-effort per page, so the adapter maps every failure
//! mode to a sentinel string instead of an error. One page's OCR failure
//! must never block or corrupt the result for any other page.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

/// Sentinel reported when an OCR task exceeds its time budget.
pub const OCR_TIMEOUT: &str = "[OCR TIMEOUT]";

/// Sentinel prefix reported when the OCR invocation itself fails.
pub const OCR_ERROR_PREFIX: &str = "[OCR ERROR]";

/// Sentinel reported when OCR succeeds but recognizes no text.
pub const OCR_EMPTY: &str = "[OCR EMPTY]";

/// Recognizes text in a single page image.
///
/// The seam between the scheduler and the OCR engine: production uses
/// Tesseract, tests substitute deterministic engines. Every implementation
/// must return a string on every path - sentinels, never errors.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    async fn recognize(&self, image: &Path) -> String;
}

/// Tesseract OCR via the system binary.
pub struct TesseractEngine {
    program: String,
    language: String,
    timeout: Duration,
}

impl TesseractEngine {
    pub fn new(language: &str, timeout: Duration) -> Self {
        Self {
            program: "tesseract".to_string(),
            language: language.to_string(),
            timeout,
        }
    }

    /// Override the binary name, for alternate tesseract builds.
    pub fn with_program(mut self, program: &str) -> Self {
        self.program = program.to_string();
        self
    }
}

#[async_trait]
impl OcrEngine for TesseractEngine {
    /// Run Tesseract on one image under the per-task budget.
    ///
    /// Failure policy, in priority order: timeout, invocation failure,
    /// non-zero exit, empty output - each yields its sentinel. The child is
    /// killed when the timeout drops the future, so an expired task never
    /// holds a worker slot beyond its budget.
    async fn recognize(&self, image: &Path) -> String {
        let mut cmd = Command::new(&self.program);
        cmd.arg(image)
            .arg("stdout")
            .args(["-l", &self.language])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = match tokio::time::timeout(self.timeout, cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                tracing::debug!("{} could not be run: {}", self.program, e);
                return format!("{} {}", OCR_ERROR_PREFIX, e);
            }
            Err(_) => {
                tracing::debug!(
                    "{} timed out after {:?} on {}",
                    self.program,
                    self.timeout,
                    image.display()
                );
                return OCR_TIMEOUT.to_string();
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return format!("{} {}", OCR_ERROR_PREFIX, stderr.trim());
        }

        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if text.is_empty() {
            OCR_EMPTY.to_string()
        } else {
            text
        }
    }
}
