//! External tool availability checks.

/// The external binaries the pipeline shells out to.
pub const REQUIRED_TOOLS: [&str; 4] = ["pdfinfo", "pdftotext", "pdftoppm", "tesseract"];

/// Check if a binary is available in PATH.
pub fn check_binary(name: &str) -> bool {
    which::which(name).is_ok()
}

/// Check availability of every required tool.
pub fn check_tools() -> Vec<(&'static str, bool)> {
    REQUIRED_TOOLS
        .iter()
        .map(|tool| (*tool, check_binary(tool)))
        .collect()
}
