//! Batch page rasterization via pdftoppm.
//!
//! The whole document is converted in a single pdftoppm invocation rather
//! than one process per page: process startup dominates for short runs, and
//! the OCR stage is already per-page. Rasterization failure of any kind is a
//! soft failure - the caller gets an empty image set and pages degrade to
//! the no-image sentinel instead of failing the request.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tempfile::TempDir;
use tokio::process::Command;

/// Rasterized page images for one document.
///
/// Holds the temp directory the images live in, so dropping the set reclaims
/// the on-disk artifacts on every exit path. Zero-or-one image per page: the
/// tool can crash, time out, or emit fewer files than the document has pages.
#[derive(Debug)]
pub struct PageImages {
    _dir: Option<TempDir>,
    paths: HashMap<usize, PathBuf>,
}

impl PageImages {
    /// The empty set, used when rasterization fails entirely.
    pub fn empty() -> Self {
        Self {
            _dir: None,
            paths: HashMap::new(),
        }
    }

    /// Build a set from explicit page-index-to-path entries. The images are
    /// not owned and will not be cleaned up; used by alternative image
    /// sources and tests.
    pub fn from_paths(paths: HashMap<usize, PathBuf>) -> Self {
        Self { _dir: None, paths }
    }

    /// Image path for a 0-based page index, if one was produced.
    pub fn get(&self, index: usize) -> Option<&Path> {
        self.paths.get(&index).map(|p| p.as_path())
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Rasterize every page of a PDF to JPEG in one pdftoppm run.
///
/// Never fails the request: any error (tool missing, non-zero exit, timeout,
/// unreadable output directory) logs a warning and returns an empty set. On
/// timeout the child is killed via `kill_on_drop` so no process outlives its
/// budget.
pub async fn rasterize(pdf: &Path, dpi: u32, timeout: Duration) -> PageImages {
    let dir = match TempDir::new() {
        Ok(dir) => dir,
        Err(e) => {
            tracing::warn!("could not create raster temp dir: {}", e);
            return PageImages::empty();
        }
    };

    let mut cmd = Command::new("pdftoppm");
    cmd.arg("-jpeg")
        .args(["-r", &dpi.to_string()])
        .arg(pdf)
        .arg(dir.path().join("page"))
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true);

    match tokio::time::timeout(timeout, cmd.status()).await {
        Ok(Ok(status)) if status.success() => {}
        Ok(Ok(status)) => {
            tracing::warn!("pdftoppm exited with {}", status);
            return PageImages::empty();
        }
        Ok(Err(e)) => {
            tracing::warn!("pdftoppm could not be run: {}", e);
            return PageImages::empty();
        }
        Err(_) => {
            tracing::warn!("pdftoppm timed out after {:?}", timeout);
            return PageImages::empty();
        }
    }

    let paths = match index_images(dir.path()) {
        Ok(paths) => paths,
        Err(e) => {
            tracing::warn!("could not read rasterized pages: {}", e);
            return PageImages::empty();
        }
    };

    tracing::info!("rasterized {} pages at {} dpi", paths.len(), dpi);
    PageImages {
        _dir: Some(dir),
        paths,
    }
}

/// Map pdftoppm output files back to 0-based page indices.
///
/// pdftoppm names files `page-N.jpg` and zero-pads N to the width of the
/// last page number (`page-1.jpg`, `page-07.jpg`, `page-012.jpg`), so the
/// page number is parsed out of the stem rather than probed by width.
fn index_images(dir: &Path) -> std::io::Result<HashMap<usize, PathBuf>> {
    let mut paths = HashMap::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_jpg = path.extension().map(|ext| ext == "jpg").unwrap_or(false);
        if !is_jpg {
            continue;
        }
        let page_num = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .and_then(|stem| stem.rsplit('-').next())
            .and_then(|num| num.parse::<usize>().ok());
        if let Some(num) = page_num {
            if num >= 1 {
                paths.insert(num - 1, path);
            }
        }
    }
    Ok(paths)
}
