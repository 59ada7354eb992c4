//! Fallback scheduler: bounded concurrent OCR over the pages that need it.
//!
//! Tasks complete in arbitrary order; correctness rests on index-addressed
//! writes. Each task owns exactly one page slot for its lifetime, and page
//! order is reconstructed by the aggregator iterating indices - never here.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::models::{Classification, Page};

use super::ocr::OcrEngine;
use super::raster::PageImages;

/// Sentinel for a page that needed OCR but had no rasterized image.
pub const NO_IMAGE: &str = "[NO IMAGE AVAILABLE FOR OCR]";

/// Sentinel prefix for a task that failed to report a result at all.
pub const OCR_FAILED_PREFIX: &str = "[OCR FAILED]";

/// Runs OCR for every `NeedsOcr` page under a fixed-size worker pool.
pub struct FallbackScheduler {
    engine: Arc<dyn OcrEngine>,
    workers: usize,
}

impl FallbackScheduler {
    pub fn new(engine: Arc<dyn OcrEngine>, workers: usize) -> Self {
        Self {
            engine,
            workers: workers.max(1),
        }
    }

    /// Run the fallback round. Returns whether OCR was invoked, i.e. whether
    /// any page was classified `NeedsOcr` - individual task failures do not
    /// change that flag.
    ///
    /// Every `NeedsOcr` page has its final text set on return: OCR output,
    /// or a sentinel for missing images and lost tasks. Pages with no image
    /// are settled inline and never reach the pool. Images are looked up by
    /// `Page::index`; result writes address the page's slice position, so
    /// the slice need not be sorted by index.
    pub async fn run(&self, pages: &mut [Page], images: &PageImages) -> bool {
        let needs_ocr: Vec<(usize, usize)> = pages
            .iter()
            .enumerate()
            .filter(|(_, p)| p.classification == Classification::NeedsOcr)
            .map(|(slot, p)| (slot, p.index))
            .collect();

        if needs_ocr.is_empty() {
            return false;
        }
        tracing::info!("{} of {} pages need OCR", needs_ocr.len(), pages.len());

        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut tasks = JoinSet::new();
        let mut task_slots: HashMap<tokio::task::Id, usize> = HashMap::new();

        for (slot, index) in needs_ocr {
            let Some(image) = images.get(index) else {
                pages[slot].final_text = NO_IMAGE.to_string();
                continue;
            };
            let image = image.to_path_buf();
            let engine = Arc::clone(&self.engine);
            let semaphore = Arc::clone(&semaphore);

            let handle = tasks.spawn(async move {
                // The semaphore is never closed while tasks run.
                let _permit = semaphore.acquire_owned().await.ok();
                (slot, engine.recognize(&image).await)
            });
            task_slots.insert(handle.id(), slot);
        }

        // Collect in completion order; each result carries its page slot.
        while let Some(joined) = tasks.join_next_with_id().await {
            match joined {
                Ok((_, (slot, text))) => {
                    pages[slot].ocr_text = Some(text.clone());
                    pages[slot].final_text = text;
                }
                Err(e) => {
                    // A task that panicked or was aborted still must not
                    // leave its slot empty.
                    if let Some(&slot) = task_slots.get(&e.id()) {
                        tracing::warn!(
                            "OCR task for page {} was lost: {}",
                            pages[slot].index + 1,
                            e
                        );
                        pages[slot].final_text = format!("{} {}", OCR_FAILED_PREFIX, e);
                    }
                }
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use std::path::Path;

    /// Engine that answers with the page number parsed from the image path,
    /// after a per-page delay chosen so higher pages finish first.
    struct ReverseDelayEngine;

    fn page_of(image: &Path) -> usize {
        image
            .file_stem()
            .and_then(|s| s.to_str())
            .and_then(|s| s.rsplit('-').next())
            .and_then(|s| s.parse().ok())
            .unwrap_or(0)
    }

    #[async_trait]
    impl OcrEngine for ReverseDelayEngine {
        async fn recognize(&self, image: &Path) -> String {
            let page = page_of(image);
            // Later pages complete sooner.
            tokio::time::sleep(Duration::from_millis(60 - 10 * page as u64)).await;
            format!("recognized page {}", page)
        }
    }

    /// Engine that counts calls and tracks peak concurrency.
    struct CountingEngine {
        calls: AtomicUsize,
        running: AtomicUsize,
        peak: AtomicUsize,
    }

    impl CountingEngine {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                running: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl OcrEngine for CountingEngine {
        async fn recognize(&self, _image: &Path) -> String {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(30)).await;
            self.running.fetch_sub(1, Ordering::SeqCst);
            "ok".to_string()
        }
    }

    fn pages(count: usize, needs_ocr: &[usize]) -> Vec<Page> {
        (0..count)
            .map(|i| {
                let mut page = Page::new(i, format!("embedded text for page {i}, long enough"));
                if needs_ocr.contains(&i) {
                    page.direct_text.clear();
                } else {
                    page.classification = Classification::Sufficient;
                    page.final_text = page.direct_text.clone();
                }
                page
            })
            .collect()
    }

    fn fake_images(indices: &[usize]) -> PageImages {
        PageImages::from_paths(
            indices
                .iter()
                .map(|&i| (i, PathBuf::from(format!("/fake/page-{i}.jpg"))))
                .collect(),
        )
    }

    #[tokio::test]
    async fn completion_order_does_not_affect_slots() {
        let mut pages = pages(6, &[0, 1, 2, 3, 4, 5]);
        let images = fake_images(&[0, 1, 2, 3, 4, 5]);
        let scheduler = FallbackScheduler::new(Arc::new(ReverseDelayEngine), 6);

        let ocr_used = scheduler.run(&mut pages, &images).await;
        assert!(ocr_used);
        for (i, page) in pages.iter().enumerate() {
            assert_eq!(page.final_text, format!("recognized page {}", i));
            assert_eq!(page.ocr_text.as_deref(), Some(page.final_text.as_str()));
        }
    }

    #[tokio::test]
    async fn no_needs_ocr_pages_means_no_work() {
        let engine = Arc::new(CountingEngine::new());
        let mut pages = pages(3, &[]);
        let scheduler = FallbackScheduler::new(engine.clone(), 4);

        let ocr_used = scheduler.run(&mut pages, &PageImages::empty()).await;
        assert!(!ocr_used);
        assert_eq!(engine.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_image_settles_inline_without_an_engine_call() {
        let engine = Arc::new(CountingEngine::new());
        let mut pages = pages(3, &[1, 2]);
        // Only page 2 got an image.
        let images = fake_images(&[2]);
        let scheduler = FallbackScheduler::new(engine.clone(), 4);

        let ocr_used = scheduler.run(&mut pages, &images).await;
        assert!(ocr_used);
        assert_eq!(pages[1].final_text, NO_IMAGE);
        assert_eq!(pages[2].final_text, "ok");
        assert_eq!(engine.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn worker_pool_bounds_concurrency() {
        let engine = Arc::new(CountingEngine::new());
        let mut pages = pages(8, &[0, 1, 2, 3, 4, 5, 6, 7]);
        let images = fake_images(&[0, 1, 2, 3, 4, 5, 6, 7]);
        let scheduler = FallbackScheduler::new(engine.clone(), 2);

        scheduler.run(&mut pages, &images).await;
        assert_eq!(engine.calls.load(Ordering::SeqCst), 8);
        assert!(engine.peak.load(Ordering::SeqCst) <= 2);
    }

    /// Engine whose task never reports a result.
    struct PanickingEngine;

    #[async_trait]
    impl OcrEngine for PanickingEngine {
        async fn recognize(&self, _image: &Path) -> String {
            panic!("engine crashed mid-page");
        }
    }

    #[tokio::test]
    async fn lost_task_still_fills_its_slot() {
        let mut pages = pages(2, &[0]);
        let images = fake_images(&[0]);
        let scheduler = FallbackScheduler::new(Arc::new(PanickingEngine), 4);

        let ocr_used = scheduler.run(&mut pages, &images).await;
        assert!(ocr_used);
        assert!(
            pages[0].final_text.starts_with(OCR_FAILED_PREFIX),
            "got {:?}",
            pages[0].final_text
        );
        assert_eq!(pages[1].final_text, pages[1].direct_text);
    }

    #[tokio::test]
    async fn unsorted_page_slices_write_the_right_slots() {
        // Slice position deliberately disagrees with Page::index.
        let mut pages = vec![Page::new(2, String::new()), Page::new(0, String::new())];
        let images = fake_images(&[0, 2]);
        let scheduler = FallbackScheduler::new(Arc::new(ReverseDelayEngine), 2);

        let ocr_used = scheduler.run(&mut pages, &images).await;
        assert!(ocr_used);
        assert_eq!(pages[0].final_text, "recognized page 2");
        assert_eq!(pages[1].final_text, "recognized page 0");
    }

    #[tokio::test]
    async fn sufficient_pages_keep_their_direct_text() {
        let mut pages = pages(3, &[1]);
        let images = fake_images(&[1]);
        let scheduler = FallbackScheduler::new(Arc::new(ReverseDelayEngine), 4);

        scheduler.run(&mut pages, &images).await;
        assert_eq!(pages[0].final_text, pages[0].direct_text);
        assert_eq!(pages[1].final_text, "recognized page 1");
        assert_eq!(pages[2].final_text, pages[2].direct_text);
    }
}
