//! Progress-callback trait for per-page extraction events.
//!
//! Inject an [`Arc<dyn ExtractionProgressCallback>`] via
//! [`crate::pipeline::extract::ExtractOptions`] to receive events while a PDF
//! transcript is turned into text. Callers can drive a terminal progress bar,
//! a log line per page, or nothing at all.
//!
//! # Example
//!
//! ```rust
//! use transcript_gpa::ExtractionProgressCallback;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! struct LineCounter {
//!     lines: AtomicUsize,
//! }
//!
//! impl ExtractionProgressCallback for LineCounter {
//!     fn on_page_extracted(&self, page_num: usize, total_pages: usize, line_count: usize) {
//!         self.lines.fetch_add(line_count, Ordering::SeqCst);
//!         eprintln!("Page {}/{}: {} lines", page_num, total_pages, line_count);
//!     }
//! }
//! ```

use std::sync::Arc;

/// Called by the extraction stage as it walks the pages of a PDF.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
pub trait ExtractionProgressCallback: Send + Sync {
    /// Called once after the document is opened.
    ///
    /// # Arguments
    /// * `total_pages` — number of pages that will be read
    fn on_extraction_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called after a page's text has been read.
    ///
    /// # Arguments
    /// * `page_num`    — 1-indexed page number
    /// * `total_pages` — total pages in the document
    /// * `line_count`  — number of text lines the page produced
    fn on_page_extracted(&self, page_num: usize, total_pages: usize, line_count: usize) {
        let _ = (page_num, total_pages, line_count);
    }

    /// Called when a page yields no text. Extraction continues.
    fn on_page_empty(&self, page_num: usize, total_pages: usize) {
        let _ = (page_num, total_pages);
    }

    /// Called once after all pages have been read.
    ///
    /// # Arguments
    /// * `total_pages` — total pages in the document
    /// * `total_lines` — lines across all pages
    fn on_extraction_complete(&self, total_pages: usize, total_lines: usize) {
        let _ = (total_pages, total_lines);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ExtractionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in
/// [`crate::pipeline::extract::ExtractOptions`].
pub type ProgressCallback = Arc<dyn ExtractionProgressCallback>;
