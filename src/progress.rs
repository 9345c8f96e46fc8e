//! Progress-callback trait for per-run generation events.
//!
//! Inject an [`Arc<dyn GenerationProgressCallback>`] via
//! [`crate::config::GenerationRequestBuilder::progress_callback`] to follow a
//! run as it moves from layout inference through each keyword. The library
//! does not care where events go: a terminal bar, a log, a websocket.
//!
//! # Example
//!
//! ```rust
//! use shot2seo::{GenerationProgressCallback, GenerationRequest};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     completed: AtomicUsize,
//! }
//!
//! impl GenerationProgressCallback for CountingCallback {
//!     fn on_page_complete(&self, index: usize, total: usize, keyword: &str, html_len: usize) {
//!         self.completed.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{index}/{total} {keyword}: {html_len} bytes");
//!     }
//! }
//!
//! let request = GenerationRequest::builder()
//!     .progress_callback(Arc::new(CountingCallback { completed: AtomicUsize::new(0) }))
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the orchestrator as a run progresses.
///
/// All methods default to no-ops. With `concurrency > 1`, page events may
/// arrive from several tasks at once, so implementations must be `Send + Sync`.
pub trait GenerationProgressCallback: Send + Sync {
    /// Inputs resolved; `total_keywords` content calls will follow the layout call.
    fn on_run_start(&self, total_keywords: usize) {
        let _ = total_keywords;
    }

    /// The layout-inference request is about to be sent.
    fn on_layout_start(&self, screenshots: usize) {
        let _ = screenshots;
    }

    /// The base layout was received.
    fn on_layout_complete(&self, html_len: usize) {
        let _ = html_len;
    }

    /// A content call for `keyword` (1-indexed `index`) is about to be sent.
    fn on_page_start(&self, index: usize, total: usize, keyword: &str) {
        let _ = (index, total, keyword);
    }

    /// A page was generated.
    fn on_page_complete(&self, index: usize, total: usize, keyword: &str, html_len: usize) {
        let _ = (index, total, keyword, html_len);
    }

    /// A content call failed. The run aborts after this event.
    fn on_page_error(&self, index: usize, total: usize, keyword: &str, error: &str) {
        let _ = (index, total, keyword, error);
    }

    /// The archive was built.
    fn on_run_complete(&self, total_keywords: usize, archive_entries: usize) {
        let _ = (total_keywords, archive_entries);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl GenerationProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::GenerationRequest`].
pub type ProgressCallback = Arc<dyn GenerationProgressCallback>;
