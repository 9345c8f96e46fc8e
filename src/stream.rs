//! Streaming generation API: emit pages as they complete.
//!
//! [`generate_stream`] runs the layout phase before returning, then hands
//! back a stream that issues one content call per keyword as it is polled.
//! Callers can write pages to disk, show them in a UI, or stop early by
//! dropping the stream; dropped keywords are never sent.
//!
//! Pages arrive in keyword order. The stream ends right after the first
//! error item, matching the eager API's fail-fast behaviour. No archive is
//! built; use [`crate::pipeline::archive::build_archive`] on the collected
//! pages if one is needed.

use crate::config::GenerationRequest;
use crate::error::SeoGenError;
use crate::generate::{check_preconditions, encode_screenshots, resolve_backend};
use crate::keywords;
use crate::output::{BaseLayout, GeneratedPage};
use crate::pipeline::input::GenerationInputs;
use crate::pipeline::llm::{self, GenerationBackend};
use futures::future;
use futures::stream::{self, StreamExt};
use std::pin::Pin;
use std::sync::Arc;
use tokio_stream::Stream;
use tracing::info;

/// A boxed stream of page results.
pub type PageStream = Pin<Box<dyn Stream<Item = Result<GeneratedPage, SeoGenError>> + Send>>;

/// The inferred layout plus a stream of the pages still to generate.
pub struct LayoutStream {
    pub layout: BaseLayout,
    /// Resolved keywords, in the order pages will arrive.
    pub keywords: Vec<String>,
    pub pages: PageStream,
}

/// Infer the layout, then stream one page per keyword.
///
/// # Returns
/// - `Ok(LayoutStream)` once the layout call succeeded
/// - `Err(SeoGenError)` for missing inputs, bad keyword files or images,
///   provider set-up errors, or a failed layout call
pub async fn generate_stream(
    inputs: &GenerationInputs,
    request: &GenerationRequest,
) -> Result<LayoutStream, SeoGenError> {
    check_preconditions(inputs, request)?;
    let backend: Arc<dyn GenerationBackend> = Arc::new(resolve_backend(request)?);
    start_stream(backend, inputs, request).await
}

/// Same as [`generate_stream`] but with a caller-supplied backend.
pub async fn generate_stream_with_backend(
    backend: Arc<dyn GenerationBackend>,
    inputs: &GenerationInputs,
    request: &GenerationRequest,
) -> Result<LayoutStream, SeoGenError> {
    check_preconditions(inputs, request)?;
    start_stream(backend, inputs, request).await
}

async fn start_stream(
    backend: Arc<dyn GenerationBackend>,
    inputs: &GenerationInputs,
    request: &GenerationRequest,
) -> Result<LayoutStream, SeoGenError> {
    info!("Starting streaming generation for '{}'", request.project_name);

    let keywords = keywords::resolve_keywords(
        inputs.keyword_text.as_deref(),
        inputs.keyword_file.as_deref(),
    )?;
    let images = encode_screenshots(&inputs.screenshots)?;

    if let Some(ref cb) = request.progress_callback {
        cb.on_run_start(keywords.len());
        cb.on_layout_start(images.len());
    }
    let layout = llm::infer_layout(backend.as_ref(), &images, request).await?;
    if let Some(ref cb) = request.progress_callback {
        cb.on_layout_complete(layout.html.len());
    }

    // ── Build the stream ─────────────────────────────────────────────────
    let total = keywords.len();
    let concurrency = request.concurrency.max(1);
    let base_layout: Arc<str> = Arc::from(layout.html.as_str());
    let request = request.clone();

    let s = stream::iter(keywords.clone().into_iter().enumerate())
        .map(move |(i, keyword)| {
            let backend = Arc::clone(&backend);
            let base_layout = Arc::clone(&base_layout);
            let cfg = request.clone();
            async move {
                let index = i + 1;
                if let Some(ref cb) = cfg.progress_callback {
                    cb.on_page_start(index, total, &keyword);
                }
                let result =
                    llm::generate_page(backend.as_ref(), &base_layout, index, &keyword, &cfg).await;
                if let Some(ref cb) = cfg.progress_callback {
                    match &result {
                        Ok(page) => cb.on_page_complete(index, total, &keyword, page.html.len()),
                        Err(e) => cb.on_page_error(index, total, &keyword, &e.to_string()),
                    }
                }
                result
            }
        })
        .buffered(concurrency)
        .scan(false, |failed, item| {
            if *failed {
                return future::ready(None);
            }
            *failed = item.is_err();
            future::ready(Some(item))
        });

    Ok(LayoutStream {
        layout,
        keywords,
        pages: Box::pin(s),
    })
}
