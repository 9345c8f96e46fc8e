//! Eager (whole-run) generation entry points.
//!
//! These functions wait for every page, build the archive, and return a
//! [`GenerationOutput`]. Use [`crate::stream::generate_stream`] instead to
//! receive pages one at a time as they are generated.
//!
//! A run follows one fixed sequence:
//!
//! ```text
//! Idle ─▶ LayoutPending ─▶ LayoutReady ─▶ PagePending(1) ─▶ … ─▶ PagePending(N) ─▶ Done
//! ```
//!
//! There is no retry edge. The first failed call ends the run with an error
//! and the pages generated so far are dropped with it.

use crate::config::{GenerationRequest, DEFAULT_PROVIDER};
use crate::error::SeoGenError;
use crate::keywords;
use crate::output::{GeneratedPage, GenerationOutput, GenerationStats, OutputArchive};
use crate::pipeline::archive;
use crate::pipeline::encode::{self, EncodedImage};
use crate::pipeline::input::{GenerationInputs, Screenshot};
use crate::pipeline::llm::{self, GenerationBackend, ProviderBackend};
use edgequake_llm::{
    AnthropicProvider, GeminiProvider, LLMProvider, OpenAIProvider, OpenRouterProvider,
    ProviderFactory, ProviderType,
};
use futures::stream::{self, StreamExt, TryStreamExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Generate one page per keyword and pack them into an archive.
///
/// This is the primary entry point for the library. Providers are resolved
/// from `request` (see [`resolve_backend`]).
///
/// # Errors
/// - [`SeoGenError::MissingInput`] when the credential or the screenshots are
///   missing; no call is made.
/// - Keyword, image and provider errors before the first call.
/// - [`SeoGenError::LayoutFailed`] / [`SeoGenError::PageFailed`] from the
///   generation service; the run stops at the first one.
pub async fn generate(
    inputs: &GenerationInputs,
    request: &GenerationRequest,
) -> Result<GenerationOutput, SeoGenError> {
    check_preconditions(inputs, request)?;
    let backend = resolve_backend(request)?;
    execute(&backend, inputs, request).await
}

/// Same as [`generate`] but with a caller-supplied backend.
pub async fn generate_with_backend(
    backend: &dyn GenerationBackend,
    inputs: &GenerationInputs,
    request: &GenerationRequest,
) -> Result<GenerationOutput, SeoGenError> {
    check_preconditions(inputs, request)?;
    execute(backend, inputs, request).await
}

/// Generate and write the archive to `output_path`.
///
/// If `output_path` is an existing directory the archive is written inside
/// it as `<project>_seo_pages.zip`. Returns the final path and run stats.
pub async fn generate_to_file(
    inputs: &GenerationInputs,
    output_path: impl AsRef<Path>,
    request: &GenerationRequest,
) -> Result<(PathBuf, GenerationStats), SeoGenError> {
    let output = generate(inputs, request).await?;
    let path = output_path.as_ref();
    let path = if path.is_dir() {
        path.join(&output.archive.file_name)
    } else {
        path.to_path_buf()
    };
    write_archive(&output.archive, &path).await?;
    Ok((path, output.stats))
}

/// Synchronous wrapper around [`generate`].
///
/// Creates a temporary tokio runtime internally.
pub fn generate_sync(
    inputs: &GenerationInputs,
    request: &GenerationRequest,
) -> Result<GenerationOutput, SeoGenError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| SeoGenError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(generate(inputs, request))
}

/// Write archive bytes to `path`.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub async fn write_archive(archive: &OutputArchive, path: &Path) -> Result<(), SeoGenError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| SeoGenError::OutputWriteFailed {
                    path: path.to_path_buf(),
                    source: e,
                })?;
        }
    }

    let tmp_path = path.with_extension("zip.tmp");
    tokio::fs::write(&tmp_path, &archive.bytes)
        .await
        .map_err(|e| SeoGenError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| SeoGenError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    info!("Wrote {} ({} bytes)", path.display(), archive.bytes.len());
    Ok(())
}

/// Reject a run that lacks a credential or screenshots.
///
/// Zero keywords is not an error; it produces an empty archive.
pub fn check_preconditions(
    inputs: &GenerationInputs,
    request: &GenerationRequest,
) -> Result<(), SeoGenError> {
    let missing = match (request.has_credential(), !inputs.screenshots.is_empty()) {
        (true, true) => return Ok(()),
        (false, false) => "API key and screenshots",
        (false, true) => "API key",
        (true, false) => "screenshots",
    };
    Err(SeoGenError::MissingInput {
        what: missing.to_string(),
    })
}

/// Resolve the layout and page providers, from most-specific to least-specific.
///
/// 1. **Pre-built providers** (`layout_provider` / `page_provider`) are used
///    as-is, each independently.
/// 2. Otherwise the provider is named by `provider_name`, then the
///    `SHOT2SEO_PROVIDER` environment variable, then [`DEFAULT_PROVIDER`],
///    and built with `layout_model` / `page_model`.
/// 3. The request's `api_key` is handed straight to the OpenAI, Anthropic,
///    Gemini and OpenRouter providers. Other providers, and requests without
///    a key, go through [`ProviderFactory::create_llm_provider`], which reads
///    the provider's key (`OPENAI_API_KEY`, …) from the environment.
pub fn resolve_backend(request: &GenerationRequest) -> Result<ProviderBackend, SeoGenError> {
    let provider_name = request
        .provider_name
        .clone()
        .or_else(|| {
            std::env::var("SHOT2SEO_PROVIDER")
                .ok()
                .filter(|p| !p.is_empty())
        })
        .unwrap_or_else(|| DEFAULT_PROVIDER.to_string());
    let api_key = request.api_key.as_deref().filter(|k| !k.trim().is_empty());

    let layout = match request.layout_provider {
        Some(ref provider) => Arc::clone(provider),
        None => create_provider(&provider_name, &request.layout_model, api_key)?,
    };
    let page = match request.page_provider {
        Some(ref provider) => Arc::clone(provider),
        None => create_provider(&provider_name, &request.page_model, api_key)?,
    };

    Ok(ProviderBackend::new(layout, page))
}

// ── Internal helpers ─────────────────────────────────────────────────────

fn create_provider(
    provider_name: &str,
    model: &str,
    api_key: Option<&str>,
) -> Result<Arc<dyn LLMProvider>, SeoGenError> {
    if let (Some(key), Some(kind)) = (api_key, ProviderType::from_str(provider_name)) {
        let provider: Option<Arc<dyn LLMProvider>> = match kind {
            ProviderType::OpenAI => Some(Arc::new(OpenAIProvider::new(key).with_model(model))),
            ProviderType::Anthropic => {
                Some(Arc::new(AnthropicProvider::new(key).with_model(model)))
            }
            ProviderType::OpenRouter => {
                Some(Arc::new(OpenRouterProvider::new(key).with_model(model)))
            }
            // Vertex AI authenticates with project credentials, not a key.
            ProviderType::Gemini if !model.starts_with("vertexai:") => {
                Some(Arc::new(GeminiProvider::new(key).with_model(model)))
            }
            _ => None,
        };
        if let Some(provider) = provider {
            debug!("Built {} provider for '{}' from request key", provider_name, model);
            return Ok(provider);
        }
    }

    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        SeoGenError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!(
                "Could not create model '{model}': {e}\n\
                Pass --api-key or export the provider's key (e.g. OPENAI_API_KEY)."
            ),
        }
    })
}

/// Decode and re-encode every screenshot, stopping at the first bad one.
pub(crate) fn encode_screenshots(shots: &[Screenshot]) -> Result<Vec<EncodedImage>, SeoGenError> {
    shots
        .iter()
        .map(|shot| {
            encode::encode_screenshot(shot).map_err(|e| SeoGenError::ImageDecodeFailed {
                name: shot.name.clone(),
                detail: e.to_string(),
            })
        })
        .collect()
}

/// The run after preconditions hold.
async fn execute(
    backend: &dyn GenerationBackend,
    inputs: &GenerationInputs,
    request: &GenerationRequest,
) -> Result<GenerationOutput, SeoGenError> {
    let total_start = Instant::now();
    info!("Starting generation for project '{}'", request.project_name);

    // ── Step 1: Resolve keywords ─────────────────────────────────────────
    let keywords = keywords::resolve_keywords(
        inputs.keyword_text.as_deref(),
        inputs.keyword_file.as_deref(),
    )?;

    // ── Step 2: Encode screenshots ───────────────────────────────────────
    let images = encode_screenshots(&inputs.screenshots)?;
    debug!("Encoded {} screenshots", images.len());

    if let Some(ref cb) = request.progress_callback {
        cb.on_run_start(keywords.len());
    }

    // ── Step 3: Layout inference ─────────────────────────────────────────
    if let Some(ref cb) = request.progress_callback {
        cb.on_layout_start(images.len());
    }
    let layout = llm::infer_layout(backend, &images, request).await?;
    info!(
        "Layout inferred from {} screenshots in {}ms",
        images.len(),
        layout.duration_ms
    );
    if let Some(ref cb) = request.progress_callback {
        cb.on_layout_complete(layout.html.len());
    }

    // ── Step 4: One content call per keyword ─────────────────────────────
    let pages_start = Instant::now();
    let pages = generate_pages(backend, &layout.html, &keywords, request).await?;
    let pages_duration_ms = pages_start.elapsed().as_millis() as u64;

    // ── Step 5: Archive ──────────────────────────────────────────────────
    let project = request.project_name.clone();
    let (pages, archive) = tokio::task::spawn_blocking(move || {
        let archive = archive::build_archive(&pages, &project);
        (pages, archive)
    })
    .await
    .map_err(|e| SeoGenError::Internal(format!("archive task failed: {e}")))?;
    let archive = archive?;

    // ── Step 6: Stats ────────────────────────────────────────────────────
    let stats = GenerationStats {
        total_keywords: keywords.len(),
        pages_generated: pages.len(),
        archive_entries: archive.entries.len(),
        total_input_tokens: layout.input_tokens as u64
            + pages.iter().map(|p| p.input_tokens as u64).sum::<u64>(),
        total_output_tokens: layout.output_tokens as u64
            + pages.iter().map(|p| p.output_tokens as u64).sum::<u64>(),
        layout_duration_ms: layout.duration_ms,
        pages_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Generation complete: {} pages, {} archive entries, {}ms total",
        stats.pages_generated, stats.archive_entries, stats.total_duration_ms
    );

    if let Some(ref cb) = request.progress_callback {
        cb.on_run_complete(keywords.len(), archive.entries.len());
    }

    Ok(GenerationOutput {
        layout,
        pages,
        archive,
        stats,
    })
}

/// Run the content calls in keyword order, at most `concurrency` in flight.
///
/// `buffered` keeps output in input order; `try_collect` stops pulling new
/// keywords at the first error.
async fn generate_pages(
    backend: &dyn GenerationBackend,
    base_layout: &str,
    keywords: &[String],
    request: &GenerationRequest,
) -> Result<Vec<GeneratedPage>, SeoGenError> {
    let total = keywords.len();
    stream::iter(keywords.iter().enumerate())
        .map(move |(i, keyword)| async move {
            let index = i + 1;
            if let Some(ref cb) = request.progress_callback {
                cb.on_page_start(index, total, keyword);
            }
            let result = llm::generate_page(backend, base_layout, index, keyword, request).await;
            if let Some(ref cb) = request.progress_callback {
                match &result {
                    Ok(page) => cb.on_page_complete(index, total, keyword, page.html.len()),
                    Err(e) => cb.on_page_error(index, total, keyword, &e.to_string()),
                }
            }
            result
        })
        .buffered(request.concurrency.max(1))
        .try_collect()
        .await
}
