//! Error types for the shot2seo library.
//!
//! A run is all-or-nothing: every failure, whether it happens while reading
//! inputs, talking to the model, or packing the archive, surfaces as a single
//! [`SeoGenError`] from the top-level `generate*` functions. Pages generated
//! before the failure are discarded together with the run.
//!
//! Variants are grouped by the stage that produces them so callers can match
//! on the broad category (input, LLM, output) without caring about detail.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the shot2seo library.
#[derive(Debug, Error)]
pub enum SeoGenError {
    // ── Precondition errors ───────────────────────────────────────────────
    /// A required input (credential or screenshots) was not supplied.
    ///
    /// Raised before any network call is made.
    #[error("Missing required input: {what}\nScreenshots and an API key are required.")]
    MissingInput { what: String },

    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("File not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input string is not a valid file path or URL.
    #[error("Invalid input '{input}': not a file path or a valid HTTP/HTTPS URL")]
    InvalidInput { input: String },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    /// A screenshot could not be decoded as an image.
    #[error("Screenshot '{name}' could not be decoded: {detail}\nSupported formats: PNG, JPEG.")]
    ImageDecodeFailed { name: String, detail: String },

    // ── Keyword source errors ─────────────────────────────────────────────
    /// The keyword CSV has no header row or no column with the expected name.
    #[error("Keyword file '{path}' has no '{column}' column")]
    KeywordColumnMissing { path: PathBuf, column: String },

    /// The keyword CSV could not be parsed.
    #[error("Keyword file '{path}' is not valid CSV: {detail}")]
    KeywordFileInvalid { path: PathBuf, detail: String },

    // ── LLM errors ────────────────────────────────────────────────────────
    /// The configured provider is not initialised (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// The LLM API returned an error for a single call.
    #[error("LLM API error: {message}")]
    LlmApiError { message: String },

    /// The layout-inference call failed; no page was attempted.
    #[error("Layout inference failed: {detail}")]
    LayoutFailed { detail: String },

    /// A content-generation call failed; remaining keywords were not attempted.
    #[error("Page {index} ('{keyword}') failed: {detail}")]
    PageFailed {
        index: usize,
        keyword: String,
        detail: String,
    },

    // ── Output errors ─────────────────────────────────────────────────────
    /// Staging or packing the ZIP archive failed.
    #[error("Failed to build archive: {detail}")]
    ArchiveFailed { detail: String },

    /// Could not create or write the output archive file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<zip::result::ZipError> for SeoGenError {
    fn from(e: zip::result::ZipError) -> Self {
        SeoGenError::ArchiveFailed {
            detail: e.to_string(),
        }
    }
}
