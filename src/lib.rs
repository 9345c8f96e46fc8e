//! # shot2seo
//!
//! Turn desktop screenshots of a website and a keyword list into a ZIP of
//! SEO-optimised HTML pages, one per keyword, laid out like the screenshots.
//!
//! ## Pipeline Overview
//!
//! ```text
//! screenshots + keywords
//!  │
//!  ├─ 1. Keywords  pasted text or CSV `keyword` column (file wins)
//!  ├─ 2. Encode    each screenshot → base64 PNG
//!  ├─ 3. Layout    ONE vision call → reusable semantic HTML skeleton
//!  ├─ 4. Pages     ONE text call per keyword, skeleton + SEO instructions
//!  └─ 5. Archive   <slug>.html entries → <project>_seo_pages.zip
//! ```
//!
//! The run is all-or-nothing: the first failed call aborts it, and no call is
//! retried. A run with zero keywords still makes the layout call and yields an
//! empty archive.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use shot2seo::{generate, GenerationInputs, GenerationRequest, Screenshot, SeoType};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let request = GenerationRequest::builder()
//!         .project_name("acme")
//!         .seo_type(SeoType::Local)
//!         .city("Lahore")
//!         .api_key(std::env::var("OPENAI_API_KEY")?)
//!         .build()?;
//!     let inputs = GenerationInputs::new(vec![Screenshot::new(
//!         "home.png",
//!         std::fs::read("home.png")?,
//!     )])
//!     .with_keyword_text("best coffee maker\nespresso grinder");
//!
//!     let output = generate(&inputs, &request).await?;
//!     std::fs::write(&output.archive.file_name, &output.archive.bytes)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `shot2seo` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! ## Cost
//!
//! Every keyword is a separate billable call and repeated keywords are not
//! cached. A run costs one vision call plus N text calls.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod generate;
pub mod keywords;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod stream;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ContentLength, GenerationRequest, GenerationRequestBuilder, Language, SeoType};
pub use error::SeoGenError;
pub use generate::{generate, generate_sync, generate_to_file, generate_with_backend, write_archive};
pub use output::{BaseLayout, GeneratedPage, GenerationOutput, GenerationStats, OutputArchive};
pub use pipeline::input::{load_screenshots, GenerationInputs, Screenshot};
pub use pipeline::llm::{CallKind, Completion, GenerationBackend, GenerationCall, ProviderBackend};
pub use progress::{GenerationProgressCallback, NoopProgressCallback, ProgressCallback};
pub use stream::{generate_stream, generate_stream_with_backend, LayoutStream, PageStream};
