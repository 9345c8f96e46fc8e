//! Result types produced by a generation run.

use serde::{Deserialize, Serialize};

/// HTML skeleton inferred once from the screenshots and shared by every page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseLayout {
    /// Raw model output, taken verbatim.
    pub html: String,
    pub input_tokens: usize,
    pub output_tokens: usize,
    pub duration_ms: u64,
}

/// One generated page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedPage {
    /// 1-indexed position of the keyword in the run's keyword list.
    pub index: usize,
    pub keyword: String,
    /// Archive entry name: `<slug>.html`.
    pub file_name: String,
    /// Raw model output, taken verbatim.
    pub html: String,
    pub input_tokens: usize,
    pub output_tokens: usize,
    pub duration_ms: u64,
}

/// The downloadable bundle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputArchive {
    /// `<project>_seo_pages.zip`
    pub file_name: String,
    /// Entry names in archive order.
    pub entries: Vec<String>,
    /// ZIP bytes. Not serialised; write them with
    /// [`crate::generate::generate_to_file`] or directly.
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

/// Aggregate numbers for a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationStats {
    /// Keywords resolved from the input.
    pub total_keywords: usize,
    /// Content calls that returned a page (equals `total_keywords` on success).
    pub pages_generated: usize,
    /// Distinct files in the archive; lower than `pages_generated` when slugs collide.
    pub archive_entries: usize,
    pub total_input_tokens: u64,
    pub total_output_tokens: u64,
    pub layout_duration_ms: u64,
    pub pages_duration_ms: u64,
    pub total_duration_ms: u64,
}

/// Everything a successful run produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationOutput {
    pub layout: BaseLayout,
    /// One entry per keyword in input order, including pages whose slug was
    /// overwritten in the archive.
    pub pages: Vec<GeneratedPage>,
    pub archive: OutputArchive,
    pub stats: GenerationStats,
}
