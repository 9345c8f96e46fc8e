//! Configuration types for a page-generation run.
//!
//! Every option that shapes a run lives in [`GenerationRequest`], built via
//! [`GenerationRequestBuilder`]. The request is passed by reference into the
//! prompt builder and orchestrator, so nothing reads configuration from
//! ambient state and two runs can be compared by diffing their requests.
//!
//! Option values such as country and city are free text and are trusted
//! verbatim; only structural knobs (concurrency, temperatures) are checked.

use crate::error::SeoGenError;
use crate::progress::ProgressCallback;
use edgequake_llm::LLMProvider;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Default model for the layout-inference call. Must accept image input.
pub const DEFAULT_LAYOUT_MODEL: &str = "gpt-4o";

/// Default model for the per-keyword content calls.
pub const DEFAULT_PAGE_MODEL: &str = "gpt-4";

/// Default provider when neither the request nor the environment names one.
pub const DEFAULT_PROVIDER: &str = "openai";

/// Configuration for one generation run.
///
/// # Example
/// ```rust
/// use shot2seo::{ContentLength, GenerationRequest, Language, SeoType};
///
/// let request = GenerationRequest::builder()
///     .project_name("Acme Coffee")
///     .language(Language::English)
///     .seo_type(SeoType::Local)
///     .country("Pakistan")
///     .city("Lahore")
///     .content_length(ContentLength::Words1200)
///     .api_key("sk-...")
///     .build()
///     .unwrap();
/// assert_eq!(request.archive_file_name(), "Acme Coffee_seo_pages.zip");
/// ```
#[derive(Clone)]
pub struct GenerationRequest {
    /// Project or website name. Used only to name the output archive.
    pub project_name: String,

    /// Language the pages are written in. Default: English.
    pub language: Language,

    /// Search intent the content targets. Default: Global.
    pub seo_type: SeoType,

    /// Optional target country, interpolated verbatim into the page prompt.
    pub country: Option<String>,

    /// Optional target city, interpolated verbatim into the page prompt.
    pub city: Option<String>,

    /// Target length of each page's body copy. Default: 800 words.
    pub content_length: ContentLength,

    /// Credential for the generation service. Must be non-empty for a run
    /// to start.
    pub api_key: Option<String>,

    /// LLM provider name (e.g. "openai", "azure", "ollama").
    /// If None, `SHOT2SEO_PROVIDER` is consulted, then [`DEFAULT_PROVIDER`].
    pub provider_name: Option<String>,

    /// Vision model used for the single layout-inference call.
    pub layout_model: String,

    /// Model used for every content-generation call.
    pub page_model: String,

    /// Pre-constructed provider for the layout call. Takes precedence over
    /// `provider_name` + `layout_model`.
    pub layout_provider: Option<Arc<dyn LLMProvider>>,

    /// Pre-constructed provider for content calls. Takes precedence over
    /// `provider_name` + `page_model`.
    pub page_provider: Option<Arc<dyn LLMProvider>>,

    /// Sampling temperature for the layout call. Default: 0.3.
    ///
    /// The layout should mirror the screenshots, so randomness is kept low.
    pub layout_temperature: f32,

    /// Sampling temperature for content calls. Default: 0.7.
    pub page_temperature: f32,

    /// Maximum output tokens per call. None leaves the provider default.
    pub max_tokens: Option<usize>,

    /// Custom system prompt for content calls. If None, uses the built-in one.
    pub page_system_prompt: Option<String>,

    /// Number of content calls kept in flight at once. Default: 1.
    ///
    /// Pages are still returned and archived in keyword order whatever the
    /// value, so collisions resolve the same way.
    pub concurrency: usize,

    /// Download timeout for screenshot URLs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Optional per-run progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for GenerationRequest {
    fn default() -> Self {
        Self {
            project_name: String::new(),
            language: Language::default(),
            seo_type: SeoType::default(),
            country: None,
            city: None,
            content_length: ContentLength::default(),
            api_key: None,
            provider_name: None,
            layout_model: DEFAULT_LAYOUT_MODEL.to_string(),
            page_model: DEFAULT_PAGE_MODEL.to_string(),
            layout_provider: None,
            page_provider: None,
            layout_temperature: 0.3,
            page_temperature: 0.7,
            max_tokens: None,
            page_system_prompt: None,
            concurrency: 1,
            download_timeout_secs: 120,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for GenerationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationRequest")
            .field("project_name", &self.project_name)
            .field("language", &self.language)
            .field("seo_type", &self.seo_type)
            .field("country", &self.country)
            .field("city", &self.city)
            .field("content_length", &self.content_length)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("provider_name", &self.provider_name)
            .field("layout_model", &self.layout_model)
            .field("page_model", &self.page_model)
            .field(
                "layout_provider",
                &self.layout_provider.as_ref().map(|_| "<dyn LLMProvider>"),
            )
            .field(
                "page_provider",
                &self.page_provider.as_ref().map(|_| "<dyn LLMProvider>"),
            )
            .field("layout_temperature", &self.layout_temperature)
            .field("page_temperature", &self.page_temperature)
            .field("max_tokens", &self.max_tokens)
            .field("concurrency", &self.concurrency)
            .finish()
    }
}

impl GenerationRequest {
    /// Create a new builder for `GenerationRequest`.
    pub fn builder() -> GenerationRequestBuilder {
        GenerationRequestBuilder {
            request: Self::default(),
        }
    }

    /// True when a non-blank credential is present.
    pub fn has_credential(&self) -> bool {
        self.api_key
            .as_deref()
            .map(|k| !k.trim().is_empty())
            .unwrap_or(false)
    }

    /// File name of the downloadable archive: `<project>_seo_pages.zip`.
    pub fn archive_file_name(&self) -> String {
        crate::pipeline::archive::archive_file_name(&self.project_name)
    }
}

/// Builder for [`GenerationRequest`].
#[derive(Debug)]
pub struct GenerationRequestBuilder {
    request: GenerationRequest,
}

impl GenerationRequestBuilder {
    pub fn project_name(mut self, name: impl Into<String>) -> Self {
        self.request.project_name = name.into();
        self
    }

    pub fn language(mut self, language: Language) -> Self {
        self.request.language = language;
        self
    }

    pub fn seo_type(mut self, seo_type: SeoType) -> Self {
        self.request.seo_type = seo_type;
        self
    }

    pub fn country(mut self, country: impl Into<String>) -> Self {
        self.request.country = Some(country.into());
        self
    }

    pub fn city(mut self, city: impl Into<String>) -> Self {
        self.request.city = Some(city.into());
        self
    }

    pub fn content_length(mut self, length: ContentLength) -> Self {
        self.request.content_length = length;
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.request.api_key = Some(key.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.request.provider_name = Some(name.into());
        self
    }

    pub fn layout_model(mut self, model: impl Into<String>) -> Self {
        self.request.layout_model = model.into();
        self
    }

    pub fn page_model(mut self, model: impl Into<String>) -> Self {
        self.request.page_model = model.into();
        self
    }

    pub fn layout_provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.request.layout_provider = Some(provider);
        self
    }

    pub fn page_provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.request.page_provider = Some(provider);
        self
    }

    pub fn layout_temperature(mut self, t: f32) -> Self {
        self.request.layout_temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn page_temperature(mut self, t: f32) -> Self {
        self.request.page_temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.request.max_tokens = Some(n);
        self
    }

    pub fn page_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.request.page_system_prompt = Some(prompt.into());
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.request.concurrency = n;
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.request.download_timeout_secs = secs;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.request.progress_callback = Some(cb);
        self
    }

    /// Build the request, validating structural constraints.
    ///
    /// The credential is not checked here; a missing key is reported when
    /// the run starts so callers see the same error as a form submission.
    pub fn build(self) -> Result<GenerationRequest, SeoGenError> {
        let r = &self.request;
        if r.concurrency == 0 {
            return Err(SeoGenError::InvalidConfig(
                "Concurrency must be ≥ 1".into(),
            ));
        }
        if r.layout_model.trim().is_empty() || r.page_model.trim().is_empty() {
            return Err(SeoGenError::InvalidConfig(
                "Model identifiers must not be empty".into(),
            ));
        }
        Ok(self.request)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Language the generated pages are written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    English,
    Urdu,
    Arabic,
    Spanish,
    Korean,
    Filipino,
}

impl Language {
    pub const ALL: [Language; 6] = [
        Language::English,
        Language::Urdu,
        Language::Arabic,
        Language::Spanish,
        Language::Korean,
        Language::Filipino,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Urdu => "Urdu",
            Language::Arabic => "Arabic",
            Language::Spanish => "Spanish",
            Language::Korean => "Korean",
            Language::Filipino => "Filipino",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = SeoGenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::ALL
            .into_iter()
            .find(|l| l.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SeoGenError::InvalidConfig(format!("Unknown language '{s}'")))
    }
}

/// Search intent the content targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SeoType {
    /// Local search: a city or region matters to the searcher.
    Local,
    /// Global search with no location bias. (default)
    #[default]
    Global,
    /// Both local and global intent.
    Hybrid,
}

impl SeoType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeoType::Local => "Local",
            SeoType::Global => "Global",
            SeoType::Hybrid => "Hybrid",
        }
    }
}

impl fmt::Display for SeoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SeoType {
    type Err = SeoGenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" => Ok(SeoType::Local),
            "global" => Ok(SeoType::Global),
            "hybrid" => Ok(SeoType::Hybrid),
            other => Err(SeoGenError::InvalidConfig(format!(
                "Unknown SEO type '{other}' (expected local, global or hybrid)"
            ))),
        }
    }
}

/// Target length of each generated page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ContentLength {
    #[default]
    Words800,
    Words1200,
    Words1800,
}

impl ContentLength {
    pub fn words(&self) -> u32 {
        match self {
            ContentLength::Words800 => 800,
            ContentLength::Words1200 => 1200,
            ContentLength::Words1800 => 1800,
        }
    }

    pub fn from_words(words: u32) -> Option<Self> {
        match words {
            800 => Some(ContentLength::Words800),
            1200 => Some(ContentLength::Words1200),
            1800 => Some(ContentLength::Words1800),
            _ => None,
        }
    }
}

impl fmt::Display for ContentLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} words", self.words())
    }
}
