//! Model interaction: build generation calls and send them to a backend.
//!
//! Two kinds of call exist. The layout call carries the fixed layout prompt
//! and every screenshot; each page call carries the base layout plus one
//! keyword's instructions and no images. Prompt wording lives in
//! [`crate::prompts`]; this module only assembles and dispatches.
//!
//! Calls are never retried. A failed call becomes a run-level error and the
//! orchestrator stops issuing new ones.

use crate::config::GenerationRequest;
use crate::error::SeoGenError;
use crate::output::{BaseLayout, GeneratedPage};
use crate::pipeline::archive::page_file_name;
use crate::pipeline::encode::EncodedImage;
use crate::prompts::{layout_prompt, page_prompt, page_system_prompt, page_user_message};
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider};
use futures::future::BoxFuture;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Which phase a call belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    /// Multimodal layout inference from screenshots.
    Layout,
    /// Text-only content generation for one keyword.
    Page,
}

/// One request to the generation service.
#[derive(Debug, Clone)]
pub struct GenerationCall {
    pub kind: CallKind,
    /// Optional system message sent before the user turn.
    pub system: Option<String>,
    /// Text of the user turn.
    pub text: String,
    /// Images attached to the user turn, in order.
    pub images: Vec<EncodedImage>,
    pub temperature: f32,
    pub max_tokens: Option<usize>,
}

/// A single textual completion.
#[derive(Debug, Clone, Default)]
pub struct Completion {
    pub content: String,
    pub input_tokens: usize,
    pub output_tokens: usize,
}

/// Anything that can answer a [`GenerationCall`].
///
/// [`ProviderBackend`] talks to a real LLM provider; tests substitute a
/// scripted backend to count and inspect calls.
pub trait GenerationBackend: Send + Sync {
    fn complete<'a>(&'a self, call: &'a GenerationCall) -> BoxFuture<'a, Result<Completion, SeoGenError>>;
}

/// Backend over two edgequake-llm providers, one per call kind.
///
/// The layout call needs a vision-capable model; content calls may use a
/// different (text-only) model.
pub struct ProviderBackend {
    layout: Arc<dyn LLMProvider>,
    page: Arc<dyn LLMProvider>,
}

impl ProviderBackend {
    pub fn new(layout: Arc<dyn LLMProvider>, page: Arc<dyn LLMProvider>) -> Self {
        Self { layout, page }
    }
}

impl GenerationBackend for ProviderBackend {
    fn complete<'a>(&'a self, call: &'a GenerationCall) -> BoxFuture<'a, Result<Completion, SeoGenError>> {
        Box::pin(async move {
            let provider = match call.kind {
                CallKind::Layout => &self.layout,
                CallKind::Page => &self.page,
            };
            let messages = build_messages(call);
            let options = build_options(call);

            let response = provider
                .chat(&messages, Some(&options))
                .await
                .map_err(|e| SeoGenError::LlmApiError {
                    message: e.to_string(),
                })?;

            Ok(Completion {
                content: response.content,
                input_tokens: response.prompt_tokens,
                output_tokens: response.completion_tokens,
            })
        })
    }
}

/// Translate a call into chat messages.
///
/// Layout: a single user turn holding the prompt text and every screenshot.
/// Page: the system prompt, then the user turn with layout + instructions.
fn build_messages(call: &GenerationCall) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(2);
    if let Some(ref system) = call.system {
        messages.push(ChatMessage::system(system.as_str()));
    }
    if call.images.is_empty() {
        messages.push(ChatMessage::user(call.text.as_str()));
    } else {
        let images = call.images.iter().map(EncodedImage::to_image_data).collect();
        messages.push(ChatMessage::user_with_images(call.text.as_str(), images));
    }
    messages
}

fn build_options(call: &GenerationCall) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(call.temperature),
        max_tokens: call.max_tokens,
        ..Default::default()
    }
}

/// The layout-inference call for a set of encoded screenshots.
pub fn layout_call(images: &[EncodedImage], request: &GenerationRequest) -> GenerationCall {
    GenerationCall {
        kind: CallKind::Layout,
        system: None,
        text: layout_prompt().to_string(),
        images: images.to_vec(),
        temperature: request.layout_temperature,
        max_tokens: request.max_tokens,
    }
}

/// The content call for one keyword.
pub fn page_call(base_layout: &str, keyword: &str, request: &GenerationRequest) -> GenerationCall {
    GenerationCall {
        kind: CallKind::Page,
        system: Some(page_system_prompt(request).to_string()),
        text: page_user_message(base_layout, &page_prompt(request, keyword)),
        images: Vec::new(),
        temperature: request.page_temperature,
        max_tokens: request.max_tokens,
    }
}

/// Issue the single layout-inference call. The reply is used verbatim.
pub async fn infer_layout(
    backend: &dyn GenerationBackend,
    images: &[EncodedImage],
    request: &GenerationRequest,
) -> Result<BaseLayout, SeoGenError> {
    let start = Instant::now();
    let call = layout_call(images, request);

    match backend.complete(&call).await {
        Ok(completion) => {
            let duration = start.elapsed();
            debug!(
                "Layout: {} images, {} input tokens, {} output tokens, {:?}",
                images.len(),
                completion.input_tokens,
                completion.output_tokens,
                duration
            );
            Ok(BaseLayout {
                html: completion.content,
                input_tokens: completion.input_tokens,
                output_tokens: completion.output_tokens,
                duration_ms: duration.as_millis() as u64,
            })
        }
        Err(e) => {
            warn!("Layout inference failed: {}", e);
            Err(SeoGenError::LayoutFailed {
                detail: e.to_string(),
            })
        }
    }
}

/// Issue the content call for keyword number `index` (1-indexed).
pub async fn generate_page(
    backend: &dyn GenerationBackend,
    base_layout: &str,
    index: usize,
    keyword: &str,
    request: &GenerationRequest,
) -> Result<GeneratedPage, SeoGenError> {
    let start = Instant::now();
    let call = page_call(base_layout, keyword, request);

    match backend.complete(&call).await {
        Ok(completion) => {
            let duration = start.elapsed();
            debug!(
                "Page {} ('{}'): {} input tokens, {} output tokens, {:?}",
                index, keyword, completion.input_tokens, completion.output_tokens, duration
            );
            Ok(GeneratedPage {
                index,
                keyword: keyword.to_string(),
                file_name: page_file_name(keyword),
                html: completion.content,
                input_tokens: completion.input_tokens,
                output_tokens: completion.output_tokens,
                duration_ms: duration.as_millis() as u64,
            })
        }
        Err(e) => {
            warn!("Page {} ('{}') failed: {}", index, keyword, e);
            Err(SeoGenError::PageFailed {
                index,
                keyword: keyword.to_string(),
                detail: e.to_string(),
            })
        }
    }
}
