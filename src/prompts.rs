//! Prompt templates for layout inference and per-keyword page generation.
//!
//! Keeping every prompt here means a wording change touches one file, and
//! tests can inspect the exact text sent to the model without a provider.
//!
//! Both builders are pure: the layout prompt takes no input at all, and the
//! page prompt reads only the [`GenerationRequest`] it is handed.

use crate::config::GenerationRequest;

/// Instruction sent with the screenshots in the layout-inference call.
///
/// Deliberately free of any run configuration: the same skeleton is reused
/// for every language and keyword.
pub const LAYOUT_PROMPT: &str = r#"Analyze the uploaded website screenshots (desktop view).

TASK:
- Understand the page layout and sections
- Create a clean, semantic HTML5 structure
- Use proper tags: header, section, article, footer
- Add placeholder text where content belongs
- Make SEO-friendly structure
- Do NOT include CSS or JS
- This will be a reusable base template

OUTPUT:
Return only valid HTML."#;

/// Default system prompt for content-generation calls.
///
/// Used when `GenerationRequest::page_system_prompt` is `None`.
pub const PAGE_SYSTEM_PROMPT: &str = "Generate SEO optimized HTML pages.";

/// The layout-inference instruction.
pub fn layout_prompt() -> &'static str {
    LAYOUT_PROMPT
}

/// Build the content-generation instruction for one keyword.
///
/// Country and city render as empty strings when absent; every value is
/// interpolated verbatim.
pub fn page_prompt(request: &GenerationRequest, keyword: &str) -> String {
    format!(
        r#"You are an expert SEO content writer.

BASE RULES:
- Use the provided HTML structure exactly
- Replace placeholder text only
- Keep layout unchanged

SEO DETAILS:
Language: {language}
SEO Type: {seo_type}
Primary Keyword: {keyword}
Country: {country}
City: {city}
Content Length: {length}

CONTENT RULES:
- NLP and semantic optimization
- Include related entities
- Natural language (no stuffing)
- Unique angle for this keyword
- Add:
  - Meta title
  - Meta description
  - H1, H2, H3
  - FAQ section
  - JSON-LD FAQ schema

OUTPUT:
Return full optimized HTML page only."#,
        language = request.language,
        seo_type = request.seo_type,
        keyword = keyword,
        country = request.country.as_deref().unwrap_or(""),
        city = request.city.as_deref().unwrap_or(""),
        length = request.content_length,
    )
}

/// Text of the user turn for a content call: the base layout followed by the
/// keyword's instructions.
pub fn page_user_message(base_layout: &str, prompt: &str) -> String {
    format!("{}\n\n{}", base_layout, prompt)
}

/// System prompt for content calls, honouring the request override.
pub fn page_system_prompt(request: &GenerationRequest) -> &str {
    request
        .page_system_prompt
        .as_deref()
        .unwrap_or(PAGE_SYSTEM_PROMPT)
}
