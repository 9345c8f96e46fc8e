//! Integration tests for the generation pipeline.
//!
//! Everything except the last test runs against a scripted in-process
//! backend, so no network access or API key is needed. The live test makes
//! real LLM API calls and is gated behind the `E2E_ENABLED` environment
//! variable so it does not run in CI unless explicitly requested.
//!
//! Run with:
//!   cargo test --test generation -- --nocapture
//!
//! Live run:
//!   E2E_ENABLED=1 OPENAI_API_KEY=sk-... cargo test --test generation live_ -- --nocapture

use futures::future::BoxFuture;
use futures::StreamExt;
use shot2seo::{
    generate, generate_stream_with_backend, generate_with_backend, CallKind, Completion,
    ContentLength, GenerationBackend, GenerationCall, GenerationInputs,
    GenerationProgressCallback, GenerationRequest, Language, Screenshot, SeoGenError, SeoType,
};
use std::collections::VecDeque;
use std::io::{Cursor, Read};
use std::sync::{Arc, Mutex};

// ── Test helpers ─────────────────────────────────────────────────────────────

const LAYOUT_HTML: &str = "<html><body><header></header><main></main></body></html>";

/// Backend that records every call and answers from a script.
///
/// The layout call always returns [`LAYOUT_HTML`]. Page calls pop replies
/// from `page_replies`, falling back to `<p>page N</p>`. When `fail_on_page`
/// is set, that page call (1-based, in issue order) returns an error.
#[derive(Default)]
struct ScriptedBackend {
    calls: Mutex<Vec<GenerationCall>>,
    page_replies: Mutex<VecDeque<String>>,
    fail_on_page: Option<usize>,
    fail_layout: bool,
}

impl ScriptedBackend {
    fn with_replies(replies: &[&str]) -> Self {
        Self {
            page_replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
            ..Default::default()
        }
    }

    fn failing_on_page(n: usize) -> Self {
        Self {
            fail_on_page: Some(n),
            ..Default::default()
        }
    }

    fn calls(&self) -> Vec<GenerationCall> {
        self.calls.lock().unwrap().clone()
    }

    fn count(&self, kind: CallKind) -> usize {
        self.calls().iter().filter(|c| c.kind == kind).count()
    }
}

impl GenerationBackend for ScriptedBackend {
    fn complete<'a>(
        &'a self,
        call: &'a GenerationCall,
    ) -> BoxFuture<'a, Result<Completion, SeoGenError>> {
        Box::pin(async move {
            let page_no = {
                let mut calls = self.calls.lock().unwrap();
                calls.push(call.clone());
                calls.iter().filter(|c| c.kind == CallKind::Page).count()
            };

            match call.kind {
                CallKind::Layout if self.fail_layout => Err(SeoGenError::LlmApiError {
                    message: "vision model unavailable".into(),
                }),
                CallKind::Layout => Ok(Completion {
                    content: LAYOUT_HTML.to_string(),
                    input_tokens: 1000,
                    output_tokens: 200,
                }),
                CallKind::Page if self.fail_on_page == Some(page_no) => {
                    Err(SeoGenError::LlmApiError {
                        message: "rate limited".into(),
                    })
                }
                CallKind::Page => {
                    let content = self
                        .page_replies
                        .lock()
                        .unwrap()
                        .pop_front()
                        .unwrap_or_else(|| format!("<p>page {page_no}</p>"));
                    Ok(Completion {
                        content,
                        input_tokens: 300,
                        output_tokens: 900,
                    })
                }
            }
        })
    }
}

/// A tiny valid PNG.
fn png_bytes() -> Vec<u8> {
    let img = image::RgbImage::from_pixel(8, 6, image::Rgb([240, 240, 240]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn screenshots(n: usize) -> Vec<Screenshot> {
    (1..=n)
        .map(|i| Screenshot::new(format!("shot{i}.png"), png_bytes()))
        .collect()
}

/// Route library logs to the test harness. `RUST_LOG=shot2seo=debug` shows
/// per-call token counts with `--nocapture`.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn request() -> GenerationRequest {
    init_tracing();
    GenerationRequest::builder()
        .project_name("acme")
        .api_key("sk-test")
        .build()
        .unwrap()
}

fn read_entry(bytes: &[u8], name: &str) -> String {
    let mut zip = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut file = zip.by_name(name).unwrap();
    let mut out = String::new();
    file.read_to_string(&mut out).unwrap();
    out
}

// ── Orchestration ────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_colliding_keywords_share_one_entry() {
    let backend = ScriptedBackend::with_replies(&["first", "second"]);
    let inputs = GenerationInputs::new(screenshots(1))
        .with_keyword_text("Best Coffee Maker\nbest coffee maker");

    let output = generate_with_backend(&backend, &inputs, &request())
        .await
        .unwrap();

    assert_eq!(backend.count(CallKind::Layout), 1);
    assert_eq!(backend.count(CallKind::Page), 2);
    assert_eq!(output.archive.file_name, "acme_seo_pages.zip");
    assert_eq!(output.archive.entries, vec!["best-coffee-maker.html"]);
    assert_eq!(
        read_entry(&output.archive.bytes, "best-coffee-maker.html"),
        "second"
    );
    assert_eq!(output.stats.pages_generated, 2);
    assert_eq!(output.stats.archive_entries, 1);
}

#[tokio::test]
async fn test_one_layout_call_plus_one_call_per_keyword() {
    let backend = ScriptedBackend::default();
    let inputs = GenerationInputs::new(screenshots(3))
        .with_keyword_text("alpha\nbeta\ngamma\nalpha\ndelta");

    let output = generate_with_backend(&backend, &inputs, &request())
        .await
        .unwrap();

    let calls = backend.calls();
    assert_eq!(calls.len(), 6);
    assert_eq!(calls[0].kind, CallKind::Layout);
    assert_eq!(calls[0].images.len(), 3);
    assert!(calls[1..].iter().all(|c| c.kind == CallKind::Page));
    assert!(calls[1..].iter().all(|c| c.images.is_empty()));

    let keywords: Vec<_> = output.pages.iter().map(|p| p.keyword.as_str()).collect();
    assert_eq!(keywords, ["alpha", "beta", "gamma", "alpha", "delta"]);
    assert_eq!(output.archive.entries.len(), 4);

    // Layout tokens count toward the totals.
    assert_eq!(output.stats.total_input_tokens, 1000 + 5 * 300);
    assert_eq!(output.stats.total_output_tokens, 200 + 5 * 900);
}

#[tokio::test]
async fn test_page_calls_embed_layout_and_keyword() {
    let backend = ScriptedBackend::default();
    let req = GenerationRequest::builder()
        .project_name("acme")
        .api_key("sk-test")
        .language(Language::Spanish)
        .seo_type(SeoType::Local)
        .country("Spain")
        .city("Madrid")
        .content_length(ContentLength::Words1200)
        .build()
        .unwrap();
    let inputs = GenerationInputs::new(screenshots(1)).with_keyword_text("tapas bar");

    generate_with_backend(&backend, &inputs, &req).await.unwrap();

    let calls = backend.calls();
    let page = &calls[1];
    assert!(page.text.starts_with(LAYOUT_HTML));
    for needle in ["tapas bar", "Spanish", "Local", "Spain", "Madrid", "1200 words"] {
        assert!(page.text.contains(needle), "page prompt lacks {needle:?}");
    }
    assert_eq!(
        page.system.as_deref(),
        Some("Generate SEO optimized HTML pages.")
    );
}

#[tokio::test]
async fn test_layout_prompt_ignores_seo_settings() {
    let a = ScriptedBackend::default();
    let b = ScriptedBackend::default();
    let inputs = GenerationInputs::new(screenshots(2)).with_keyword_text("x");

    let req_b = GenerationRequest::builder()
        .project_name("other")
        .api_key("sk-test")
        .language(Language::Korean)
        .seo_type(SeoType::Hybrid)
        .city("Seoul")
        .content_length(ContentLength::Words1800)
        .build()
        .unwrap();

    generate_with_backend(&a, &inputs, &request()).await.unwrap();
    generate_with_backend(&b, &inputs, &req_b).await.unwrap();

    let (calls_a, calls_b) = (a.calls(), b.calls());
    let (la, lb) = (&calls_a[0], &calls_b[0]);
    assert_eq!(la.text, lb.text);
    assert!(la.system.is_none());
    assert_eq!(la.images.len(), lb.images.len());
}

#[tokio::test]
async fn test_empty_keywords_still_make_layout_call() {
    let backend = ScriptedBackend::default();
    let inputs = GenerationInputs::new(screenshots(1)).with_keyword_text("\n   \n");

    let output = generate_with_backend(&backend, &inputs, &request())
        .await
        .unwrap();

    assert_eq!(backend.calls().len(), 1);
    assert_eq!(output.layout.html, LAYOUT_HTML);
    assert!(output.pages.is_empty());
    assert!(output.archive.entries.is_empty());
    let zip = zip::ZipArchive::new(Cursor::new(&output.archive.bytes[..])).unwrap();
    assert_eq!(zip.len(), 0);
}

#[tokio::test]
async fn test_keyword_file_wins_over_text() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("kw.csv");
    std::fs::write(&csv, "keyword,volume\nfrom file,10\nalso file,5\n").unwrap();

    let backend = ScriptedBackend::default();
    let inputs = GenerationInputs::new(screenshots(1))
        .with_keyword_text("from text")
        .with_keyword_file(&csv);

    let output = generate_with_backend(&backend, &inputs, &request())
        .await
        .unwrap();

    assert_eq!(
        output.archive.entries,
        vec!["also-file.html", "from-file.html"]
    );
    assert!(backend
        .calls()
        .iter()
        .all(|c| !c.text.contains("from text")));
}

#[tokio::test]
async fn test_keyword_file_without_column_makes_no_calls() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("kw.csv");
    std::fs::write(&csv, "term\nfoo\n").unwrap();

    let backend = ScriptedBackend::default();
    let inputs = GenerationInputs::new(screenshots(1)).with_keyword_file(&csv);

    let err = generate_with_backend(&backend, &inputs, &request())
        .await
        .unwrap_err();

    assert!(matches!(err, SeoGenError::KeywordColumnMissing { .. }));
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn test_keyword_escaping_staging_fails_run() {
    let name = format!("shot2seo-run-escape-{}", std::process::id());
    let backend = ScriptedBackend::default();
    let inputs = GenerationInputs::new(screenshots(1))
        .with_keyword_text(format!("espresso\n../{name}"));

    let err = generate_with_backend(&backend, &inputs, &request())
        .await
        .unwrap_err();

    assert!(matches!(err, SeoGenError::ArchiveFailed { .. }));
    assert!(!std::env::temp_dir().join(format!("{name}.html")).exists());
}

// ── Preconditions and failures ───────────────────────────────────────────────

#[tokio::test]
async fn test_missing_screenshots_makes_no_calls() {
    let backend = ScriptedBackend::default();
    let inputs = GenerationInputs::default().with_keyword_text("coffee");

    let err = generate_with_backend(&backend, &inputs, &request())
        .await
        .unwrap_err();

    assert!(matches!(err, SeoGenError::MissingInput { ref what } if what == "screenshots"));
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn test_missing_key_fails_before_provider_setup() {
    let req = GenerationRequest::builder()
        .project_name("acme")
        .api_key("   ")
        .build()
        .unwrap();
    let inputs = GenerationInputs::new(screenshots(1)).with_keyword_text("coffee");

    let err = generate(&inputs, &req).await.unwrap_err();
    assert!(matches!(err, SeoGenError::MissingInput { ref what } if what == "API key"));
}

#[tokio::test]
async fn test_corrupt_screenshot_makes_no_calls() {
    let backend = ScriptedBackend::default();
    let inputs = GenerationInputs::new(vec![Screenshot::new("bad.png", b"not an image".to_vec())])
        .with_keyword_text("coffee");

    let err = generate_with_backend(&backend, &inputs, &request())
        .await
        .unwrap_err();

    assert!(matches!(err, SeoGenError::ImageDecodeFailed { ref name, .. } if name == "bad.png"));
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn test_layout_failure_stops_before_pages() {
    let backend = ScriptedBackend {
        fail_layout: true,
        ..Default::default()
    };
    let inputs = GenerationInputs::new(screenshots(1)).with_keyword_text("a\nb");

    let err = generate_with_backend(&backend, &inputs, &request())
        .await
        .unwrap_err();

    assert!(matches!(err, SeoGenError::LayoutFailed { .. }));
    assert_eq!(backend.calls().len(), 1);
}

#[tokio::test]
async fn test_page_failure_aborts_run() {
    let backend = ScriptedBackend::failing_on_page(2);
    let inputs = GenerationInputs::new(screenshots(1)).with_keyword_text("a\nb\nc\nd");

    let err = generate_with_backend(&backend, &inputs, &request())
        .await
        .unwrap_err();

    match err {
        SeoGenError::PageFailed { index, keyword, .. } => {
            assert_eq!(index, 2);
            assert_eq!(keyword, "b");
        }
        other => panic!("expected PageFailed, got {other:?}"),
    }
    // Layout + pages 1 and 2; c and d are never sent.
    assert_eq!(backend.calls().len(), 3);
}

// ── Streaming ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_stream_yields_pages_in_order() {
    let backend = Arc::new(ScriptedBackend::default());
    let inputs = GenerationInputs::new(screenshots(1)).with_keyword_text("one\ntwo\nthree");

    let ls = generate_stream_with_backend(backend.clone(), &inputs, &request())
        .await
        .unwrap();
    assert_eq!(ls.layout.html, LAYOUT_HTML);
    assert_eq!(ls.keywords, ["one", "two", "three"]);

    let pages: Vec<_> = ls.pages.collect().await;
    let indices: Vec<_> = pages.iter().map(|p| p.as_ref().unwrap().index).collect();
    assert_eq!(indices, [1, 2, 3]);
    assert_eq!(backend.calls().len(), 4);
}

#[tokio::test]
async fn test_stream_ends_after_first_error() {
    let backend = Arc::new(ScriptedBackend::failing_on_page(2));
    let inputs = GenerationInputs::new(screenshots(1)).with_keyword_text("one\ntwo\nthree");

    let ls = generate_stream_with_backend(backend.clone(), &inputs, &request())
        .await
        .unwrap();
    let items: Vec<_> = ls.pages.collect().await;

    assert_eq!(items.len(), 2);
    assert!(items[0].is_ok());
    assert!(matches!(items[1], Err(SeoGenError::PageFailed { index: 2, .. })));
    assert_eq!(backend.calls().len(), 3);
}

#[tokio::test]
async fn test_dropped_stream_sends_nothing_more() {
    let backend = Arc::new(ScriptedBackend::default());
    let inputs = GenerationInputs::new(screenshots(1)).with_keyword_text("one\ntwo\nthree");

    let mut ls = generate_stream_with_backend(backend.clone(), &inputs, &request())
        .await
        .unwrap();
    let first = ls.pages.next().await.unwrap().unwrap();
    assert_eq!(first.keyword, "one");
    drop(ls);

    assert_eq!(backend.calls().len(), 2);
}

// ── Progress callback ────────────────────────────────────────────────────────

#[derive(Default)]
struct RecordingCallback {
    events: Mutex<Vec<String>>,
}

impl RecordingCallback {
    fn push(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

impl GenerationProgressCallback for RecordingCallback {
    fn on_run_start(&self, total_keywords: usize) {
        self.push(format!("run:{total_keywords}"));
    }
    fn on_layout_start(&self, screenshots: usize) {
        self.push(format!("layout:{screenshots}"));
    }
    fn on_layout_complete(&self, _html_len: usize) {
        self.push("layout-done".into());
    }
    fn on_page_start(&self, index: usize, total: usize, keyword: &str) {
        self.push(format!("start:{index}/{total}:{keyword}"));
    }
    fn on_page_complete(&self, index: usize, _total: usize, _keyword: &str, _html_len: usize) {
        self.push(format!("done:{index}"));
    }
    fn on_page_error(&self, index: usize, _total: usize, _keyword: &str, _error: &str) {
        self.push(format!("error:{index}"));
    }
    fn on_run_complete(&self, total_keywords: usize, archive_entries: usize) {
        self.push(format!("complete:{total_keywords}/{archive_entries}"));
    }
}

#[tokio::test]
async fn test_progress_events_follow_run_order() {
    let cb = Arc::new(RecordingCallback::default());
    let req = GenerationRequest::builder()
        .project_name("acme")
        .api_key("sk-test")
        .progress_callback(cb.clone())
        .build()
        .unwrap();
    let inputs = GenerationInputs::new(screenshots(2)).with_keyword_text("a\nA");

    generate_with_backend(&ScriptedBackend::default(), &inputs, &req)
        .await
        .unwrap();

    let events = cb.events.lock().unwrap().clone();
    assert_eq!(
        events,
        [
            "run:2",
            "layout:2",
            "layout-done",
            "start:1/2:a",
            "done:1",
            "start:2/2:A",
            "done:2",
            "complete:2/1",
        ]
    );
}

#[tokio::test]
async fn test_progress_reports_page_error() {
    let cb = Arc::new(RecordingCallback::default());
    let req = GenerationRequest::builder()
        .api_key("sk-test")
        .progress_callback(cb.clone())
        .build()
        .unwrap();
    let inputs = GenerationInputs::new(screenshots(1)).with_keyword_text("a\nb");

    let _ = generate_with_backend(&ScriptedBackend::failing_on_page(1), &inputs, &req).await;

    let events = cb.events.lock().unwrap().clone();
    assert_eq!(events.last().map(String::as_str), Some("error:1"));
    assert!(!events.iter().any(|e| e.starts_with("complete")));
}

// ── Concurrency ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_concurrent_pages_keep_keyword_order() {
    let backend = ScriptedBackend::default();
    let req = GenerationRequest::builder()
        .project_name("acme")
        .api_key("sk-test")
        .concurrency(4)
        .build()
        .unwrap();
    let keywords: Vec<String> = (1..=10).map(|i| format!("kw {i}")).collect();
    let inputs = GenerationInputs::new(screenshots(1)).with_keyword_text(keywords.join("\n"));

    let output = generate_with_backend(&backend, &inputs, &req).await.unwrap();

    let got: Vec<_> = output.pages.iter().map(|p| p.keyword.clone()).collect();
    assert_eq!(got, keywords);
    assert_eq!(backend.calls().len(), 11);
}

// ── Live ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn live_generate_two_pages() {
    if std::env::var("E2E_ENABLED").is_err() {
        println!("SKIP: set E2E_ENABLED=1 to run live tests");
        return;
    }
    let Ok(key) = std::env::var("OPENAI_API_KEY") else {
        println!("SKIP: OPENAI_API_KEY not set");
        return;
    };

    let req = GenerationRequest::builder()
        .project_name("e2e")
        .api_key(key)
        .max_tokens(1500)
        .build()
        .unwrap();
    let inputs = GenerationInputs::new(screenshots(1))
        .with_keyword_text("handmade ceramic mugs\nceramic mug care");

    let output = generate(&inputs, &req).await.expect("live generation failed");

    assert_eq!(output.pages.len(), 2);
    assert!(!output.layout.html.trim().is_empty());
    for page in &output.pages {
        assert!(!page.html.trim().is_empty(), "empty page for {}", page.keyword);
    }
    assert_eq!(
        output.archive.entries,
        vec!["ceramic-mug-care.html", "handmade-ceramic-mugs.html"]
    );
}
