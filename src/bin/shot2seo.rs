//! CLI binary for shot2seo.
//!
//! A thin shim over the library crate that maps CLI flags to a
//! `GenerationRequest`, runs one generation, and writes the archive.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use shot2seo::{
    generate, load_screenshots, write_archive, ContentLength, GenerationInputs,
    GenerationProgressCallback, GenerationRequest, Language, ProgressCallback, SeoType,
};
use std::collections::HashMap;
use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a spinner during layout inference, then a bar
/// with one log line per keyword.
struct CliProgressCallback {
    bar: ProgressBar,
    /// Per-keyword wall-clock start times, keyed by 1-based index.
    start_times: Mutex<HashMap<usize, Instant>>,
    errors: AtomicUsize,
}

impl CliProgressCallback {
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0); // length set in on_run_start

        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Reading inputs…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            start_times: Mutex::new(HashMap::new()),
            errors: AtomicUsize::new(0),
        })
    }

    /// Switch to the full progress-bar style once the layout is ready.
    fn activate_bar(&self) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_style(progress_style);
        self.bar.set_prefix("Writing");
        self.bar.reset_eta();
    }

    fn elapsed_secs(&self, index: usize) -> f64 {
        self.start_times
            .lock()
            .map(|mut m| m.remove(&index))
            .ok()
            .flatten()
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }
}

impl GenerationProgressCallback for CliProgressCallback {
    fn on_run_start(&self, total_keywords: usize) {
        self.bar.set_length(total_keywords as u64);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Generating {total_keywords} pages…"))
        ));
    }

    fn on_layout_start(&self, screenshots: usize) {
        self.bar.set_prefix("Layout");
        self.bar
            .set_message(format!("inferring structure from {screenshots} screenshot(s)"));
    }

    fn on_layout_complete(&self, html_len: usize) {
        self.bar.println(format!(
            "  {} Layout        {}",
            green("✓"),
            dim(&format!("{html_len:>5} chars")),
        ));
        self.activate_bar();
    }

    fn on_page_start(&self, index: usize, _total: usize, keyword: &str) {
        if let Ok(mut m) = self.start_times.lock() {
            m.insert(index, Instant::now());
        }
        self.bar.set_message(keyword.to_string());
    }

    fn on_page_complete(&self, index: usize, total: usize, keyword: &str, html_len: usize) {
        let secs = self.elapsed_secs(index);
        self.bar.println(format!(
            "  {} {:>3}/{:<3} {:<32}  {:<8}  {}",
            green("✓"),
            index,
            total,
            keyword,
            dim(&format!("{html_len:>5} chars")),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_page_error(&self, index: usize, total: usize, keyword: &str, error: &str) {
        let secs = self.elapsed_secs(index);
        self.errors.fetch_add(1, Ordering::SeqCst);

        // Truncate very long error messages to keep output tidy.
        let msg: String = if error.chars().count() > 80 {
            format!("{}\u{2026}", error.chars().take(79).collect::<String>())
        } else {
            error.to_string()
        };

        self.bar.println(format!(
            "  {} {:>3}/{:<3} {:<32}  {}  {}",
            red("✗"),
            index,
            total,
            keyword,
            red(&msg),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.abandon();
    }

    fn on_run_complete(&self, total_keywords: usize, archive_entries: usize) {
        self.bar.finish_and_clear();
        if archive_entries == total_keywords {
            eprintln!(
                "{} {} pages generated",
                green("✔"),
                bold(&total_keywords.to_string())
            );
        } else {
            eprintln!(
                "{} {} pages generated, {} archive entries  ({} overwritten by duplicate slugs)",
                cyan("⚠"),
                bold(&total_keywords.to_string()),
                archive_entries,
                total_keywords - archive_entries,
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Keywords pasted on the command line (one per line)
  shot2seo -p "Acme Coffee" -s home.png -s about.png -k $'best coffee maker\nespresso grinder'

  # Keywords from a CSV with a `keyword` column
  shot2seo -p acme -s home.png -f keywords.csv --language spanish --length 1200

  # Local SEO for a city, archive written to a chosen path
  shot2seo -p acme -s home.png -f kw.csv --seo-type local --country Pakistan --city Lahore -o out/acme.zip

  # Keywords from stdin, screenshot from a URL
  cat kw.txt | shot2seo -p acme -s https://example.com/shot.png --keywords-stdin

  # Run summary as JSON on stdout
  shot2seo -p acme -s home.png -f kw.csv --json > run.json

CALLS PER RUN:
  1 vision call (layout) + 1 text call per keyword. Repeated keywords are
  generated (and billed) again. Keywords that lowercase to the same slug
  share one archive entry: the later page wins.

ENVIRONMENT VARIABLES:
  SHOT2SEO_API_KEY        API key for any provider (same as --api-key)
  OPENAI_API_KEY          OpenAI API key (with --provider openai, the default)
  ANTHROPIC_API_KEY       Anthropic API key (with --provider anthropic)
  GEMINI_API_KEY          Google Gemini API key (with --provider gemini)
  SHOT2SEO_PROVIDER       Override provider (openai, anthropic, gemini, azure, ollama)
  SHOT2SEO_LAYOUT_MODEL   Vision model for the layout call
  SHOT2SEO_PAGE_MODEL     Model for the per-keyword calls
  RUST_LOG                Override log filter (e.g. shot2seo=debug)
"#;

/// Generate SEO landing pages from website screenshots and a keyword list.
#[derive(Parser, Debug)]
#[command(
    name = "shot2seo",
    version,
    about = "Generate SEO landing pages from website screenshots and a keyword list",
    long_about = "Infer a semantic HTML5 layout from desktop screenshots with a vision model, \
then write one SEO-optimised page per keyword into that layout and bundle the pages into a ZIP.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Project / website name. Names the archive: <PROJECT>_seo_pages.zip.
    #[arg(short, long, env = "SHOT2SEO_PROJECT")]
    project: String,

    /// Desktop screenshot (path or HTTP/HTTPS URL). Repeat for several.
    #[arg(short, long = "screenshot", value_name = "PATH|URL")]
    screenshots: Vec<String>,

    /// Keywords, one per line.
    #[arg(short, long)]
    keywords: Option<String>,

    /// Read keywords (one per line) from stdin.
    #[arg(long, conflicts_with = "keywords")]
    keywords_stdin: bool,

    /// CSV file with a `keyword` column. Takes precedence over pasted keywords.
    #[arg(short = 'f', long, env = "SHOT2SEO_KEYWORD_FILE")]
    keyword_file: Option<PathBuf>,

    /// Language of the generated pages.
    #[arg(short, long, env = "SHOT2SEO_LANGUAGE", value_enum, default_value = "english")]
    language: LanguageArg,

    /// Search intent: local, global, hybrid.
    #[arg(long, env = "SHOT2SEO_SEO_TYPE", value_enum, default_value = "global")]
    seo_type: SeoTypeArg,

    /// Target country (optional, free text).
    #[arg(long, env = "SHOT2SEO_COUNTRY")]
    country: Option<String>,

    /// Target city (optional, free text).
    #[arg(long, env = "SHOT2SEO_CITY")]
    city: Option<String>,

    /// Target content length in words.
    #[arg(long, env = "SHOT2SEO_LENGTH", value_enum, default_value = "800")]
    length: LengthArg,

    /// API key for the generation service. Defaults to the provider's own
    /// key variable (OPENAI_API_KEY, ANTHROPIC_API_KEY, ...).
    #[arg(long, env = "SHOT2SEO_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// LLM provider: openai, anthropic, gemini, azure, ollama.
    #[arg(long, env = "SHOT2SEO_PROVIDER")]
    provider: Option<String>,

    /// Vision model for the layout call.
    #[arg(long, env = "SHOT2SEO_LAYOUT_MODEL", default_value = shot2seo::config::DEFAULT_LAYOUT_MODEL)]
    layout_model: String,

    /// Model for the per-keyword content calls.
    #[arg(long, env = "SHOT2SEO_PAGE_MODEL", default_value = shot2seo::config::DEFAULT_PAGE_MODEL)]
    page_model: String,

    /// Temperature for the layout call (0.0–2.0).
    #[arg(long, env = "SHOT2SEO_LAYOUT_TEMPERATURE", default_value_t = 0.3)]
    layout_temperature: f32,

    /// Temperature for content calls (0.0–2.0).
    #[arg(long, env = "SHOT2SEO_PAGE_TEMPERATURE", default_value_t = 0.7)]
    page_temperature: f32,

    /// Max output tokens per call (provider default if unset).
    #[arg(long, env = "SHOT2SEO_MAX_TOKENS")]
    max_tokens: Option<usize>,

    /// Path to a text file containing a custom system prompt for content calls.
    #[arg(long, env = "SHOT2SEO_SYSTEM_PROMPT")]
    system_prompt: Option<PathBuf>,

    /// Content calls in flight at once. Pages keep keyword order.
    #[arg(short, long, env = "SHOT2SEO_CONCURRENCY", default_value_t = 1,
          value_parser = clap::value_parser!(u64).range(1..=64))]
    concurrency: u64,

    /// Archive path (or directory). Default: ./<PROJECT>_seo_pages.zip
    #[arg(short, long, env = "SHOT2SEO_OUTPUT")]
    output: Option<PathBuf>,

    /// Print the run summary (layout, pages, stats) as JSON on stdout.
    #[arg(long, env = "SHOT2SEO_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "SHOT2SEO_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "SHOT2SEO_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "SHOT2SEO_QUIET")]
    quiet: bool,

    /// HTTP timeout for screenshot URLs in seconds.
    #[arg(long, env = "SHOT2SEO_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum LanguageArg {
    English,
    Urdu,
    Arabic,
    Spanish,
    Korean,
    Filipino,
}

impl From<LanguageArg> for Language {
    fn from(v: LanguageArg) -> Self {
        match v {
            LanguageArg::English => Language::English,
            LanguageArg::Urdu => Language::Urdu,
            LanguageArg::Arabic => Language::Arabic,
            LanguageArg::Spanish => Language::Spanish,
            LanguageArg::Korean => Language::Korean,
            LanguageArg::Filipino => Language::Filipino,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum SeoTypeArg {
    Local,
    Global,
    Hybrid,
}

impl From<SeoTypeArg> for SeoType {
    fn from(v: SeoTypeArg) -> Self {
        match v {
            SeoTypeArg::Local => SeoType::Local,
            SeoTypeArg::Global => SeoType::Global,
            SeoTypeArg::Hybrid => SeoType::Hybrid,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum LengthArg {
    #[value(name = "800")]
    W800,
    #[value(name = "1200")]
    W1200,
    #[value(name = "1800")]
    W1800,
}

impl From<LengthArg> for ContentLength {
    fn from(v: LengthArg) -> Self {
        match v {
            LengthArg::W800 => ContentLength::Words800,
            LengthArg::W1200 => ContentLength::Words1200,
            LengthArg::W1800 => ContentLength::Words1800,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar provides all the feedback that matters to the user.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Credential ───────────────────────────────────────────────────────
    let provider = cli
        .provider
        .clone()
        .unwrap_or_else(|| shot2seo::config::DEFAULT_PROVIDER.to_string());
    let api_key = resolve_api_key(&cli, &provider);

    run(cli, provider, api_key, show_progress).await
}

async fn run(
    cli: Cli,
    provider: String,
    api_key: Option<String>,
    show_progress: bool,
) -> Result<()> {
    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new_dynamic();
        Some(cb as Arc<dyn GenerationProgressCallback>)
    } else {
        None
    };

    let request = build_request(&cli, provider, api_key, progress_cb).await?;
    let inputs = build_inputs(&cli).await?;

    let output = generate(&inputs, &request)
        .await
        .context("Generation failed")?;

    let path = match cli.output {
        Some(ref p) if p.is_dir() => p.join(&output.archive.file_name),
        Some(ref p) => p.clone(),
        None => PathBuf::from(&output.archive.file_name),
    };
    write_archive(&output.archive, &path)
        .await
        .context("Failed to write archive")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    }

    if !cli.quiet {
        let stats = &output.stats;
        eprintln!(
            "{}  {} pages  {} entries  {}ms  →  {}",
            green("✔"),
            stats.pages_generated,
            stats.archive_entries,
            stats.total_duration_ms,
            bold(&path.display().to_string()),
        );
        eprintln!(
            "   {} tokens in  /  {} tokens out",
            dim(&stats.total_input_tokens.to_string()),
            dim(&stats.total_output_tokens.to_string()),
        );
    }

    Ok(())
}

/// Map CLI args to `GenerationRequest`.
async fn build_request(
    cli: &Cli,
    provider: String,
    api_key: Option<String>,
    progress: Option<ProgressCallback>,
) -> Result<GenerationRequest> {
    let system_prompt = if let Some(ref path) = cli.system_prompt {
        Some(
            tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read system prompt from {:?}", path))?,
        )
    } else {
        None
    };

    let mut builder = GenerationRequest::builder()
        .project_name(cli.project.clone())
        .language(cli.language.into())
        .seo_type(cli.seo_type.into())
        .content_length(cli.length.into())
        .provider_name(provider)
        .layout_model(cli.layout_model.clone())
        .page_model(cli.page_model.clone())
        .layout_temperature(cli.layout_temperature)
        .page_temperature(cli.page_temperature)
        .concurrency(cli.concurrency as usize)
        .download_timeout_secs(cli.download_timeout);

    if let Some(ref country) = cli.country {
        builder = builder.country(country.clone());
    }
    if let Some(ref city) = cli.city {
        builder = builder.city(city.clone());
    }
    if let Some(key) = api_key {
        builder = builder.api_key(key);
    }
    if let Some(n) = cli.max_tokens {
        builder = builder.max_tokens(n);
    }
    if let Some(prompt) = system_prompt {
        builder = builder.page_system_prompt(prompt);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Load screenshots and collect the keyword source.
async fn build_inputs(cli: &Cli) -> Result<GenerationInputs> {
    let screenshots = load_screenshots(&cli.screenshots, cli.download_timeout)
        .await
        .context("Failed to load screenshots")?;

    let keyword_text = if cli.keywords_stdin {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read keywords from stdin")?;
        Some(buf)
    } else {
        cli.keywords.clone()
    };

    Ok(GenerationInputs {
        screenshots,
        keyword_text,
        keyword_file: cli.keyword_file.clone(),
    })
}

/// The explicit `--api-key`/`SHOT2SEO_API_KEY` value, else the named
/// provider's own key variable.
fn resolve_api_key(cli: &Cli, provider: &str) -> Option<String> {
    cli.api_key
        .clone()
        .or_else(|| credential_env_var(provider).and_then(|v| std::env::var(v).ok()))
        .filter(|k| !k.trim().is_empty())
}

/// Environment variable a provider reads its key from.
fn credential_env_var(provider: &str) -> Option<&'static str> {
    match provider.to_lowercase().as_str() {
        "openai" => Some("OPENAI_API_KEY"),
        "anthropic" | "claude" => Some("ANTHROPIC_API_KEY"),
        "gemini" | "google" => Some("GEMINI_API_KEY"),
        "azure" => Some("AZURE_OPENAI_API_KEY"),
        "mistral" => Some("MISTRAL_API_KEY"),
        "openrouter" | "open-router" => Some("OPENROUTER_API_KEY"),
        _ => None,
    }
}
