//! Screenshot loading: resolve a user-supplied path or URL to raw bytes.
//!
//! Screenshots are read fully into memory; the encoder decodes from a byte
//! slice, so nothing is staged on disk. The format is not checked here:
//! anything the image decoder accepts is a valid screenshot.

use crate::error::SeoGenError;
use std::path::PathBuf;
use tracing::{debug, info};

/// A raw uploaded screenshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screenshot {
    /// Display name (file name or last URL segment), used in log lines and errors.
    pub name: String,
    /// Undecoded file contents.
    pub bytes: Vec<u8>,
}

impl Screenshot {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

/// Everything a run consumes besides its configuration.
#[derive(Debug, Clone, Default)]
pub struct GenerationInputs {
    /// Screenshots in the order they are sent to the layout call.
    pub screenshots: Vec<Screenshot>,
    /// Pasted keywords, one per line.
    pub keyword_text: Option<String>,
    /// CSV file with a `keyword` column. Wins over `keyword_text`.
    pub keyword_file: Option<PathBuf>,
}

impl GenerationInputs {
    pub fn new(screenshots: Vec<Screenshot>) -> Self {
        Self {
            screenshots,
            ..Default::default()
        }
    }

    pub fn with_keyword_text(mut self, text: impl Into<String>) -> Self {
        self.keyword_text = Some(text.into());
        self
    }

    pub fn with_keyword_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.keyword_file = Some(path.into());
        self
    }
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Load every screenshot in order. Fails on the first unreadable input.
pub async fn load_screenshots(
    inputs: &[String],
    timeout_secs: u64,
) -> Result<Vec<Screenshot>, SeoGenError> {
    let mut shots = Vec::with_capacity(inputs.len());
    for input in inputs {
        shots.push(load_screenshot(input, timeout_secs).await?);
    }
    Ok(shots)
}

/// Load one screenshot from a local path or an HTTP/HTTPS URL.
pub async fn load_screenshot(input: &str, timeout_secs: u64) -> Result<Screenshot, SeoGenError> {
    if input.trim().is_empty() {
        return Err(SeoGenError::InvalidInput {
            input: input.to_string(),
        });
    }
    if is_url(input) {
        download_url(input, timeout_secs).await
    } else {
        read_local(input).await
    }
}

async fn read_local(path_str: &str) -> Result<Screenshot, SeoGenError> {
    let path = PathBuf::from(path_str);

    let bytes = match tokio::fs::read(&path).await {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(SeoGenError::PermissionDenied { path });
        }
        Err(_) => return Err(SeoGenError::FileNotFound { path }),
    };

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path_str.to_string());

    debug!("Read screenshot {} ({} bytes)", path.display(), bytes.len());
    Ok(Screenshot::new(name, bytes))
}

async fn download_url(url: &str, timeout_secs: u64) -> Result<Screenshot, SeoGenError> {
    info!("Downloading screenshot from: {}", url);

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| SeoGenError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            SeoGenError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            SeoGenError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    })?;

    if !response.status().is_success() {
        return Err(SeoGenError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| SeoGenError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    info!("Downloaded {} bytes from {}", bytes.len(), url);
    Ok(Screenshot::new(name_from_url(url), bytes.to_vec()))
}

/// Last non-empty path segment of a URL, or a generic fallback.
fn name_from_url(url: &str) -> String {
    if let Ok(parsed) = reqwest::Url::parse(url) {
        if let Some(mut segments) = parsed.path_segments() {
            if let Some(last) = segments.next_back() {
                if !last.is_empty() {
                    return last.to_string();
                }
            }
        }
    }
    "screenshot".to_string()
}
