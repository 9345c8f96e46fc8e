//! Keyword source resolution.
//!
//! Keywords come either from pasted text (one per line) or from a CSV file
//! with a `keyword` column. When both are supplied the file wins. Order is
//! preserved and nothing is deduplicated: a keyword listed twice is
//! generated twice.

use crate::error::SeoGenError;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Name of the CSV column holding keywords.
pub const KEYWORD_COLUMN: &str = "keyword";

/// Resolve the run's keyword list.
///
/// A file takes precedence over `text` even when both are present. With
/// neither, the list is empty.
pub fn resolve_keywords(
    text: Option<&str>,
    file: Option<&Path>,
) -> Result<Vec<String>, SeoGenError> {
    let keywords = match file {
        Some(path) => keywords_from_file(path)?,
        None => keywords_from_text(text.unwrap_or("")),
    };
    info!("Resolved {} keywords", keywords.len());
    Ok(keywords)
}

/// Split pasted text on line breaks, trim each line, drop blank lines.
pub fn keywords_from_text(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Read the `keyword` column of a CSV file.
pub fn keywords_from_file(path: &Path) -> Result<Vec<String>, SeoGenError> {
    let file = std::fs::File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::PermissionDenied => SeoGenError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => SeoGenError::FileNotFound {
            path: path.to_path_buf(),
        },
    })?;

    keywords_from_csv(file).map_err(|e| match e {
        CsvKeywordError::MissingColumn => SeoGenError::KeywordColumnMissing {
            path: path.to_path_buf(),
            column: KEYWORD_COLUMN.to_string(),
        },
        CsvKeywordError::Malformed(detail) => SeoGenError::KeywordFileInvalid {
            path: path.to_path_buf(),
            detail,
        },
    })
}

/// Failure reading keywords from an in-memory CSV source.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CsvKeywordError {
    /// No header row, or no `keyword` column in it.
    #[error("no '{}' column", KEYWORD_COLUMN)]
    MissingColumn,
    /// The CSV could not be parsed.
    #[error("{0}")]
    Malformed(String),
}

/// Read the `keyword` column from any CSV reader.
///
/// Rows too short to have the column and cells that are blank are dropped;
/// other cells are returned exactly as written. A header with no data rows
/// yields an empty list.
pub fn keywords_from_csv<R: Read>(reader: R) -> Result<Vec<String>, CsvKeywordError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(true)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| CsvKeywordError::Malformed(e.to_string()))?;
    let column = headers
        .iter()
        .position(|h| h.trim() == KEYWORD_COLUMN)
        .ok_or(CsvKeywordError::MissingColumn)?;

    let mut keywords = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| CsvKeywordError::Malformed(e.to_string()))?;
        match record.get(column) {
            Some(cell) if !cell.trim().is_empty() => keywords.push(cell.to_string()),
            _ => {}
        }
    }

    debug!("Read {} keywords from CSV column {}", keywords.len(), column);
    Ok(keywords)
}
