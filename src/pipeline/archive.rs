//! Archive building: generated pages → one in-memory ZIP.
//!
//! Pages are first written into a per-run temporary directory under their
//! slug file names, then every file found there is packed. Staging through
//! the file system is what gives slug collisions their semantics: a later
//! page with the same slug overwrites the earlier file, so the archive holds
//! exactly one entry per distinct slug.
//!
//! The `TempDir` is removed when it drops, on success and on error alike.

use crate::error::SeoGenError;
use crate::output::{GeneratedPage, OutputArchive};
use std::io::{Cursor, Write};
use std::path::{Component, Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Lowercase the keyword and replace each space with a hyphen.
///
/// Nothing else is rewritten; two keywords differing only in case map to
/// the same slug.
pub fn slugify(keyword: &str) -> String {
    keyword.to_lowercase().replace(' ', "-")
}

/// `<slug>.html`
pub fn page_file_name(keyword: &str) -> String {
    format!("{}.html", slugify(keyword))
}

/// `<project>_seo_pages.zip`
pub fn archive_file_name(project_name: &str) -> String {
    format!("{}_seo_pages.zip", project_name)
}

/// Resolve `file_name` inside the staging directory.
///
/// Only a single plain component is accepted. Absolute names, `..`, and
/// nested paths would land outside the staging directory or in a
/// subdirectory the packer never lists.
fn staged_path(staging: &Path, file_name: &str) -> Result<PathBuf, SeoGenError> {
    let mut components = Path::new(file_name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(name)), None) => Ok(staging.join(name)),
        _ => Err(SeoGenError::ArchiveFailed {
            detail: format!("'{file_name}' is not a plain file name"),
        }),
    }
}

/// Stage `pages` in a temporary directory and pack them into a ZIP.
///
/// Blocking; call from `spawn_blocking` inside async code.
pub fn build_archive(
    pages: &[GeneratedPage],
    project_name: &str,
) -> Result<OutputArchive, SeoGenError> {
    let staging = TempDir::new().map_err(|e| SeoGenError::ArchiveFailed {
        detail: format!("cannot create staging directory: {e}"),
    })?;

    for page in pages {
        let path = staged_path(staging.path(), &page.file_name)?;
        std::fs::write(&path, page.html.as_bytes()).map_err(|e| SeoGenError::ArchiveFailed {
            detail: format!("cannot stage '{}': {e}", page.file_name),
        })?;
        debug!("Staged {} ({} bytes)", page.file_name, page.html.len());
    }

    let mut files: Vec<_> = std::fs::read_dir(staging.path())
        .and_then(|rd| rd.collect::<Result<Vec<_>, _>>())
        .map_err(|e| SeoGenError::ArchiveFailed {
            detail: format!("cannot list staging directory: {e}"),
        })?
        .into_iter()
        .filter(|entry| entry.path().is_file())
        .map(|entry| (entry.file_name().to_string_lossy().into_owned(), entry.path()))
        .collect();
    files.sort_by(|a, b| a.0.cmp(&b.0));

    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let mut entries = Vec::with_capacity(files.len());

    for (name, path) in files {
        let contents = std::fs::read(&path).map_err(|e| SeoGenError::ArchiveFailed {
            detail: format!("cannot read staged '{name}': {e}"),
        })?;
        zip.start_file(name.as_str(), options)?;
        zip.write_all(&contents)
            .map_err(|e| SeoGenError::ArchiveFailed {
                detail: format!("cannot write '{name}' to archive: {e}"),
            })?;
        entries.push(name);
    }

    let bytes = zip.finish()?.into_inner();
    let file_name = archive_file_name(project_name);
    info!(
        "Packed {} entries into {} ({} bytes)",
        entries.len(),
        file_name,
        bytes.len()
    );

    Ok(OutputArchive {
        file_name,
        entries,
        bytes,
    })
}
