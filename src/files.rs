//! Local files on either side of an upload or download.
//!
//! Bundle walks never follow symlinks: a link inside a bundle directory is
//! skipped, so nothing outside the directory is uploaded and link cycles
//! cannot stall the walk.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::api::PackFile;
use crate::http::Download;

#[derive(Debug, thiserror::Error)]
pub enum FilesError {
    #[error("walk failed: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("{path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },
    #[error("{0} contains no files")]
    EmptyBundle(PathBuf),
}

/// Read one file, attaching its path to any error.
///
/// # Errors
///
/// [`FilesError::Io`] when the file cannot be read.
pub fn read_file(path: &Path) -> Result<Vec<u8>, FilesError> {
    std::fs::read(path).map_err(|source| FilesError::Io { path: path.to_path_buf(), source })
}

/// Final path component of `path` as a display string.
#[must_use]
pub fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().into_owned())
}

/// Every regular file under `root` with its `/`-separated path relative to
/// `root`, sorted by that path.
///
/// # Errors
///
/// [`FilesError::Walk`] if a directory cannot be listed,
/// [`FilesError::Io`] if a file cannot be read, and
/// [`FilesError::EmptyBundle`] when no regular file was found.
pub fn collect_bundle(root: &Path) -> Result<Vec<PackFile>, FilesError> {
    let mut files = Vec::new();
    for entry in walkdir::WalkDir::new(root).follow_links(false) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            if entry.path_is_symlink() {
                debug!(path = %entry.path().display(), "skipping symlink in bundle");
            }
            continue;
        }
        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        let bundle_path = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        files.push(PackFile { path: bundle_path, file_name: file_name_of(path), bytes: read_file(path)? });
    }
    if files.is_empty() {
        return Err(FilesError::EmptyBundle(root.to_path_buf()));
    }
    files.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(files)
}

/// Where a download lands: `output` when given, otherwise the server's file
/// name (or `fallback`) reduced to its final component so the server never
/// picks a directory.
#[must_use]
pub fn download_path(download: &Download, output: Option<PathBuf>, fallback: &str) -> PathBuf {
    if let Some(output) = output {
        return output;
    }
    let name = download.file_name.as_deref().unwrap_or(fallback);
    local_name(name)
        .or_else(|| local_name(fallback))
        .unwrap_or_else(|| PathBuf::from("download.bin"))
}

fn local_name(name: &str) -> Option<PathBuf> {
    // Backslashes count as separators too; servers on Windows send them.
    let last = name.rsplit(['/', '\\']).next()?.trim();
    match last {
        "" | "." | ".." => None,
        _ => Some(PathBuf::from(last)),
    }
}

/// Write a download to `path`.
///
/// # Errors
///
/// [`FilesError::Io`] when the file cannot be written.
pub fn save(download: &Download, path: &Path) -> Result<(), FilesError> {
    std::fs::write(path, &download.bytes).map_err(|source| FilesError::Io { path: path.to_path_buf(), source })
}

#[cfg(test)]
#[path = "files_test.rs"]
mod tests;
