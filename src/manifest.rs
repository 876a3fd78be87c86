//! Per-directory manifests: a Markdown table of every file attempted in one
//! remote directory, written to the logs directory after the directory is done.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, instrument};

use crate::layout::MirrorLayout;

/// Body line written when a directory yielded no files.
pub const NO_FILES_MARKER: &str = "_No files found_";

/// A resolved file URL and where it was (or would have been) saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRecord {
    /// Canonical absolute URL.
    pub url: String,
    /// Local destination path.
    pub destination: PathBuf,
}

/// Errors writing a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// Creating the logs directory or writing the manifest failed.
    #[error("failed to write manifest {path}: {source}")]
    Write {
        /// Manifest or logs directory path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

/// Writes manifests into the layout's logs directory.
#[derive(Debug, Clone)]
pub struct ManifestLogger {
    layout: MirrorLayout,
}

impl ManifestLogger {
    /// Creates a logger for `layout`.
    #[must_use]
    pub fn new(layout: MirrorLayout) -> Self {
        Self { layout }
    }

    /// Writes (overwriting) the manifest for `remote_dir`, returning its path.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError`] when the logs directory or file cannot be written.
    #[instrument(skip(self, records), fields(records = records.len()))]
    pub async fn log_folder(
        &self,
        remote_dir: &str,
        records: &[DownloadRecord],
    ) -> Result<PathBuf, ManifestError> {
        let logs_dir = self.layout.logs_dir();
        tokio::fs::create_dir_all(logs_dir)
            .await
            .map_err(|source| ManifestError::Write {
                path: logs_dir.to_path_buf(),
                source,
            })?;

        let path = self.layout.manifest_path(remote_dir);
        tokio::fs::write(&path, render_manifest(remote_dir, records))
            .await
            .map_err(|source| ManifestError::Write {
                path: path.clone(),
                source,
            })?;

        info!(remote_dir, manifest = %path.display(), "logged structure");
        Ok(path)
    }
}

/// Renders the manifest body for `remote_dir`.
#[must_use]
pub fn render_manifest(remote_dir: &str, records: &[DownloadRecord]) -> String {
    let rows = if records.is_empty() {
        NO_FILES_MARKER.to_string()
    } else {
        records
            .iter()
            .map(|record| {
                format!(
                    "| {} | [🔗 Open File]({}) |",
                    file_label(&record.destination),
                    record.url
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!("# 📁 {remote_dir}\n\n| File Name | URL |\n|------------|-----|\n{rows}\n\n---\n")
}

fn file_label(destination: &Path) -> String {
    destination
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
