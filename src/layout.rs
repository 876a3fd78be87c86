//! Mapping from remote directory paths to the local mirror layout.
//!
//! A remote path such as `question-papers/2024-Papers/Sem1/Maths` is mirrored
//! under the download root with the configured root prefix removed and each
//! remaining segment sanitized: `downloads/Sem1/Maths`. The root itself maps to
//! `downloads/root`. Manifests follow the same relative naming in the logs
//! directory, flattened into a single file name.

use std::path::{Path, PathBuf};

use crate::sanitize::sanitize_name;

/// Placeholder segment used when a remote path has nothing left after the root prefix.
pub const ROOT_PLACEHOLDER: &str = "root";

/// File extension of per-directory manifests.
pub const MANIFEST_EXTENSION: &str = "md";

/// Pure mapping between remote directory coordinates and local paths.
#[derive(Debug, Clone)]
pub struct MirrorLayout {
    root_remote_dir: String,
    root_segment_count: usize,
    download_dir: PathBuf,
    logs_dir: PathBuf,
}

impl MirrorLayout {
    /// Creates a layout rooted at `root_remote_dir`.
    #[must_use]
    pub fn new(
        root_remote_dir: impl Into<String>,
        download_dir: impl Into<PathBuf>,
        logs_dir: impl Into<PathBuf>,
    ) -> Self {
        let root_remote_dir = root_remote_dir.into();
        let root_segment_count = segments(&root_remote_dir).count();
        Self {
            root_remote_dir,
            root_segment_count,
            download_dir: download_dir.into(),
            logs_dir: logs_dir.into(),
        }
    }

    /// The configured starting remote directory.
    #[must_use]
    pub fn root_remote_dir(&self) -> &str {
        &self.root_remote_dir
    }

    /// Local download root.
    #[must_use]
    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    /// Local manifest directory.
    #[must_use]
    pub fn logs_dir(&self) -> &Path {
        &self.logs_dir
    }

    /// Returns the local folder that mirrors `remote_dir`.
    ///
    /// The first N segments are dropped, where N is the number of segments in
    /// the configured root; the rest are sanitized individually. Segments that
    /// sanitize to nothing (`..`, `.`) are skipped so the result never escapes
    /// the download root.
    #[must_use]
    pub fn local_folder(&self, remote_dir: &str) -> PathBuf {
        let relative: Vec<String> = segments(remote_dir)
            .skip(self.root_segment_count)
            .map(sanitize_name)
            .filter(|segment| !segment.is_empty())
            .collect();

        if relative.is_empty() {
            return self.download_dir.join(ROOT_PLACEHOLDER);
        }
        relative
            .iter()
            .fold(self.download_dir.clone(), |path, segment| path.join(segment))
    }

    /// Returns the manifest path for `remote_dir` inside the logs directory.
    #[must_use]
    pub fn manifest_path(&self, remote_dir: &str) -> PathBuf {
        self.logs_dir.join(manifest_file_name(&self.root_remote_dir, remote_dir))
    }
}

/// Flattens `remote_dir` (relative to `root_remote_dir`) into a manifest file name.
///
/// The first occurrence of the root prefix is removed along with leading
/// slashes; an empty remainder becomes [`ROOT_PLACEHOLDER`]. Slashes in
/// deeper paths are replaced by the sanitizer, so `Sem1/Maths` yields
/// `Sem1_Maths.md`.
#[must_use]
pub fn manifest_file_name(root_remote_dir: &str, remote_dir: &str) -> String {
    let without_root = if root_remote_dir.is_empty() {
        remote_dir.to_string()
    } else {
        remote_dir.replacen(root_remote_dir, "", 1)
    };
    let relative = without_root.trim_start_matches('/');
    let label = if relative.is_empty() {
        ROOT_PLACEHOLDER.to_string()
    } else {
        sanitize_name(relative)
    };
    let label = if label.is_empty() { "_".to_string() } else { label };
    format!("{label}.{MANIFEST_EXTENSION}")
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROOT: &str = "question-papers/2024-Papers";

    fn layout() -> MirrorLayout {
        MirrorLayout::new(ROOT, "/mirror/downloads", "/mirror/logs")
    }

    #[test]
    fn test_root_maps_to_root_placeholder() {
        assert_eq!(
            layout().local_folder(ROOT),
            PathBuf::from("/mirror/downloads/root")
        );
        assert_eq!(
            layout().local_folder("/question-papers/2024-Papers/"),
            PathBuf::from("/mirror/downloads/root")
        );
    }

    #[test]
    fn test_nested_path_strips_root_and_sanitizes_segments() {
        assert_eq!(
            layout().local_folder("question-papers/2024-Papers/Sem 1/B.Sc:Maths"),
            PathBuf::from("/mirror/downloads/Sem 1/B.Sc_Maths")
        );
    }

    #[test]
    fn test_local_folder_is_deterministic() {
        let layout = layout();
        let path = "question-papers/2024-Papers/Winter/Law";
        assert_eq!(layout.local_folder(path), layout.local_folder(path));
    }

    #[test]
    fn test_dot_segments_cannot_escape_download_root() {
        let folder = layout().local_folder("question-papers/2024-Papers/../../etc");
        assert_eq!(folder, PathBuf::from("/mirror/downloads/etc"));
    }

    #[test]
    fn test_manifest_file_name_for_root_is_placeholder() {
        assert_eq!(manifest_file_name(ROOT, ROOT), "root.md");
    }

    #[test]
    fn test_manifest_file_name_flattens_nested_path() {
        assert_eq!(
            manifest_file_name(ROOT, "question-papers/2024-Papers/Sem1/Maths"),
            "Sem1_Maths.md"
        );
    }

    #[test]
    fn test_manifest_path_is_inside_logs_dir() {
        assert_eq!(
            layout().manifest_path("question-papers/2024-Papers/Sem1"),
            PathBuf::from("/mirror/logs/Sem1.md")
        );
    }
}
