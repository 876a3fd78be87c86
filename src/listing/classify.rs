//! Classification of listing rows into subdirectories, PDF files, and noise.

use std::sync::LazyLock;

use regex::Regex;

use super::{ListingDialect, ListingRow};
use crate::sanitize::sanitize_name;
use crate::url_builder::{build_file_url, url_basename};

/// A `.pdf` path, optionally followed by a query string.
#[allow(clippy::expect_used)]
static PDF_PATH_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\.pdf(\?.*)?$").expect("PDF_PATH_PATTERN is a valid regex")
});

/// A `rel` hint that names a PDF directly (no query string).
#[allow(clippy::expect_used)]
static PDF_REL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.pdf$").expect("PDF_REL_PATTERN is a valid regex"));

/// File name used when a resolved URL has no usable last segment.
const FALLBACK_FILE_NAME: &str = "download.pdf";

/// What a listing row means to the crawler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    /// A child directory to recurse into, by remote path.
    Subdirectory(String),
    /// A PDF to download.
    PdfFile {
        /// Canonical absolute URL.
        url: String,
        /// Sanitized local file name derived from the URL.
        file_name: String,
    },
    /// Anything else.
    Ignorable,
}

/// Classifies `row`, found in `current_dir`, with fixed precedence:
///
/// 1. non-empty `rel` and a script link in `href` → subdirectory at `rel`
/// 2. `rel` ending in `.pdf` (else `href`) matching `.pdf[?query]` → PDF file
/// 3. directory icon or directory-like text → subdirectory `current_dir/text`
/// 4. otherwise ignorable
#[must_use]
pub fn classify_row(
    row: &ListingRow,
    current_dir: &str,
    origin: &str,
    dialect: &ListingDialect,
) -> EntryKind {
    if !row.rel.is_empty() && row.href.contains(&dialect.script_link_marker) {
        return EntryKind::Subdirectory(row.rel.clone());
    }

    let pdf_path = if !row.rel.is_empty() && PDF_REL_PATTERN.is_match(&row.rel) {
        &row.rel
    } else {
        &row.href
    };
    if is_pdf_path(pdf_path) {
        let url = build_file_url(origin, current_dir, pdf_path);
        let file_name = sanitize_name(url_basename(&url));
        let file_name = if file_name.is_empty() {
            FALLBACK_FILE_NAME.to_string()
        } else {
            file_name
        };
        return EntryKind::PdfFile { url, file_name };
    }

    let has_directory_icon = row
        .icon_src
        .as_deref()
        .is_some_and(|src| src.contains(&dialect.directory_icon_marker));
    if has_directory_icon || contains_ignore_case(&row.text, &dialect.directory_text_marker) {
        return EntryKind::Subdirectory(format!("{current_dir}/{}", row.text));
    }

    EntryKind::Ignorable
}

/// Returns true when `path` ends in `.pdf`, optionally followed by a query string.
#[must_use]
pub fn is_pdf_path(path: &str) -> bool {
    !path.is_empty() && PDF_PATH_PATTERN.is_match(path)
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    !needle.is_empty() && haystack.to_lowercase().contains(&needle.to_lowercase())
}
