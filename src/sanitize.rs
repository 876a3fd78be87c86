//! Filesystem-safe names for remote directory and file labels.
//!
//! Remote listings carry arbitrary display text; every segment that ends up
//! on disk (mirror folders, downloaded files, manifest names) goes through
//! [`sanitize_name`] first.

/// Maximum length of a sanitized name, in characters.
pub const MAX_NAME_CHARS: usize = 200;

/// Converts an arbitrary remote name into a filesystem-safe path segment.
///
/// - whitespace runs collapse to a single space
/// - `< > : " / \ | ? *` and control characters `0x00..=0x1F` become `_`
/// - leading dots (and any whitespace exposed by removing them) are stripped
/// - the result is truncated to [`MAX_NAME_CHARS`] and has no surrounding whitespace
///
/// The function is idempotent: `sanitize_name(&sanitize_name(x)) == sanitize_name(x)`.
#[must_use]
pub fn sanitize_name(name: &str) -> String {
    let mut collapsed = String::with_capacity(name.len());
    let mut in_whitespace = false;
    for ch in name.chars() {
        if ch.is_whitespace() {
            if !in_whitespace {
                collapsed.push(' ');
                in_whitespace = true;
            }
            continue;
        }
        in_whitespace = false;
        collapsed.push(if is_illegal_char(ch) { '_' } else { ch });
    }

    let stripped = collapsed.trim_start_matches(['.', ' ']);
    let truncated: String = stripped.chars().take(MAX_NAME_CHARS).collect();
    truncated.trim_end().to_string()
}

/// Returns true for characters that are rejected by at least one mainstream filesystem.
#[must_use]
pub fn is_illegal_char(ch: char) -> bool {
    matches!(ch, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*') || ch <= '\u{1f}'
}
