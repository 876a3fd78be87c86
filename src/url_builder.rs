//! Reconstruction of absolute file URLs from inconsistent listing hrefs.
//!
//! Listing responses are inconsistent about whether a file path is absolute,
//! relative, single- or double-encoded. [`build_file_url`] folds all of these
//! into one canonical URL under the site origin with exactly one level of
//! percent-encoding per path segment.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use tracing::warn;
use url::Url;

/// Bytes escaped in a path segment: everything except ASCII alphanumerics and
/// `- _ . ! ~ * ' ( )`, the unreserved set of JavaScript's `encodeURIComponent`.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Decoding passes applied to a segment before it is re-encoded.
///
/// Enough to unwrap any realistic stack of accidental encodings (`%252520`).
const MAX_DECODE_PASSES: usize = 8;

/// Builds the absolute URL of a file listed in `remote_dir`.
///
/// 1. An `http`/`https` href is reduced to its final path segment and then
///    treated as relative to `remote_dir`; the server is known to emit broken
///    absolute URLs. If it cannot be parsed, the raw href is returned as-is.
/// 2. A leading `./` and leading slashes are stripped from the href, and
///    surrounding slashes from `remote_dir`.
/// 3. Both are joined with URL (POSIX) semantics; `.` and `..` segments are resolved.
/// 4. Every segment is fully percent-decoded and encoded exactly once.
/// 5. The result is prefixed with `origin` (trailing slashes removed).
#[must_use]
pub fn build_file_url(origin: &str, remote_dir: &str, href: &str) -> String {
    let relative_hint = if has_http_scheme(href) {
        match Url::parse(href) {
            Ok(parsed) => final_path_segment(&parsed).to_string(),
            Err(error) => {
                warn!(href = %href, error = %error, "malformed absolute href; using it unchanged");
                return href.to_string();
            }
        }
    } else {
        href.to_string()
    };

    let clean_href = relative_hint
        .strip_prefix("./")
        .unwrap_or(&relative_hint)
        .trim_start_matches('/')
        .trim();
    let clean_remote = remote_dir.trim_matches('/').trim();

    let encoded_path = join_url_path(clean_remote, clean_href)
        .iter()
        .map(|segment| encode_segment(segment))
        .collect::<Vec<_>>()
        .join("/");

    format!("{}/{encoded_path}", origin.trim_end_matches('/'))
}

/// Returns the last path component of an encoded URL, i.e. the file name.
#[must_use]
pub fn url_basename(url: &str) -> &str {
    let without_query = url.split(['?', '#']).next().unwrap_or(url);
    without_query
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
}

fn has_http_scheme(href: &str) -> bool {
    let lower = href.get(..8).unwrap_or(href).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

fn final_path_segment(url: &Url) -> &str {
    url.path()
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
}

/// Joins two slash-separated paths and resolves `.`/`..`; empty segments are dropped.
fn join_url_path<'a>(base: &'a str, relative: &'a str) -> Vec<&'a str> {
    let mut resolved: Vec<&str> = Vec::new();
    for segment in base.split('/').chain(relative.split('/')) {
        match segment {
            "" | "." => {}
            ".." => {
                resolved.pop();
            }
            other => resolved.push(other),
        }
    }
    resolved
}

fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(&decode_fully(segment), SEGMENT).to_string()
}

/// Percent-decodes until a fixed point, stopping early on invalid UTF-8.
fn decode_fully(segment: &str) -> String {
    let mut current = segment.to_string();
    for _ in 0..MAX_DECODE_PASSES {
        if !current.contains('%') {
            break;
        }
        let next = match urlencoding::decode(&current) {
            Ok(decoded) if decoded != current.as_str() => decoded.into_owned(),
            _ => break,
        };
        current = next;
    }
    current
}
