//! Remote directory listings: fetching, parsing, and row classification.
//!
//! # Architecture
//!
//! - [`ListingSource`] - Async trait returning raw listing markup for a remote directory
//! - [`DirectoryFetcher`] - HTTP implementation issuing the site's AJAX `dir` request
//! - [`parse_listing`] - Extracts [`ListingRow`]s from markup
//! - [`classify_row`] - Pure classification into [`EntryKind`]
//! - [`ListingDialect`] - Server-specific selectors and markers

mod classify;
mod fetcher;
mod parse;

pub use classify::{EntryKind, classify_row, is_pdf_path};
pub use fetcher::{DirectoryFetcher, FetchError};
pub use parse::parse_listing;

use async_trait::async_trait;
use scraper::Selector;
use serde::Deserialize;

/// Source of directory listing markup.
///
/// The crawler only depends on this trait, so listings can come from the
/// live site or from fixed markup in tests.
#[async_trait]
pub trait ListingSource: Send + Sync {
    /// Returns the listing markup for `remote_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] when the listing cannot be retrieved.
    async fn fetch_listing(&self, remote_dir: &str) -> Result<String, FetchError>;
}

/// One row of a directory listing, as extracted from markup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingRow {
    /// Raw `href` of the row's first anchor (absolute, relative, encoded or a script link).
    pub href: String,
    /// Alternate path hint carried in the anchor's `rel` attribute.
    pub rel: String,
    /// Display text of the anchor.
    pub text: String,
    /// `src` of the row's first image, if any.
    pub icon_src: Option<String>,
}

/// Markup and query conventions of a directory-listing server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ListingDialect {
    /// CSS selector matching listing rows.
    pub item_selector: String,
    /// Query parameter naming the AJAX action.
    pub action_param: String,
    /// Value of the action parameter for directory listings.
    pub action_value: String,
    /// Query parameter carrying the remote directory path.
    pub dir_param: String,
    /// Query parameter carrying the cache-busting timestamp.
    pub cache_buster_param: String,
    /// Substring of an icon `src` that marks a directory row.
    pub directory_icon_marker: String,
    /// Substring of an `href` that marks a script-triggered (non-navigating) link.
    pub script_link_marker: String,
    /// Case-insensitive substring of the display text that marks a directory row.
    pub directory_text_marker: String,
}

impl Default for ListingDialect {
    fn default() -> Self {
        Self {
            item_selector: ".sfl_item".to_string(),
            action_param: "sflaction".to_string(),
            action_value: "dir".to_string(),
            dir_param: "sflDir".to_string(),
            cache_buster_param: "_".to_string(),
            directory_icon_marker: "directory.png".to_string(),
            script_link_marker: "javascript".to_string(),
            directory_text_marker: "directory".to_string(),
        }
    }
}

impl ListingDialect {
    /// Checks that the row selector parses.
    ///
    /// # Errors
    ///
    /// Returns a human-readable message when the selector is empty or invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.item_selector.trim().is_empty() {
            return Err("selector must not be empty".to_string());
        }
        Selector::parse(&self.item_selector)
            .map(|_| ())
            .map_err(|error| format!("'{}' is not a valid selector: {error}", self.item_selector))
    }
}
