//! Listing Mirror Library
//!
//! Recursively crawls a site's AJAX directory listings, downloads every PDF it
//! finds into a local tree mirroring the remote one, writes a manifest per
//! directory, and records anything it could not fetch in a skip ledger.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`config`] - TOML configuration with defaults and validation
//! - [`listing`] - Listing fetch, row extraction, and classification
//! - [`url_builder`] - Canonical file URLs from inconsistent hrefs
//! - [`sanitize`] / [`layout`] - Filesystem-safe names and the local mirror layout
//! - [`download`] - Streaming downloads with fixed-delay retry
//! - [`ledger`] - The append-only skip ledger
//! - [`manifest`] - Per-directory manifests
//! - [`crawler`] - The depth-first orchestrator

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod crawler;
pub mod download;
mod http;
pub mod layout;
pub mod ledger;
pub mod listing;
pub mod manifest;
pub mod sanitize;
pub mod url_builder;
mod user_agent;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use config::{ConfigError, CrawlConfig, resolve_default_config_path};
pub use crawler::{CrawlError, CrawlStats, Crawler};
pub use download::{DownloadError, Downloader, HttpClient, RetryDecision, RetryPolicy};
pub use layout::MirrorLayout;
pub use ledger::{
    CsvSkipLedger, LedgerError, MemorySkipLedger, SkipEntry, SkipLedger, read_skip_ledger,
    remove_skip_ledger,
};
pub use listing::{
    DirectoryFetcher, EntryKind, FetchError, ListingDialect, ListingRow, ListingSource,
    classify_row, parse_listing,
};
pub use manifest::{DownloadRecord, ManifestError, ManifestLogger};
pub use sanitize::sanitize_name;
pub use url_builder::build_file_url;
