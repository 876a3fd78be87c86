//! File downloads: one streaming attempt ([`HttpClient`]) wrapped in a
//! fixed-delay retry loop that reports exhausted URLs to the skip ledger
//! ([`Downloader`]).
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use listing_mirror::download::{Downloader, HttpClient, RetryPolicy};
//! use listing_mirror::ledger::CsvSkipLedger;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpClient::new(Duration::from_secs(30))?;
//! let ledger = Arc::new(CsvSkipLedger::new("skipped.csv"));
//! let downloader = Downloader::new(client, RetryPolicy::default(), ledger);
//! let ok = downloader
//!     .download("https://example.com/paper.pdf", Path::new("./downloads/paper.pdf"))
//!     .await;
//! println!("downloaded: {ok}");
//! # Ok(())
//! # }
//! ```

mod client;
mod downloader;
mod error;
mod retry;

pub use client::HttpClient;
pub use downloader::Downloader;
pub use error::DownloadError;
pub use retry::{RetryDecision, RetryPolicy};
