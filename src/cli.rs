//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

use listing_mirror::CrawlConfig;

/// Mirror every PDF from a site's AJAX directory listings.
///
/// Listing-mirror walks the remote directory tree depth-first, saves each PDF
/// under a local folder mirroring its remote directory, writes one manifest per
/// directory, and records failures in a CSV skip ledger.
#[derive(Parser, Debug)]
#[command(name = "listing-mirror")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// TOML config file (default: $XDG_CONFIG_HOME/listing-mirror/config.toml, if present)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Page answering the AJAX directory listing requests
    #[arg(long, value_name = "URL")]
    pub base_page_url: Option<String>,

    /// Scheme and host prefixed to file URLs
    #[arg(long, value_name = "URL")]
    pub site_origin: Option<String>,

    /// Remote directory to start crawling from
    #[arg(long, value_name = "REMOTE_PATH")]
    pub root_dir: Option<String>,

    /// Local mirror root
    #[arg(short = 'o', long, value_name = "DIR")]
    pub download_dir: Option<PathBuf>,

    /// Directory for per-directory manifests
    #[arg(long, value_name = "DIR")]
    pub logs_dir: Option<PathBuf>,

    /// CSV file recording failed downloads and listings
    #[arg(long, value_name = "PATH")]
    pub skip_ledger: Option<PathBuf>,

    /// Download attempts per file (0-10; 0 still makes one attempt)
    #[arg(short = 'r', long, value_parser = clap::value_parser!(u32).range(0..=10))]
    pub max_retries: Option<u32>,

    /// Delay between download attempts in milliseconds (max 60000)
    #[arg(long, value_parser = clap::value_parser!(u64).range(0..=60_000))]
    pub retry_delay_ms: Option<u64>,

    /// Timeout for one directory listing request in milliseconds
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..=3_600_000))]
    pub fetch_timeout_ms: Option<u64>,

    /// Download idle timeout in milliseconds (headers and each body chunk)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..=3_600_000))]
    pub download_timeout_ms: Option<u64>,

    /// List and classify without downloading; manifests are still written
    #[arg(long)]
    pub dry_run: bool,

    /// Re-attempt the rows of the existing skip ledger instead of a full crawl
    #[arg(long)]
    pub retry_skipped: bool,
}

impl Args {
    /// Applies every flag that was given on top of `config`.
    pub fn apply_overrides(&self, config: &mut CrawlConfig) {
        if let Some(url) = &self.base_page_url {
            config.base_page_url.clone_from(url);
        }
        if let Some(origin) = &self.site_origin {
            config.site_origin.clone_from(origin);
        }
        if let Some(root) = &self.root_dir {
            config.root_remote_dir.clone_from(root);
        }
        if let Some(dir) = &self.download_dir {
            config.download_dir.clone_from(dir);
        }
        if let Some(dir) = &self.logs_dir {
            config.logs_dir.clone_from(dir);
        }
        if let Some(path) = &self.skip_ledger {
            config.skip_ledger.clone_from(path);
        }
        if let Some(retries) = self.max_retries {
            config.max_retries = retries;
        }
        if let Some(delay) = self.retry_delay_ms {
            config.retry_delay_ms = delay;
        }
        if let Some(timeout) = self.fetch_timeout_ms {
            config.fetch_timeout_ms = timeout;
        }
        if let Some(timeout) = self.download_timeout_ms {
            config.download_timeout_ms = timeout;
        }
    }
}
