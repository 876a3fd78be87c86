//! Recursive, depth-first crawl of a directory listing tree.
//!
//! Each directory visit fetches its listing, classifies every row in document
//! order, recurses into subdirectories immediately, downloads PDFs into the
//! mirrored local folder, and finally writes the directory's manifest. Listing
//! and download failures go to the skip ledger; nothing aborts the crawl.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::config::CrawlConfig;
use crate::download::{Downloader, HttpClient, RetryPolicy};
use crate::layout::MirrorLayout;
use crate::ledger::{SkipEntry, SkipLedger, record_or_warn};
use crate::listing::{
    DirectoryFetcher, EntryKind, ListingDialect, ListingSource, classify_row, parse_listing,
};
use crate::manifest::{DownloadRecord, ManifestLogger};

/// Errors constructing a crawler.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// The HTTP client for listings or downloads could not be built.
    #[error("failed to build HTTP client: {source}")]
    HttpClient {
        /// The underlying client error.
        #[source]
        source: reqwest::Error,
    },
}

/// Counters accumulated over a crawl.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStats {
    /// Directories whose listing was requested.
    pub directories_visited: usize,
    /// Directories whose listing could not be fetched.
    pub directories_failed: usize,
    /// Files saved to disk.
    pub files_downloaded: usize,
    /// Files that failed every attempt.
    pub files_failed: usize,
    /// Files found during a dry run.
    pub files_planned: usize,
    /// Directory re-entries refused by cycle detection.
    pub cycles_skipped: usize,
    /// Manifests written.
    pub manifests_written: usize,
}

impl CrawlStats {
    /// Number of rows recorded to the skip ledger.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.directories_failed + self.files_failed
    }

    /// Listings fetched plus files downloaded or planned.
    #[must_use]
    pub fn completed(&self) -> usize {
        (self.directories_visited - self.directories_failed)
            + self.files_downloaded
            + self.files_planned
    }
}

/// Sequential crawler over one mirror layout.
pub struct Crawler {
    layout: MirrorLayout,
    site_origin: String,
    dialect: ListingDialect,
    source: Box<dyn ListingSource>,
    downloader: Downloader,
    manifests: ManifestLogger,
    ledger: Arc<dyn SkipLedger>,
    dry_run: bool,
    visited: HashSet<String>,
    stats: CrawlStats,
}

impl std::fmt::Debug for Crawler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Crawler")
            .field("layout", &self.layout)
            .field("site_origin", &self.site_origin)
            .field("dry_run", &self.dry_run)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl Crawler {
    /// Creates a crawler from its parts.
    #[must_use]
    pub fn new(
        layout: MirrorLayout,
        site_origin: impl Into<String>,
        dialect: ListingDialect,
        source: Box<dyn ListingSource>,
        downloader: Downloader,
        ledger: Arc<dyn SkipLedger>,
    ) -> Self {
        Self {
            manifests: ManifestLogger::new(layout.clone()),
            layout,
            site_origin: site_origin.into(),
            dialect,
            source,
            downloader,
            ledger,
            dry_run: false,
            visited: HashSet::new(),
            stats: CrawlStats::default(),
        }
    }

    /// Creates a crawler against the live site described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`CrawlError`] when an HTTP client cannot be built.
    pub fn from_config(
        config: &CrawlConfig,
        ledger: Arc<dyn SkipLedger>,
    ) -> Result<Self, CrawlError> {
        let fetcher = DirectoryFetcher::new(
            config.base_page_url.clone(),
            config.listing.clone(),
            config.fetch_timeout(),
        )
        .map_err(|source| CrawlError::HttpClient { source })?;
        let client = HttpClient::new(config.download_timeout())
            .map_err(|source| CrawlError::HttpClient { source })?;
        let policy = RetryPolicy::new(config.download_attempts(), config.retry_delay());
        let downloader = Downloader::new(client, policy, Arc::clone(&ledger));

        Ok(Self::new(
            config.layout(),
            config.site_origin.clone(),
            config.listing.clone(),
            Box::new(fetcher),
            downloader,
            ledger,
        ))
    }

    /// Enables or disables dry-run mode (no downloads, no mirror folders).
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Counters so far.
    #[must_use]
    pub fn stats(&self) -> &CrawlStats {
        &self.stats
    }

    /// Crawls the whole tree from the configured root directory.
    pub async fn run(&mut self) -> &CrawlStats {
        if !self.dry_run {
            ensure_dir(self.layout.download_dir()).await;
        }
        let root = self.layout.root_remote_dir().to_string();
        info!(root = %root, dry_run = self.dry_run, "starting crawl");
        self.visit(root).await;
        info!("crawl finished");
        &self.stats
    }

    /// Re-attempts the rows of a previous skip ledger.
    ///
    /// Download rows are retried with the same downloader; fetch rows are
    /// re-crawled as subtrees, each with a fresh visited set.
    pub async fn retry_skipped(&mut self, entries: Vec<SkipEntry>) -> &CrawlStats {
        info!(entries = entries.len(), "retrying skipped entries");
        for entry in entries {
            match entry {
                SkipEntry::DownloadFailed { url, destination } => {
                    self.fetch_file(&url, &destination).await;
                }
                SkipEntry::FetchFailed { path, message } => {
                    debug!(remote_dir = %path, previous_error = %message, "re-crawling subtree");
                    self.visited.clear();
                    self.visit(path).await;
                }
            }
        }
        &self.stats
    }

    fn visit(&mut self, remote_dir: String) -> BoxFuture<'_, ()> {
        async move {
            if !self.visited.insert(visit_key(&remote_dir)) {
                warn!(remote_dir = %remote_dir, "directory already visited, refusing to re-enter");
                self.stats.cycles_skipped += 1;
                return;
            }
            self.stats.directories_visited += 1;
            info!(remote_dir = %remote_dir, "scraping");

            let markup = match self.source.fetch_listing(&remote_dir).await {
                Ok(markup) => markup,
                Err(e) => {
                    error!(remote_dir = %remote_dir, error = %e, "failed to fetch directory");
                    self.stats.directories_failed += 1;
                    record_or_warn(
                        self.ledger.as_ref(),
                        &SkipEntry::FetchFailed {
                            path: remote_dir,
                            message: e.to_string(),
                        },
                    );
                    return;
                }
            };

            let rows = parse_listing(&markup, &self.dialect);
            debug!(remote_dir = %remote_dir, rows = rows.len(), "listing parsed");

            let local_folder = self.layout.local_folder(&remote_dir);
            if !self.dry_run {
                ensure_dir(&local_folder).await;
            }

            let mut records = Vec::new();
            for row in &rows {
                match classify_row(row, &remote_dir, &self.site_origin, &self.dialect) {
                    EntryKind::Subdirectory(child) => {
                        debug!(parent = %remote_dir, child = %child, "found subdirectory");
                        self.visit(child).await;
                    }
                    EntryKind::PdfFile { url, file_name } => {
                        let destination = local_folder.join(file_name);
                        self.fetch_file(&url, &destination).await;
                        records.push(DownloadRecord { url, destination });
                    }
                    EntryKind::Ignorable => {
                        debug!(href = %row.href, text = %row.text, "ignoring row");
                    }
                }
            }

            match self.manifests.log_folder(&remote_dir, &records).await {
                Ok(_) => self.stats.manifests_written += 1,
                Err(e) => error!(remote_dir = %remote_dir, error = %e, "failed to write manifest"),
            }
        }
        .boxed()
    }

    async fn fetch_file(&mut self, url: &str, destination: &Path) {
        if self.dry_run {
            info!(url, dest = %destination.display(), "would download");
            self.stats.files_planned += 1;
        } else if self.downloader.download(url, destination).await {
            self.stats.files_downloaded += 1;
        } else {
            self.stats.files_failed += 1;
        }
    }
}

/// Normalizes a remote path for cycle detection.
fn visit_key(remote_dir: &str) -> String {
    remote_dir
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

async fn ensure_dir(path: &Path) {
    if let Err(e) = tokio::fs::create_dir_all(path).await {
        warn!(path = %path.display(), error = %e, "could not create directory");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use tempfile::TempDir;

    use crate::ledger::MemorySkipLedger;
    use crate::listing::FetchError;

    const ROOT: &str = "question-papers/2024-Papers";

    /// Serves fixed markup per remote path; unknown paths answer HTTP 404.
    #[derive(Default)]
    struct StaticListings {
        pages: HashMap<String, String>,
        requests: Arc<Mutex<Vec<String>>>,
    }

    impl StaticListings {
        fn with(mut self, remote_dir: &str, rows: &[&str]) -> Self {
            let markup = rows
                .iter()
                .map(|row| format!("<div class=\"sfl_item\">{row}</div>"))
                .collect::<String>();
            self.pages.insert(remote_dir.to_string(), markup);
            self
        }
    }

    #[async_trait]
    impl ListingSource for StaticListings {
        async fn fetch_listing(&self, remote_dir: &str) -> Result<String, FetchError> {
            self.requests.lock().unwrap().push(remote_dir.to_string());
            self.pages
                .get(remote_dir)
                .cloned()
                .ok_or_else(|| FetchError::http_status(remote_dir, 404))
        }
    }

    struct Harness {
        _temp: TempDir,
        layout: MirrorLayout,
        ledger: Arc<MemorySkipLedger>,
        requests: Arc<Mutex<Vec<String>>>,
    }

    fn crawler(listings: StaticListings, origin: &str, dry_run: bool) -> (Crawler, Harness) {
        let temp = TempDir::new().unwrap();
        let layout = MirrorLayout::new(
            ROOT,
            temp.path().join("downloads"),
            temp.path().join("logs"),
        );
        let ledger = Arc::new(MemorySkipLedger::new());
        let requests = Arc::clone(&listings.requests);
        let downloader = Downloader::new(
            HttpClient::new(Duration::from_secs(1)).unwrap(),
            RetryPolicy::new(1, Duration::ZERO),
            Arc::clone(&ledger) as Arc<dyn SkipLedger>,
        );
        let crawler = Crawler::new(
            layout.clone(),
            origin,
            ListingDialect::default(),
            Box::new(listings),
            downloader,
            Arc::clone(&ledger) as Arc<dyn SkipLedger>,
        )
        .with_dry_run(dry_run);
        (
            crawler,
            Harness {
                _temp: temp,
                layout,
                ledger,
                requests,
            },
        )
    }

    fn subdir_row(rel: &str) -> String {
        format!("<a href=\"javascript:void(0)\" rel=\"{rel}\">dir</a>")
    }

    #[tokio::test]
    async fn test_dry_run_visits_depth_first_and_writes_manifests() {
        let sem1 = format!("{ROOT}/Sem1");
        let listings = StaticListings::default()
            .with(
                ROOT,
                &[
                    &subdir_row(&sem1),
                    "<a href=\"Top.pdf\">Top</a>",
                    "<a href=\"readme.txt\">Readme</a>",
                ],
            )
            .with(&sem1, &["<a href=\"Paper%201.pdf\">Paper 1</a>"]);
        let (mut crawler, harness) = crawler(listings, "https://site.test", true);

        let stats = crawler.run().await.clone();

        assert_eq!(
            stats,
            CrawlStats {
                directories_visited: 2,
                files_planned: 2,
                manifests_written: 2,
                ..CrawlStats::default()
            }
        );
        assert_eq!(*harness.requests.lock().unwrap(), vec![ROOT.to_string(), sem1.clone()]);
        assert!(!harness.layout.download_dir().exists(), "dry run creates no mirror folders");

        let child_manifest = std::fs::read_to_string(harness.layout.manifest_path(&sem1)).unwrap();
        assert!(child_manifest.contains(&format!("https://site.test/{sem1}/Paper%201.pdf")));
        let root_manifest = std::fs::read_to_string(harness.layout.manifest_path(ROOT)).unwrap();
        assert!(root_manifest.contains("| Top.pdf |"));
        assert!(!root_manifest.contains("readme"));
    }

    #[tokio::test]
    async fn test_fetch_failure_records_fetch_err_and_skips_manifest() {
        let missing = format!("{ROOT}/Missing");
        let listings = StaticListings::default().with(ROOT, &[&subdir_row(&missing)]);
        let (mut crawler, harness) = crawler(listings, "https://site.test", true);

        let stats = crawler.run().await.clone();

        assert_eq!(stats.directories_visited, 2);
        assert_eq!(stats.directories_failed, 1);
        assert_eq!(stats.manifests_written, 1);
        assert_eq!(
            harness.ledger.entries(),
            vec![SkipEntry::FetchFailed {
                path: missing.clone(),
                message: format!("HTTP 404 listing {missing}"),
            }]
        );
        assert!(!harness.layout.manifest_path(&missing).exists());
    }

    #[tokio::test]
    async fn test_cycle_is_refused_and_counted() {
        let listings = StaticListings::default().with(
            ROOT,
            &[&subdir_row(&format!("/{ROOT}/")), &subdir_row(&format!("{ROOT}//"))],
        );
        let (mut crawler, harness) = crawler(listings, "https://site.test", true);

        let stats = crawler.run().await.clone();

        assert_eq!(stats.directories_visited, 1);
        assert_eq!(stats.cycles_skipped, 2);
        assert_eq!(harness.requests.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_guessed_subdirectory_from_icon() {
        let child = format!("{ROOT}/Winter 2024");
        let listings = StaticListings::default()
            .with(
                ROOT,
                &["<img src=\"/icons/directory.png\"><a href=\"#\">Winter 2024</a>"],
            )
            .with(&child, &[]);
        let (mut crawler, harness) = crawler(listings, "https://site.test", true);

        crawler.run().await;

        assert_eq!(*harness.requests.lock().unwrap(), vec![ROOT.to_string(), child.clone()]);
        let manifest = std::fs::read_to_string(harness.layout.manifest_path(&child)).unwrap();
        assert!(manifest.contains("_No files found_"));
    }

    #[tokio::test]
    async fn test_failed_download_is_recorded_and_still_listed() {
        // An origin without a scheme yields URLs that fail to parse, so the
        // single attempt fails without touching the network.
        let listings = StaticListings::default().with(ROOT, &["<a href=\"Broken.pdf\">x</a>"]);
        let (mut crawler, harness) = crawler(listings, "no-scheme", false);

        let stats = crawler.run().await.clone();

        assert_eq!(stats.files_failed, 1);
        assert_eq!(stats.files_downloaded, 0);
        let destination = harness.layout.local_folder(ROOT).join("Broken.pdf");
        assert_eq!(
            harness.ledger.entries(),
            vec![SkipEntry::DownloadFailed {
                url: format!("no-scheme/{ROOT}/Broken.pdf"),
                destination,
            }]
        );
        assert!(harness.layout.local_folder(ROOT).is_dir());
        let manifest = std::fs::read_to_string(harness.layout.manifest_path(ROOT)).unwrap();
        assert!(manifest.contains("| Broken.pdf |"));
    }

    #[tokio::test]
    async fn test_retry_skipped_recrawls_fetch_rows_and_plans_downloads() {
        let sem2 = format!("{ROOT}/Sem2");
        let listings = StaticListings::default().with(&sem2, &["<a href=\"B.pdf\">B</a>"]);
        let (mut crawler, harness) = crawler(listings, "https://site.test", true);

        let stats = crawler
            .retry_skipped(vec![
                SkipEntry::FetchFailed {
                    path: sem2.clone(),
                    message: "timeout".to_string(),
                },
                SkipEntry::DownloadFailed {
                    url: "https://site.test/A.pdf".to_string(),
                    destination: harness.layout.download_dir().join("A.pdf"),
                },
            ])
            .await
            .clone();

        assert_eq!(stats.directories_visited, 1);
        assert_eq!(stats.files_planned, 2);
        assert!(harness.ledger.is_empty());
    }

    #[test]
    fn test_visit_key_normalizes_slashes() {
        assert_eq!(visit_key("/a//b/"), "a/b");
        assert_eq!(visit_key("a/b"), "a/b");
        assert_eq!(visit_key(""), "");
    }

    #[test]
    fn test_stats_failed_and_completed() {
        let stats = CrawlStats {
            directories_visited: 3,
            directories_failed: 1,
            files_downloaded: 4,
            files_failed: 2,
            ..CrawlStats::default()
        };
        assert_eq!(stats.failed(), 3);
        assert_eq!(stats.completed(), 6);
    }
}
