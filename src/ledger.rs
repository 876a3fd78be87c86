//! The skip ledger: an append-only record of downloads that exhausted their
//! retries and directories whose listing could not be fetched.
//!
//! Rows come in two shapes and both are kept as-is on disk:
//!
//! ```text
//! "https://site/a/b.pdf","downloads/a/b.pdf"
//! "FETCH_ERR","a/b","HTTP 500 fetching listing for a/b"
//! ```

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use csv::{QuoteStyle, ReaderBuilder, WriterBuilder};
use thiserror::Error;
use tracing::{debug, warn};

/// Marker in the first column of a directory fetch failure row.
pub const FETCH_ERR_MARKER: &str = "FETCH_ERR";

/// One ledger row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipEntry {
    /// A file download that failed on every attempt.
    DownloadFailed {
        /// Resolved absolute URL.
        url: String,
        /// Local path the file was meant to be written to.
        destination: PathBuf,
    },
    /// A directory listing that could not be fetched.
    FetchFailed {
        /// Remote directory path.
        path: String,
        /// Human-readable cause.
        message: String,
    },
}

impl SkipEntry {
    fn fields(&self) -> Vec<String> {
        match self {
            Self::DownloadFailed { url, destination } => {
                vec![url.clone(), destination.to_string_lossy().into_owned()]
            }
            Self::FetchFailed { path, message } => {
                vec![FETCH_ERR_MARKER.to_string(), path.clone(), message.clone()]
            }
        }
    }

    fn from_fields(record: &csv::StringRecord) -> Option<Self> {
        match (record.get(0), record.get(1)) {
            (Some(FETCH_ERR_MARKER), Some(path)) => Some(Self::FetchFailed {
                path: path.to_string(),
                message: record.get(2).unwrap_or_default().to_string(),
            }),
            (Some(url), Some(destination)) if record.len() == 2 => Some(Self::DownloadFailed {
                url: url.to_string(),
                destination: PathBuf::from(destination),
            }),
            _ => None,
        }
    }
}

/// Errors raised while writing or reading the ledger file.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Opening, creating, or removing the ledger file failed.
    #[error("ledger IO error at {path}: {source}")]
    Io {
        /// Ledger file path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Encoding or decoding a CSV row failed.
    #[error("ledger CSV error at {path}: {source}")]
    Csv {
        /// Ledger file path.
        path: PathBuf,
        /// The underlying CSV error.
        #[source]
        source: csv::Error,
    },
}

impl LedgerError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn csv(path: &Path, source: csv::Error) -> Self {
        Self::Csv {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Destination for skip rows, shared by the downloader and the crawler.
pub trait SkipLedger: Send + Sync {
    /// Appends one row.
    ///
    /// # Errors
    ///
    /// Returns a [`LedgerError`] when the row could not be persisted.
    fn record(&self, entry: &SkipEntry) -> Result<(), LedgerError>;
}

/// Records `entry`, logging instead of failing when the ledger is unwritable.
pub fn record_or_warn(ledger: &dyn SkipLedger, entry: &SkipEntry) {
    if let Err(error) = ledger.record(entry) {
        warn!(%error, ?entry, "could not append to skip ledger");
    }
}

/// CSV file ledger. The file is only created once the first row is recorded.
#[derive(Debug)]
pub struct CsvSkipLedger {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl CsvSkipLedger {
    /// Creates a ledger appending to `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Ledger file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SkipLedger for CsvSkipLedger {
    fn record(&self, entry: &SkipEntry) -> Result<(), LedgerError> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| LedgerError::io(parent, e))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| LedgerError::io(&self.path, e))?;

        let mut writer = WriterBuilder::new()
            .has_headers(false)
            .flexible(true)
            .quote_style(QuoteStyle::Always)
            .from_writer(file);
        writer
            .write_record(entry.fields())
            .map_err(|e| LedgerError::csv(&self.path, e))?;
        writer
            .flush()
            .map_err(|e| LedgerError::io(&self.path, e))?;

        debug!(path = %self.path.display(), ?entry, "skip ledger row appended");
        Ok(())
    }
}

/// In-memory ledger, for tests and for callers that inspect failures directly.
#[derive(Debug, Default)]
pub struct MemorySkipLedger {
    entries: Mutex<Vec<SkipEntry>>,
}

impl MemorySkipLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every recorded entry, in order.
    #[must_use]
    pub fn entries(&self) -> Vec<SkipEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of recorded entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SkipLedger for MemorySkipLedger {
    fn record(&self, entry: &SkipEntry) -> Result<(), LedgerError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry.clone());
        Ok(())
    }
}

/// Reads a ledger file back into typed entries.
///
/// A missing file yields an empty list. Rows matching neither shape are
/// skipped with a warning.
///
/// # Errors
///
/// Returns a [`LedgerError`] when the file exists but cannot be read or decoded.
pub fn read_skip_ledger(path: &Path) -> Result<Vec<SkipEntry>, LedgerError> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| LedgerError::csv(path, e))?;

    let mut entries = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record.map_err(|e| LedgerError::csv(path, e))?;
        match SkipEntry::from_fields(&record) {
            Some(entry) => entries.push(entry),
            None => warn!(
                path = %path.display(),
                row = index + 1,
                fields = record.len(),
                "ignoring unrecognized skip ledger row"
            ),
        }
    }
    Ok(entries)
}

/// Removes a ledger file; a missing file is not an error.
///
/// # Errors
///
/// Returns a [`LedgerError`] when the file exists but cannot be removed.
pub fn remove_skip_ledger(path: &Path) -> Result<(), LedgerError> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(LedgerError::io(path, e)),
    }
}
