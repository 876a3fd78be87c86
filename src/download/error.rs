//! Why a single PDF download attempt failed.
//!
//! Every variant is retryable: [`super::Downloader`] keeps trying until the
//! attempt cap, then records a `(url, destination)` ledger row. The variant
//! itself only reaches the logs.

use std::path::PathBuf;

use thiserror::Error;

/// Failure of one [`super::HttpClient::download_to_path`] call.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The connection or body stream broke.
    #[error("network error downloading {url}: {source}")]
    Network {
        /// File URL.
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// No headers, or no next body chunk, within the idle timeout.
    #[error("timeout downloading {url}")]
    Timeout {
        /// File URL.
        url: String,
    },

    /// The site answered with a non-2xx status; no file is written.
    #[error("HTTP {status} downloading {url}")]
    HttpStatus {
        /// File URL.
        url: String,
        /// Response status code.
        status: u16,
    },

    /// Creating the mirror folder or writing the PDF failed.
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// Folder or file in the mirror tree.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The resolved file URL does not parse.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The unparseable URL.
        url: String,
    },
}

impl DownloadError {
    /// Wraps a reqwest failure, reporting elapsed timeouts as [`Self::Timeout`].
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            return Self::timeout(url);
        }
        Self::Network {
            url: url.into(),
            source,
        }
    }

    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }
}
