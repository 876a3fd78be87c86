//! HTTP directory listing requests.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, instrument};

use super::{ListingDialect, ListingSource};
use crate::http;

/// Errors that abort a single directory visit.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level failure (DNS, connection, TLS, truncated body).
    #[error("network error listing {path}: {source}")]
    Network {
        /// Remote directory that was requested.
        path: String,
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },

    /// The listing request exceeded the configured timeout.
    #[error("timeout listing {path}")]
    Timeout {
        /// Remote directory that was requested.
        path: String,
    },

    /// The server answered with a non-success status.
    #[error("HTTP {status} listing {path}")]
    HttpStatus {
        /// Remote directory that was requested.
        path: String,
        /// Response status code.
        status: u16,
    },
}

impl FetchError {
    /// Creates a network or timeout error from a client error.
    pub fn from_request(path: impl Into<String>, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::Timeout { path: path.into() }
        } else {
            Self::Network {
                path: path.into(),
                source,
            }
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(path: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            path: path.into(),
            status,
        }
    }
}

/// Fetches listing markup through the site's AJAX `dir` action.
///
/// Issues `GET <base_page_url>?<action>=dir&<dir>=<path>&_=<millis>`; no retry
/// happens at this layer.
#[derive(Debug, Clone)]
pub struct DirectoryFetcher {
    client: Client,
    base_page_url: String,
    dialect: ListingDialect,
}

impl DirectoryFetcher {
    /// Creates a fetcher whose requests are bounded by `timeout`.
    ///
    /// # Errors
    ///
    /// Returns the client construction error.
    pub fn new(
        base_page_url: impl Into<String>,
        dialect: ListingDialect,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: http::build_client(timeout)?,
            base_page_url: base_page_url.into(),
            dialect,
        })
    }

    /// Returns the raw listing markup for `remote_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] on network failure, timeout, or a non-2xx status.
    #[instrument(skip(self), fields(base = %self.base_page_url))]
    pub async fn fetch_directory_markup(&self, remote_dir: &str) -> Result<String, FetchError> {
        let cache_buster = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0)
            .to_string();

        let response = self
            .client
            .get(&self.base_page_url)
            .query(&[
                (
                    self.dialect.action_param.as_str(),
                    self.dialect.action_value.as_str(),
                ),
                (self.dialect.dir_param.as_str(), remote_dir),
                (
                    self.dialect.cache_buster_param.as_str(),
                    cache_buster.as_str(),
                ),
            ])
            .send()
            .await
            .map_err(|e| FetchError::from_request(remote_dir, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::http_status(remote_dir, status.as_u16()));
        }

        let markup = response
            .text()
            .await
            .map_err(|e| FetchError::from_request(remote_dir, e))?;
        debug!(bytes = markup.len(), "listing fetched");
        Ok(markup)
    }
}

#[async_trait]
impl ListingSource for DirectoryFetcher {
    async fn fetch_listing(&self, remote_dir: &str) -> Result<String, FetchError> {
        self.fetch_directory_markup(remote_dir).await
    }
}
