//! HTTP client wrapper for streaming single files to disk.
//!
//! This module provides the `HttpClient` struct which performs exactly one
//! download attempt: no retry, no ledger. [`super::Downloader`] layers those on top.

use std::path::Path;
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::Client;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, instrument};
use url::Url;

use super::error::DownloadError;
use crate::http;

/// HTTP client for downloading files with streaming support.
///
/// This client is designed to be created once and reused for every file in a
/// crawl, taking advantage of connection pooling.
///
/// # Example
///
/// ```no_run
/// use listing_mirror::download::HttpClient;
/// use std::path::Path;
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = HttpClient::new(Duration::from_secs(30))?;
/// let bytes = client
///     .download_to_path("https://example.com/file.pdf", Path::new("./downloads/file.pdf"))
///     .await?;
/// println!("Wrote {bytes} bytes");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    header_timeout: Duration,
}

impl HttpClient {
    /// Creates a client that gives up when connecting, waiting for response
    /// headers, or waiting for the next body chunk takes longer than `timeout`.
    ///
    /// The body as a whole has no deadline.
    ///
    /// # Errors
    ///
    /// Returns the client construction error.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: http::build_streaming_client(timeout)?,
            header_timeout: timeout,
        })
    }

    /// Downloads `url` to exactly `destination`, returning the bytes written.
    ///
    /// The parent directory is created first. An existing file at
    /// `destination` is overwritten; a partially written file is removed when
    /// the attempt fails.
    ///
    /// # Errors
    ///
    /// Returns `DownloadError` if:
    /// - The URL is invalid
    /// - The request fails (network error, headers or a body chunk overdue)
    /// - The server returns an error status (4xx, 5xx)
    /// - Creating the directory or writing the file fails
    #[instrument(skip(self, url, destination), fields(url = %url, dest = %destination.display()))]
    pub async fn download_to_path(
        &self,
        url: &str,
        destination: &Path,
    ) -> Result<u64, DownloadError> {
        Url::parse(url).map_err(|_| DownloadError::invalid_url(url))?;

        if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| DownloadError::io(parent, e))?;
        }

        let response = tokio::time::timeout(self.header_timeout, self.client.get(url).send())
            .await
            .map_err(|_| DownloadError::timeout(url))?
            .map_err(|e| DownloadError::network(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::http_status(url, status.as_u16()));
        }

        let mut file = File::create(destination)
            .await
            .map_err(|e| DownloadError::io(destination, e))?;

        let stream_result = stream_to_file(&mut file, response, url, destination).await;
        if stream_result.is_err() {
            drop(file);
            debug!("cleaning up partial file after error");
            let _ = tokio::fs::remove_file(destination).await;
        }
        stream_result
    }
}

/// Streams response body to file, returning bytes written.
///
/// This is extracted to enable cleanup on error in the caller.
async fn stream_to_file(
    file: &mut File,
    response: reqwest::Response,
    url: &str,
    file_path: &Path,
) -> Result<u64, DownloadError> {
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| DownloadError::network(url, e))?;

        writer
            .write_all(&chunk)
            .await
            .map_err(|e| DownloadError::io(file_path, e))?;

        bytes_written += chunk.len() as u64;
    }

    // Ensure all data is flushed to disk
    writer
        .flush()
        .await
        .map_err(|e| DownloadError::io(file_path, e))?;

    Ok(bytes_written)
}
