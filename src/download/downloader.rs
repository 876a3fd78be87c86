//! Download with bounded retry and a skip ledger.
//!
//! [`Downloader::download`] never returns an error: after the final failed
//! attempt it appends one row to the ledger and reports `false`.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, error, info, instrument, warn};

use super::client::HttpClient;
use super::retry::{RetryDecision, RetryPolicy};
use crate::ledger::{SkipEntry, SkipLedger, record_or_warn};

/// Streams files to disk, retrying failed attempts per [`RetryPolicy`].
#[derive(Clone)]
pub struct Downloader {
    client: HttpClient,
    policy: RetryPolicy,
    ledger: Arc<dyn SkipLedger>,
}

impl std::fmt::Debug for Downloader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Downloader")
            .field("client", &self.client)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl Downloader {
    /// Creates a downloader recording exhausted downloads into `ledger`.
    #[must_use]
    pub fn new(client: HttpClient, policy: RetryPolicy, ledger: Arc<dyn SkipLedger>) -> Self {
        Self {
            client,
            policy,
            ledger,
        }
    }

    /// The retry policy in effect.
    #[must_use]
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Downloads `url` to `destination`, returning whether it succeeded.
    #[instrument(skip(self, url, destination), fields(url = %url))]
    pub async fn download(&self, url: &str, destination: &Path) -> bool {
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            debug!(attempt, "attempting download");

            match self.client.download_to_path(url, destination).await {
                Ok(bytes) => {
                    info!(dest = %destination.display(), bytes, "saved");
                    return true;
                }
                Err(e) => match self.policy.should_retry(attempt) {
                    RetryDecision::Retry {
                        delay,
                        attempt: next_attempt,
                    } => {
                        warn!(
                            attempt,
                            next_attempt,
                            max_attempts = self.policy.max_attempts(),
                            delay_ms = delay.as_millis(),
                            error = %e,
                            "download attempt failed, retrying"
                        );
                        tokio::time::sleep(delay).await;
                    }
                    RetryDecision::DoNotRetry { reason } => {
                        error!(
                            attempts = attempt,
                            %reason,
                            error = %e,
                            "download failed, recording to skip ledger"
                        );
                        record_or_warn(
                            self.ledger.as_ref(),
                            &SkipEntry::DownloadFailed {
                                url: url.to_string(),
                                destination: destination.to_path_buf(),
                            },
                        );
                        return false;
                    }
                },
            }
        }
    }
}
