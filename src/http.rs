//! Shared HTTP client construction policy.
//!
//! Listing fetches and file downloads use separate clients. A listing request
//! has a total deadline; a download only bounds connection setup and each gap
//! between body chunks, so a large PDF may stream for as long as data keeps
//! arriving. User agent and compression are configured here once.

use std::time::Duration;

use reqwest::{Client, ClientBuilder};

use crate::user_agent;

/// Upper bound on TCP/TLS connection setup, independent of the request timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Builds a client whose requests (headers and body) must finish within `timeout`.
///
/// # Errors
///
/// Returns the underlying [`reqwest::Error`] when the TLS backend or
/// system configuration cannot be initialized.
pub fn build_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    base_builder(timeout).timeout(timeout).build()
}

/// Builds a client for streamed bodies: no total deadline, but any single read
/// (including the wait for response headers) that stalls for `idle_timeout` fails.
///
/// # Errors
///
/// Returns the underlying [`reqwest::Error`] when the TLS backend or
/// system configuration cannot be initialized.
pub fn build_streaming_client(idle_timeout: Duration) -> Result<Client, reqwest::Error> {
    base_builder(idle_timeout).read_timeout(idle_timeout).build()
}

fn base_builder(timeout: Duration) -> ClientBuilder {
    Client::builder()
        .connect_timeout(CONNECT_TIMEOUT.min(timeout))
        .gzip(true)
        .user_agent(user_agent::default_user_agent())
}
