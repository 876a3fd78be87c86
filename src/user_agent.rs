//! Shared User-Agent string for listing and download HTTP clients.

/// Project URL for User-Agent identification (good citizenship; RFC 9308).
const PROJECT_UA_URL: &str = "https://github.com/fierce/listing-mirror";

/// Default User-Agent for every request the crawler makes.
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("listing-mirror/{version} (archive-mirror; +{PROJECT_UA_URL})")
}
