//! Crawl configuration: defaults, TOML loading, and validation.
//!
//! Every option is optional in the file; missing keys fall back to the
//! defaults below, which target the site the tool was first written for.
//! Command-line overrides are applied by the binary after loading.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::layout::MirrorLayout;
use crate::listing::ListingDialect;

/// Default listing page that answers the directory AJAX calls.
pub const DEFAULT_BASE_PAGE_URL: &str = "https://www.sgbaukrc.ac.in/index.php/question-papers";
/// Default origin prefixed to reconstructed file URLs.
pub const DEFAULT_SITE_ORIGIN: &str = "https://www.sgbaukrc.ac.in";
/// Default starting remote directory.
pub const DEFAULT_ROOT_REMOTE_DIR: &str = "question-papers/2024-Papers";
/// Default local mirror root.
pub const DEFAULT_DOWNLOAD_DIR: &str = "downloads";
/// Default manifest directory.
pub const DEFAULT_LOGS_DIR: &str = "logs";
/// Default skip ledger path.
pub const DEFAULT_SKIP_LEDGER: &str = "skipped.csv";
/// Default download attempts per file (including the first).
pub const DEFAULT_MAX_RETRIES: u32 = 3;
/// Default fixed delay between download attempts.
pub const DEFAULT_RETRY_DELAY_MS: u64 = 2_000;
/// Default total timeout for a directory listing request.
pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 20_000;
/// Default wait for response headers or the next body chunk of a download.
pub const DEFAULT_DOWNLOAD_TIMEOUT_MS: u64 = 30_000;

const MAX_RETRIES_LIMIT: u32 = 10;
const MAX_RETRY_DELAY_MS: u64 = 60_000;
const MAX_TIMEOUT_MS: u64 = 3_600_000;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        /// Path that was read.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML or contains unknown keys.
    #[error("failed to parse config{}: {source}", describe_path(.path.as_deref()))]
    Parse {
        /// Path of the file, when parsing came from disk.
        path: Option<PathBuf>,
        /// Underlying TOML error.
        #[source]
        source: toml::de::Error,
    },

    /// A value is out of range or malformed.
    #[error("invalid config value for `{field}`: {message}")]
    Invalid {
        /// Offending key.
        field: &'static str,
        /// What is wrong with it.
        message: String,
    },
}

fn describe_path(path: Option<&Path>) -> String {
    path.map(|p| format!(" file {}", p.display()))
        .unwrap_or_default()
}

impl ConfigError {
    fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            message: message.into(),
        }
    }
}

/// Complete crawl configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CrawlConfig {
    /// Page that serves directory listings for the AJAX `dir` action.
    pub base_page_url: String,
    /// Scheme and host prefixed to reconstructed file URLs.
    pub site_origin: String,
    /// Remote directory the crawl starts from.
    pub root_remote_dir: String,
    /// Local mirror root.
    pub download_dir: PathBuf,
    /// Directory receiving one manifest per visited remote directory.
    pub logs_dir: PathBuf,
    /// Append-only CSV of failed downloads and directory fetches.
    pub skip_ledger: PathBuf,
    /// Download attempts per file, including the first (0 is treated as 1).
    pub max_retries: u32,
    /// Fixed delay between download attempts.
    pub retry_delay_ms: u64,
    /// Total timeout for one listing request.
    pub fetch_timeout_ms: u64,
    /// Longest wait for response headers or between body chunks of a download;
    /// the body as a whole is unbounded.
    pub download_timeout_ms: u64,
    /// Server-specific markup and query markers.
    pub listing: ListingDialect,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            base_page_url: DEFAULT_BASE_PAGE_URL.to_string(),
            site_origin: DEFAULT_SITE_ORIGIN.to_string(),
            root_remote_dir: DEFAULT_ROOT_REMOTE_DIR.to_string(),
            download_dir: PathBuf::from(DEFAULT_DOWNLOAD_DIR),
            logs_dir: PathBuf::from(DEFAULT_LOGS_DIR),
            skip_ledger: PathBuf::from(DEFAULT_SKIP_LEDGER),
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            fetch_timeout_ms: DEFAULT_FETCH_TIMEOUT_MS,
            download_timeout_ms: DEFAULT_DOWNLOAD_TIMEOUT_MS,
            listing: ListingDialect::default(),
        }
    }
}

impl CrawlConfig {
    /// Parses a TOML document; absent keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML or unknown keys.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|source| ConfigError::Parse { path: None, source })
    }

    /// Reads and parses a TOML config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] or [`ConfigError::Parse`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: Some(path.to_path_buf()),
            source,
        })
    }

    /// Checks ranges and URL shapes.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_http_url("base_page_url", &self.base_page_url)?;
        validate_http_url("site_origin", &self.site_origin)?;

        if self.max_retries > MAX_RETRIES_LIMIT {
            return Err(ConfigError::invalid(
                "max_retries",
                format!("{}; expected range 0..={MAX_RETRIES_LIMIT}", self.max_retries),
            ));
        }
        if self.retry_delay_ms > MAX_RETRY_DELAY_MS {
            return Err(ConfigError::invalid(
                "retry_delay_ms",
                format!("{}; expected range 0..={MAX_RETRY_DELAY_MS}", self.retry_delay_ms),
            ));
        }
        validate_timeout_ms("fetch_timeout_ms", self.fetch_timeout_ms)?;
        validate_timeout_ms("download_timeout_ms", self.download_timeout_ms)?;

        self.listing
            .validate()
            .map_err(|message| ConfigError::invalid("listing.item_selector", message))
    }

    /// Effective number of download attempts (never zero).
    #[must_use]
    pub fn download_attempts(&self) -> u32 {
        self.max_retries.max(1)
    }

    /// Delay between download attempts.
    #[must_use]
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Listing request timeout.
    #[must_use]
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    /// Download attempt timeout.
    #[must_use]
    pub fn download_timeout(&self) -> Duration {
        Duration::from_millis(self.download_timeout_ms)
    }

    /// Mirror layout derived from the root and local directories.
    #[must_use]
    pub fn layout(&self) -> MirrorLayout {
        MirrorLayout::new(
            self.root_remote_dir.clone(),
            self.download_dir.clone(),
            self.logs_dir.clone(),
        )
    }
}

fn validate_http_url(field: &'static str, value: &str) -> Result<(), ConfigError> {
    let parsed = Url::parse(value)
        .map_err(|error| ConfigError::invalid(field, format!("'{value}' is not a URL: {error}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::invalid(
            field,
            format!("'{value}' must use http or https"),
        ));
    }
    Ok(())
}

fn validate_timeout_ms(field: &'static str, value: u64) -> Result<(), ConfigError> {
    if !(1..=MAX_TIMEOUT_MS).contains(&value) {
        return Err(ConfigError::invalid(
            field,
            format!("{value}; expected range 1..={MAX_TIMEOUT_MS}"),
        ));
    }
    Ok(())
}

/// Resolves the default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/listing-mirror/config.toml`
/// 2. `$HOME/.config/listing-mirror/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg_config_home)
                .join("listing-mirror")
                .join("config.toml"),
        );
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("listing-mirror")
            .join("config.toml"),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}
