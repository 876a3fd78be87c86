//! Fixed-delay retry policy for file downloads.
//!
//! The target sites are uncontrolled and inconsistent, so every failure
//! (network, timeout, HTTP status, local write) is retried identically until
//! the attempt cap is reached, with the same pause between attempts.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use listing_mirror::download::{RetryDecision, RetryPolicy};
//!
//! let policy = RetryPolicy::new(3, Duration::from_secs(2));
//! assert!(matches!(policy.should_retry(1), RetryDecision::Retry { attempt: 2, .. }));
//! assert!(matches!(policy.should_retry(3), RetryDecision::DoNotRetry { .. }));
//! ```

use std::time::Duration;

use tracing::debug;

use crate::config::{DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY_MS};

/// Decision on whether to retry a failed download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry the download after the specified delay.
    Retry {
        /// How long to wait before retrying.
        delay: Duration,
        /// Which attempt number this will be (1-indexed, so first retry is attempt 2).
        attempt: u32,
    },

    /// Do not retry the download.
    DoNotRetry {
        /// Human-readable reason why retry is not attempted.
        reason: String,
    },
}

/// Attempt cap plus a constant inter-attempt delay.
///
/// # Default Values
///
/// - `max_attempts`: 3
/// - `delay`: 2 seconds
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the initial attempt).
    max_attempts: u32,

    /// Pause between consecutive attempts.
    delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_MAX_RETRIES,
            Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
        )
    }
}

impl RetryPolicy {
    /// Creates a policy; `max_attempts` below 1 is raised to 1.
    #[must_use]
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// Returns the maximum number of attempts configured.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Returns the pause between attempts.
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Determines whether to try again after `attempt` (1-indexed) failed.
    #[must_use]
    pub fn should_retry(&self, attempt: u32) -> RetryDecision {
        if attempt >= self.max_attempts {
            debug!(attempt, max = self.max_attempts, "max attempts reached");
            return RetryDecision::DoNotRetry {
                reason: format!("max attempts ({}) exhausted", self.max_attempts),
            };
        }

        RetryDecision::Retry {
            delay: self.delay,
            attempt: attempt + 1,
        }
    }
}
