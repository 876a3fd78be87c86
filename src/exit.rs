//! Exit code logic for the crawl process.
//!
//! Single responsibility: map completion/failure counts to the process exit outcome.

use std::process::ExitCode;

/// Outcome of a crawl as seen by the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProcessExit {
    /// Nothing was recorded to the skip ledger.
    Success,
    /// Some failures alongside at least one success.
    Partial,
    /// Failures and no success at all.
    Failure,
}

impl ProcessExit {
    pub(crate) fn code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Partial => 1,
            Self::Failure => 2,
        }
    }
}

impl From<ProcessExit> for ExitCode {
    fn from(outcome: ProcessExit) -> Self {
        ExitCode::from(outcome.code())
    }
}

/// Determines the process exit outcome from completed and failed counts.
pub(crate) fn determine_exit_outcome(completed: usize, failed: usize) -> ProcessExit {
    if failed == 0 {
        ProcessExit::Success
    } else if completed > 0 {
        ProcessExit::Partial
    } else {
        ProcessExit::Failure
    }
}
