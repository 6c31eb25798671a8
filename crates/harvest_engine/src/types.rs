use std::fmt;
use std::path::PathBuf;

use harvest_core::{BatchError, PlanError, Window};
use thiserror::Error;

use crate::PersistError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    RedirectLimitExceeded,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::RedirectLimitExceeded => write!(f, "redirect limit exceeded"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::Network => write!(f, "network error"),
        }
    }
}

/// Why a single request attempt did not yield an acceptable page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptFailure {
    Incomplete { observed: usize, expected: usize },
    Transport(FetchError),
    Undecodable(String),
}

impl fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptFailure::Incomplete { observed, expected } => {
                write!(f, "incomplete {observed}/{expected}")
            }
            AttemptFailure::Transport(err) => write!(f, "transport failure: {err}"),
            AttemptFailure::Undecodable(message) => write!(f, "undecodable page: {message}"),
        }
    }
}

#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("invalid plan: {0}")]
    InvalidPlan(#[from] PlanError),
    #[error("window {window} still short after {attempts} attempts (last held {last_observed})")]
    ExhaustedRetries {
        window: Window,
        attempts: u32,
        last_observed: usize,
    },
    #[error("fetch of window {window} failed after {attempts} attempts: {source}")]
    FetchFailed {
        window: Window,
        attempts: u32,
        source: FetchError,
    },
    #[error("failed to write batch {batch_index}: {source}")]
    WriteFailure {
        batch_index: usize,
        source: PersistError,
    },
    #[error("page rejected by batch: {0}")]
    Rejected(#[from] BatchError),
    #[error("response for query {query:?} declared no total result count")]
    MissingTotal { query: String },
    #[error("harvest cancelled")]
    Cancelled,
}

/// Run-level failure: the cause plus the last batch known to be on disk.
#[derive(Debug, Error)]
#[error("harvest aborted (last flushed batch {last_flushed:?}): {cause}")]
pub struct RunError {
    #[source]
    pub cause: HarvestError,
    pub last_flushed: Option<usize>,
}

impl RunError {
    /// First batch a follow-up run should start at.
    pub fn resume_batch(&self) -> usize {
        self.last_flushed.map_or(0, |index| index + 1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunSummary {
    pub batches_flushed: usize,
    pub pages_fetched: usize,
    pub last_flushed: Option<usize>,
    pub artifacts: Vec<PathBuf>,
}

/// Progress notifications emitted while a run is underway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HarvestEvent {
    PlanReady {
        num_batches: usize,
        windows_per_batch: usize,
        start_batch: usize,
        dropped_records: u64,
    },
    AttemptFailed {
        window: Window,
        attempt: u32,
        failure: AttemptFailure,
    },
    PageAccepted {
        batch_index: usize,
        page_index: usize,
        window: Window,
    },
    BatchFlushed {
        batch_index: usize,
        records: usize,
        path: PathBuf,
    },
}
