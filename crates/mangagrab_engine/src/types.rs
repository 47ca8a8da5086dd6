use std::fmt;

use mangagrab_core::{ChapterState, ErrorCategory, Progress};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutput {
    pub bytes: Vec<u8>,
    pub metadata: FetchMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchMetadata {
    pub original_url: String,
    pub final_url: String,
    pub content_type: Option<String>,
    pub byte_len: u64,
    /// 1-based attempt that produced the body.
    pub attempts: u32,
}

/// A fetched page ready to be written as one archive entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageAsset {
    pub entry_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        self.kind.category()
    }

    pub fn is_retryable(&self) -> bool {
        self.category().is_retryable()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    RedirectLimitExceeded,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    /// Body length differs from the declared `Content-Length`.
    Integrity { declared: u64, received: u64 },
    /// The page did not lead to an image address.
    Resolve,
    /// The task never produced a result (panic or abort).
    Aborted,
    Network,
}

impl FailureKind {
    pub fn category(&self) -> ErrorCategory {
        match self {
            FailureKind::HttpStatus(code) if (500..600).contains(code) => ErrorCategory::Network,
            FailureKind::Timeout
            | FailureKind::Integrity { .. }
            | FailureKind::Aborted
            | FailureKind::Network => ErrorCategory::Network,
            FailureKind::InvalidUrl
            | FailureKind::HttpStatus(_)
            | FailureKind::RedirectLimitExceeded
            | FailureKind::TooLarge { .. }
            | FailureKind::Resolve => ErrorCategory::NotFound,
        }
    }
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
            FailureKind::Integrity { declared, received } => {
                write!(f, "integrity mismatch (declared {declared}, received {received})")
            }
            FailureKind::Resolve => write!(f, "image address not found"),
            FailureKind::Aborted => write!(f, "aborted"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    StateChanged {
        chapter: String,
        state: ChapterState,
    },
    Progress {
        chapter: String,
        progress: Progress,
    },
}
