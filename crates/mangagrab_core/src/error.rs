use std::fmt;

/// Coarse classification shared by every error type in the workspace.
///
/// Only `Network` failures are retried, and only by the fetcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Transport failure, 5xx status or a body that did not match its declared length.
    Network,
    /// 4xx status or a resource that does not contain what was expected.
    NotFound,
    /// Directory creation, temporary file write or rename failure.
    Filesystem,
    /// A resolved chapter or page list was empty.
    EmptyResult,
    /// Malformed batch configuration or site definition.
    Config,
}

impl ErrorCategory {
    pub fn is_retryable(self) -> bool {
        matches!(self, ErrorCategory::Network)
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Network => write!(f, "network error"),
            ErrorCategory::NotFound => write!(f, "not found"),
            ErrorCategory::Filesystem => write!(f, "filesystem error"),
            ErrorCategory::EmptyResult => write!(f, "empty result"),
            ErrorCategory::Config => write!(f, "configuration error"),
        }
    }
}
