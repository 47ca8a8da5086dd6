use std::fmt;

use crate::ErrorCategory;

/// Lifecycle of one chapter run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChapterState {
    #[default]
    Pending,
    Fetching,
    Assembling,
    Published,
    /// The final archive already existed; nothing was fetched or written.
    Skipped,
    Failed,
}

impl ChapterState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ChapterState::Published | ChapterState::Skipped | ChapterState::Failed
        )
    }
}

impl fmt::Display for ChapterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ChapterState::Pending => "pending",
            ChapterState::Fetching => "fetching",
            ChapterState::Assembling => "assembling",
            ChapterState::Published => "published",
            ChapterState::Skipped => "skipped",
            ChapterState::Failed => "failed",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChapterEvent {
    /// Destination archive is already on disk.
    AlreadyPresent,
    /// Page list resolved; fetching begins.
    StartFetch,
    /// Every page task has been joined.
    FetchFinished,
    /// Temporary archive renamed onto the destination.
    Publish,
    Fail,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid chapter transition: {event:?} while {from}")]
pub struct TransitionError {
    pub from: ChapterState,
    pub event: ChapterEvent,
}

impl TransitionError {
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::Config
    }
}

/// Pure transition function: applies an event to a state.
///
/// `Fail` is accepted from every non-terminal state; terminal states accept nothing.
pub fn transition(from: ChapterState, event: ChapterEvent) -> Result<ChapterState, TransitionError> {
    use ChapterEvent as E;
    use ChapterState as S;

    let next = match (from, event) {
        (S::Pending | S::Assembling, E::AlreadyPresent) => S::Skipped,
        (S::Pending, E::StartFetch) => S::Fetching,
        (S::Fetching, E::FetchFinished) => S::Assembling,
        (S::Assembling, E::Publish) => S::Published,
        (S::Pending | S::Fetching | S::Assembling, E::Fail) => S::Failed,
        _ => return Err(TransitionError { from, event }),
    };
    Ok(next)
}
