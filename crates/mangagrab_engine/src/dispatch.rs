use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use engine_logging::{engine_debug, engine_warn};
use futures_util::FutureExt;
use mangagrab_core::{OrderedProgress, Progress};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::{FailureKind, FetchError};

/// Pages fetched at once when the caller does not choose.
pub const DEFAULT_CONCURRENCY: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    #[error("invalid concurrency value {0}: must be at least 1")]
    InvalidConcurrency(usize),
}

/// Bounded fan-out/fan-in over an ordered list of work items.
///
/// Each item runs as its own task on the tokio runtime; a semaphore with
/// `concurrency` permits gates when the work starts. Results come back
/// index-aligned with the input no matter which task finishes first.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    concurrency: usize,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

impl Dispatcher {
    pub fn new(concurrency: usize) -> Result<Self, DispatchError> {
        if concurrency == 0 {
            return Err(DispatchError::InvalidConcurrency(concurrency));
        }
        Ok(Self { concurrency })
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Runs `work` over every item and returns one result per item, in input order.
    ///
    /// A failing item never cancels its siblings. Every task is joined before this
    /// returns. `on_progress` first receives `(0, total)` and then each advance of
    /// the contiguous completed prefix.
    ///
    /// Dropping the returned future aborts all tasks that are still running.
    pub async fn run<T, R, F, Fut, P>(
        &self,
        items: Vec<T>,
        work: F,
        mut on_progress: P,
    ) -> Vec<Result<R, FetchError>>
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, FetchError>> + Send + 'static,
        P: FnMut(Progress),
    {
        let total = items.len();
        engine_debug!(
            "dispatching {} items with concurrency {}",
            total,
            self.concurrency
        );

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let work = Arc::new(work);
        let mut tasks = JoinSet::new();

        for (index, item) in items.into_iter().enumerate() {
            let semaphore = Arc::clone(&semaphore);
            let work = Arc::clone(&work);
            tasks.spawn(async move {
                let result = match semaphore.acquire_owned().await {
                    Ok(permit) => {
                        let outcome = AssertUnwindSafe(async { work(item).await })
                            .catch_unwind()
                            .await;
                        drop(permit);
                        outcome.unwrap_or_else(|_| {
                            Err(FetchError::new(FailureKind::Aborted, "task panicked"))
                        })
                    }
                    Err(_) => Err(FetchError::new(
                        FailureKind::Aborted,
                        "dispatcher permit pool closed",
                    )),
                };
                (index, result)
            });
        }

        let mut tracker = OrderedProgress::new(total);
        on_progress(tracker.snapshot());

        let mut slots: Vec<Option<Result<R, FetchError>>> = (0..total).map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, result)) => {
                    slots[index] = Some(result);
                    if let Some(progress) = tracker.mark(index) {
                        on_progress(progress);
                    }
                }
                Err(err) => engine_warn!("dispatch task ended without a result: {}", err),
            }
        }

        slots
            .into_iter()
            .map(|slot| {
                slot.unwrap_or_else(|| {
                    Err(FetchError::new(
                        FailureKind::Aborted,
                        "task ended without a result",
                    ))
                })
            })
            .collect()
    }
}
