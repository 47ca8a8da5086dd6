use std::path::{Path, PathBuf};
use std::sync::Arc;

use engine_logging::{engine_error, engine_info};
use mangagrab_core::{
    transition, Chapter, ChapterEntry, ChapterError, ChapterEvent, ChapterState, ErrorCategory,
    Page, TransitionError,
};
use thiserror::Error;

use crate::archive::{ArchiveAssembler, AssembleOutcome, AssemblyError};
use crate::dispatch::{DispatchError, Dispatcher, DEFAULT_CONCURRENCY};
use crate::fetch::Fetcher;
use crate::filename::{archive_filename, entry_name};
use crate::persist::{expand_home, PersistError};
use crate::sink::ProgressSink;
use crate::source::{ChapterSource, SourceError};
use crate::{EngineEvent, FetchError, PageAsset};

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub output_dir: PathBuf,
    pub concurrency: usize,
}

impl PipelineSettings {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChapterOutcome {
    Published { path: PathBuf, pages: usize },
    Skipped { path: PathBuf },
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Chapter(#[from] ChapterError),
    #[error(transparent)]
    Assembly(#[from] AssemblyError),
    #[error(transparent)]
    Persist(#[from] PersistError),
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
    #[error(transparent)]
    Transition(#[from] TransitionError),
}

impl PipelineError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            PipelineError::Source(err) => err.category(),
            PipelineError::Chapter(ChapterError::NoPages(_)) => ErrorCategory::EmptyResult,
            PipelineError::Chapter(ChapterError::DuplicatePage { .. }) => ErrorCategory::NotFound,
            PipelineError::Assembly(err) => err.category(),
            PipelineError::Persist(err) => err.category(),
            PipelineError::Dispatch(_) => ErrorCategory::Config,
            PipelineError::Transition(err) => err.category(),
        }
    }
}

/// Downloads one chapter into one archive: pages -> fetch -> assemble -> publish.
///
/// Runs share no mutable state, so one pipeline may serve several chapters in
/// sequence or concurrently.
pub struct ChapterPipeline {
    source: Arc<dyn ChapterSource>,
    fetcher: Arc<dyn Fetcher>,
    dispatcher: Dispatcher,
    assembler: ArchiveAssembler,
    output_dir: PathBuf,
}

impl ChapterPipeline {
    pub fn new(
        source: Arc<dyn ChapterSource>,
        fetcher: Arc<dyn Fetcher>,
        settings: PipelineSettings,
    ) -> Result<Self, PipelineError> {
        Ok(Self {
            source,
            fetcher,
            dispatcher: Dispatcher::new(settings.concurrency)?,
            assembler: ArchiveAssembler::new(),
            output_dir: expand_home(&settings.output_dir),
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn destination_for(&self, entry: &ChapterEntry) -> PathBuf {
        self.output_dir.join(archive_filename(&entry.name))
    }

    /// Runs one chapter to a terminal state.
    ///
    /// An existing destination is reported as `Skipped` before any network call.
    /// On failure nothing is left at the destination and the first cause is returned.
    pub async fn run(
        &self,
        entry: &ChapterEntry,
        sink: &dyn ProgressSink,
    ) -> Result<ChapterOutcome, PipelineError> {
        let mut run = ChapterRun::new(&entry.name, sink);
        let destination = self.destination_for(entry);

        if destination.exists() {
            run.advance(ChapterEvent::AlreadyPresent)?;
            engine_info!("file {:?} exists, skipped download", destination);
            return Ok(ChapterOutcome::Skipped { path: destination });
        }

        match self.drive(entry, &destination, &mut run).await {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                if !run.state().is_terminal() {
                    run.advance(ChapterEvent::Fail)?;
                }
                engine_error!("chapter {} failed: {}", entry.name, err);
                Err(err)
            }
        }
    }

    async fn drive(
        &self,
        entry: &ChapterEntry,
        destination: &Path,
        run: &mut ChapterRun<'_>,
    ) -> Result<ChapterOutcome, PipelineError> {
        let pages = self.source.resolve_pages(&entry.locator).await?;
        let chapter = Chapter::new(entry.clone(), pages)?;
        let page_count = chapter.len();

        run.advance(ChapterEvent::StartFetch)?;
        let results = self.fetch_pages(chapter, run.sink).await;
        run.advance(ChapterEvent::FetchFinished)?;

        match self.assemble(results, destination).await? {
            AssembleOutcome::Published { path, entries } => {
                run.advance(ChapterEvent::Publish)?;
                engine_info!("published {:?} with {} entries", path, entries);
                Ok(ChapterOutcome::Published {
                    path,
                    pages: page_count,
                })
            }
            // Another writer published the same chapter while pages were in flight.
            AssembleOutcome::Skipped { path } => {
                run.advance(ChapterEvent::AlreadyPresent)?;
                engine_info!("file {:?} appeared while fetching, skipped", path);
                Ok(ChapterOutcome::Skipped { path })
            }
        }
    }

    /// Writes the archive on the blocking pool.
    ///
    /// Once started, assembly runs to completion even if the run is dropped, so the
    /// destination is either published whole or left untouched.
    async fn assemble(
        &self,
        results: Vec<Result<PageAsset, FetchError>>,
        destination: &Path,
    ) -> Result<AssembleOutcome, AssemblyError> {
        let assembler = self.assembler.clone();
        let destination = destination.to_path_buf();
        tokio::task::spawn_blocking(move || assembler.assemble(results, &destination))
            .await
            .map_err(|err| AssemblyError::Aborted(err.to_string()))?
    }

    async fn fetch_pages(
        &self,
        chapter: Chapter,
        sink: &dyn ProgressSink,
    ) -> Vec<Result<PageAsset, FetchError>> {
        let name = chapter.name().to_string();
        let source = Arc::clone(&self.source);
        let fetcher = Arc::clone(&self.fetcher);

        let work = move |page: Page| {
            let source = Arc::clone(&source);
            let fetcher = Arc::clone(&fetcher);
            async move { fetch_page(source.as_ref(), fetcher.as_ref(), page).await }
        };

        self.dispatcher
            .run(chapter.into_pages(), work, |progress| {
                sink.emit(EngineEvent::Progress {
                    chapter: name.clone(),
                    progress,
                })
            })
            .await
    }
}

async fn fetch_page(
    source: &dyn ChapterSource,
    fetcher: &dyn Fetcher,
    page: Page,
) -> Result<PageAsset, FetchError> {
    let image_url = source
        .resolve_image_locator(&page.locator)
        .await
        .map_err(SourceError::into_fetch_error)?;
    let output = fetcher.fetch(&image_url).await?;
    Ok(PageAsset {
        entry_name: entry_name(&page.name, &image_url),
        bytes: output.bytes,
    })
}

/// State of one run plus the sink its transitions are reported to.
struct ChapterRun<'a> {
    chapter: &'a str,
    state: ChapterState,
    sink: &'a dyn ProgressSink,
}

impl<'a> ChapterRun<'a> {
    fn new(chapter: &'a str, sink: &'a dyn ProgressSink) -> Self {
        let run = Self {
            chapter,
            state: ChapterState::Pending,
            sink,
        };
        run.report();
        run
    }

    fn state(&self) -> ChapterState {
        self.state
    }

    fn advance(&mut self, event: ChapterEvent) -> Result<ChapterState, TransitionError> {
        self.state = transition(self.state, event)?;
        engine_info!("chapter {} is {}", self.chapter, self.state);
        self.report();
        Ok(self.state)
    }

    fn report(&self) {
        self.sink.emit(EngineEvent::StateChanged {
            chapter: self.chapter.to_string(),
            state: self.state,
        });
    }
}
