use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use engine_logging::{engine_error, engine_info};
use mangagrab_core::ChapterSelection;
use mangagrab_engine::{
    archive_filename, ChapterOutcome, ChapterPipeline, ChapterSource, FetchSettings, Fetcher,
    NullProgressSink, PipelineSettings, ReqwestFetcher, SelectorSource, SiteProfile,
};

use crate::config::BatchEntry;
use crate::progress::TerminalProgress;

/// One title to download from one site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub title: String,
    pub site: String,
    pub dir: PathBuf,
    pub selection: ChapterSelection,
}

impl From<BatchEntry> for Job {
    fn from(entry: BatchEntry) -> Self {
        let selection = if entry.latest_only {
            ChapterSelection::Latest
        } else {
            ChapterSelection::All
        };
        Self {
            title: entry.title,
            site: entry.site,
            dir: entry.dir,
            selection,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    pub concurrency: usize,
    pub quiet: bool,
}

/// Runs every job in order with one shared HTTP client.
///
/// A failed job does not stop the ones after it; the first failure is returned
/// once all jobs have run.
pub async fn run_jobs(jobs: Vec<Job>, options: RunOptions) -> Result<()> {
    let fetcher: Arc<dyn Fetcher> = Arc::new(ReqwestFetcher::new(FetchSettings::default())?);
    let mut first_failure = None;

    for job in &jobs {
        if let Err(err) = run_job(job, Arc::clone(&fetcher), options).await {
            engine_error!("Download of {:?} from {} failed: {}", job.title, job.site, err);
            if jobs.len() > 1 {
                eprintln!("{}: {}", job.title, err);
            }
            first_failure.get_or_insert(err);
        }
    }

    match first_failure {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Downloads the selected chapters of one title, oldest first, stopping at the
/// first chapter that fails.
async fn run_job(job: &Job, fetcher: Arc<dyn Fetcher>, options: RunOptions) -> Result<()> {
    let profile = SiteProfile::builtin(&job.site)?;
    let source: Arc<dyn ChapterSource> =
        Arc::new(SelectorSource::new(profile, Arc::clone(&fetcher))?);

    let chapters = source.resolve_chapters(&job.title).await?;
    let selected = job.selection.select(&chapters)?;
    engine_info!(
        "{} of {} chapters of {:?} selected",
        selected.len(),
        chapters.len(),
        job.title
    );

    let settings = PipelineSettings {
        output_dir: job.dir.clone(),
        concurrency: options.concurrency,
    };
    let pipeline = ChapterPipeline::new(source, fetcher, settings)?;

    for entry in selected {
        let outcome = if options.quiet {
            pipeline.run(entry, &NullProgressSink).await?
        } else {
            let archive = archive_filename(&entry.name);
            let sink = TerminalProgress::stdout(&job.title, &entry.number, &archive);
            pipeline.run(entry, &sink).await?
        };
        if let ChapterOutcome::Published { path, pages } = outcome {
            engine_info!("Saved {} pages to {:?}", pages, path);
        }
    }
    Ok(())
}
