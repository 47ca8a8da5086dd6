//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;
use engine_logging::LogDestination;
use log::LevelFilter;
use mangagrab_core::ChapterSelection;
use mangagrab_engine::DEFAULT_CONCURRENCY;

/// Download manga chapters into one cbz archive per chapter.
#[derive(Parser, Debug)]
#[command(name = "mangagrab")]
#[command(author, version, about)]
pub struct Args {
    /// Manga title to download
    #[arg(required_unless_present = "file")]
    pub title: Option<String>,

    /// Manga site to download from
    #[arg(short, long, default_value = "mangahere")]
    pub site: String,

    /// Download all chapters available
    #[arg(short, long, conflicts_with = "chapter")]
    pub all: bool,

    /// Chapter number, or an interval such as `10-15` or `10-`
    #[arg(short, long)]
    pub chapter: Option<ChapterSelection>,

    /// Download directory
    #[arg(short, long, default_value = ".")]
    pub dir: PathBuf,

    /// RON batch file; downloads the latest chapter of every entry
    #[arg(short, long, conflicts_with_all = ["title", "all", "chapter"])]
    pub file: Option<PathBuf>,

    /// Pages downloaded at the same time (1-64)
    #[arg(short = 'j', long, default_value_t = DEFAULT_CONCURRENCY as u8, value_parser = clap::value_parser!(u8).range(1..=64))]
    pub concurrency: u8,

    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    pub fn selection(&self) -> ChapterSelection {
        if self.all {
            return ChapterSelection::All;
        }
        self.chapter.clone().unwrap_or_default()
    }

    /// Log file only by default; `-v` adds the terminal.
    pub fn logging(&self) -> (LogDestination, LevelFilter) {
        if self.quiet {
            return (LogDestination::File, LevelFilter::Warn);
        }
        match self.verbose {
            0 => (LogDestination::File, LevelFilter::Info),
            1 => (LogDestination::Both, LevelFilter::Debug),
            _ => (LogDestination::Both, LevelFilter::Trace),
        }
    }
}
