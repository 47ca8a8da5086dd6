//! Command line entry point for mangagrab.

use std::process::ExitCode;

use clap::Parser;
use engine_logging::{engine_debug, engine_info, engine_warn};

mod cli;
mod config;
mod download;
mod progress;

use cli::Args;
use config::{load_batch, ConfigError};
use download::{run_jobs, Job, RunOptions};

/// Exit status after Ctrl-C, as shells report SIGINT.
const INTERRUPTED_EXIT_CODE: u8 = 130;

#[tokio::main]
async fn main() -> ExitCode {
    // Parse CLI arguments first so --help works without a log file.
    let args = Args::parse();
    let (destination, level) = args.logging();
    engine_logging::initialize(destination, level);
    engine_debug!("CLI arguments parsed: {:?}", args);

    let jobs = match jobs_from_args(&args) {
        Ok(jobs) => jobs,
        Err(err) => {
            eprintln!("mangagrab: {}: {err}", err.category());
            return ExitCode::FAILURE;
        }
    };
    let options = RunOptions {
        concurrency: usize::from(args.concurrency),
        quiet: args.quiet,
    };

    // Dropping the download future on Ctrl-C aborts in-flight page tasks. An
    // archive already being written is published or discarded whole before exit.
    tokio::select! {
        result = run_jobs(jobs, options) => match result {
            Ok(()) => {
                engine_info!("All downloads finished");
                ExitCode::SUCCESS
            }
            Err(err) => {
                eprintln!("mangagrab: error: {err}");
                ExitCode::FAILURE
            }
        },
        _ = tokio::signal::ctrl_c() => {
            engine_warn!("Interrupted, partial chapter discarded");
            eprintln!("\nmangagrab: interrupted");
            ExitCode::from(INTERRUPTED_EXIT_CODE)
        }
    }
}

fn jobs_from_args(args: &Args) -> Result<Vec<Job>, ConfigError> {
    if let Some(path) = &args.file {
        let jobs: Vec<Job> = load_batch(path)?.into_iter().map(Job::from).collect();
        return Ok(jobs);
    }
    Ok(vec![Job {
        title: args.title.clone().unwrap_or_default(),
        site: args.site.clone(),
        dir: args.dir.clone(),
        selection: args.selection(),
    }])
}
