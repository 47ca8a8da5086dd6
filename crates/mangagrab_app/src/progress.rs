use std::io::{self, Write};
use std::sync::Mutex;

use engine_logging::engine_warn;
use mangagrab_core::{render_progress_bar, ChapterState};
use mangagrab_engine::{EngineEvent, ProgressSink};

/// Human-readable progress for one chapter, redrawn in place with `\r`.
pub struct TerminalProgress<W: Write + Send> {
    title: String,
    number: String,
    archive: String,
    out: Mutex<W>,
}

impl TerminalProgress<io::Stdout> {
    pub fn stdout(title: &str, number: &str, archive: &str) -> Self {
        Self::new(title, number, archive, io::stdout())
    }
}

impl<W: Write + Send> TerminalProgress<W> {
    pub fn new(title: &str, number: &str, archive: &str, out: W) -> Self {
        Self {
            title: title.to_string(),
            number: number.to_string(),
            archive: archive.to_string(),
            out: Mutex::new(out),
        }
    }

    fn line_for(&self, event: &EngineEvent) -> Option<String> {
        match event {
            EngineEvent::StateChanged {
                state: ChapterState::Fetching,
                ..
            } => Some(format!("downloading {} {}:\n", self.title, self.number)),
            EngineEvent::StateChanged {
                state: ChapterState::Skipped,
                ..
            } => Some(format!("file {} exist, skipped download\n", self.archive)),
            EngineEvent::StateChanged { .. } => None,
            EngineEvent::Progress { progress, .. } => {
                let end = if progress.is_complete() { "\n" } else { "" };
                Some(format!("\r{}{end}", render_progress_bar(*progress)))
            }
        }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        match self.out.into_inner() {
            Ok(out) => out,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl<W: Write + Send> ProgressSink for TerminalProgress<W> {
    fn emit(&self, event: EngineEvent) {
        let Some(line) = self.line_for(&event) else {
            return;
        };
        let mut out = match self.out.lock() {
            Ok(out) => out,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Err(err) = out.write_all(line.as_bytes()).and_then(|()| out.flush()) {
            engine_warn!("Failed to write progress: {}", err);
        }
    }
}
