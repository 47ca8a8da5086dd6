use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use engine_logging::engine_debug;
use mangagrab_core::ErrorCategory;
use tempfile::{Builder, NamedTempFile};
use thiserror::Error;

/// Suffix of in-progress archives; never used by a published file.
pub const TEMP_SUFFIX: &str = ".tmp";

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("output directory missing or not writable: {0}")]
    OutputDir(String),
    #[error("failed to publish {path:?}: {source}")]
    Publish {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

impl PersistError {
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::Filesystem
    }
}

/// Expands a leading `~` to the home directory; other paths are returned as given.
pub fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match std::env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(rest),
        None => path.to_path_buf(),
    }
}

/// Ensure output directory exists; create if missing.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(PersistError::OutputDir(format!(
                "{} is not a directory",
                dir.display()
            )));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
    }
    Ok(())
}

/// Opens a hidden temporary file next to `target`.
///
/// The file is removed when the handle is dropped unless it is published first.
pub fn temp_file_for(target: &Path) -> Result<NamedTempFile, PersistError> {
    let dir = parent_dir(target);
    ensure_output_dir(&dir)?;
    let stem = target
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file = Builder::new()
        .prefix(&format!(".{stem}."))
        .suffix(TEMP_SUFFIX)
        .tempfile_in(&dir)?;
    engine_debug!("opened temporary file {:?}", file.path());
    Ok(file)
}

/// Flushes `tmp` to disk and renames it onto `target`.
pub fn publish(mut tmp: NamedTempFile, target: &Path) -> Result<PathBuf, PersistError> {
    tmp.flush()?;
    tmp.as_file_mut().sync_all()?;
    tmp.persist(target).map_err(|e| PersistError::Publish {
        path: target.to_path_buf(),
        source: e.error,
    })?;
    Ok(target.to_path_buf())
}

/// Directories between `dir` and its closest existing ancestor, deepest first.
pub(crate) fn missing_dirs(dir: &Path) -> Vec<PathBuf> {
    dir.ancestors()
        .take_while(|ancestor| !ancestor.as_os_str().is_empty() && !ancestor.exists())
        .map(Path::to_path_buf)
        .collect()
}

/// Removes directories listed by `missing_dirs` that are still empty.
pub(crate) fn remove_created_dirs(created: &[PathBuf]) {
    for dir in created {
        match fs::remove_dir(dir) {
            Ok(()) => engine_debug!("removed directory {:?} created by a failed run", dir),
            Err(err) => {
                engine_debug!("left directory {:?} in place: {}", dir, err);
                return;
            }
        }
    }
}

pub(crate) fn parent_dir(target: &Path) -> PathBuf {
    match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
