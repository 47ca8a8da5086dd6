use std::collections::HashSet;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use engine_logging::{engine_debug, engine_info};
use mangagrab_core::ErrorCategory;
use thiserror::Error;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::persist::{
    missing_dirs, parent_dir, publish, remove_created_dirs, temp_file_for, PersistError,
};
use crate::{FetchError, PageAsset};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssembleOutcome {
    Published { path: PathBuf, entries: usize },
    /// Destination already existed; nothing was written.
    Skipped { path: PathBuf },
}

#[derive(Debug, Error)]
pub enum AssemblyError {
    #[error("page {index} failed: {source}")]
    PageFailed {
        index: usize,
        #[source]
        source: FetchError,
    },
    #[error("archive entry {0} appears more than once")]
    DuplicateEntry(String),
    #[error("archive write failed: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Persist(#[from] PersistError),
    #[error("archive assembly did not finish: {0}")]
    Aborted(String),
}

impl AssemblyError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            AssemblyError::PageFailed { source, .. } => source.category(),
            AssemblyError::DuplicateEntry(_) => ErrorCategory::Config,
            AssemblyError::Zip(_)
            | AssemblyError::Io(_)
            | AssemblyError::Persist(_)
            | AssemblyError::Aborted(_) => ErrorCategory::Filesystem,
        }
    }
}

/// Sequential, all-or-nothing archive writer.
///
/// Entries go into a temporary file beside the destination, in the order of the
/// results. The first failed result or write error drops the temporary file,
/// which deletes it, and removes any directory the call created; only a complete
/// archive is renamed onto the destination.
#[derive(Debug, Clone)]
pub struct ArchiveAssembler {
    compression: CompressionMethod,
}

impl Default for ArchiveAssembler {
    fn default() -> Self {
        Self {
            compression: CompressionMethod::Deflated,
        }
    }
}

impl ArchiveAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_compression(compression: CompressionMethod) -> Self {
        Self { compression }
    }

    pub fn assemble<I>(&self, results: I, destination: &Path) -> Result<AssembleOutcome, AssemblyError>
    where
        I: IntoIterator<Item = Result<PageAsset, FetchError>>,
    {
        if destination.exists() {
            engine_info!("{:?} already exists, skipping", destination);
            return Ok(AssembleOutcome::Skipped {
                path: destination.to_path_buf(),
            });
        }

        let created = missing_dirs(&parent_dir(destination));
        let result = self.write_and_publish(results, destination);
        if result.is_err() {
            remove_created_dirs(&created);
        }
        result
    }

    fn write_and_publish<I>(
        &self,
        results: I,
        destination: &Path,
    ) -> Result<AssembleOutcome, AssemblyError>
    where
        I: IntoIterator<Item = Result<PageAsset, FetchError>>,
    {
        let tmp = temp_file_for(destination)?;
        let mut writer = ZipWriter::new(tmp);
        let options = FileOptions::default().compression_method(self.compression);
        let mut names = HashSet::new();

        for (index, result) in results.into_iter().enumerate() {
            let asset = result.map_err(|source| AssemblyError::PageFailed { index, source })?;
            if !names.insert(asset.entry_name.clone()) {
                return Err(AssemblyError::DuplicateEntry(asset.entry_name));
            }
            writer.start_file(asset.entry_name.as_str(), options)?;
            writer.write_all(&asset.bytes)?;
        }

        let tmp = writer.finish()?;
        let path = publish(tmp, destination)?;
        engine_debug!("renamed temporary archive onto {:?}", path);
        Ok(AssembleOutcome::Published {
            path,
            entries: names.len(),
        })
    }
}
