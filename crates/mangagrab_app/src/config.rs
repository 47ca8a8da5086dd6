//! RON batch file: one entry per title to keep up to date.
//!
//! ```ron
//! [
//!     (title: "One Piece", site: "mangahere", dir: "~/manga/one_piece"),
//!     (title: "Berserk", site: "mangafox", dir: "~/manga/berserk", latest_only: false),
//! ]
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use engine_logging::engine_info;
use mangagrab_core::ErrorCategory;
use mangagrab_engine::SiteProfile;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BatchEntry {
    pub title: String,
    #[serde(default = "default_site")]
    pub site: String,
    #[serde(default = "default_dir")]
    pub dir: PathBuf,
    /// Only the newest chapter; `false` downloads every chapter not yet on disk.
    #[serde(default = "default_latest_only")]
    pub latest_only: bool,
}

fn default_site() -> String {
    "mangahere".to_string()
}

fn default_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_latest_only() -> bool {
    true
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file {path:?} does not exist")]
    Missing { path: PathBuf },
    #[error("failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("config error in {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("config error in entry {index}: {message}")]
    Invalid { index: usize, message: String },
}

impl ConfigError {
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::Config
    }
}

pub fn load_batch(path: &Path) -> Result<Vec<BatchEntry>, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(ConfigError::Missing {
                path: path.to_path_buf(),
            });
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let entries = parse_batch(&content, path)?;
    engine_info!("Loaded {} batch entries from {:?}", entries.len(), path);
    Ok(entries)
}

fn parse_batch(content: &str, path: &Path) -> Result<Vec<BatchEntry>, ConfigError> {
    let entries: Vec<BatchEntry> = ron::from_str(content).map_err(|err| ConfigError::Parse {
        path: path.to_path_buf(),
        message: err.to_string(),
    })?;

    for (index, entry) in entries.iter().enumerate() {
        if entry.title.trim().is_empty() {
            return Err(ConfigError::Invalid {
                index,
                message: "title is empty".to_string(),
            });
        }
        if !SiteProfile::builtin_names().contains(&entry.site.as_str()) {
            return Err(ConfigError::Invalid {
                index,
                message: format!("unknown site {}", entry.site),
            });
        }
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn entries_take_defaults() {
        let entries = parse_batch(
            r#"[
                (title: "One Piece"),
                (title: "Berserk", site: "mangafox", dir: "~/manga/berserk", latest_only: false),
            ]"#,
            Path::new("batch.ron"),
        )
        .unwrap();

        assert_eq!(
            entries,
            vec![
                BatchEntry {
                    title: "One Piece".to_string(),
                    site: "mangahere".to_string(),
                    dir: PathBuf::from("."),
                    latest_only: true,
                },
                BatchEntry {
                    title: "Berserk".to_string(),
                    site: "mangafox".to_string(),
                    dir: PathBuf::from("~/manga/berserk"),
                    latest_only: false,
                },
            ]
        );
    }

    #[test]
    fn empty_list_is_valid() {
        assert!(parse_batch("[]", Path::new("batch.ron")).unwrap().is_empty());
    }

    #[test]
    fn missing_title_is_a_parse_error() {
        let err = parse_batch(r#"[(site: "mangahere")]"#, Path::new("batch.ron")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }), "{err:?}");
        assert_eq!(err.category(), ErrorCategory::Config);
    }

    #[test]
    fn unknown_site_is_rejected() {
        let err = parse_batch(
            r#"[(title: "a"), (title: "b", site: "nowhere")]"#,
            Path::new("batch.ron"),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { index: 1, .. }), "{err:?}");
        assert!(err.to_string().contains("unknown site nowhere"));
    }

    #[test]
    fn blank_title_is_rejected() {
        let err = parse_batch(r#"[(title: "   ")]"#, Path::new("batch.ron")).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { index: 0, .. }));
    }

    #[test]
    fn load_reports_the_file_path() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("batch.ron");

        let err = load_batch(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Missing { .. }));

        fs::write(&path, "not ron at all (").unwrap();
        match load_batch(&path).unwrap_err() {
            ConfigError::Parse { path: reported, .. } => assert_eq!(reported, path),
            other => panic!("unexpected error {other:?}"),
        }

        fs::write(&path, r#"[(title: "Naruto", dir: "out")]"#).unwrap();
        let entries = load_batch(&path).unwrap();
        assert_eq!(entries[0].dir, PathBuf::from("out"));
    }
}
