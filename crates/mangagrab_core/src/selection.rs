use std::str::FromStr;

use crate::{ChapterEntry, ErrorCategory};

/// Which chapters of an ascending chapter list to download.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ChapterSelection {
    /// The last chapter of the list.
    #[default]
    Latest,
    Single(String),
    /// From `begin` through `end` inclusive; an open end runs to the last chapter.
    Range { begin: String, end: Option<String> },
    All,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("chapter {0} doesn't exist")]
    NotFound(String),
    #[error("invalid chapter interval {begin}-{end}, the end should be bigger than start")]
    InvalidRange { begin: String, end: String },
    #[error("empty chapter argument")]
    Empty,
    #[error("no chapter available")]
    NoChapters,
}

impl SelectionError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SelectionError::NotFound(_) => ErrorCategory::NotFound,
            SelectionError::InvalidRange { .. } | SelectionError::Empty => ErrorCategory::Config,
            SelectionError::NoChapters => ErrorCategory::EmptyResult,
        }
    }
}

impl FromStr for ChapterSelection {
    type Err = SelectionError;

    /// Parses `"12"`, `"10-15"` or `"10-"`.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(SelectionError::Empty);
        }

        let Some((begin, end)) = raw.split_once('-') else {
            return Ok(ChapterSelection::Single(raw.to_string()));
        };
        let begin = begin.trim();
        let end = end.trim();
        if begin.is_empty() {
            return Err(SelectionError::Empty);
        }
        if end.is_empty() {
            return Ok(ChapterSelection::Range {
                begin: begin.to_string(),
                end: None,
            });
        }

        if let (Ok(b), Ok(e)) = (begin.parse::<f64>(), end.parse::<f64>()) {
            if b > e {
                return Err(SelectionError::InvalidRange {
                    begin: begin.to_string(),
                    end: end.to_string(),
                });
            }
        }
        Ok(ChapterSelection::Range {
            begin: begin.to_string(),
            end: Some(end.to_string()),
        })
    }
}

impl ChapterSelection {
    /// Applies the selection to an ascending chapter list, preserving list order.
    pub fn select<'a>(
        &self,
        chapters: &'a [ChapterEntry],
    ) -> Result<Vec<&'a ChapterEntry>, SelectionError> {
        if chapters.is_empty() {
            return Err(SelectionError::NoChapters);
        }

        match self {
            ChapterSelection::Latest => Ok(chapters.last().into_iter().collect()),
            ChapterSelection::All => Ok(chapters.iter().collect()),
            ChapterSelection::Single(number) => chapters
                .iter()
                .find(|chapter| &chapter.number == number)
                .map(|chapter| vec![chapter])
                .ok_or_else(|| SelectionError::NotFound(number.clone())),
            ChapterSelection::Range { begin, end } => {
                let start = position_of(chapters, begin)?;
                let stop = match end {
                    Some(end) => position_of(chapters, end)?,
                    None => chapters.len() - 1,
                };
                if stop < start {
                    return Ok(Vec::new());
                }
                Ok(chapters[start..=stop].iter().collect())
            }
        }
    }
}

fn position_of(chapters: &[ChapterEntry], number: &str) -> Result<usize, SelectionError> {
    chapters
        .iter()
        .position(|chapter| chapter.number == number)
        .ok_or_else(|| SelectionError::NotFound(number.to_string()))
}
