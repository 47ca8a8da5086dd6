use std::collections::HashSet;

/// One chapter as listed by a source: `{number, name, locator}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterEntry {
    pub number: String,
    pub name: String,
    pub locator: String,
}

impl ChapterEntry {
    pub fn new(
        number: impl Into<String>,
        name: impl Into<String>,
        locator: impl Into<String>,
    ) -> Self {
        Self {
            number: number.into(),
            name: name.into(),
            locator: locator.into(),
        }
    }
}

/// One page of a chapter; resolves to exactly one binary asset.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Page {
    pub name: String,
    pub locator: String,
}

impl Page {
    pub fn new(name: impl Into<String>, locator: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            locator: locator.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChapterError {
    #[error("chapter {0} has no pages")]
    NoPages(String),
    #[error("page name {page} appears more than once in chapter {chapter}")]
    DuplicatePage { chapter: String, page: String },
}

/// An ordered, non-empty list of uniquely named pages plus the listing it came from.
///
/// The page order is the order entries are written to the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    entry: ChapterEntry,
    pages: Vec<Page>,
}

impl Chapter {
    pub fn new(entry: ChapterEntry, pages: Vec<Page>) -> Result<Self, ChapterError> {
        if pages.is_empty() {
            return Err(ChapterError::NoPages(entry.name));
        }
        let mut seen = HashSet::with_capacity(pages.len());
        for page in &pages {
            if !seen.insert(page.name.as_str()) {
                return Err(ChapterError::DuplicatePage {
                    chapter: entry.name.clone(),
                    page: page.name.clone(),
                });
            }
        }
        Ok(Self { entry, pages })
    }

    pub fn entry(&self) -> &ChapterEntry {
        &self.entry
    }

    pub fn name(&self) -> &str {
        &self.entry.name
    }

    pub fn number(&self) -> &str {
        &self.entry.number
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Never true for a chapter built through `new`.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn into_pages(self) -> Vec<Page> {
        self.pages
    }
}
