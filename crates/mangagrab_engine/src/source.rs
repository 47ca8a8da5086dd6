use std::sync::Arc;

use engine_logging::{engine_debug, engine_info};
use mangagrab_core::{ChapterEntry, ErrorCategory, Page};
use scraper::{Html, Selector};
use thiserror::Error;
use url::Url;

use crate::decode::decode_html;
use crate::fetch::Fetcher;
use crate::{FailureKind, FetchError};

/// Order in which a site lists its chapters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingOrder {
    Ascending,
    Descending,
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("there is no chapter available for {0}")]
    NoChapters(String),
    #[error("no pages listed at {0}")]
    NoPages(String),
    #[error("no image found at {0}")]
    NoImage(String),
    #[error("invalid selector {selector:?}: {message}")]
    Selector { selector: String, message: String },
    #[error("invalid url {url}: {message}")]
    Url { url: String, message: String },
    #[error("unknown site {0}")]
    UnknownSite(String),
}

impl SourceError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SourceError::Fetch(err) => err.category(),
            SourceError::NoChapters(_) | SourceError::NoPages(_) => ErrorCategory::EmptyResult,
            SourceError::NoImage(_) | SourceError::Url { .. } => ErrorCategory::NotFound,
            SourceError::Selector { .. } | SourceError::UnknownSite(_) => ErrorCategory::Config,
        }
    }

    /// Collapses into the error type page tasks report.
    pub fn into_fetch_error(self) -> FetchError {
        match self {
            SourceError::Fetch(err) => err,
            other => FetchError::new(FailureKind::Resolve, other.to_string()),
        }
    }
}

/// Resolves titles, chapters and pages for one site.
///
/// `resolve_chapters` always returns chapters oldest first, whatever the site's
/// own `listing_order`.
#[async_trait::async_trait]
pub trait ChapterSource: Send + Sync {
    fn name(&self) -> &str;

    fn listing_order(&self) -> ListingOrder;

    async fn resolve_chapters(&self, title: &str) -> Result<Vec<ChapterEntry>, SourceError>;

    async fn resolve_pages(&self, chapter_locator: &str) -> Result<Vec<Page>, SourceError>;

    async fn resolve_image_locator(&self, page_locator: &str) -> Result<String, SourceError>;
}

/// How a user-supplied title becomes the slug in the site's URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleRule {
    /// `one-piece!` -> `one_piece`, index at `{base}/manga/{slug}/`.
    Underscore,
    /// `one piece` -> `one-piece`, index at `{base}/{slug}`.
    Hyphen,
}

/// How a page name becomes the address of the page that shows its image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageUrlRule {
    /// `{chapter_url}{name}.html`
    AppendHtml,
    /// Replace the trailing `{n}.html` of the chapter url with `{name}.html`.
    ReplaceNumberedHtml,
    /// `{chapter_url}/{name}`
    PathSegment,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteProfile {
    pub name: String,
    pub base_url: String,
    pub chapters_css: String,
    pub pages_css: String,
    pub image_css: String,
    pub listing_order: ListingOrder,
    pub title_rule: TitleRule,
    pub page_url_rule: PageUrlRule,
    /// Option texts in the page selector that are not pages.
    pub ignored_page_names: Vec<String>,
}

const BUILTIN_SITES: &[&str] = &["mangahere", "mangatown", "mangafox", "mangareader"];

impl SiteProfile {
    pub fn builtin_names() -> &'static [&'static str] {
        BUILTIN_SITES
    }

    pub fn builtin(name: &str) -> Result<Self, SourceError> {
        let profile = match name {
            "mangahere" => Self {
                name: name.to_string(),
                base_url: "http://www.mangahere.cc".to_string(),
                chapters_css: "div.detail_list ul li a".to_string(),
                pages_css: "section.readpage_top div.go_page select option".to_string(),
                image_css: "img#image".to_string(),
                listing_order: ListingOrder::Descending,
                title_rule: TitleRule::Underscore,
                page_url_rule: PageUrlRule::AppendHtml,
                ignored_page_names: Vec::new(),
            },
            "mangatown" => Self {
                name: name.to_string(),
                base_url: "http://www.mangatown.com".to_string(),
                chapters_css: "div.chapter_content ul.chapter_list li a".to_string(),
                pages_css: "div.manga_read_footer div.page_select select option".to_string(),
                image_css: "img#image".to_string(),
                listing_order: ListingOrder::Descending,
                title_rule: TitleRule::Underscore,
                page_url_rule: PageUrlRule::AppendHtml,
                ignored_page_names: Vec::new(),
            },
            "mangafox" => Self {
                name: name.to_string(),
                base_url: "http://mangafox.la".to_string(),
                chapters_css: "a.tips".to_string(),
                pages_css: "#top_bar option".to_string(),
                image_css: "img#image".to_string(),
                listing_order: ListingOrder::Descending,
                title_rule: TitleRule::Underscore,
                page_url_rule: PageUrlRule::ReplaceNumberedHtml,
                ignored_page_names: vec!["Comments".to_string()],
            },
            "mangareader" => Self {
                name: name.to_string(),
                base_url: "http://www.mangareader.net".to_string(),
                chapters_css: "#chapterlist td a".to_string(),
                pages_css: "div#selectpage option".to_string(),
                image_css: "img#img".to_string(),
                listing_order: ListingOrder::Ascending,
                title_rule: TitleRule::Hyphen,
                page_url_rule: PageUrlRule::PathSegment,
                ignored_page_names: Vec::new(),
            },
            other => return Err(SourceError::UnknownSite(other.to_string())),
        };
        Ok(profile)
    }

    /// Same profile served from another host, used to point a site at a mirror.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn title_slug(&self, title: &str) -> String {
        let lowered = title.trim().to_lowercase();
        match self.title_rule {
            TitleRule::Underscore => {
                let is_word = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit();
                let trimmed = lowered.trim_matches(|c: char| !is_word(c));
                let mut slug = String::with_capacity(trimmed.len());
                let mut in_gap = false;
                for c in trimmed.chars() {
                    if is_word(c) {
                        slug.push(c);
                        in_gap = false;
                    } else if !in_gap {
                        slug.push('_');
                        in_gap = true;
                    }
                }
                slug
            }
            TitleRule::Hyphen => lowered
                .chars()
                .map(|c| if c == ' ' || c == '_' { '-' } else { c })
                .filter(|c| *c == '-' || c.is_ascii_lowercase() || c.is_ascii_digit())
                .collect(),
        }
    }

    pub fn title_url(&self, title: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let slug = self.title_slug(title);
        match self.title_rule {
            TitleRule::Underscore => format!("{base}/manga/{slug}/"),
            TitleRule::Hyphen => format!("{base}/{slug}"),
        }
    }

    pub fn page_url(&self, chapter_url: &str, page_name: &str) -> String {
        match self.page_url_rule {
            PageUrlRule::AppendHtml => format!("{chapter_url}{page_name}.html"),
            PageUrlRule::ReplaceNumberedHtml => {
                let Some(stem) = chapter_url.strip_suffix(".html") else {
                    return chapter_url.to_string();
                };
                let prefix = stem.trim_end_matches(|c: char| c.is_ascii_digit());
                if prefix.len() == stem.len() {
                    return chapter_url.to_string();
                }
                format!("{prefix}{page_name}.html")
            }
            PageUrlRule::PathSegment => {
                format!("{}/{}", chapter_url.trim_end_matches('/'), page_name)
            }
        }
    }

    /// `{slug}_c{number}` with the number left-padded to three digits.
    pub fn chapter_name(&self, title: &str, number: &str) -> String {
        format!("{}_c{:0>3}", self.title_slug(title), number)
    }
}

/// `ChapterSource` driven by the CSS selectors of a `SiteProfile`.
pub struct SelectorSource {
    profile: SiteProfile,
    base: Url,
    chapters: Selector,
    pages: Selector,
    image: Selector,
    fetcher: Arc<dyn Fetcher>,
}

impl SelectorSource {
    pub fn new(profile: SiteProfile, fetcher: Arc<dyn Fetcher>) -> Result<Self, SourceError> {
        let base = Url::parse(&profile.base_url).map_err(|err| SourceError::Url {
            url: profile.base_url.clone(),
            message: err.to_string(),
        })?;
        Ok(Self {
            chapters: parse_selector(&profile.chapters_css)?,
            pages: parse_selector(&profile.pages_css)?,
            image: parse_selector(&profile.image_css)?,
            base,
            profile,
            fetcher,
        })
    }

    pub fn profile(&self) -> &SiteProfile {
        &self.profile
    }

    async fn fetch_document(&self, url: &str) -> Result<String, SourceError> {
        let output = self.fetcher.fetch(url).await?;
        let decoded = decode_html(&output.bytes, output.metadata.content_type.as_deref());
        Ok(decoded.html)
    }

    fn parse_chapters(&self, html: &str, title: &str) -> Vec<ChapterEntry> {
        let document = Html::parse_document(html);
        let mut chapters: Vec<ChapterEntry> = document
            .select(&self.chapters)
            .filter_map(|link| {
                let text = link.text().collect::<String>();
                let number = text.split_whitespace().last()?.to_string();
                let href = link.value().attr("href")?;
                let locator = self.base.join(href.trim()).ok()?.to_string();
                let name = self.profile.chapter_name(title, &number);
                Some(ChapterEntry {
                    number,
                    name,
                    locator,
                })
            })
            .collect();

        if self.profile.listing_order == ListingOrder::Descending {
            chapters.reverse();
        }
        chapters
    }

    /// Every option in document order; repeated names are kept so that
    /// `Chapter::new` reports them.
    fn parse_pages(&self, html: &str, chapter_locator: &str) -> Vec<Page> {
        let document = Html::parse_document(html);
        document
            .select(&self.pages)
            .filter_map(|option| {
                let name = option.text().collect::<String>().trim().to_string();
                if name.is_empty() || self.profile.ignored_page_names.contains(&name) {
                    return None;
                }
                let locator = self.profile.page_url(chapter_locator, &name);
                Some(Page { name, locator })
            })
            .collect()
    }

    fn parse_image(&self, html: &str, page_locator: &str) -> Option<String> {
        let document = Html::parse_document(html);
        let src = document
            .select(&self.image)
            .next()?
            .value()
            .attr("src")?
            .trim()
            .to_string();
        if let Some(rest) = src.strip_prefix("//") {
            return Some(format!("http://{rest}"));
        }
        match Url::parse(page_locator) {
            Ok(page) => page.join(&src).ok().map(|url| url.to_string()),
            Err(_) => Some(src),
        }
    }
}

#[async_trait::async_trait]
impl ChapterSource for SelectorSource {
    fn name(&self) -> &str {
        &self.profile.name
    }

    fn listing_order(&self) -> ListingOrder {
        self.profile.listing_order
    }

    async fn resolve_chapters(&self, title: &str) -> Result<Vec<ChapterEntry>, SourceError> {
        let url = self.profile.title_url(title);
        engine_info!("resolving chapters of {:?} from {}", title, url);
        let html = self.fetch_document(&url).await?;
        let chapters = self.parse_chapters(&html, title);
        if chapters.is_empty() {
            return Err(SourceError::NoChapters(title.to_string()));
        }
        engine_debug!("{} chapters listed for {:?}", chapters.len(), title);
        Ok(chapters)
    }

    async fn resolve_pages(&self, chapter_locator: &str) -> Result<Vec<Page>, SourceError> {
        let html = self.fetch_document(chapter_locator).await?;
        let pages = self.parse_pages(&html, chapter_locator);
        if pages.is_empty() {
            return Err(SourceError::NoPages(chapter_locator.to_string()));
        }
        Ok(pages)
    }

    async fn resolve_image_locator(&self, page_locator: &str) -> Result<String, SourceError> {
        let html = self.fetch_document(page_locator).await?;
        self.parse_image(&html, page_locator)
            .ok_or_else(|| SourceError::NoImage(page_locator.to_string()))
    }
}

fn parse_selector(css: &str) -> Result<Selector, SourceError> {
    Selector::parse(css).map_err(|err| SourceError::Selector {
        selector: css.to_string(),
        message: err.to_string(),
    })
}
