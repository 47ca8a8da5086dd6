use mangagrab_core::{Chapter, ChapterEntry, ChapterError, ErrorCategory, Page};

fn entry() -> ChapterEntry {
    ChapterEntry::new("7", "title_c007", "http://example.com/c7/")
}

#[test]
fn chapter_keeps_page_order() {
    let pages = vec![
        Page::new("1", "http://example.com/c7/1.html"),
        Page::new("2", "http://example.com/c7/2.html"),
        Page::new("credits", "http://example.com/c7/credits.html"),
    ];
    let chapter = Chapter::new(entry(), pages.clone()).unwrap();
    assert_eq!(chapter.name(), "title_c007");
    assert_eq!(chapter.number(), "7");
    assert_eq!(chapter.len(), 3);
    assert!(!chapter.is_empty());
    assert_eq!(chapter.into_pages(), pages);
}

#[test]
fn chapter_without_pages_is_rejected() {
    let err = Chapter::new(entry(), Vec::new()).unwrap_err();
    assert_eq!(err, ChapterError::NoPages("title_c007".into()));
}

#[test]
fn duplicate_page_names_are_rejected() {
    let pages = vec![
        Page::new("1", "http://example.com/a"),
        Page::new("1", "http://example.com/b"),
    ];
    let err = Chapter::new(entry(), pages).unwrap_err();
    assert!(matches!(err, ChapterError::DuplicatePage { ref page, .. } if page == "1"));
}

#[test]
fn only_network_errors_are_retryable() {
    assert!(ErrorCategory::Network.is_retryable());
    for category in [
        ErrorCategory::NotFound,
        ErrorCategory::Filesystem,
        ErrorCategory::EmptyResult,
        ErrorCategory::Config,
    ] {
        assert!(!category.is_retryable());
    }
}
