use std::sync::Arc;
use std::time::Duration;

use mangagrab_core::{Chapter, ChapterEntry, ChapterError, ErrorCategory};
use mangagrab_engine::{
    ChapterSource, FailureKind, FetchSettings, Fetcher, ListingOrder, ReqwestFetcher,
    SelectorSource, SiteProfile, SourceError,
};
use pretty_assertions::assert_eq;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetcher() -> Arc<dyn Fetcher> {
    Arc::new(
        ReqwestFetcher::new(FetchSettings {
            retry_delay: Duration::ZERO,
            max_attempts: 1,
            ..FetchSettings::default()
        })
        .unwrap(),
    )
}

fn source_for(site: &str, server: &MockServer) -> SelectorSource {
    let profile = SiteProfile::builtin(site).unwrap().with_base_url(server.uri());
    SelectorSource::new(profile, fetcher()).unwrap()
}

async fn serve_html(server: &MockServer, at: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(body.as_bytes().to_vec(), "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn descending_listing_is_returned_oldest_first() {
    let server = MockServer::start().await;
    serve_html(
        &server,
        "/manga/one_piece/",
        r#"<html><body><div class="detail_list"><ul>
            <li><a href="/manga/one_piece/c010/">One Piece 10</a></li>
            <li><a href="/manga/one_piece/c009/">One Piece 9</a></li>
            <li><a href="/manga/one_piece/c001/">One Piece 1</a></li>
        </ul></div></body></html>"#,
    )
    .await;

    let source = source_for("mangahere", &server);
    assert_eq!(source.listing_order(), ListingOrder::Descending);

    let chapters = source.resolve_chapters("One Piece").await.unwrap();
    let base = server.uri();
    assert_eq!(
        chapters,
        vec![
            ChapterEntry::new("1", "one_piece_c001", format!("{base}/manga/one_piece/c001/")),
            ChapterEntry::new("9", "one_piece_c009", format!("{base}/manga/one_piece/c009/")),
            ChapterEntry::new("10", "one_piece_c010", format!("{base}/manga/one_piece/c010/")),
        ]
    );
}

#[tokio::test]
async fn empty_listing_is_an_empty_result() {
    let server = MockServer::start().await;
    serve_html(&server, "/manga/nothing/", "<html><body><p>gone</p></body></html>").await;

    let err = source_for("mangahere", &server)
        .resolve_chapters("nothing")
        .await
        .unwrap_err();
    assert!(matches!(err, SourceError::NoChapters(ref title) if title == "nothing"));
    assert_eq!(err.category(), ErrorCategory::EmptyResult);
}

#[tokio::test]
async fn missing_title_page_surfaces_the_fetch_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = source_for("mangatown", &server)
        .resolve_chapters("unknown title")
        .await
        .unwrap_err();
    assert_eq!(err.category(), ErrorCategory::NotFound);
    assert_eq!(err.into_fetch_error().kind, FailureKind::HttpStatus(404));
}

#[tokio::test]
async fn page_options_keep_document_order_and_repeats() {
    let server = MockServer::start().await;
    serve_html(
        &server,
        "/manga/one_piece/c001/",
        r#"<html><body><section class="readpage_top"><div class="go_page"><select>
            <option>1</option><option>2</option><option>2</option><option>3</option>
        </select></div></section></body></html>"#,
    )
    .await;

    let chapter = format!("{}/manga/one_piece/c001/", server.uri());
    let pages = source_for("mangahere", &server)
        .resolve_pages(&chapter)
        .await
        .unwrap();

    let names: Vec<&str> = pages.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["1", "2", "2", "3"]);
    assert_eq!(pages[1].locator, format!("{chapter}2.html"));

    let err = Chapter::new(ChapterEntry::new("1", "one_piece_c001", chapter.clone()), pages)
        .unwrap_err();
    assert_eq!(
        err,
        ChapterError::DuplicatePage {
            chapter: "one_piece_c001".to_string(),
            page: "2".to_string()
        }
    );
}

#[tokio::test]
async fn ignored_option_texts_are_not_pages() {
    let server = MockServer::start().await;
    serve_html(
        &server,
        "/manga/berserk/c001/1.html",
        r#"<html><body><div id="top_bar"><select>
            <option>1</option><option>2</option><option>Comments</option>
        </select></div></body></html>"#,
    )
    .await;

    let chapter = format!("{}/manga/berserk/c001/1.html", server.uri());
    let pages = source_for("mangafox", &server)
        .resolve_pages(&chapter)
        .await
        .unwrap();

    let locators: Vec<String> = pages.into_iter().map(|p| p.locator).collect();
    assert_eq!(
        locators,
        vec![
            format!("{}/manga/berserk/c001/1.html", server.uri()),
            format!("{}/manga/berserk/c001/2.html", server.uri()),
        ]
    );
}

#[tokio::test]
async fn chapter_without_pages_is_an_empty_result() {
    let server = MockServer::start().await;
    serve_html(&server, "/manga/x/c001/", "<html><body></body></html>").await;

    let chapter = format!("{}/manga/x/c001/", server.uri());
    let err = source_for("mangahere", &server)
        .resolve_pages(&chapter)
        .await
        .unwrap_err();
    assert_eq!(err.category(), ErrorCategory::EmptyResult);
}

#[tokio::test]
async fn protocol_relative_image_gets_a_scheme() {
    let server = MockServer::start().await;
    serve_html(
        &server,
        "/manga/x/c001/1.html",
        r#"<html><body><img id="image" src="//cdn.example.test/store/x/001.jpg?v=2"></body></html>"#,
    )
    .await;

    let page = format!("{}/manga/x/c001/1.html", server.uri());
    let image = source_for("mangahere", &server)
        .resolve_image_locator(&page)
        .await
        .unwrap();
    assert_eq!(image, "http://cdn.example.test/store/x/001.jpg?v=2");
}

#[tokio::test]
async fn relative_image_is_joined_onto_the_page() {
    let server = MockServer::start().await;
    serve_html(
        &server,
        "/one-piece/1/2",
        r#"<html><body><img id="img" src="/images/one-piece/1/2.png"></body></html>"#,
    )
    .await;

    let page = format!("{}/one-piece/1/2", server.uri());
    let image = source_for("mangareader", &server)
        .resolve_image_locator(&page)
        .await
        .unwrap();
    assert_eq!(image, format!("{}/images/one-piece/1/2.png", server.uri()));
}

#[tokio::test]
async fn page_without_image_resolves_to_a_resolve_failure() {
    let server = MockServer::start().await;
    serve_html(&server, "/manga/x/c001/4.html", "<html><body></body></html>").await;

    let page = format!("{}/manga/x/c001/4.html", server.uri());
    let err = source_for("mangahere", &server)
        .resolve_image_locator(&page)
        .await
        .unwrap_err();
    assert_eq!(err.category(), ErrorCategory::NotFound);
    assert_eq!(err.into_fetch_error().kind, FailureKind::Resolve);
}

#[test]
fn underscore_titles_collapse_punctuation() {
    let profile = SiteProfile::builtin("mangahere").unwrap();
    assert_eq!(profile.title_slug("  One Piece!! "), "one_piece");
    assert_eq!(profile.title_slug("Kaguya-sama: Love is War"), "kaguya_sama_love_is_war");
    assert_eq!(
        profile.title_url("One Piece"),
        "http://www.mangahere.cc/manga/one_piece/"
    );
    assert_eq!(profile.chapter_name("One Piece", "7"), "one_piece_c007");
    assert_eq!(profile.chapter_name("One Piece", "1024"), "one_piece_c1024");
}

#[test]
fn hyphen_titles_use_the_bare_slug() {
    let profile = SiteProfile::builtin("mangareader").unwrap();
    assert_eq!(profile.title_slug("One Piece"), "one-piece");
    assert_eq!(profile.title_url("One Piece"), "http://www.mangareader.net/one-piece");
    assert_eq!(
        profile.page_url("http://www.mangareader.net/one-piece/1/", "3"),
        "http://www.mangareader.net/one-piece/1/3"
    );
}

#[test]
fn numbered_page_urls_swap_only_the_page_number() {
    let profile = SiteProfile::builtin("mangafox").unwrap();
    assert_eq!(
        profile.page_url("http://mangafox.la/manga/a/v01/c012/1.html", "14"),
        "http://mangafox.la/manga/a/v01/c012/14.html"
    );
    assert_eq!(
        profile.page_url("http://mangafox.la/manga/a/c012/", "14"),
        "http://mangafox.la/manga/a/c012/"
    );
}

#[test]
fn every_builtin_site_has_a_profile() {
    for name in SiteProfile::builtin_names() {
        let profile = SiteProfile::builtin(name).unwrap();
        assert_eq!(profile.name, *name);
        assert!(SelectorSource::new(profile, fetcher()).is_ok());
    }
}

#[test]
fn unknown_site_is_a_configuration_error() {
    let err = SiteProfile::builtin("mangastream").unwrap_err();
    assert!(matches!(err, SourceError::UnknownSite(ref name) if name == "mangastream"));
    assert_eq!(err.category(), ErrorCategory::Config);
}
