//! Resolver pipeline against the fixture crawler

use crate::support::{atom_feed, html_page, FixtureCrawler};
use weblens::handler::all_properties;
use weblens::page::PageKind;
use weblens::remote::RemoteSections;
use weblens::request::{json_to_request, request_to_json};
use weblens::{FetchOutcome, Handler, RequestSpec, Resolver, StatusClass};

#[tokio::test]
async fn test_plain_page() {
    let crawler = FixtureCrawler::new();
    crawler.serve("https://example.com/about", 200, "text/html", html_page("About", None));

    let mut resolver = Resolver::new(crawler.context(), "https://EXAMPLE.com/about/").unwrap();
    let outcome = resolver.get_response().await.unwrap();

    let response = outcome.response().unwrap();
    assert!(response.is_valid());
    assert_eq!(response.recognized_content_type.as_deref(), Some("text/html"));
    assert!(response.body_hash().is_some());

    let handler = resolver.handler().unwrap();
    assert_eq!(handler.name(), "HttpPageHandler");
    assert_eq!(handler.title().as_deref(), Some("About"));
}

#[tokio::test]
async fn test_server_error_page_is_invalid() {
    let url = "https://page-with-http-status-500.com";
    let crawler = FixtureCrawler::new();
    crawler.serve(url, 500, "text/html", html_page("Internal error", None));

    let mut resolver = Resolver::new(crawler.context(), url).unwrap();
    let outcome = resolver.get_response().await.unwrap();

    let response = outcome.response().unwrap();
    assert_eq!(response.status_code, 500);
    assert_eq!(response.status_class(), StatusClass::Invalid);
    assert!(response.is_invalid());

    let handler = resolver.handler().unwrap();
    assert!(!handler.is_valid());
    assert!(handler.title().is_none());
}

#[tokio::test]
async fn test_forbidden_and_rate_limited_are_indeterminate() {
    let crawler = FixtureCrawler::new();
    crawler.serve("https://a.com/forbidden", 403, "text/html", "");
    crawler.serve("https://a.com/slow-down", 429, "text/html", "");

    for url in ["https://a.com/forbidden", "https://a.com/slow-down"] {
        let mut resolver = Resolver::new(crawler.context(), url).unwrap();
        let outcome = resolver.get_response().await.unwrap();
        let response = outcome.response().unwrap();

        assert_eq!(response.status_class(), StatusClass::Indeterminate, "{}", url);
        assert!(!response.is_valid());
        assert!(!response.is_invalid());
        assert!(response.is_uncertain());
    }
}

#[tokio::test]
async fn test_feed_declared_as_html_is_parsed_as_feed() {
    let url = "https://feeds.example.com/rss";
    let crawler = FixtureCrawler::new();
    crawler.serve(url, 200, "text/html; charset=utf-8", atom_feed("Mislabelled", 5));

    let mut resolver = Resolver::new(crawler.context(), url).unwrap();
    let outcome = resolver.get_response().await.unwrap();

    let handler = resolver.handler().unwrap();
    assert_eq!(handler.page().map(|page| page.kind()), Some(PageKind::Rss));
    assert_eq!(handler.entries().len(), 5);
    assert_eq!(
        outcome.response().unwrap().recognized_content_type.as_deref(),
        Some("application/rss+xml")
    );
}

#[tokio::test]
async fn test_resolution_is_idempotent() {
    let crawler = FixtureCrawler::new();
    let canonical = "https://www.youtube.com/watch?v=abc";
    crawler.serve(canonical, 200, "text/html", html_page("Video", None));

    let mut resolver = Resolver::new(crawler.context(), "https://youtu.be/abc").unwrap();
    let first = resolver.resolve().unwrap().url().to_string();
    let second = resolver.resolve().unwrap().url().to_string();
    assert_eq!(first, canonical);
    assert_eq!(first, second);

    resolver.get_response().await.unwrap();
    resolver.get_response().await.unwrap();
    assert_eq!(crawler.fetch_count(canonical), 1);
    assert_eq!(crawler.total_fetches(), 1);
}

#[tokio::test]
async fn test_missing_page_yields_fetched_invalid_response() {
    let crawler = FixtureCrawler::new();
    let mut resolver = Resolver::new(crawler.context(), "https://nothing.example.com").unwrap();

    match resolver.get_response().await.unwrap() {
        FetchOutcome::Fetched(response) => assert_eq!(response.status_code, 404),
        other => panic!("unexpected outcome {:?}", other),
    }
}

#[tokio::test]
async fn test_properties_document() {
    let crawler = FixtureCrawler::new();
    let url = "https://example.com/feed";
    crawler.serve(url, 200, "application/atom+xml", atom_feed("Feed", 3));

    let mut resolver = Resolver::new(crawler.context(), url).unwrap();
    resolver.get_response().await.unwrap();

    let document = all_properties(resolver.handler().unwrap(), true);
    let sections = RemoteSections::new(document);
    let properties = sections.properties().unwrap();
    assert_eq!(properties["title"], "Feed");
    assert_eq!(properties["feeds"][0], url);
    assert_eq!(sections.entries().len(), 3);
    assert_eq!(sections.response().unwrap().status_code, 200);
}

#[test]
fn test_request_json_round_trip() {
    let mut request = RequestSpec::new("https://example.com/feed");
    request.user_agent = Some("Agent/1.0".to_string());
    request.bytes_limit = Some(1024);
    request.ping = true;
    request
        .cookies
        .insert("CONSENT".to_string(), "YES".to_string());

    let restored = json_to_request(request_to_json(&request)).unwrap();
    assert_eq!(restored, request);
}
