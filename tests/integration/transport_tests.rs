//! HTTP crawler behaviour against a real socket

use std::time::{Duration, Instant};
use weblens::crawler::{Crawler, HttpCrawler};
use weblens::status::{
    HTTP_STATUS_CODE_FILE_TOO_BIG, HTTP_STATUS_CODE_PAGE_UNSUPPORTED, HTTP_STATUS_CODE_TIMEOUT,
};
use weblens::{Handler, RequestSpec, Resolver, ResolverContext};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn request(url: String) -> RequestSpec {
    let mut request = RequestSpec::new(url);
    request.timeout = Duration::from_secs(1);
    request
}

#[tokio::test]
async fn test_slow_server_hits_total_deadline() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("late")
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let context = ResolverContext::new().with_template(request(String::new()));
    let mut resolver = Resolver::new(context, &format!("{}/slow", server.uri())).unwrap();

    let started = Instant::now();
    let outcome = resolver.get_response().await.unwrap();
    let elapsed = started.elapsed();

    let response = outcome.response().unwrap();
    assert_eq!(response.status_code, HTTP_STATUS_CODE_TIMEOUT);
    assert!(response.is_invalid());
    assert!(!response.errors.is_empty());
    assert!(elapsed < Duration::from_secs(3), "took {:?}", elapsed);
}

#[tokio::test]
async fn test_server_error_status_is_kept() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let response = HttpCrawler::new().run(&request(server.uri())).await;
    assert_eq!(response.status_code, 500);
    assert!(response.is_invalid());
    assert!(response.crawl_time.is_some());
}

#[tokio::test]
async fn test_body_over_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("x".repeat(4096))
                .insert_header("content-type", "text/plain"),
        )
        .mount(&server)
        .await;

    let mut request = request(server.uri());
    request.bytes_limit = Some(100);

    let response = HttpCrawler::new().run(&request).await;
    assert_eq!(response.status_code, HTTP_STATUS_CODE_FILE_TOO_BIG);
    assert!(response.text.is_none());
    assert_eq!(response.errors.len(), 1);
}

#[tokio::test]
async fn test_unaccepted_content_type() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(vec![0u8; 16])
                .insert_header("content-type", "image/png"),
        )
        .mount(&server)
        .await;

    let mut request = request(server.uri());
    request.accept_types = "html,rss".to_string();

    let response = HttpCrawler::new().run(&request).await;
    assert_eq!(response.status_code, HTTP_STATUS_CODE_PAGE_UNSUPPORTED);
}

#[tokio::test]
async fn test_headers_cookies_and_charset() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/page"))
        .and(header("user-agent", "WebLensTest/1.0"))
        .and(header("cookie", "CONSENT=YES"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(b"<html><head><title>Caf\xe9</title></head></html>".to_vec())
                .insert_header("content-type", "text/html; charset=iso-8859-1"),
        )
        .mount(&server)
        .await;

    let mut template = request(String::new());
    template.user_agent = Some("WebLensTest/1.0".to_string());
    template
        .cookies
        .insert("CONSENT".to_string(), "YES".to_string());

    let context = ResolverContext::new().with_template(template);
    let mut resolver = Resolver::new(context, &format!("{}/page", server.uri())).unwrap();
    let outcome = resolver.get_response().await.unwrap();

    let response = outcome.response().unwrap();
    assert_eq!(response.status_code, 200);
    assert_eq!(response.encoding.as_deref(), Some("windows-1252"));
    assert_eq!(
        resolver.handler().and_then(|h| h.title()).as_deref(),
        Some("Café")
    );
}

#[tokio::test]
async fn test_ping_skips_body() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(200).insert_header("content-type", "text/html"))
        .expect(1)
        .mount(&server)
        .await;

    let mut request = request(server.uri());
    request.ping = true;

    let response = HttpCrawler::new().run(&request).await;
    assert!(response.is_valid());
    assert!(response.text.is_none());
}
