//! robots.txt enforcement through the resolver

use crate::support::{html_page, FixtureCrawler};
use std::sync::Arc;
use weblens::{FetchOutcome, Resolver};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_disallowed_url_is_blocked_without_fetching() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /private\n"),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/private/page"))
        .respond_with(ResponseTemplate::new(200).set_body_string("secret"))
        .expect(0)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/public"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(html_page("Public", None))
                .insert_header("content-type", "text/html"),
        )
        .mount(&server)
        .await;

    let context = weblens::ResolverContext::new().enable_robots_cache(10);

    let mut blocked = Resolver::new(context.clone(), &format!("{}/private/page", server.uri())).unwrap();
    let outcome = blocked.get_response().await.unwrap();
    assert!(outcome.is_blocked());

    let mut allowed = Resolver::new(context.clone(), &format!("{}/public", server.uri())).unwrap();
    let outcome = allowed.get_response().await.unwrap();
    assert!(matches!(outcome, FetchOutcome::Fetched(ref response) if response.is_valid()));
    assert_eq!(allowed.handler().map(|h| h.title()), Some(Some("Public".to_string())));

    let cache = context.domain_cache().unwrap();
    assert_eq!(cache.len(), 1);
    let info = cache.get_domain_info(&server.uri()).await.unwrap();
    assert!(!info.is_allowed(&format!("{}/private/x", server.uri())));
}

#[tokio::test]
async fn test_not_respecting_robots_fetches_anyway() {
    let crawler = FixtureCrawler::new();
    crawler.serve("https://a.com/robots.txt", 200, "text/plain", "User-agent: *\nDisallow: /\n");
    crawler.serve("https://a.com/page", 200, "text/html", html_page("Page", None));

    let context = crawler.context().enable_robots_cache(10);
    let mut request = context.request_for_url("https://a.com/page");
    request.respect_robots = false;

    let mut resolver = Resolver::with_request(context, request).unwrap();
    let outcome = resolver.get_response().await.unwrap();
    assert!(!outcome.is_blocked());
    assert_eq!(crawler.fetch_count("https://a.com/robots.txt"), 0);
}

#[tokio::test]
async fn test_cache_keeps_newest_domains() {
    let crawler = FixtureCrawler::new();
    for host in ["a.com", "b.com", "c.com"] {
        crawler.serve(
            &format!("https://{}/robots.txt", host),
            200,
            "text/plain",
            "User-agent: *\nAllow: /\n",
        );
        crawler.serve(&format!("https://{}/page", host), 200, "text/html", html_page(host, None));
    }

    let context = crawler.context().enable_robots_cache(2);
    for host in ["a.com", "b.com", "c.com"] {
        let mut resolver = Resolver::new(context.clone(), &format!("https://{}/page", host)).unwrap();
        assert!(!resolver.get_response().await.unwrap().is_blocked());
    }

    let cache = Arc::clone(context.domain_cache().unwrap());
    assert_eq!(cache.len(), 2);
    assert_eq!(cache.domains(), vec!["b.com".to_string(), "c.com".to_string()]);
    assert!(!cache.contains("https://a.com/page"));

    // Each robots.txt is fetched once; a.com again after eviction.
    let mut resolver = Resolver::new(context.clone(), "https://a.com/page").unwrap();
    resolver.get_response().await.unwrap();
    assert_eq!(crawler.fetch_count("https://a.com/robots.txt"), 2);
    assert_eq!(crawler.fetch_count("https://c.com/robots.txt"), 1);
    assert_eq!(cache.domains(), vec!["c.com".to_string(), "a.com".to_string()]);
}
