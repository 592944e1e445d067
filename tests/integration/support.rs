//! Fixture crawler serving canned responses

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use weblens::crawler::{Crawler, CrawlerRegistry};
use weblens::request::RequestSpec;
use weblens::response::ResponseModel;
use weblens::ResolverContext;

pub const FIXTURE_CRAWLER: &str = "FixtureCrawler";

#[derive(Debug, Clone)]
struct Fixture {
    status: u16,
    content_type: String,
    body: String,
}

/// Serves a fixed body per URL and counts fetches; unknown URLs are 404
#[derive(Debug, Default)]
pub struct FixtureCrawler {
    fixtures: Mutex<HashMap<String, Fixture>>,
    delays: Mutex<HashMap<String, Duration>>,
    fetches: Mutex<HashMap<String, usize>>,
    total: AtomicUsize,
}

impl FixtureCrawler {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn serve(&self, url: &str, status: u16, content_type: &str, body: impl Into<String>) {
        self.fixtures.lock().unwrap().insert(
            url.to_string(),
            Fixture {
                status,
                content_type: content_type.to_string(),
                body: body.into(),
            },
        );
    }

    /// Holds every fetch of `url` for `delay` before answering
    pub fn delay(&self, url: &str, delay: Duration) {
        self.delays.lock().unwrap().insert(url.to_string(), delay);
    }

    pub fn fetch_count(&self, url: &str) -> usize {
        self.fetches.lock().unwrap().get(url).copied().unwrap_or(0)
    }

    pub fn total_fetches(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }

    /// Context whose only crawler is this fixture
    pub fn context(self: &Arc<Self>) -> ResolverContext {
        let mut crawlers = CrawlerRegistry::new();
        let crawler = Arc::clone(self);
        crawlers.register(
            FIXTURE_CRAWLER,
            Arc::new(move || Arc::clone(&crawler) as Arc<dyn Crawler>),
        );
        crawlers.set_default(FIXTURE_CRAWLER);

        let template = RequestSpec {
            crawler_name: Some(FIXTURE_CRAWLER.to_string()),
            ..RequestSpec::default()
        };
        ResolverContext::new()
            .with_crawlers(crawlers)
            .with_template(template)
    }
}

#[async_trait]
impl Crawler for FixtureCrawler {
    fn name(&self) -> &str {
        FIXTURE_CRAWLER
    }

    async fn run(&self, request: &RequestSpec) -> ResponseModel {
        self.total.fetch_add(1, Ordering::SeqCst);
        *self
            .fetches
            .lock()
            .unwrap()
            .entry(request.url.clone())
            .or_insert(0) += 1;

        let delay = self.delays.lock().unwrap().get(&request.url).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let fixture = self.fixtures.lock().unwrap().get(&request.url).cloned();
        match fixture {
            Some(fixture) => ResponseModel::new(request.url.clone(), fixture.status)
                .with_header("Content-Type", &fixture.content_type)
                .with_text(fixture.body),
            None => ResponseModel::new(request.url.clone(), 404),
        }
    }
}

/// Atom feed in the shape YouTube serves, with `count` entries
pub fn atom_feed(title: &str, count: usize) -> String {
    let mut entries = String::new();
    for i in 0..count {
        entries.push_str(&format!(
            r#"<entry><id>yt:video:v{i}</id><title>Video {i}</title>
<link rel="alternate" href="https://www.youtube.com/watch?v=v{i}"/>
<published>2024-01-{day:02}T10:00:00+00:00</published></entry>"#,
            day = i % 28 + 1
        ));
    }
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom"><title>{title}</title>
<id>yt:channel:UCabc</id><updated>2024-02-01T00:00:00+00:00</updated>{entries}</feed>"#
    )
}

/// Minimal HTML page with a title and optional feed link
pub fn html_page(title: &str, feed: Option<&str>) -> String {
    let link = feed
        .map(|href| format!(r#"<link rel="alternate" type="application/rss+xml" href="{href}">"#))
        .unwrap_or_default();
    format!("<html><head><title>{title}</title>{link}</head><body><p>{title}</p></body></html>")
}
