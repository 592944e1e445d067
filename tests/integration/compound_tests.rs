//! Channel handlers merging a feed and a page

use crate::support::{atom_feed, html_page, FixtureCrawler};
use weblens::{FetchOutcome, Handler, Resolver};
use std::time::{Duration, Instant};

const CHANNEL: &str = "https://www.youtube.com/channel/UCabc";
const FEED: &str = "https://www.youtube.com/feeds/videos.xml?channel_id=UCabc";

fn channel_fixture() -> std::sync::Arc<FixtureCrawler> {
    let crawler = FixtureCrawler::new();
    crawler.serve(FEED, 200, "application/atom+xml", atom_feed("Channel feed", 13));
    crawler.serve(CHANNEL, 200, "text/html", html_page("Channel page", Some(FEED)));
    crawler
}

#[tokio::test]
async fn test_channel_merges_feed_entries_and_title() {
    let crawler = channel_fixture();
    let mut resolver = Resolver::new(crawler.context(), CHANNEL).unwrap();

    let outcome = resolver.get_response().await.unwrap();
    assert!(matches!(outcome, FetchOutcome::Fetched(_)));

    let handler = resolver.handler().unwrap();
    assert_eq!(handler.name(), "YouTubeChannelHandler");
    assert_eq!(handler.entries().len(), 13);
    // The feed comes first in source order and has a title.
    assert_eq!(handler.title().as_deref(), Some("Channel feed"));
    assert_eq!(handler.channel_name().as_deref(), Some("Channel feed"));
    assert_eq!(handler.channel_url().as_deref(), Some(CHANNEL));
    assert_eq!(handler.feeds(), vec![FEED.to_string()]);
    assert!(handler.contents_hash().is_some());
    assert!(handler.is_valid());
}

#[tokio::test]
async fn test_page_title_used_when_feed_has_none() {
    let crawler = channel_fixture();
    crawler.serve(FEED, 200, "application/atom+xml", atom_feed("", 2));

    let mut resolver = Resolver::new(crawler.context(), CHANNEL).unwrap();
    resolver.get_response().await.unwrap();

    let handler = resolver.handler().unwrap();
    assert_eq!(handler.title().as_deref(), Some("Channel page"));
    assert_eq!(handler.entries().len(), 2);
}

#[tokio::test]
async fn test_no_source_is_fetched_twice() {
    let crawler = channel_fixture();
    let mut resolver = Resolver::new(crawler.context(), CHANNEL).unwrap();

    resolver.get_response().await.unwrap();
    resolver.get_response().await.unwrap();
    if let Some(handler) = resolver.handler_mut() {
        handler.get_response().await;
        handler.get_response().await;
    }

    assert_eq!(crawler.fetch_count(FEED), 1);
    assert_eq!(crawler.fetch_count(CHANNEL), 1);
    assert_eq!(crawler.total_fetches(), 2);
}

#[tokio::test]
async fn test_slow_feed_still_wins_merge() {
    let crawler = channel_fixture();
    crawler.delay(FEED, Duration::from_millis(300));
    crawler.delay(CHANNEL, Duration::from_millis(50));

    let mut resolver = Resolver::new(crawler.context(), CHANNEL).unwrap();
    resolver.get_response().await.unwrap();

    // The page finishes first, but merging follows source order.
    let handler = resolver.handler().unwrap();
    assert_eq!(handler.title().as_deref(), Some("Channel feed"));
    assert_eq!(handler.entries().len(), 13);
    assert_eq!(handler.entries()[0].link, "https://www.youtube.com/watch?v=v0");
}

#[tokio::test]
async fn test_sources_are_fetched_concurrently() {
    let crawler = channel_fixture();
    crawler.delay(FEED, Duration::from_millis(500));
    crawler.delay(CHANNEL, Duration::from_millis(500));

    let mut resolver = Resolver::new(crawler.context(), CHANNEL).unwrap();
    let start = Instant::now();
    resolver.get_response().await.unwrap();
    let elapsed = start.elapsed();

    assert!(elapsed < Duration::from_millis(900), "took {:?}", elapsed);
    assert_eq!(crawler.fetch_count(FEED), 1);
    assert_eq!(crawler.fetch_count(CHANNEL), 1);
}

#[tokio::test]
async fn test_failed_source_is_not_retried() {
    let crawler = FixtureCrawler::new();
    crawler.serve(CHANNEL, 200, "text/html", html_page("Channel page", None));

    let mut resolver = Resolver::new(crawler.context(), CHANNEL).unwrap();
    resolver.get_response().await.unwrap();
    if let Some(handler) = resolver.handler_mut() {
        handler.get_response().await;
    }

    let handler = resolver.handler().unwrap();
    assert_eq!(crawler.fetch_count(FEED), 1);
    assert!(handler.entries().is_empty());
    assert_eq!(handler.title().as_deref(), Some("Channel page"));
}

#[tokio::test]
async fn test_handle_discovers_channel_code() {
    let crawler = channel_fixture();
    let handle = "https://www.youtube.com/@somebody";
    crawler.serve(handle, 200, "text/html", html_page("Somebody", Some(FEED)));

    let mut resolver = Resolver::new(crawler.context(), handle).unwrap();
    resolver.get_response().await.unwrap();

    let handler = resolver.handler().unwrap();
    assert_eq!(handler.code(), Some("UCabc"));
    assert_eq!(handler.entries().len(), 13);
    assert_eq!(crawler.fetch_count(handle), 1);
    assert_eq!(crawler.fetch_count(FEED), 1);
    assert_eq!(crawler.fetch_count(CHANNEL), 1);
}

#[tokio::test]
async fn test_odysee_channel() {
    let crawler = FixtureCrawler::new();
    let feed = "https://odysee.com/$/rss/@chan:1";
    crawler.serve(feed, 200, "application/rss+xml", atom_feed("Odysee channel", 4));
    crawler.serve("https://odysee.com/@chan:1", 200, "text/html", html_page("Chan", None));

    let mut resolver = Resolver::new(crawler.context(), "https://odysee.com/@chan:1").unwrap();
    resolver.get_response().await.unwrap();

    let handler = resolver.handler().unwrap();
    assert_eq!(handler.name(), "OdyseeChannelHandler");
    assert_eq!(handler.entries().len(), 4);
    assert_eq!(handler.title().as_deref(), Some("Odysee channel"));
}
