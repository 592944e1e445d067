//! Handlers that merge several sources
//!
//! A channel usually needs two resources: the feed has the entries, the HTML
//! page has the display name. Sources are fetched concurrently and merged in
//! a fixed order, so the result does not depend on which fetch finished first.

use crate::handler::{Handler, HttpPageHandler, SourceMap};
use crate::page::FeedEntry;
use crate::request::RequestSpec;
use crate::resolver::{Resolver, ResolverContext};
use crate::response::{calculate_hash, ContentHash, ResponseModel};
use crate::url::{first_matching_rule, strip_protocol, PathRule};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// URL shapes of a channel site and how to derive its sources
pub trait ChannelRules: Send + Sync + 'static {
    const NAME: &'static str;

    /// Accepted shapes, checked in order against the protocol-stripped URL
    fn rules() -> &'static [PathRule];

    /// Channel code embedded in `url`, if there is one
    fn code_from_url(url: &str) -> Option<String>;

    fn code_to_url(code: &str) -> String;

    fn code_to_feed(code: &str) -> String;

    /// Whether a URL without a code can be resolved by reading the page's feed link
    fn can_discover_code(_url: &str) -> bool {
        false
    }

    /// Site-specific request tweaks, e.g. consent cookies
    fn prepare_request(_request: &mut RequestSpec) {}

    fn canonical_url(_input: &str, code: Option<&str>) -> Option<String> {
        code.map(Self::code_to_url)
    }
}

/// Channel assembled from its feed and its page
pub struct CompoundChannelHandler<R: ChannelRules> {
    request: RequestSpec,
    context: ResolverContext,
    code: Option<String>,
    sources: SourceMap,
    discovery_done: bool,
    _rules: PhantomData<R>,
}

impl<R: ChannelRules> CompoundChannelHandler<R> {
    pub fn new(mut request: RequestSpec, context: ResolverContext) -> Self {
        R::prepare_request(&mut request);
        let code = if Self::matches(&request.url) {
            R::code_from_url(&request.url)
        } else {
            None
        };

        Self {
            request,
            context,
            code,
            sources: SourceMap::new(),
            discovery_done: false,
            _rules: PhantomData,
        }
    }

    fn matches(url: &str) -> bool {
        first_matching_rule(R::rules(), strip_protocol(url)).is_some()
    }

    /// Feed first, then the channel page; the input URL when no code is known
    pub fn channel_sources(&self) -> Vec<String> {
        match &self.code {
            Some(code) => vec![R::code_to_feed(code), R::code_to_url(code)],
            None => vec![self.request.url.clone()],
        }
    }

    pub fn sources(&self) -> &SourceMap {
        &self.sources
    }

    /// Fetches every source not fetched yet, at most `max_workers` at a time
    ///
    /// Results are stored in source order. A failed source is stored as
    /// absent and is not retried.
    pub async fn get_responses(&mut self) -> Vec<Arc<ResponseModel>> {
        if !self.discovery_done {
            self.discovery_done = true;
            if self.code.is_none() && R::can_discover_code(&self.request.url) {
                self.code = self.discover_code().await;
            }
        }

        let mut pending: Vec<String> = Vec::new();
        for source in self.channel_sources() {
            if !self.sources.contains(&source) && !pending.contains(&source) {
                pending.push(source);
            }
        }

        if !pending.is_empty() {
            let semaphore = Arc::new(Semaphore::new(self.context.max_workers().max(1)));
            let mut tasks = JoinSet::new();

            for (index, source) in pending.iter().enumerate() {
                let request = self
                    .request
                    .with_url(source.clone())
                    .with_handler(HttpPageHandler::NAME);
                let context = self.context.clone();
                let semaphore = Arc::clone(&semaphore);

                tasks.spawn(async move {
                    let _permit = semaphore.acquire_owned().await.ok();
                    (index, fetch_source(context, request).await)
                });
            }

            let mut fetched: Vec<Option<Box<dyn Handler>>> =
                std::iter::repeat_with(|| None).take(pending.len()).collect();
            while let Some(joined) = tasks.join_next().await {
                match joined {
                    Ok((index, handler)) => fetched[index] = handler,
                    Err(e) => warn!("{}: source task failed: {}", R::NAME, e),
                }
            }

            for (source, handler) in pending.into_iter().zip(fetched) {
                self.sources.insert(source, handler);
            }
        }

        self.sources.responses()
    }

    /// Reads the code off the feed link of the input page
    ///
    /// The page is fetched through a throwaway resolver and is not kept as a
    /// source.
    async fn discover_code(&self) -> Option<String> {
        let request = self
            .request
            .with_url(self.request.url.clone())
            .with_handler(HttpPageHandler::NAME);
        let handler = fetch_source(self.context.clone(), request).await?;

        let code = handler
            .feeds()
            .iter()
            .find_map(|feed| R::code_from_url(feed));
        debug!("{}: discovered code {:?} for {}", R::NAME, code, self.request.url);
        code
    }

    /// MD5 over the texts of all sources, in source order
    pub fn hash(&self) -> Option<ContentHash> {
        if self.sources.is_empty() {
            return None;
        }
        let mut text = String::new();
        for handler in self.sources.handlers() {
            if let Some(contents) = handler.contents() {
                text.push_str(&contents);
            }
        }
        Some(calculate_hash(text.as_bytes()))
    }
}

async fn fetch_source(context: ResolverContext, request: RequestSpec) -> Option<Box<dyn Handler>> {
    let url = request.url.clone();
    let mut resolver = match Resolver::with_request(context, request) {
        Ok(resolver) => resolver,
        Err(e) => {
            warn!("Url:{} Cannot resolve source: {}", url, e);
            return None;
        }
    };

    if let Err(e) = resolver.get_response().await {
        warn!("Url:{} Source fetch failed: {}", url, e);
        return None;
    }
    resolver.into_handler()
}

impl<R: ChannelRules> fmt::Debug for CompoundChannelHandler<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(R::NAME)
            .field("url", &self.request.url)
            .field("code", &self.code)
            .field("sources", &self.sources.urls())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<R: ChannelRules> Handler for CompoundChannelHandler<R> {
    fn name(&self) -> &'static str {
        R::NAME
    }

    fn url(&self) -> &str {
        &self.request.url
    }

    fn request(&self) -> &RequestSpec {
        &self.request
    }

    fn is_handled_by(&self) -> bool {
        Self::matches(&self.request.url)
    }

    fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    async fn get_response(&mut self) -> Option<Arc<ResponseModel>> {
        self.get_responses().await;
        self.sources.first_response()
    }

    fn response(&self) -> Option<Arc<ResponseModel>> {
        self.sources.first_response()
    }

    fn title(&self) -> Option<String> {
        self.sources.first_non_empty(|h| h.title())
    }

    fn description(&self) -> Option<String> {
        self.sources.first_non_empty(|h| h.description())
    }

    fn author(&self) -> Option<String> {
        self.sources.first_non_empty(|h| h.author())
    }

    fn thumbnail(&self) -> Option<String> {
        self.sources.first_non_empty(|h| h.thumbnail())
    }

    fn language(&self) -> Option<String> {
        self.sources.first_non_empty(|h| h.language())
    }

    fn tags(&self) -> Vec<String> {
        self.sources.first_non_empty_list(|h| h.tags())
    }

    fn date_published(&self) -> Option<DateTime<Utc>> {
        self.sources.first_non_empty(|h| h.date_published())
    }

    fn entries(&self) -> Vec<FeedEntry> {
        self.sources.first_non_empty_list(|h| h.entries())
    }

    /// The code's feed, then every source's feeds, without duplicates
    fn feeds(&self) -> Vec<String> {
        let mut feeds: Vec<String> = self.code.iter().map(|c| R::code_to_feed(c)).collect();
        for handler in self.sources.handlers() {
            for feed in handler.feeds() {
                if !feeds.contains(&feed) {
                    feeds.push(feed);
                }
            }
        }
        feeds
    }

    fn canonical_url(&self) -> Option<String> {
        R::canonical_url(&self.request.url, self.code.as_deref())
    }

    fn contents_hash(&self) -> Option<ContentHash> {
        self.hash()
    }

    fn body_hash(&self) -> Option<ContentHash> {
        self.sources.first_non_empty(|h| h.body_hash())
    }

    fn channel_name(&self) -> Option<String> {
        self.title()
    }

    fn channel_url(&self) -> Option<String> {
        self.code.as_deref().map(R::code_to_url)
    }
}
