//! URL resolution
//!
//! A [`Resolver`] takes one URL through the whole pipeline: canonicalize,
//! bind a crawler, pick a handler from the registry, check robots.txt and
//! fetch. Everything it needs from outside is carried by a
//! [`ResolverContext`], which is cheap to clone and is handed down to
//! compound handlers so their sub-fetches run through the same machinery.

use crate::config::Config;
use crate::crawler::CrawlerRegistry;
use crate::handler::{Handler, HandlerRegistry, HttpPageHandler};
use crate::request::RequestSpec;
use crate::response::ResponseModel;
use crate::robots::{DomainCache, RobotsSource};
use crate::url::canonicalize_url;
use crate::{Result, UrlError};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Default number of concurrent sub-fetches of a compound handler
pub const DEFAULT_MAX_WORKERS: usize = 4;

/// Shared collaborators of every resolver
#[derive(Debug, Clone)]
pub struct ResolverContext {
    handlers: Arc<HandlerRegistry>,
    crawlers: Arc<CrawlerRegistry>,
    domain_cache: Option<Arc<DomainCache>>,
    template: RequestSpec,
    max_workers: usize,
}

impl Default for ResolverContext {
    fn default() -> Self {
        Self {
            handlers: Arc::new(HandlerRegistry::new()),
            crawlers: Arc::new(CrawlerRegistry::new()),
            domain_cache: None,
            template: RequestSpec::default(),
            max_workers: DEFAULT_MAX_WORKERS,
        }
    }
}

impl ResolverContext {
    /// Default handlers, [`HttpCrawler`](crate::crawler::HttpCrawler), no robots cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Context wired from configuration, robots cache included
    pub fn from_config(config: &Config) -> Self {
        let context = Self {
            handlers: Arc::new(HandlerRegistry::new()),
            crawlers: Arc::new(CrawlerRegistry::from_config(config)),
            domain_cache: None,
            template: RequestSpec::from_config(&config.request),
            max_workers: config.compound.max_workers,
        };

        let cache = DomainCache::new(config.domain_cache.capacity, Arc::new(context.clone()))
            .with_respect_robots(config.request.respect_robots);
        info!(
            "Resolver ready: crawler={}, robots cache capacity={}",
            context.crawlers.default_name(),
            cache.capacity()
        );
        context.with_domain_cache(Arc::new(cache))
    }

    pub fn with_handlers(mut self, handlers: HandlerRegistry) -> Self {
        self.handlers = Arc::new(handlers);
        self
    }

    pub fn with_crawlers(mut self, crawlers: CrawlerRegistry) -> Self {
        self.crawlers = Arc::new(crawlers);
        self
    }

    pub fn with_domain_cache(mut self, cache: Arc<DomainCache>) -> Self {
        self.domain_cache = Some(cache);
        self
    }

    /// Request every resolved URL starts from
    pub fn with_template(mut self, template: RequestSpec) -> Self {
        self.template = template;
        self
    }

    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers.max(1);
        self
    }

    /// Adds a robots cache that fetches robots.txt through this context
    ///
    /// Must be called after the other builders; the cache captures the
    /// context as it is at this point.
    pub fn enable_robots_cache(self, capacity: usize) -> Self {
        let cache = DomainCache::new(capacity, Arc::new(self.clone()));
        self.with_domain_cache(Arc::new(cache))
    }

    pub fn handlers(&self) -> &HandlerRegistry {
        &self.handlers
    }

    pub fn crawlers(&self) -> &CrawlerRegistry {
        &self.crawlers
    }

    pub fn domain_cache(&self) -> Option<&Arc<DomainCache>> {
        self.domain_cache.as_ref()
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    pub fn request_for_url(&self, url: impl Into<String>) -> RequestSpec {
        self.template.with_url(url)
    }

    fn without_domain_cache(&self) -> Self {
        Self {
            domain_cache: None,
            ..self.clone()
        }
    }
}

/// robots.txt is fetched like any page, but never checked against itself
#[async_trait]
impl RobotsSource for ResolverContext {
    async fn fetch_robots(&self, robots_url: &str) -> Option<String> {
        let mut request = self
            .request_for_url(robots_url)
            .with_handler(HttpPageHandler::NAME);
        request.respect_robots = false;
        request.accept_types = "all".to_string();

        let mut resolver = match Resolver::with_request(self.without_domain_cache(), request) {
            Ok(resolver) => resolver,
            Err(e) => {
                warn!("Url:{} Cannot fetch robots: {}", robots_url, e);
                return None;
            }
        };

        match resolver.get_response().await {
            Ok(FetchOutcome::Fetched(response)) if response.is_valid() => response.text.clone(),
            _ => None,
        }
    }
}

/// What a fetch ended with
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    Fetched(Arc<ResponseModel>),
    /// robots.txt disallows the URL; nothing was fetched
    Blocked,
    /// The handler produced no response
    NoData,
}

impl FetchOutcome {
    pub fn is_blocked(&self) -> bool {
        matches!(self, FetchOutcome::Blocked)
    }

    pub fn response(&self) -> Option<&Arc<ResponseModel>> {
        match self {
            FetchOutcome::Fetched(response) => Some(response),
            _ => None,
        }
    }
}

/// Resolves one URL to a handler and its response
///
/// Resolution and fetching each happen at most once; repeated calls return
/// the stored handler and outcome.
pub struct Resolver {
    context: ResolverContext,
    request: RequestSpec,
    handler: Option<Box<dyn Handler>>,
    outcome: Option<FetchOutcome>,
    /// Whether the crawler was bound here rather than inherited
    owns_crawler: bool,
}

impl Resolver {
    /// Resolver for `url` using the context's request template
    pub fn new(context: ResolverContext, url: &str) -> Result<Self> {
        let request = context.request_for_url(url);
        Self::with_request(context, request)
    }

    /// Resolver for a prepared request
    ///
    /// The URL is canonicalized here, once. An empty URL or one with a scheme
    /// other than http(s) fails before anything is fetched.
    pub fn with_request(context: ResolverContext, mut request: RequestSpec) -> Result<Self> {
        if request.url.trim().is_empty() {
            return Err(UrlError::Empty.into());
        }
        request.url = canonicalize_url(&request.url)?;

        let owns_crawler = request.crawler.is_none();
        context.crawlers.bind(&mut request)?;

        Ok(Self {
            context,
            request,
            handler: None,
            outcome: None,
            owns_crawler,
        })
    }

    pub fn context(&self) -> &ResolverContext {
        &self.context
    }

    pub fn request(&self) -> &RequestSpec {
        &self.request
    }

    /// Current URL; after resolution this is the handler's URL
    pub fn url(&self) -> &str {
        &self.request.url
    }

    /// Picks the handler for the URL
    ///
    /// A pinned handler name is built directly. Otherwise the registry is
    /// walked in order and the first handler that accepts the URL wins, with
    /// [`HttpPageHandler`] as the fallback.
    pub fn resolve(&mut self) -> Result<&dyn Handler> {
        if self.handler.is_none() {
            let handler = self.select_handler()?;
            debug!(
                "Url:{} resolved by {} to {}",
                self.request.url,
                handler.name(),
                handler.url()
            );
            self.request.url = handler.url().to_string();
            self.handler = Some(handler);
        }

        match self.handler.as_deref() {
            Some(handler) => Ok(handler),
            None => Err(UrlError::Malformed(self.request.url.clone()).into()),
        }
    }

    fn select_handler(&self) -> Result<Box<dyn Handler>> {
        let handlers = &self.context.handlers;

        if let Some(name) = &self.request.handler_name {
            return handlers.build(name, self.request.clone(), self.context.clone());
        }

        for entry in handlers.entries() {
            let handler = (entry.build)(self.request.clone(), self.context.clone());
            if handler.is_handled_by() {
                return Ok(handler);
            }
        }
        Ok(Box::new(HttpPageHandler::new(self.request.clone())))
    }

    pub fn handler(&self) -> Option<&dyn Handler> {
        self.handler.as_deref()
    }

    pub fn handler_mut(&mut self) -> Option<&mut (dyn Handler + 'static)> {
        self.handler.as_deref_mut()
    }

    pub fn into_handler(mut self) -> Option<Box<dyn Handler>> {
        self.handler.take()
    }

    /// Whether robots.txt lets the current URL be fetched
    ///
    /// Without a robots cache everything is allowed. A cache failure is
    /// logged and treated as allowed.
    pub async fn is_allowed(&self) -> bool {
        let Some(cache) = &self.context.domain_cache else {
            return true;
        };
        match cache.is_allowed(&self.request.url).await {
            Ok(allowed) => allowed,
            Err(e) => {
                warn!("Url:{} Robots check failed: {}", self.request.url, e);
                true
            }
        }
    }

    /// Resolves, checks robots.txt and fetches, once
    pub async fn get_response(&mut self) -> Result<FetchOutcome> {
        if let Some(outcome) = &self.outcome {
            return Ok(outcome.clone());
        }

        self.resolve()?;

        let outcome = if self.request.respect_robots && !self.is_allowed().await {
            info!("Url:{} Blocked by robots.txt", self.request.url);
            FetchOutcome::Blocked
        } else {
            let response = match self.handler.as_mut() {
                Some(handler) => handler.get_response().await,
                None => None,
            };
            match response {
                Some(response) => {
                    if !response.is_valid() {
                        warn!(
                            "Url:{} Invalid response: {}",
                            self.request.url, response.status_code
                        );
                    }
                    FetchOutcome::Fetched(response)
                }
                None => FetchOutcome::NoData,
            }
        };

        self.outcome = Some(outcome.clone());
        Ok(outcome)
    }
}

impl Drop for Resolver {
    fn drop(&mut self) {
        if self.owns_crawler {
            if let Some(crawler) = &self.request.crawler {
                crawler.close();
            }
        }
    }
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("url", &self.request.url)
            .field("handler", &self.handler.as_ref().map(|h| h.name()))
            .field("outcome", &self.outcome)
            .finish_non_exhaustive()
    }
}
