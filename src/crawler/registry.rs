//! Named crawler backends

use crate::config::Config;
use crate::crawler::{Crawler, HttpCrawler};
use crate::remote::{RemoteCrawler, RemoteServer};
use crate::request::RequestSpec;
use crate::{Result, WebLensError};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Creates a fresh crawler instance
pub type CrawlerFactory = Arc<dyn Fn() -> Arc<dyn Crawler> + Send + Sync>;

/// Maps crawler names to factories
///
/// Binding a request creates one crawler instance; every request copied from
/// it afterwards shares that instance.
#[derive(Clone)]
pub struct CrawlerRegistry {
    factories: Vec<(String, CrawlerFactory)>,
    default_name: String,
}

impl CrawlerRegistry {
    /// Registry with only [`HttpCrawler`]
    pub fn new() -> Self {
        let mut registry = Self {
            factories: Vec::new(),
            default_name: HttpCrawler::NAME.to_string(),
        };
        registry.register(HttpCrawler::NAME, Arc::new(|| Arc::new(HttpCrawler::new())));
        registry
    }

    /// Adds the remote crawler when a server is configured
    pub fn from_config(config: &Config) -> Self {
        let mut registry = Self::new();
        registry.default_name = config.request.crawler.clone();

        if let Some(server) = &config.remote.server {
            let remote = RemoteServer::new(server.clone())
                .with_timeout(std::time::Duration::from_secs(config.remote.timeout_s));
            registry.register(
                RemoteCrawler::NAME,
                Arc::new(move || Arc::new(RemoteCrawler::new(remote.clone()))),
            );
        }
        registry
    }

    /// Adds a factory, replacing one registered under the same name
    pub fn register(&mut self, name: impl Into<String>, factory: CrawlerFactory) {
        let name = name.into();
        match self.factories.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = factory,
            None => self.factories.push((name, factory)),
        }
    }

    pub fn set_default(&mut self, name: impl Into<String>) {
        self.default_name = name.into();
    }

    pub fn default_name(&self) -> &str {
        &self.default_name
    }

    pub fn names(&self) -> Vec<&str> {
        self.factories.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn create(&self, name: &str) -> Result<Arc<dyn Crawler>> {
        self.factories
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, factory)| factory())
            .ok_or_else(|| WebLensError::UnknownCrawler(name.to_string()))
    }

    /// Gives the request a crawler instance unless it already has one
    pub fn bind(&self, request: &mut RequestSpec) -> Result<()> {
        if let Some(crawler) = &request.crawler {
            request.crawler_name = Some(crawler.name().to_string());
            return Ok(());
        }

        let name = request
            .crawler_name
            .clone()
            .unwrap_or_else(|| self.default_name.clone());
        let crawler = self.create(&name)?;
        debug!("Bound crawler {} for {}", name, request.url);
        request.crawler_name = Some(name);
        request.crawler = Some(crawler);
        Ok(())
    }
}

impl Default for CrawlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CrawlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrawlerRegistry")
            .field("names", &self.names())
            .field("default_name", &self.default_name)
            .finish()
    }
}
