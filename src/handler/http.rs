//! Plain HTTP page handler

use crate::crawler::{Crawler, HttpCrawler};
use crate::handler::Handler;
use crate::page::{FeedEntry, Page, PageFactory, RssPage};
use crate::request::RequestSpec;
use crate::response::ResponseModel;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Fetches the URL with the bound crawler and parses the body into a [`Page`]
///
/// Only valid responses are parsed, so an error page never lends its title to
/// the result.
#[derive(Debug)]
pub struct HttpPageHandler {
    request: RequestSpec,
    response: Option<Arc<ResponseModel>>,
    page: Option<Page>,
}

impl HttpPageHandler {
    pub const NAME: &'static str = "HttpPageHandler";

    pub fn new(request: RequestSpec) -> Self {
        Self {
            request,
            response: None,
            page: None,
        }
    }

    /// Handler around an already available response
    pub fn with_response(request: RequestSpec, response: ResponseModel) -> Self {
        let mut handler = Self::new(request);
        handler.store(response);
        handler
    }

    fn store(&mut self, mut response: ResponseModel) {
        if response.is_valid() {
            self.page = PageFactory::get(&response);
        }
        if let Some(page) = &self.page {
            response.recognized_content_type = page.content_type().map(str::to_string);
            response.set_body_hash(page.body_hash());
            if response.encoding.is_none() {
                response.encoding = page.charset();
            }
        }
        self.response = Some(Arc::new(response));
    }
}

#[async_trait]
impl Handler for HttpPageHandler {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn url(&self) -> &str {
        &self.request.url
    }

    fn request(&self) -> &RequestSpec {
        &self.request
    }

    fn is_handled_by(&self) -> bool {
        self.request.url.starts_with("https://") || self.request.url.starts_with("http://")
    }

    async fn get_response(&mut self) -> Option<Arc<ResponseModel>> {
        if let Some(response) = &self.response {
            return Some(Arc::clone(response));
        }

        let crawler: Arc<dyn Crawler> = match &self.request.crawler {
            Some(crawler) => Arc::clone(crawler),
            None => Arc::new(HttpCrawler::new()),
        };
        debug!("{} fetching {} with {}", Self::NAME, self.request.url, crawler.name());

        let response = crawler.run(&self.request).await;
        self.store(response);
        self.response.clone()
    }

    fn response(&self) -> Option<Arc<ResponseModel>> {
        self.response.clone()
    }

    fn page(&self) -> Option<&Page> {
        self.page.as_ref()
    }

    /// Feed entries; an HTML page may still carry a feed in its body
    fn entries(&self) -> Vec<FeedEntry> {
        match &self.page {
            Some(Page::Html(html)) => {
                let rss = RssPage::new(html.url(), html.contents());
                if rss.is_valid() {
                    rss.entries()
                } else {
                    Vec::new()
                }
            }
            Some(page) => page.entries(),
            None => Vec::new(),
        }
    }
}
