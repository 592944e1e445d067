//! Typed pages
//!
//! A [`Page`] wraps the decoded body of a response and exposes one property
//! surface regardless of what the body turned out to be. [`PageFactory`]
//! decides which kind it is.

pub mod dates;
mod factory;
pub mod html;
pub mod json;
pub mod opml;
pub mod rss;

pub use factory::{PageFactory, PageKind};
pub use html::{HtmlMeta, HtmlPage};
pub use json::JsonPage;
pub use opml::{OpmlOutline, OpmlPage};
pub use rss::RssPage;

use crate::response::{calculate_hash, ContentHash};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One item of a feed (or outline of an OPML list)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedEntry {
    pub link: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
    pub language: Option<String>,
    pub author: Option<String>,
    pub tags: Vec<String>,
    pub date_published: Option<DateTime<Utc>>,
    /// URL of the feed the entry came from
    pub source: String,
}

/// Body nobody could parse; only the raw contents are available
#[derive(Debug)]
pub struct DefaultPage {
    url: String,
    contents: String,
}

impl DefaultPage {
    pub fn new(url: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            contents: contents.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn contents(&self) -> &str {
        &self.contents
    }
}

#[derive(Debug)]
pub enum Page {
    Html(HtmlPage),
    Rss(RssPage),
    Opml(OpmlPage),
    Json(JsonPage),
    Default(DefaultPage),
}

impl Page {
    pub fn kind(&self) -> PageKind {
        match self {
            Page::Html(_) => PageKind::Html,
            Page::Rss(_) => PageKind::Rss,
            Page::Opml(_) => PageKind::Opml,
            Page::Json(_) => PageKind::Json,
            Page::Default(_) => PageKind::Default,
        }
    }

    /// Content type to record as the recognized type of the response
    pub fn content_type(&self) -> Option<&'static str> {
        self.kind().content_type()
    }

    pub fn url(&self) -> &str {
        match self {
            Page::Html(page) => page.url(),
            Page::Rss(page) => page.url(),
            Page::Opml(page) => page.url(),
            Page::Json(page) => page.url(),
            Page::Default(page) => page.url(),
        }
    }

    pub fn contents(&self) -> &str {
        match self {
            Page::Html(page) => page.contents(),
            Page::Rss(page) => page.contents(),
            Page::Opml(page) => page.contents(),
            Page::Json(page) => page.contents(),
            Page::Default(page) => page.contents(),
        }
    }

    pub fn is_valid(&self) -> bool {
        match self {
            Page::Html(page) => page.is_valid(),
            Page::Rss(page) => page.is_valid(),
            Page::Opml(page) => page.is_valid(),
            Page::Json(page) => page.is_valid(),
            Page::Default(_) => true,
        }
    }

    pub fn title(&self) -> Option<String> {
        match self {
            Page::Html(page) => page.meta().title.clone(),
            Page::Rss(page) => page.title(),
            Page::Opml(page) => page.title(),
            Page::Json(page) => page.title(),
            Page::Default(_) => None,
        }
    }

    pub fn description(&self) -> Option<String> {
        match self {
            Page::Html(page) => page.meta().description.clone(),
            Page::Rss(page) => page.description(),
            Page::Json(page) => page.description(),
            Page::Opml(_) | Page::Default(_) => None,
        }
    }

    pub fn author(&self) -> Option<String> {
        match self {
            Page::Html(page) => page.meta().author.clone(),
            Page::Rss(page) => page.author(),
            Page::Json(page) => page.author(),
            Page::Opml(_) | Page::Default(_) => None,
        }
    }

    pub fn thumbnail(&self) -> Option<String> {
        match self {
            Page::Html(page) => page.meta().thumbnail.clone(),
            Page::Rss(page) => page.thumbnail(),
            Page::Json(page) => page.thumbnail(),
            Page::Opml(_) | Page::Default(_) => None,
        }
    }

    pub fn language(&self) -> Option<String> {
        match self {
            Page::Html(page) => page.meta().language.clone(),
            Page::Rss(page) => page.language(),
            Page::Json(page) => page.language(),
            Page::Opml(_) | Page::Default(_) => None,
        }
    }

    pub fn tags(&self) -> Vec<String> {
        match self {
            Page::Html(page) => page.meta().tags.clone(),
            Page::Rss(page) => page.tags(),
            Page::Json(page) => page.tags(),
            Page::Opml(_) | Page::Default(_) => Vec::new(),
        }
    }

    pub fn date_published(&self) -> Option<DateTime<Utc>> {
        match self {
            Page::Html(page) => page.meta().date_published,
            Page::Rss(page) => page.date_published(),
            Page::Json(page) => page.date_published(),
            Page::Opml(_) | Page::Default(_) => None,
        }
    }

    /// Feed links the page advertises
    pub fn feeds(&self) -> Vec<String> {
        match self {
            Page::Html(page) => page.meta().feeds.clone(),
            Page::Rss(page) => page.feeds(),
            Page::Opml(page) => page.feeds(),
            Page::Json(_) | Page::Default(_) => Vec::new(),
        }
    }

    /// Absolute web links found in the page body
    pub fn links(&self) -> Vec<String> {
        match self {
            Page::Html(page) => page.links().to_vec(),
            _ => Vec::new(),
        }
    }

    pub fn links_inner(&self) -> Vec<String> {
        match self {
            Page::Html(page) => page.links_inner(),
            _ => Vec::new(),
        }
    }

    pub fn links_outer(&self) -> Vec<String> {
        match self {
            Page::Html(page) => page.links_outer(),
            _ => Vec::new(),
        }
    }

    pub fn domains(&self) -> Vec<String> {
        match self {
            Page::Html(page) => page.domains(),
            _ => Vec::new(),
        }
    }

    pub fn entries(&self) -> Vec<FeedEntry> {
        match self {
            Page::Rss(page) => page.entries(),
            Page::Opml(page) => page.entries(),
            Page::Html(_) | Page::Json(_) | Page::Default(_) => Vec::new(),
        }
    }

    pub fn canonical_url(&self) -> Option<String> {
        match self {
            Page::Html(page) => page.meta().canonical_url.clone(),
            _ => None,
        }
    }

    /// Charset the document declares about itself
    pub fn charset(&self) -> Option<String> {
        match self {
            Page::Html(page) => page.meta().charset.clone(),
            Page::Rss(page) => page.charset(),
            _ => None,
        }
    }

    /// Hash of the part of the document that matters for change detection
    pub fn body_hash(&self) -> Option<ContentHash> {
        match self {
            Page::Html(page) => Some(page.body_hash()),
            Page::Rss(page) => page.body_hash(),
            Page::Opml(page) => Some(page.body_hash()),
            Page::Json(page) => Some(page.body_hash()),
            Page::Default(page) => Some(calculate_hash(page.contents().as_bytes())),
        }
    }
}
