//! Content handlers
//!
//! A handler knows how to fetch and describe one kind of URL. The resolver
//! walks the [`HandlerRegistry`] in order and keeps the first handler whose
//! [`Handler::is_handled_by`] accepts the URL; [`HttpPageHandler`] accepts
//! anything and comes last.
//!
//! Variants:
//! - [`HttpPageHandler`]: one request, one page
//! - [`CanonicalHandler`]: rewrites equivalent URL shapes into one canonical URL
//! - [`CompoundChannelHandler`]: merges several sources fetched concurrently

mod canonical;
mod compound;
mod http;
mod merge;
mod odysee;
mod properties;
mod registry;
mod youtube;

pub use canonical::{CanonicalHandler, CanonicalRules};
pub use compound::{ChannelRules, CompoundChannelHandler};
pub use http::HttpPageHandler;
pub use merge::SourceMap;
pub use odysee::{
    OdyseeChannelHandler, OdyseeChannelRules, OdyseeVideoHandler, OdyseeVideoRules,
};
pub use properties::{all_properties, properties, properties_hash};
pub use registry::{HandlerBuilder, HandlerEntry, HandlerRegistry};
pub use youtube::{
    YouTubeChannelHandler, YouTubeChannelRules, YouTubeVideoHandler, YouTubeVideoRules,
};

use crate::page::{FeedEntry, Page};
use crate::request::RequestSpec;
use crate::response::{ContentHash, ResponseModel};
use crate::status;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;

/// Fetches and describes a URL
///
/// Getters never fail: an attribute that is not available is `None` or
/// empty. Only [`Handler::get_response`] touches the network; every getter
/// works on what has been fetched so far.
#[async_trait]
pub trait Handler: Send + Sync + fmt::Debug {
    /// Registry name, e.g. `"HttpPageHandler"`
    fn name(&self) -> &'static str;

    /// URL the handler works with, after any rewriting
    fn url(&self) -> &str;

    fn request(&self) -> &RequestSpec;

    fn is_handled_by(&self) -> bool;

    /// Site-specific identifier, if the handler resolved one
    fn code(&self) -> Option<&str> {
        None
    }

    /// Fetches on first call; later calls return the stored response
    async fn get_response(&mut self) -> Option<Arc<ResponseModel>>;

    /// Response fetched so far
    fn response(&self) -> Option<Arc<ResponseModel>>;

    /// Parsed page of the response, if any
    fn page(&self) -> Option<&Page> {
        None
    }

    fn contents(&self) -> Option<String> {
        self.response()?.text().map(str::to_string)
    }

    fn title(&self) -> Option<String> {
        self.page()?.title()
    }

    fn description(&self) -> Option<String> {
        self.page()?.description()
    }

    fn author(&self) -> Option<String> {
        self.page()?.author()
    }

    fn thumbnail(&self) -> Option<String> {
        self.page()?.thumbnail()
    }

    fn language(&self) -> Option<String> {
        self.page()?.language()
    }

    fn tags(&self) -> Vec<String> {
        self.page().map(Page::tags).unwrap_or_default()
    }

    fn date_published(&self) -> Option<DateTime<Utc>> {
        self.page()?.date_published()
    }

    fn entries(&self) -> Vec<FeedEntry> {
        self.page().map(Page::entries).unwrap_or_default()
    }

    fn feeds(&self) -> Vec<String> {
        self.page().map(Page::feeds).unwrap_or_default()
    }

    fn canonical_url(&self) -> Option<String> {
        self.page()?.canonical_url()
    }

    /// Hash of the whole response body
    fn contents_hash(&self) -> Option<ContentHash> {
        self.response()?.hash()
    }

    /// Hash of the meaningful part of the body
    fn body_hash(&self) -> Option<ContentHash> {
        self.response()?.body_hash()
    }

    fn status_code(&self) -> u16 {
        self.response()
            .map(|response| response.status_code)
            .unwrap_or(status::HTTP_STATUS_UNKNOWN)
    }

    fn is_valid(&self) -> bool {
        let Some(response) = self.response() else {
            return false;
        };
        response.is_valid() && self.page().map(Page::is_valid).unwrap_or(true)
    }

    fn is_invalid(&self) -> bool {
        self.response()
            .map(|response| response.is_invalid())
            .unwrap_or(false)
    }

    /// Display name of the channel, for handlers that represent one
    fn channel_name(&self) -> Option<String> {
        None
    }

    fn channel_url(&self) -> Option<String> {
        None
    }
}
