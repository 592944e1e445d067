//! Crawler backends
//!
//! A crawler executes one [`RequestSpec`] and always produces one
//! [`ResponseModel`]. Transport failures are encoded in the response status
//! code, never returned as errors.
//!
//! - [`HttpCrawler`]: direct HTTP with a hard total deadline
//! - [`RemoteCrawler`](crate::remote::RemoteCrawler): proxies through a crawling server
//! - [`CrawlerRegistry`]: name to backend, used to bind requests

mod deadline;
mod encoding;
mod http;
mod registry;

pub use deadline::run_with_deadline;
pub use encoding::{decode_body, sniff_charset};
pub use http::{build_http_client, HttpCrawler};
pub use registry::{CrawlerFactory, CrawlerRegistry};

use crate::request::RequestSpec;
use crate::response::ResponseModel;
use crate::status;
use async_trait::async_trait;
use std::fmt;

/// Executes requests
#[async_trait]
pub trait Crawler: Send + Sync + fmt::Debug {
    /// Name the crawler is registered under
    fn name(&self) -> &str;

    /// Runs the request; may be called more than once
    async fn run(&self, request: &RequestSpec) -> ResponseModel;

    /// Releases any held resources
    fn close(&self) {}
}

/// Applies the request's size and content-type policy to a response
///
/// A response over `bytes_limit` becomes [`status::HTTP_STATUS_CODE_FILE_TOO_BIG`],
/// one of a type the request does not accept becomes
/// [`status::HTTP_STATUS_CODE_PAGE_UNSUPPORTED`]. Returns whether the response
/// is still valid.
pub fn check_response(response: &mut ResponseModel, request: &RequestSpec) -> bool {
    if !response.is_valid() {
        return false;
    }

    if let (Some(limit), Some(length)) = (request.bytes_limit, response.content_length()) {
        if length > limit {
            response.status_code = status::HTTP_STATUS_CODE_FILE_TOO_BIG;
            response.add_error(format!(
                "Url:{} Page is too big: {} > {}",
                request.url, length, limit
            ));
            return false;
        }
    }

    if !is_content_type_accepted(response, request) {
        response.status_code = status::HTTP_STATUS_CODE_PAGE_UNSUPPORTED;
        response.add_error(format!(
            "Url:{} Content type not accepted: {}",
            request.url,
            response.content_type().unwrap_or("")
        ));
        return false;
    }

    true
}

/// Responses without a declared type are always accepted
pub fn is_content_type_accepted(response: &ResponseModel, request: &RequestSpec) -> bool {
    if request.accepts_all_types() || response.content_type().is_none() {
        return true;
    }

    let keys = response.headers.content_type_keys();
    request.accepted_type_keys().iter().any(|accepted| {
        keys.iter().any(|key| key == accepted)
            || (accepted == "rss" && keys.iter().any(|key| key == "xml" || key == "atom"))
    })
}
