//! Client for a remote crawling server
//!
//! The server takes a request as URL query parameters and answers with a JSON
//! array of named sections (`Properties`, `Response`, `Streams`, `Entries`,
//! `Headers`, `PropertiesHash`). Any failure on the way is "no data"; nothing
//! here returns an error.

use crate::crawler::Crawler;
use crate::request::{request_encode, RequestSpec};
use crate::response::{json_to_response, ResponseModel};
use crate::status;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Extra time granted on top of the request timeout, for the server's own overhead
const SERVER_GRACE: Duration = Duration::from_secs(5);

/// Decoded reply of the crawling server
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteSections(Value);

impl RemoteSections {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn value(&self) -> &Value {
        &self.0
    }

    /// Data of the section called `name`
    pub fn read_section(&self, name: &str) -> Option<&Value> {
        self.0.as_array()?.iter().find_map(|section| {
            if section.get("name")?.as_str()? == name {
                section.get("data")
            } else {
                None
            }
        })
    }

    pub fn properties(&self) -> Option<&Value> {
        self.read_section("Properties")
    }

    pub fn entries(&self) -> Vec<Value> {
        self.read_section("Entries")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default()
    }

    /// Rebuilds the response, taking its text from the `Streams` section
    pub fn response(&self) -> Option<ResponseModel> {
        let mut response = json_to_response(self.read_section("Response")?);
        if let Some(text) = self
            .read_section("Streams")
            .and_then(|streams| streams.get("Text"))
            .and_then(Value::as_str)
        {
            response.text = Some(text.to_string());
        }
        Some(response)
    }
}

/// Crawling server endpoint
#[derive(Debug, Clone)]
pub struct RemoteServer {
    server: String,
    timeout: Duration,
    client: Client,
}

impl RemoteServer {
    pub fn new(server: impl Into<String>) -> Self {
        Self {
            server: server.into().trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(30),
            client: Client::new(),
        }
    }

    /// Deadline for calls made without a request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    /// Everything the server knows about the URL
    pub async fn get_getj(&self, request: &RequestSpec) -> Option<RemoteSections> {
        self.call("getj", request).await.map(RemoteSections::new)
    }

    pub async fn get_feedsj(&self, request: &RequestSpec) -> Option<RemoteSections> {
        self.call("feedsj", request).await.map(RemoteSections::new)
    }

    pub async fn get_socialj(&self, request: &RequestSpec) -> Option<RemoteSections> {
        self.call("socialj", request).await.map(RemoteSections::new)
    }

    /// Whether the server reports the URL as reachable
    pub async fn get_pingj(&self, request: &RequestSpec) -> Option<bool> {
        self.call("pingj", request).await?.get("status")?.as_bool()
    }

    async fn call(&self, endpoint: &str, request: &RequestSpec) -> Option<Value> {
        let link = format!("{}/{}?{}", self.server, endpoint, request_encode(request));
        let timeout = if request.timeout.is_zero() {
            self.timeout
        } else {
            request.timeout.saturating_add(SERVER_GRACE)
        };
        debug!("Remote server: Calling {}", link);

        let response = match self.client.get(&link).timeout(timeout).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("Url:{} Remote error: {}", link, e);
                return None;
            }
        };

        if !response.status().is_success() {
            warn!("Url:{} Remote error. Status {}", link, response.status());
            return None;
        }

        let text = match response.text().await {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => {
                warn!("Url:{} Remote error. No text", link);
                return None;
            }
            Err(e) => {
                warn!("Url:{} Remote error: {}", link, e);
                return None;
            }
        };

        let value: Value = match serde_json::from_str(&text) {
            Ok(value) => value,
            Err(e) => {
                warn!("Url:{} Remote error. Invalid JSON: {}", link, e);
                return None;
            }
        };

        if value.get("success").and_then(Value::as_bool) == Some(false) {
            warn!("Url:{} Remote error. Not a success", link);
            return None;
        }

        Some(value)
    }
}

/// Crawler that delegates the transfer to a crawling server
#[derive(Debug, Clone)]
pub struct RemoteCrawler {
    server: RemoteServer,
}

impl RemoteCrawler {
    pub const NAME: &'static str = "RemoteCrawler";

    pub fn new(server: RemoteServer) -> Self {
        Self { server }
    }
}

#[async_trait]
impl Crawler for RemoteCrawler {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn run(&self, request: &RequestSpec) -> ResponseModel {
        let Some(sections) = self.server.get_getj(request).await else {
            return ResponseModel::failure(
                &request.url,
                status::HTTP_STATUS_CODE_SERVER_ERROR,
                format!("Url:{} Remote server returned no data", request.url),
            );
        };

        match sections.response() {
            Some(mut response) => {
                if response.request_url.is_empty() {
                    response.request_url = request.url.clone();
                }
                response
            }
            None => ResponseModel::failure(
                &request.url,
                status::HTTP_STATUS_CODE_SERVER_ERROR,
                format!("Url:{} Remote server reply has no response section", request.url),
            ),
        }
    }
}
