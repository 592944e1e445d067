//! Request description
//!
//! A [`RequestSpec`] says what to fetch and under which policy. It carries no
//! network code; the bound crawler is only a shared handle so every request a
//! resolver issues reuses the same backend.

use crate::config::RequestConfig;
use crate::crawler::Crawler;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Default transfer deadline
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// What to fetch and how
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestSpec {
    /// Target URL; only the resolver and handlers rewrite it
    pub url: String,

    #[serde(rename = "timeout_s", with = "timeout_secs")]
    pub timeout: Duration,

    pub user_agent: Option<String>,

    #[serde(rename = "request_headers")]
    pub headers: BTreeMap<String, String>,

    pub cookies: BTreeMap<String, String>,

    pub proxy: Option<String>,

    pub ssl_verify: bool,

    pub respect_robots: bool,

    /// `"all"` or comma separated content-type keys (`"html,rss"`)
    pub accept_types: String,

    pub bytes_limit: Option<u64>,

    /// Status and headers only, the body is never downloaded
    pub ping: bool,

    /// Forces a specific handler instead of matching
    pub handler_name: Option<String>,

    pub crawler_name: Option<String>,

    #[serde(skip)]
    pub crawler: Option<Arc<dyn Crawler>>,
}

impl Default for RequestSpec {
    fn default() -> Self {
        Self {
            url: String::new(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: None,
            headers: BTreeMap::new(),
            cookies: BTreeMap::new(),
            proxy: None,
            ssl_verify: true,
            respect_robots: true,
            accept_types: "all".to_string(),
            bytes_limit: None,
            ping: false,
            handler_name: None,
            crawler_name: None,
            crawler: None,
        }
    }
}

impl RequestSpec {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Builds a request template from configuration defaults
    pub fn from_config(config: &RequestConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.timeout_s),
            user_agent: Some(config.user_agent.clone()),
            headers: config.headers.clone(),
            proxy: config.proxy.clone(),
            ssl_verify: config.ssl_verify,
            respect_robots: config.respect_robots,
            accept_types: config.accept_types.clone(),
            bytes_limit: config.bytes_limit,
            crawler_name: Some(config.crawler.clone()),
            ..Self::default()
        }
    }

    /// Copy of this request aimed at another URL
    ///
    /// The handler pin is dropped; the crawler binding is kept.
    pub fn with_url(&self, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            handler_name: None,
            ..self.clone()
        }
    }

    pub fn with_handler(mut self, name: impl Into<String>) -> Self {
        self.handler_name = Some(name.into());
        self
    }

    pub fn accepts_all_types(&self) -> bool {
        self.accept_types.trim().eq_ignore_ascii_case("all")
    }

    /// Accepted content-type keys, lowercase
    pub fn accepted_type_keys(&self) -> Vec<String> {
        self.accept_types
            .split(',')
            .map(|key| key.trim().to_lowercase())
            .filter(|key| !key.is_empty())
            .collect()
    }
}

impl PartialEq for RequestSpec {
    fn eq(&self, other: &Self) -> bool {
        self.url == other.url
            && self.timeout == other.timeout
            && self.user_agent == other.user_agent
            && self.headers == other.headers
            && self.cookies == other.cookies
            && self.proxy == other.proxy
            && self.ssl_verify == other.ssl_verify
            && self.respect_robots == other.respect_robots
            && self.accept_types == other.accept_types
            && self.bytes_limit == other.bytes_limit
            && self.ping == other.ping
            && self.handler_name == other.handler_name
            && self.crawler_name == other.crawler_name
    }
}

impl fmt::Debug for RequestSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestSpec")
            .field("url", &self.url)
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .field("respect_robots", &self.respect_robots)
            .field("accept_types", &self.accept_types)
            .field("bytes_limit", &self.bytes_limit)
            .field("ping", &self.ping)
            .field("handler_name", &self.handler_name)
            .field("crawler", &self.crawler.as_ref().map(|c| c.name()))
            .finish_non_exhaustive()
    }
}

impl fmt::Display for RequestSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Url:{} Timeout:{:?} Ping:{}",
            self.url, self.timeout, self.ping
        )
    }
}

/// Serializes a request to JSON; the bound crawler is left out
pub fn request_to_json(request: &RequestSpec) -> serde_json::Value {
    // A struct of plain fields and string maps always serializes.
    serde_json::to_value(request).unwrap_or(serde_json::Value::Null)
}

/// Rebuilds a request from [`request_to_json`] output
pub fn json_to_request(value: serde_json::Value) -> crate::Result<RequestSpec> {
    Ok(serde_json::from_value(value)?)
}

/// Encodes a request as a URL query string for the remote crawling server
pub fn request_encode(request: &RequestSpec) -> String {
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    query.append_pair("url", &request.url);
    query.append_pair("timeout_s", &request.timeout.as_secs_f64().to_string());
    query.append_pair("ping", bool_str(request.ping));
    query.append_pair("ssl_verify", bool_str(request.ssl_verify));
    query.append_pair("respect_robots", bool_str(request.respect_robots));
    query.append_pair("accept_types", &request.accept_types);

    if let Some(user_agent) = &request.user_agent {
        query.append_pair("user_agent", user_agent);
    }
    if let Some(limit) = request.bytes_limit {
        query.append_pair("bytes_limit", &limit.to_string());
    }
    if let Some(name) = &request.crawler_name {
        query.append_pair("crawler_name", name);
    }
    if let Some(name) = &request.handler_name {
        query.append_pair("handler_name", name);
    }
    if !request.headers.is_empty() {
        if let Ok(headers) = serde_json::to_string(&request.headers) {
            query.append_pair("request_headers", &headers);
        }
    }

    query.finish()
}

fn bool_str(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

mod timeout_secs {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(timeout: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(timeout.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs)
            .map_err(|e| D::Error::custom(format!("invalid timeout_s {}: {}", secs, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_request() -> RequestSpec {
        let mut request = RequestSpec::new("https://example.com/feed");
        request.timeout = Duration::from_millis(2500);
        request.user_agent = Some("TestAgent/1.0".to_string());
        request
            .headers
            .insert("Accept-Language".to_string(), "en".to_string());
        request
            .cookies
            .insert("CONSENT".to_string(), "YES+".to_string());
        request.proxy = Some("http://proxy.local:3128".to_string());
        request.ssl_verify = false;
        request.respect_robots = false;
        request.accept_types = "html,rss".to_string();
        request.bytes_limit = Some(4096);
        request.ping = true;
        request.handler_name = Some("HttpPageHandler".to_string());
        request.crawler_name = Some("HttpCrawler".to_string());
        request
    }

    #[test]
    fn test_json_round_trip_keeps_every_scalar() {
        let request = sample_request();
        let restored = json_to_request(request_to_json(&request)).unwrap();
        assert_eq!(restored, request);
    }

    #[test]
    fn test_json_uses_timeout_seconds() {
        let json = request_to_json(&sample_request());
        assert_eq!(json["timeout_s"], serde_json::json!(2.5));
        assert!(json.get("crawler").is_none());
    }

    #[test]
    fn test_json_missing_fields_use_defaults() {
        let request = json_to_request(serde_json::json!({"url": "https://a.com"})).unwrap();
        assert_eq!(request.url, "https://a.com");
        assert_eq!(request.timeout, DEFAULT_TIMEOUT);
        assert!(request.accepts_all_types());
        assert!(request.ssl_verify);
    }

    #[test]
    fn test_json_rejects_negative_timeout() {
        let result = json_to_request(serde_json::json!({"url": "x", "timeout_s": -1.0}));
        assert!(result.is_err());
    }

    #[test]
    fn test_json_rejects_oversized_timeout() {
        let result = json_to_request(serde_json::json!({"url": "https://a.com", "timeout_s": 1e30}));
        assert!(result.is_err());

        let result = json_to_request(serde_json::json!({"url": "x", "timeout_s": f64::MAX}));
        assert!(result.is_err());
    }

    #[test]
    fn test_accepted_type_keys() {
        let mut request = RequestSpec::new("https://example.com");
        request.accept_types = " HTML , rss,,".to_string();
        assert!(!request.accepts_all_types());
        assert_eq!(request.accepted_type_keys(), vec!["html", "rss"]);
    }

    #[test]
    fn test_with_url_drops_handler_pin() {
        let request = sample_request();
        let copy = request.with_url("https://example.com/other");
        assert_eq!(copy.url, "https://example.com/other");
        assert!(copy.handler_name.is_none());
        assert_eq!(copy.user_agent, request.user_agent);
    }

    #[test]
    fn test_request_encode() {
        let encoded = request_encode(&sample_request());
        assert!(encoded.starts_with("url=https%3A%2F%2Fexample.com%2Ffeed"));
        assert!(encoded.contains("timeout_s=2.5"));
        assert!(encoded.contains("ping=True"));
        assert!(encoded.contains("bytes_limit=4096"));
        assert!(encoded.contains("handler_name=HttpPageHandler"));
    }
}
