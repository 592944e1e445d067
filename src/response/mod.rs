//! Response model
//!
//! A [`ResponseModel`] is produced exactly once per request execution. Its
//! validity is always derived from the status code.

mod headers;

pub use headers::{content_type_keys, ResponseHeaders};

use crate::status::{self, StatusClass};
use serde_json::{json, Map, Value};
use std::time::Duration;

/// MD5 digest used for change detection
pub type ContentHash = [u8; 16];

/// MD5 of arbitrary bytes
pub fn calculate_hash(data: &[u8]) -> ContentHash {
    md5::compute(data).0
}

/// Result of one crawler run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponseModel {
    /// URL actually fetched, after redirects
    pub url: String,
    /// URL that was requested
    pub request_url: String,
    pub status_code: u16,
    pub headers: ResponseHeaders,
    pub text: Option<String>,
    pub binary: Option<Vec<u8>>,
    /// Encoding the text was decoded with
    pub encoding: Option<String>,
    pub crawl_time: Option<Duration>,
    pub errors: Vec<String>,
    /// Content type the page factory settled on, which may differ from the header
    pub recognized_content_type: Option<String>,
    body_hash: Option<ContentHash>,
}

impl ResponseModel {
    pub fn new(url: impl Into<String>, status_code: u16) -> Self {
        let url = url.into();
        Self {
            request_url: url.clone(),
            url,
            status_code,
            ..Self::default()
        }
    }

    /// A failed attempt carrying a single diagnostic
    pub fn failure(url: impl Into<String>, status_code: u16, error: impl Into<String>) -> Self {
        let mut response = Self::new(url, status_code);
        response.add_error(error);
        response
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn add_error(&mut self, error: impl Into<String>) {
        let error = error.into();
        tracing::debug!("{}: {}", self.request_url, error);
        self.errors.push(error);
    }

    pub fn status_class(&self) -> StatusClass {
        status::classify(self.status_code)
    }

    pub fn is_valid(&self) -> bool {
        self.status_class() == StatusClass::Valid
    }

    pub fn is_invalid(&self) -> bool {
        self.status_class() == StatusClass::Invalid
    }

    pub fn is_uncertain(&self) -> bool {
        status::is_status_code_uncertain(self.status_code)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers.content_type()
    }

    /// Content type keys, preferring the recognized type over the header
    pub fn content_type_keys(&self) -> Vec<String> {
        match &self.recognized_content_type {
            Some(recognized) => content_type_keys(recognized),
            None => self.headers.content_type_keys(),
        }
    }

    pub fn content_length(&self) -> Option<u64> {
        self.headers.content_length()
    }

    /// Decoded text, if the body was text
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Hash of the full contents: text when present, raw bytes otherwise
    pub fn hash(&self) -> Option<ContentHash> {
        match (&self.text, &self.binary) {
            (Some(text), _) => Some(calculate_hash(text.as_bytes())),
            (None, Some(binary)) => Some(calculate_hash(binary)),
            (None, None) => None,
        }
    }

    pub fn body_hash(&self) -> Option<ContentHash> {
        self.body_hash
    }

    /// Filled in once the body has been parsed
    pub fn set_body_hash(&mut self, hash: Option<ContentHash>) {
        self.body_hash = hash;
    }
}

/// Serializes a response using the key layout the remote crawler protocol expects
pub fn response_to_json(response: &ResponseModel, with_streams: bool) -> Value {
    let mut data = Map::new();
    data.insert("url".into(), json!(response.url));
    data.insert("request_url".into(), json!(response.request_url));
    data.insert("headers".into(), json!(response.headers));
    data.insert("is_valid".into(), json!(response.is_valid()));
    data.insert("is_invalid".into(), json!(response.is_invalid()));
    data.insert("status_code".into(), json!(response.status_code));
    data.insert(
        "status_code_str".into(),
        json!(status::status_code_to_text(response.status_code)),
    );
    data.insert(
        "crawl_time_s".into(),
        json!(response.crawl_time.map(|t| t.as_secs_f64())),
    );
    data.insert("Content-Type".into(), json!(response.content_type()));
    data.insert(
        "Recognized-Content-Type".into(),
        json!(response.recognized_content_type),
    );
    data.insert("Content-Length".into(), json!(response.content_length()));
    data.insert(
        "Last-Modified".into(),
        json!(response.headers.last_modified().map(|d| d.to_rfc3339())),
    );
    data.insert("Charset".into(), json!(response.encoding));
    data.insert("hash".into(), json!(response.hash().map(hex::encode)));
    data.insert(
        "body_hash".into(),
        json!(response.body_hash().map(hex::encode)),
    );
    data.insert("errors".into(), json!(response.errors));

    if with_streams {
        data.insert("text".into(), json!(response.text));
        data.insert(
            "binary".into(),
            json!(response.binary.as_deref().map(hex::encode)),
        );
    }

    Value::Object(data)
}

/// Rebuilds a response from [`response_to_json`] output
///
/// Missing or mistyped fields fall back to defaults; the status code falls
/// back to [`status::HTTP_STATUS_UNKNOWN`].
pub fn json_to_response(value: &Value) -> ResponseModel {
    let str_field = |name: &str| value.get(name).and_then(Value::as_str).map(str::to_string);

    let url = str_field("url").unwrap_or_default();
    let mut response = ResponseModel::new(url.clone(), status::HTTP_STATUS_UNKNOWN);
    response.request_url = str_field("request_url").unwrap_or(url);
    response.status_code = value
        .get("status_code")
        .and_then(Value::as_u64)
        .and_then(|code| u16::try_from(code).ok())
        .unwrap_or(status::HTTP_STATUS_UNKNOWN);

    if let Some(headers) = value.get("headers").and_then(Value::as_object) {
        for (name, header) in headers {
            if let Some(header) = header.as_str() {
                response.headers.insert(name.clone(), header);
            }
        }
    }

    response.text = str_field("text");
    response.binary = str_field("binary").and_then(|b| hex::decode(b).ok());
    response.encoding = str_field("Charset");
    response.recognized_content_type = str_field("Recognized-Content-Type");
    response.crawl_time = value
        .get("crawl_time_s")
        .and_then(Value::as_f64)
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok());
    response.errors = value
        .get("errors")
        .and_then(Value::as_array)
        .map(|errors| {
            errors
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();
    response.body_hash = str_field("body_hash")
        .and_then(|h| hex::decode(h).ok())
        .and_then(|bytes| ContentHash::try_from(bytes.as_slice()).ok());

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::*;

    #[test]
    fn test_validity_is_derived_from_status() {
        assert!(ResponseModel::new("https://a.com", 200).is_valid());
        assert!(ResponseModel::new("https://a.com", 404).is_invalid());

        let forbidden = ResponseModel::new("https://a.com", HTTP_STATUS_USER_AGENT);
        assert!(!forbidden.is_valid());
        assert!(!forbidden.is_invalid());
        assert!(forbidden.is_uncertain());
    }

    #[test]
    fn test_hash_prefers_text() {
        let mut response = ResponseModel::new("https://a.com", 200).with_text("hello");
        response.binary = Some(vec![1, 2, 3]);
        assert_eq!(response.hash(), Some(calculate_hash(b"hello")));

        response.text = None;
        assert_eq!(response.hash(), Some(calculate_hash(&[1, 2, 3])));

        response.binary = None;
        assert_eq!(response.hash(), None);
    }

    #[test]
    fn test_md5_known_value() {
        assert_eq!(
            hex::encode(calculate_hash(b"")),
            "d41d8cd98f00b204e9800998ecf8427e"
        );
    }

    #[test]
    fn test_failure_records_error() {
        let response = ResponseModel::failure("https://a.com", HTTP_STATUS_CODE_TIMEOUT, "timeout");
        assert_eq!(response.errors, vec!["timeout".to_string()]);
        assert!(response.is_invalid());
    }

    #[test]
    fn test_recognized_type_overrides_header_keys() {
        let mut response =
            ResponseModel::new("https://a.com", 200).with_header("Content-Type", "text/html");
        response.recognized_content_type = Some("application/rss+xml".to_string());
        assert_eq!(response.content_type_keys(), vec!["application", "rss", "xml"]);
    }

    #[test]
    fn test_json_keys() {
        let mut response = ResponseModel::new("https://a.com", 200)
            .with_header("Content-Type", "text/html; charset=utf-8")
            .with_text("<html></html>");
        response.set_body_hash(Some(calculate_hash(b"body")));

        let json = response_to_json(&response, false);
        assert_eq!(json["status_code_str"], "HTTP_STATUS_OK(200)");
        assert_eq!(json["is_valid"], true);
        assert_eq!(json["Content-Type"], "text/html; charset=utf-8");
        assert_eq!(json["hash"], hex::encode(calculate_hash(b"<html></html>")));
        assert!(json.get("text").is_none());
    }

    #[test]
    fn test_json_restores_response() {
        let mut response = ResponseModel::new("https://a.com/feed", 429)
            .with_header("Content-Type", "application/rss+xml")
            .with_text("<rss></rss>");
        response.request_url = "https://a.com/feed/".to_string();
        response.crawl_time = Some(Duration::from_millis(1500));
        response.add_error("slow down");
        response.set_body_hash(Some(calculate_hash(b"x")));

        let restored = json_to_response(&response_to_json(&response, true));
        assert_eq!(restored, response);
    }

    #[test]
    fn test_json_out_of_range_crawl_time_is_dropped() {
        for secs in [1e300, -1.0] {
            let restored = json_to_response(&serde_json::json!({
                "url": "https://a.com",
                "status_code": 200,
                "crawl_time_s": secs,
            }));
            assert_eq!(restored.status_code, 200);
            assert!(restored.crawl_time.is_none(), "{}", secs);
        }
    }

    #[test]
    fn test_json_garbage_gives_unknown_status() {
        let restored = json_to_response(&serde_json::json!({"status_code": "abc"}));
        assert_eq!(restored.status_code, HTTP_STATUS_UNKNOWN);
        assert!(!restored.is_invalid());
    }
}
