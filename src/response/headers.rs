use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Response headers with case-insensitive lookup
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResponseHeaders {
    headers: BTreeMap<String, String>,
}

impl ResponseHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.headers
            .retain(|existing, _| !existing.eq_ignore_ascii_case(&name));
        self.headers.insert(name, value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.headers.iter()
    }

    pub fn content_type(&self) -> Option<&str> {
        self.get("content-type")
    }

    /// Splits the content type into keys
    ///
    /// `application/rss+xml; charset=utf-8` becomes `["application", "rss", "xml"]`.
    pub fn content_type_keys(&self) -> Vec<String> {
        self.content_type()
            .map(content_type_keys)
            .unwrap_or_default()
    }

    /// Charset parameter of the content type, without quotes
    pub fn charset(&self) -> Option<String> {
        let content_type = self.content_type()?;
        content_type.split(';').skip(1).find_map(|param| {
            let (key, value) = param.split_once('=')?;
            if !key.trim().eq_ignore_ascii_case("charset") {
                return None;
            }
            let value = value.trim().trim_matches(|c| c == '"' || c == '\'');
            (!value.is_empty()).then(|| value.to_lowercase())
        })
    }

    pub fn content_length(&self) -> Option<u64> {
        self.get("content-length")?.trim().parse().ok()
    }

    pub fn last_modified(&self) -> Option<DateTime<Utc>> {
        let value = self.get("last-modified")?;
        DateTime::parse_from_rfc2822(value.trim())
            .ok()
            .map(|date| date.with_timezone(&Utc))
    }

    pub fn location(&self) -> Option<&str> {
        self.get("location").filter(|value| !value.is_empty())
    }

    fn content_type_contains(&self, needle: &str) -> bool {
        self.content_type()
            .map(|value| value.to_lowercase().contains(needle))
            .unwrap_or(false)
    }

    pub fn is_html(&self) -> bool {
        self.content_type_contains("html")
    }

    /// RSS, Atom and plain XML all count as feeds
    pub fn is_rss(&self) -> bool {
        self.content_type_contains("rss") || self.content_type_contains("xml")
    }

    pub fn is_json(&self) -> bool {
        self.content_type_contains("json")
    }

    /// Declared media that no page type can parse
    pub fn is_binary(&self) -> bool {
        ["image", "audio", "video", "font"]
            .iter()
            .any(|kind| self.content_type_contains(kind))
    }

    /// Text-like content that should be decoded rather than kept as bytes
    pub fn is_text(&self) -> bool {
        match self.content_type() {
            None => true,
            Some(_) => {
                !self.is_binary()
                    && (self.content_type_contains("text")
                        || self.content_type_contains("application")
                        || self.content_type_contains("xml"))
            }
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ResponseHeaders {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Self::new();
        for (name, value) in iter {
            headers.insert(name, value);
        }
        headers
    }
}

/// Splits a raw content type into lowercase keys
pub fn content_type_keys(content_type: &str) -> Vec<String> {
    let main = content_type.split(';').next().unwrap_or("");
    main.replace('+', "/")
        .split('/')
        .map(|key| key.trim().to_lowercase())
        .filter(|key| !key.is_empty())
        .collect()
}
