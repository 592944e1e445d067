//! JSON documents

use crate::page::dates::parse_date;
use crate::response::{calculate_hash, ContentHash};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::sync::OnceLock;

/// A fetched JSON document
#[derive(Debug)]
pub struct JsonPage {
    url: String,
    contents: String,
    parsed: OnceLock<Option<Value>>,
}

impl JsonPage {
    pub fn new(url: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            contents: contents.into(),
            parsed: OnceLock::new(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn contents(&self) -> &str {
        &self.contents
    }

    pub fn value(&self) -> Option<&Value> {
        self.parsed
            .get_or_init(|| serde_json::from_str(&self.contents).ok())
            .as_ref()
    }

    /// Parses, and is a non-empty object or array
    pub fn is_valid(&self) -> bool {
        match self.value() {
            Some(Value::Object(map)) => !map.is_empty(),
            Some(Value::Array(items)) => !items.is_empty(),
            _ => false,
        }
    }

    fn string_field(&self, name: &str) -> Option<String> {
        self.value()?
            .get(name)?
            .as_str()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    pub fn title(&self) -> Option<String> {
        self.string_field("title")
    }

    pub fn description(&self) -> Option<String> {
        self.string_field("description")
    }

    pub fn language(&self) -> Option<String> {
        self.string_field("language")
    }

    pub fn thumbnail(&self) -> Option<String> {
        self.string_field("thumbnail")
    }

    pub fn author(&self) -> Option<String> {
        self.string_field("author")
    }

    /// `tags` as an array of strings, or a comma separated string
    pub fn tags(&self) -> Vec<String> {
        match self.value().and_then(|value| value.get("tags")) {
            Some(Value::Array(tags)) => tags
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            Some(Value::String(tags)) => tags
                .split(',')
                .map(|tag| tag.trim().to_string())
                .filter(|tag| !tag.is_empty())
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn date_published(&self) -> Option<DateTime<Utc>> {
        self.string_field("date_published")
            .and_then(|date| parse_date(&date))
    }

    pub fn body_hash(&self) -> ContentHash {
        calculate_hash(self.contents.as_bytes())
    }
}
