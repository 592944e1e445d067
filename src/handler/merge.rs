//! Insertion-ordered source map for compound handlers

use crate::handler::Handler;
use crate::response::ResponseModel;
use std::sync::Arc;

/// Source URL to the handler that fetched it
///
/// Doubles as the set of sources already fetched: a source is inserted once,
/// even when its fetch failed (stored as `None`), so it is never fetched
/// again. Merging walks the sources in insertion order and the first
/// non-empty value wins.
#[derive(Debug, Default)]
pub struct SourceMap {
    sources: Vec<(String, Option<Box<dyn Handler>>)>,
}

impl SourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.sources.iter().any(|(source, _)| source == url)
    }

    /// Stores the outcome for `url`; returns false if `url` was already present
    pub fn insert(&mut self, url: impl Into<String>, handler: Option<Box<dyn Handler>>) -> bool {
        let url = url.into();
        if self.contains(&url) {
            return false;
        }
        self.sources.push((url, handler));
        true
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn urls(&self) -> Vec<&str> {
        self.sources.iter().map(|(url, _)| url.as_str()).collect()
    }

    pub fn get(&self, url: &str) -> Option<&dyn Handler> {
        self.sources
            .iter()
            .find(|(source, _)| source == url)
            .and_then(|(_, handler)| handler.as_deref())
    }

    /// Handlers of sources that could be fetched, in insertion order
    pub fn handlers(&self) -> impl Iterator<Item = &dyn Handler> {
        self.sources
            .iter()
            .filter_map(|(_, handler)| handler.as_deref())
    }

    /// Responses in insertion order; failed sources are skipped
    pub fn responses(&self) -> Vec<Arc<ResponseModel>> {
        self.handlers().filter_map(|handler| handler.response()).collect()
    }

    /// Response of the first source, if that source produced one
    pub fn first_response(&self) -> Option<Arc<ResponseModel>> {
        self.sources
            .first()
            .and_then(|(_, handler)| handler.as_deref())
            .and_then(|handler| handler.response())
    }

    /// First value `get` returns for any source, in source order
    pub fn first_non_empty<T>(&self, get: impl Fn(&dyn Handler) -> Option<T>) -> Option<T> {
        self.handlers().find_map(get)
    }

    /// First non-empty list `get` returns for any source
    pub fn first_non_empty_list<T>(&self, get: impl Fn(&dyn Handler) -> Vec<T>) -> Vec<T> {
        self.handlers()
            .map(get)
            .find(|items| !items.is_empty())
            .unwrap_or_default()
    }
}
