//! Ordered handler registry

use crate::handler::{
    Handler, HttpPageHandler, OdyseeChannelHandler, OdyseeVideoHandler, YouTubeChannelHandler,
    YouTubeVideoHandler,
};
use crate::request::RequestSpec;
use crate::resolver::ResolverContext;
use crate::{Result, WebLensError};

/// Builds a handler for a request
pub type HandlerBuilder = fn(RequestSpec, ResolverContext) -> Box<dyn Handler>;

#[derive(Debug, Clone, Copy)]
pub struct HandlerEntry {
    pub name: &'static str,
    pub build: HandlerBuilder,
}

impl HandlerEntry {
    pub const fn new(name: &'static str, build: HandlerBuilder) -> Self {
        Self { name, build }
    }
}

/// Handlers in matching order
///
/// Specific handlers come first; [`HttpPageHandler`] is the catch-all and
/// stays last unless entries are pushed after it.
#[derive(Debug, Clone)]
pub struct HandlerRegistry {
    entries: Vec<HandlerEntry>,
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self {
            entries: vec![
                HandlerEntry::new("YouTubeVideoHandler", build_youtube_video),
                HandlerEntry::new("OdyseeVideoHandler", build_odysee_video),
                HandlerEntry::new("OdyseeChannelHandler", build_odysee_channel),
                HandlerEntry::new("YouTubeChannelHandler", build_youtube_channel),
                HandlerEntry::new(HttpPageHandler::NAME, build_http_page),
            ],
        }
    }
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with no handlers at all
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn entries(&self) -> &[HandlerEntry] {
        &self.entries
    }

    pub fn find(&self, name: &str) -> Option<&HandlerEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|entry| entry.name).collect()
    }

    /// Inserts `entry` right before the handler called `before`
    pub fn insert_before(&mut self, before: &str, entry: HandlerEntry) -> Result<()> {
        let index = self
            .entries
            .iter()
            .position(|e| e.name == before)
            .ok_or_else(|| WebLensError::UnknownHandler(before.to_string()))?;
        self.entries.insert(index, entry);
        Ok(())
    }

    pub fn push(&mut self, entry: HandlerEntry) {
        self.entries.push(entry);
    }

    /// Builds the handler called `name`
    pub fn build(
        &self,
        name: &str,
        request: RequestSpec,
        context: ResolverContext,
    ) -> Result<Box<dyn Handler>> {
        let entry = self
            .find(name)
            .ok_or_else(|| WebLensError::UnknownHandler(name.to_string()))?;
        Ok((entry.build)(request, context))
    }
}

fn build_youtube_video(request: RequestSpec, _context: ResolverContext) -> Box<dyn Handler> {
    Box::new(YouTubeVideoHandler::new(request))
}

fn build_odysee_video(request: RequestSpec, _context: ResolverContext) -> Box<dyn Handler> {
    Box::new(OdyseeVideoHandler::new(request))
}

fn build_odysee_channel(request: RequestSpec, context: ResolverContext) -> Box<dyn Handler> {
    Box::new(OdyseeChannelHandler::new(request, context))
}

fn build_youtube_channel(request: RequestSpec, context: ResolverContext) -> Box<dyn Handler> {
    Box::new(YouTubeChannelHandler::new(request, context))
}

fn build_http_page(request: RequestSpec, _context: ResolverContext) -> Box<dyn Handler> {
    Box::new(HttpPageHandler::new(request))
}
