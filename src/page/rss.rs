//! RSS / Atom / RDF feeds
//!
//! Parsing is delegated to `feed-rs`. Two recovery paths cover feeds seen in
//! the wild: HTML-escaped RSS embedded in an HTML wrapper, and entries the
//! parser returns without a link.

use crate::page::dates::clamp_to_now;
use crate::page::html::absolute_url;
use crate::page::FeedEntry;
use crate::response::{calculate_hash, ContentHash};
use chrono::{DateTime, Utc};
use feed_rs::model::{Entry, Feed};
use std::sync::OnceLock;
use tracing::{debug, warn};
use url::Url;

#[derive(Debug)]
struct ParsedFeed {
    feed: Option<Feed>,
    /// Contents after unescaping an embedded feed, when that was needed
    unescaped: Option<String>,
}

/// A fetched feed document
#[derive(Debug)]
pub struct RssPage {
    url: String,
    contents: String,
    parsed: OnceLock<ParsedFeed>,
}

impl RssPage {
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

    /// Contents the feed was parsed from, after any unescaping
    pub fn contents(&self) -> &str {
        self.parsed()
            .unescaped
            .as_deref()
            .unwrap_or(&self.contents)
    }

    fn parsed(&self) -> &ParsedFeed {
        self.parsed.get_or_init(|| parse_contents(&self.url, &self.contents))
    }

    pub fn feed(&self) -> Option<&Feed> {
        self.parsed().feed.as_ref()
    }

    /// Entries were parsed, or the contents carry a feed root element
    pub fn is_valid(&self) -> bool {
        if self.feed().map(|feed| !feed.entries.is_empty()).unwrap_or(false) {
            return true;
        }
        let contents = self.contents();
        ["<feed", "<rss", "<rdf"]
            .iter()
            .any(|marker| contents.contains(marker))
    }

    pub fn title(&self) -> Option<String> {
        self.feed()?
            .title
            .as_ref()
            .map(|text| text.content.trim().to_string())
            .filter(|title| !title.is_empty())
    }

    pub fn description(&self) -> Option<String> {
        self.feed()?
            .description
            .as_ref()
            .map(|text| text.content.trim().to_string())
            .filter(|description| !description.is_empty())
    }

    pub fn language(&self) -> Option<String> {
        self.feed()?
            .language
            .clone()
            .filter(|language| !language.is_empty())
    }

    pub fn author(&self) -> Option<String> {
        self.feed()?
            .authors
            .first()
            .map(|person| person.name.trim().to_string())
            .filter(|name| !name.is_empty())
    }

    pub fn thumbnail(&self) -> Option<String> {
        let feed = self.feed()?;
        let image = feed.logo.as_ref().or(feed.icon.as_ref())?;
        let base = Url::parse(&self.url).ok();
        Some(absolute_url(base.as_ref(), &image.uri))
    }

    pub fn tags(&self) -> Vec<String> {
        self.feed()
            .map(|feed| feed.categories.iter().map(|c| c.term.clone()).collect())
            .unwrap_or_default()
    }

    pub fn date_published(&self) -> Option<DateTime<Utc>> {
        self.feed()?.published
    }

    /// A feed is its own feed link
    pub fn feeds(&self) -> Vec<String> {
        vec![self.url.clone()]
    }

    /// Value of the XML declaration's `encoding`, lowercase
    pub fn charset(&self) -> Option<String> {
        declared_encoding(self.contents())
    }

    /// Entry property maps; entries whose link cannot be found are skipped
    pub fn entries(&self) -> Vec<FeedEntry> {
        let Some(feed) = self.feed() else {
            return Vec::new();
        };

        let language = self.language();
        let author = self.author();
        let contents = self.contents();

        feed.entries
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| {
                let link = entry_link(entry).or_else(|| recover_entry_link(contents, index));
                let Some(link) = link else {
                    warn!("Url:{}. Missing link in feed entry {}", self.url, index);
                    return None;
                };

                Some(FeedEntry {
                    link,
                    title: entry
                        .title
                        .as_ref()
                        .map(|text| text.content.trim().to_string()),
                    description: entry_description(entry),
                    thumbnail: entry_thumbnail(entry),
                    language: language.clone(),
                    author: entry
                        .authors
                        .first()
                        .map(|person| person.name.clone())
                        .filter(|name| !name.is_empty())
                        .or_else(|| author.clone()),
                    tags: entry.categories.iter().map(|c| c.term.clone()).collect(),
                    date_published: Some(clamp_to_now(entry.published.or(entry.updated))),
                    source: self.url.clone(),
                })
            })
            .collect()
    }

    /// Hash over the entry list, so cosmetic changes to the channel are ignored
    pub fn body_hash(&self) -> Option<ContentHash> {
        self.feed()?;
        let entries = self.entries();
        if entries.is_empty() {
            return Some(calculate_hash(self.contents().as_bytes()));
        }
        let mut summary = String::new();
        for entry in &entries {
            summary.push_str(&entry.link);
            summary.push('\n');
            summary.push_str(entry.title.as_deref().unwrap_or(""));
            summary.push('\n');
            summary.push_str(entry.description.as_deref().unwrap_or(""));
            summary.push('\n');
        }
        Some(calculate_hash(summary.as_bytes()))
    }
}

fn parse_contents(url: &str, contents: &str) -> ParsedFeed {
    let feed = try_parse(url, contents);
    let has_entries = feed.as_ref().map(|f| !f.entries.is_empty()).unwrap_or(false);

    if !has_entries && contents.contains("html") && contents.contains("rss") {
        if let Some(unescaped) = unescape_embedded_feed(contents) {
            debug!("Url:{}. Parsing feed embedded in HTML", url);
            if let Some(inner) = try_parse(url, &unescaped) {
                return ParsedFeed {
                    feed: Some(inner),
                    unescaped: Some(unescaped),
                };
            }
        }
    }

    ParsedFeed {
        feed,
        unescaped: None,
    }
}

fn try_parse(url: &str, contents: &str) -> Option<Feed> {
    match feed_rs::parser::parse(contents.as_bytes()) {
        Ok(feed) => Some(feed),
        Err(e) => {
            debug!("Url:{}. Feed parse failed: {}", url, e);
            None
        }
    }
}

/// Cuts `&lt;rss ... &gt;` out of an HTML wrapper and unescapes it
fn unescape_embedded_feed(contents: &str) -> Option<String> {
    let start = contents.find("&lt;rss")?;
    let end = contents.rfind("&gt;")?;
    if end <= start {
        return None;
    }
    let escaped = &contents[start..end + "&gt;".len()];
    Some(html_escape::decode_html_entities(escaped).into_owned())
}

fn entry_link(entry: &Entry) -> Option<String> {
    let link = entry
        .links
        .iter()
        .find(|link| matches!(link.rel.as_deref(), None | Some("alternate")))
        .or_else(|| entry.links.first())?;
    let href = link.href.trim();
    (!href.is_empty()).then(|| href.to_string())
}

/// Finds the link of the `index`-th entry directly in the raw XML
///
/// Locates the entry's opening tag by ordinal, then the next `<link`, and
/// takes its `href` attribute or its text up to the next `<`.
pub fn recover_entry_link(contents: &str, index: usize) -> Option<String> {
    let tag = if contents.contains("<item") {
        "<item"
    } else if contents.contains("<entry") {
        "<entry"
    } else {
        return None;
    };

    let (entry_start, _) = contents.match_indices(tag).nth(index)?;
    let link_start = entry_start + contents[entry_start..].find("<link")?;
    let tag_end = link_start + contents[link_start..].find('>')?;
    let link_tag = &contents[link_start..tag_end];

    if let Some(href_start) = link_tag.find("href=") {
        let value = &link_tag[href_start + "href=".len()..];
        let href = match value.chars().next()? {
            quote @ ('"' | '\'') => {
                let value = &value[1..];
                &value[..value.find(quote)?]
            }
            _ => {
                // Unquoted values run to whitespace or to the `/>` closing the tag
                match value.find(char::is_whitespace) {
                    Some(end) => &value[..end],
                    None => value.strip_suffix('/').unwrap_or(value),
                }
            }
        };
        return (!href.trim().is_empty()).then(|| href.trim().to_string());
    }

    let text_end = tag_end + 1 + contents[tag_end + 1..].find('<')?;
    let text = contents[tag_end + 1..text_end].trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn entry_description(entry: &Entry) -> Option<String> {
    entry
        .summary
        .as_ref()
        .map(|text| text.content.clone())
        .or_else(|| entry.content.as_ref().and_then(|c| c.body.clone()))
        .or_else(|| {
            entry
                .media
                .iter()
                .find_map(|media| media.description.as_ref().map(|d| d.content.clone()))
        })
}

fn entry_thumbnail(entry: &Entry) -> Option<String> {
    let thumbnail = entry
        .media
        .iter()
        .find_map(|media| media.thumbnails.first().map(|t| t.image.uri.clone()));
    thumbnail.or_else(|| {
        entry.media.iter().find_map(|media| {
            media
                .content
                .iter()
                .find_map(|content| content.url.as_ref().map(|url| url.to_string()))
        })
    })
}

/// Reads `encoding="..."` from an XML declaration
pub fn declared_encoding(contents: &str) -> Option<String> {
    let declaration_start = contents.find("<?xml")?;
    let declaration_end = declaration_start + contents[declaration_start..].find("?>")?;
    let declaration = &contents[declaration_start..declaration_end];
    let value = &declaration[declaration.find("encoding=")? + "encoding=".len()..];
    let quote = value.chars().next()?;
    let value = value.strip_prefix(quote)?;
    let encoding = &value[..value.find(quote)?];
    (!encoding.is_empty()).then(|| encoding.to_lowercase())
}
