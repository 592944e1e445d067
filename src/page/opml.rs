//! OPML outlines

use crate::page::FeedEntry;
use crate::response::{calculate_hash, ContentHash};
use scraper::{Html, Selector};
use std::sync::OnceLock;

/// One `<outline>` that points at a feed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpmlOutline {
    pub xml_url: String,
    pub title: Option<String>,
}

#[derive(Debug, Default)]
struct ParsedOpml {
    title: Option<String>,
    outlines: Vec<OpmlOutline>,
}

/// A fetched OPML subscription list
#[derive(Debug)]
pub struct OpmlPage {
    url: String,
    contents: String,
    parsed: OnceLock<ParsedOpml>,
}

impl OpmlPage {
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

    pub fn is_valid(&self) -> bool {
        self.contents.to_lowercase().contains("<opml")
    }

    fn parsed(&self) -> &ParsedOpml {
        self.parsed.get_or_init(|| parse_outlines(&self.contents))
    }

    pub fn title(&self) -> Option<String> {
        self.parsed().title.clone()
    }

    pub fn outlines(&self) -> &[OpmlOutline] {
        &self.parsed().outlines
    }

    pub fn feeds(&self) -> Vec<String> {
        self.outlines().iter().map(|o| o.xml_url.clone()).collect()
    }

    pub fn entries(&self) -> Vec<FeedEntry> {
        self.outlines()
            .iter()
            .map(|outline| FeedEntry {
                link: outline.xml_url.clone(),
                title: outline.title.clone(),
                source: self.url.clone(),
                ..FeedEntry::default()
            })
            .collect()
    }

    pub fn body_hash(&self) -> ContentHash {
        calculate_hash(self.feeds().join("\n").as_bytes())
    }
}

fn parse_outlines(contents: &str) -> ParsedOpml {
    // html5ever lowercases attribute names, so `xmlUrl` is matched as `xmlurl`
    let (Ok(outline_selector), Ok(title_selector)) =
        (Selector::parse("outline[xmlurl]"), Selector::parse("title"))
    else {
        return ParsedOpml::default();
    };

    let document = Html::parse_document(contents);
    let title = document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|title| !title.is_empty());

    let outlines = document
        .select(&outline_selector)
        .filter_map(|element| {
            let attrs = element.value();
            let xml_url = attrs.attr("xmlurl")?.trim();
            if xml_url.is_empty() {
                return None;
            }
            Some(OpmlOutline {
                xml_url: xml_url.to_string(),
                title: attrs
                    .attr("title")
                    .or_else(|| attrs.attr("text"))
                    .map(str::to_string),
            })
        })
        .collect();

    ParsedOpml { title, outlines }
}
