//! HTML page metadata extraction
//!
//! The DOM is parsed once, on first access, into a plain [`HtmlMeta`] so the
//! page stays `Send + Sync` and never holds on to the parsed tree.

use crate::page::dates::parse_date;
use crate::response::{calculate_hash, ContentHash};
use crate::url::domain_key;
use chrono::{DateTime, Utc};
use scraper::{ElementRef, Html, Selector};
use std::sync::OnceLock;
use url::Url;

/// Everything pulled out of an HTML document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HtmlMeta {
    pub title: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
    pub thumbnail: Option<String>,
    pub language: Option<String>,
    pub tags: Vec<String>,
    pub date_published: Option<DateTime<Utc>>,
    pub canonical_url: Option<String>,
    pub feeds: Vec<String>,
    pub favicon: Option<String>,
    pub charset: Option<String>,
    /// Text of `<body>`, if the document has one
    pub body_text: Option<String>,
    /// Absolute http(s) targets of `<a href>`, first occurrence order, no fragments
    pub links: Vec<String>,
}

/// A fetched HTML document
#[derive(Debug)]
pub struct HtmlPage {
    url: String,
    contents: String,
    meta: OnceLock<HtmlMeta>,
}

impl HtmlPage {
    pub fn new(url: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            contents: contents.into(),
            meta: OnceLock::new(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn contents(&self) -> &str {
        &self.contents
    }

    /// An `<html>` opening must exist and come before any feed root
    pub fn is_valid(&self) -> bool {
        match (html_tag_position(&self.contents), rss_tag_position(&self.contents)) {
            (Some(html), Some(rss)) => html < rss,
            (Some(_), None) => true,
            _ => false,
        }
    }

    pub fn meta(&self) -> &HtmlMeta {
        self.meta
            .get_or_init(|| extract_meta(&self.url, &self.contents))
    }

    pub fn links(&self) -> &[String] {
        &self.meta().links
    }

    /// Links pointing at the page's own host
    pub fn links_inner(&self) -> Vec<String> {
        let own = domain_key(&self.url).ok();
        self.links()
            .iter()
            .filter(|link| own.is_some() && domain_key(link).ok() == own)
            .cloned()
            .collect()
    }

    /// Links pointing anywhere else
    pub fn links_outer(&self) -> Vec<String> {
        let own = domain_key(&self.url).ok();
        self.links()
            .iter()
            .filter(|link| own.is_none() || domain_key(link).ok() != own)
            .cloned()
            .collect()
    }

    /// `scheme://host` of every linked site, without duplicates
    pub fn domains(&self) -> Vec<String> {
        let mut domains: Vec<String> = Vec::new();
        for link in self.links() {
            let Ok(parsed) = Url::parse(link) else {
                continue;
            };
            let Ok(key) = domain_key(link) else {
                continue;
            };
            let domain = format!("{}://{}", parsed.scheme(), key);
            if !domains.contains(&domain) {
                domains.push(domain);
            }
        }
        domains
    }

    /// MD5 of the body text, or of the whole document when it has no body
    pub fn body_hash(&self) -> ContentHash {
        match &self.meta().body_text {
            Some(body) => calculate_hash(body.as_bytes()),
            None => calculate_hash(self.contents.as_bytes()),
        }
    }
}

/// Position of `<html`, provided the document also has `<body` or `<meta`
pub fn html_tag_position(contents: &str) -> Option<usize> {
    let lower = contents.to_lowercase();
    let html = lower.find("<html")?;
    (lower.contains("<body") || lower.contains("<meta")).then_some(html)
}

/// Position of the first recognizable feed root
pub fn rss_tag_position(contents: &str) -> Option<usize> {
    let lower = contents.to_lowercase();
    let pairs = [("<rss", "<channel"), ("<feed", "<entry"), ("<rdf", "<channel")];
    pairs.iter().find_map(|(root, child)| {
        let position = lower.find(root)?;
        lower.contains(child).then_some(position)
    })
}

fn extract_meta(url: &str, contents: &str) -> HtmlMeta {
    let document = Html::parse_document(contents);
    let base = Url::parse(url).ok();

    let title = og_field(&document, "title")
        .or_else(|| meta_field(&document, "title"))
        .or_else(|| head_field(&document, "title"))
        .or_else(|| og_field(&document, "site_name"))
        .map(|title| title.trim().to_string())
        .filter(|title| !title.is_empty() && !title.contains("Just a moment"));

    let description = og_field(&document, "description")
        .or_else(|| schema_field(&document, "description"))
        .or_else(|| meta_field(&document, "description"))
        .map(|description| description.trim().to_string())
        .filter(|description| !description.is_empty());

    let author = meta_field(&document, "author").or_else(|| og_field(&document, "author"));

    let thumbnail = og_field(&document, "image")
        .or_else(|| schema_field(&document, "thumbnailUrl"))
        .or_else(|| schema_field(&document, "image"))
        .map(|image| absolute_url(base.as_ref(), &image));

    let language = first_attr(&document, "html[lang]", "lang")
        .or_else(|| og_field(&document, "locale"))
        .filter(|language| !language.is_empty());

    let tags = meta_field(&document, "keywords")
        .map(|keywords| split_tags(&keywords))
        .unwrap_or_default();

    let date_published = property_field(&document, "article:published_time")
        .or_else(|| meta_field(&document, "music:release_date"))
        .or_else(|| schema_field(&document, "datePublished"))
        .and_then(|date| parse_date(&date));

    let canonical_url = first_attr(&document, r#"link[rel="canonical"]"#, "href").map(|link| {
        match link.strip_suffix('/') {
            Some(stripped) => stripped.to_string(),
            None => link,
        }
    });

    let mut feeds = Vec::new();
    for feed_type in ["application/rss+xml", "application/atom+xml"] {
        for element in select(&document, "link[type][href]") {
            let matches_type = element
                .value()
                .attr("type")
                .map(|link_type| link_type.contains(feed_type))
                .unwrap_or(false);
            if let (true, Some(href)) = (matches_type, element.value().attr("href")) {
                let feed = absolute_url(base.as_ref(), href);
                if !feeds.contains(&feed) {
                    feeds.push(feed);
                }
            }
        }
    }

    let favicon = select(&document, r#"link[rel~="icon"][href]"#)
        .into_iter()
        .filter_map(|element| element.value().attr("href"))
        .find(|href| !href.trim().is_empty())
        .map(|href| absolute_url(base.as_ref(), href));

    let mut links: Vec<String> = Vec::new();
    for element in select(&document, "a[href]") {
        let Some(link) = element
            .value()
            .attr("href")
            .and_then(|href| web_link(base.as_ref(), href))
        else {
            continue;
        };
        if !links.contains(&link) {
            links.push(link);
        }
    }

    let body_text = select(&document, "body")
        .into_iter()
        .next()
        .map(|body| body.text().collect::<String>());

    HtmlMeta {
        title,
        description,
        author,
        thumbnail,
        language,
        tags,
        date_published,
        canonical_url,
        feeds,
        favicon,
        charset: charset_from_document(&document),
        body_text,
        links,
    }
}

/// Declared charset of an HTML document (`<meta charset>` or `http-equiv`)
pub fn meta_charset(contents: &str) -> Option<String> {
    charset_from_document(&Html::parse_document(contents))
}

fn charset_from_document(document: &Html) -> Option<String> {
    for element in select(document, "meta") {
        for (name, value) in element.value().attrs() {
            if name.eq_ignore_ascii_case("charset") && !value.trim().is_empty() {
                return Some(value.trim().to_lowercase());
            }
            if name.eq_ignore_ascii_case("http-equiv") {
                let content = element.value().attr("content").unwrap_or("").to_lowercase();
                if let Some(index) = content.find("charset") {
                    if let Some((_, charset)) = content[index..].split_once('=') {
                        let charset = charset.trim();
                        if !charset.is_empty() {
                            return Some(charset.to_string());
                        }
                    }
                }
            }
        }
    }
    None
}

fn select<'a>(document: &'a Html, selector: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(selector) {
        Ok(selector) => document.select(&selector).collect(),
        Err(_) => Vec::new(),
    }
}

fn first_attr(document: &Html, selector: &str, attr: &str) -> Option<String> {
    select(document, selector)
        .into_iter()
        .find_map(|element| element.value().attr(attr).map(str::to_string))
}

fn head_field(document: &Html, tag: &str) -> Option<String> {
    select(document, tag)
        .into_iter()
        .next()
        .map(|element| element.text().collect::<String>())
        .filter(|text| !text.trim().is_empty())
}

fn meta_field(document: &Html, name: &str) -> Option<String> {
    first_attr(document, &format!(r#"meta[name="{}"][content]"#, name), "content")
}

fn property_field(document: &Html, property: &str) -> Option<String> {
    first_attr(
        document,
        &format!(r#"meta[property="{}"][content]"#, property),
        "content",
    )
}

/// Open Graph field, see https://ogp.me/
fn og_field(document: &Html, name: &str) -> Option<String> {
    property_field(document, &format!("og:{}", name))
}

/// First `itemprop` value; `link` gives href, `meta` gives content
fn schema_field(document: &Html, itemprop: &str) -> Option<String> {
    let element = select(document, &format!(r#"[itemprop="{}"]"#, itemprop))
        .into_iter()
        .next()?;
    let value = match element.value().name() {
        "link" => element.value().attr("href").map(str::to_string),
        "meta" => element.value().attr("content").map(str::to_string),
        _ => Some(element.text().collect::<String>().trim().to_string()),
    };
    value.filter(|value| !value.is_empty())
}

fn split_tags(keywords: &str) -> Vec<String> {
    keywords
        .split(',')
        .map(|tag| tag.trim().to_string())
        .filter(|tag| !tag.is_empty())
        .collect()
}

/// Absolute http(s) form of `href`; `mailto:`, `javascript:` and the like give None
fn web_link(base: Option<&Url>, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    let mut url = match base {
        Some(base) => base.join(href).ok()?,
        None => Url::parse(href).ok()?,
    };
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return None;
    }
    url.set_fragment(None);
    Some(url.to_string())
}

/// Resolves `href` against the page URL; unresolvable links are kept as-is
pub fn absolute_url(base: Option<&Url>, href: &str) -> String {
    let href = href.trim();
    if href.starts_with("https://") || href.starts_with("http://") {
        return href.to_string();
    }
    base.and_then(|base| base.join(href).ok())
        .map(|url| url.to_string())
        .unwrap_or_else(|| href.to_string())
}
