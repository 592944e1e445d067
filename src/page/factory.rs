//! Content-type sniffing and the parser fallback chain

use crate::page::{DefaultPage, HtmlPage, JsonPage, OpmlPage, Page, RssPage};
use crate::response::ResponseModel;
use tracing::debug;

/// Kinds of page the factory can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageKind {
    Html,
    Rss,
    Opml,
    Json,
    Default,
}

impl PageKind {
    pub fn content_type(self) -> Option<&'static str> {
        match self {
            PageKind::Html => Some("text/html"),
            PageKind::Rss => Some("application/rss+xml"),
            PageKind::Opml => Some("text/x-opml"),
            PageKind::Json => Some("application/json"),
            PageKind::Default => None,
        }
    }

    fn build(self, url: &str, contents: &str) -> Page {
        match self {
            PageKind::Html => Page::Html(HtmlPage::new(url, contents)),
            PageKind::Rss => Page::Rss(RssPage::new(url, contents)),
            PageKind::Opml => Page::Opml(OpmlPage::new(url, contents)),
            PageKind::Json => Page::Json(JsonPage::new(url, contents)),
            PageKind::Default => Page::Default(DefaultPage::new(url, contents)),
        }
    }
}

const HTML_FIRST: [PageKind; 4] = [PageKind::Html, PageKind::Rss, PageKind::Opml, PageKind::Json];
const RSS_FIRST: [PageKind; 4] = [PageKind::Rss, PageKind::Opml, PageKind::Html, PageKind::Json];
const JSON_FIRST: [PageKind; 3] = [PageKind::Json, PageKind::Rss, PageKind::Html];

/// Builds pages out of responses
pub struct PageFactory;

impl PageFactory {
    /// Classifies and wraps the response text
    ///
    /// Declared binary media and responses without text give `None`.
    pub fn get(response: &ResponseModel) -> Option<Page> {
        let contents = response.text().filter(|text| !text.is_empty())?;
        Self::get_with_contents(response, contents)
    }

    /// Same as [`PageFactory::get`], with contents supplied by the caller
    pub fn get_with_contents(response: &ResponseModel, contents: &str) -> Option<Page> {
        let url = if response.request_url.is_empty() {
            response.url.as_str()
        } else {
            response.request_url.as_str()
        };
        let headers = &response.headers;

        if headers.is_binary() {
            debug!("Url:{}. Binary content, no page", url);
            return None;
        }

        let declared: &[PageKind] = if headers.is_html() {
            &HTML_FIRST
        } else if headers.is_rss() {
            &RSS_FIRST
        } else if headers.is_json() {
            &JSON_FIRST
        } else {
            &[]
        };

        let mut tried = Vec::with_capacity(HTML_FIRST.len());
        for kind in declared.iter().chain(HTML_FIRST.iter()) {
            if tried.contains(kind) {
                continue;
            }
            tried.push(*kind);

            let page = kind.build(url, contents);
            if page.is_valid() {
                debug!("Url:{}. Recognized as {:?}", url, kind);
                return Some(page);
            }
        }

        debug!("Url:{}. No parser matched, using default page", url);
        Some(PageKind::Default.build(url, contents))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::rss::tests::rss_with_items;

    fn response(content_type: Option<&str>, text: &str) -> ResponseModel {
        let mut response = ResponseModel::new("https://example.com/x", 200).with_text(text);
        if let Some(content_type) = content_type {
            response.headers.insert("Content-Type", content_type);
        }
        response
    }

    const HTML: &str = "<html><head><title>t</title></head><body>hi</body></html>";

    #[test]
    fn test_declared_html() {
        let page = PageFactory::get(&response(Some("text/html"), HTML)).unwrap();
        assert_eq!(page.kind(), PageKind::Html);
    }

    #[test]
    fn test_rss_mislabelled_as_html() {
        let page = PageFactory::get(&response(Some("text/html"), &rss_with_items("F", 2))).unwrap();
        assert_eq!(page.kind(), PageKind::Rss);
        assert_eq!(page.entries().len(), 2);
    }

    #[test]
    fn test_links_only_from_html() {
        let html = r#"<html><body><a href="/a">a</a><a href="https://b.org/">b</a></body></html>"#;
        let page = PageFactory::get(&response(Some("text/html"), html)).unwrap();
        assert_eq!(page.links_inner(), vec!["https://example.com/a"]);
        assert_eq!(page.links_outer(), vec!["https://b.org/"]);
        assert_eq!(page.domains(), vec!["https://example.com", "https://b.org"]);

        let page = PageFactory::get(&response(Some("text/html"), &rss_with_items("F", 2))).unwrap();
        assert!(page.links().is_empty());
        assert!(page.domains().is_empty());
    }

    #[test]
    fn test_html_mislabelled_as_rss() {
        let page = PageFactory::get(&response(Some("application/xml"), HTML)).unwrap();
        assert_eq!(page.kind(), PageKind::Html);
    }

    #[test]
    fn test_declared_json() {
        let page = PageFactory::get(&response(Some("application/json"), r#"{"title":"x"}"#)).unwrap();
        assert_eq!(page.kind(), PageKind::Json);
    }

    #[test]
    fn test_json_without_content_type() {
        let page = PageFactory::get(&response(None, r#"[{"a": 1}]"#)).unwrap();
        assert_eq!(page.kind(), PageKind::Json);
    }

    #[test]
    fn test_opml_sniffed() {
        let opml = r#"<opml version="2.0"><body><outline xmlUrl="https://a.com/f"/></body></opml>"#;
        let page = PageFactory::get(&response(Some("text/xml"), opml)).unwrap();
        assert_eq!(page.kind(), PageKind::Opml);
    }

    #[test]
    fn test_binary_gives_none() {
        assert!(PageFactory::get(&response(Some("image/png"), "\u{89}PNG")).is_none());
    }

    #[test]
    fn test_unknown_falls_back_to_default() {
        let page = PageFactory::get(&response(Some("text/plain"), "just words")).unwrap();
        assert_eq!(page.kind(), PageKind::Default);
        assert_eq!(page.contents(), "just words");
        assert!(page.content_type().is_none());
    }

    #[test]
    fn test_no_text_gives_none() {
        let response = ResponseModel::new("https://example.com", 200);
        assert!(PageFactory::get(&response).is_none());
    }
}
