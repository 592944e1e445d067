//! Body decoding
//!
//! The charset is taken from the first of: the `Content-Type` header, the
//! document's own declaration (`<meta charset>` or the XML declaration), a
//! lone `charset="utf-8"` / `encoding="utf-8"` occurrence, and finally UTF-8.

use crate::page::html::meta_charset;
use crate::page::rss::declared_encoding;
use encoding_rs::{Encoding, UTF_8};

/// Decodes `bytes`, returning the text and the label of the encoding used
pub fn decode_body(bytes: &[u8], header_charset: Option<&str>) -> (String, String) {
    let encoding = header_charset
        .and_then(lookup)
        .or_else(|| {
            let provisional = String::from_utf8_lossy(bytes);
            sniff_charset(&provisional).as_deref().and_then(lookup)
        })
        .unwrap_or(UTF_8);

    let (text, used, _had_errors) = encoding.decode(bytes);
    (text.into_owned(), used.name().to_lowercase())
}

/// Charset the document declares about itself
pub fn sniff_charset(contents: &str) -> Option<String> {
    let declared = if contents.trim_start().starts_with("<?xml") {
        declared_encoding(contents)
    } else {
        meta_charset(contents)
    };

    declared.or_else(|| {
        let lower = contents.to_lowercase();
        ["charset=\"utf-8\"", "encoding=\"utf-8\""]
            .iter()
            .any(|needle| lower.matches(needle).count() == 1)
            .then(|| "utf-8".to_string())
    })
}

fn lookup(label: &str) -> Option<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes())
}
