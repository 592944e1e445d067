//! Properties document of a handler
//!
//! The layout matches the sections the remote crawling server answers with,
//! so [`RemoteSections`](crate::remote::RemoteSections) reads both.

use crate::handler::Handler;
use crate::page::FeedEntry;
use crate::request::request_to_json;
use crate::response::{calculate_hash, response_to_json, ContentHash};
use serde_json::{json, Map, Value};

/// Flat property map of a handler
pub fn properties(handler: &dyn Handler) -> Value {
    let request = handler.request();
    let mut data = Map::new();

    data.insert("link".into(), json!(handler.url()));
    data.insert("link_request".into(), json!(request.url));
    data.insert("link_canonical".into(), json!(handler.canonical_url()));
    data.insert("title".into(), json!(handler.title()));
    data.insert("description".into(), json!(handler.description()));
    data.insert("author".into(), json!(handler.author()));
    data.insert("thumbnail".into(), json!(handler.thumbnail()));
    data.insert("language".into(), json!(handler.language()));
    data.insert("tags".into(), json!(handler.tags()));
    data.insert(
        "date_published".into(),
        json!(handler.date_published().map(|d| d.to_rfc3339())),
    );
    data.insert("feeds".into(), json!(handler.feeds()));
    if let Some(name) = handler.channel_name() {
        data.insert("channel_name".into(), json!(name));
    }
    if let Some(url) = handler.channel_url() {
        data.insert("channel_url".into(), json!(url));
    }
    data.insert("status_code".into(), json!(handler.status_code()));
    data.insert("is_valid".into(), json!(handler.is_valid()));
    data.insert(
        "contents_hash".into(),
        json!(handler.contents_hash().map(hex::encode)),
    );
    data.insert(
        "body_hash".into(),
        json!(handler.body_hash().map(hex::encode)),
    );
    data.insert("handler".into(), json!(handler.name()));

    Value::Object(data)
}

/// Hash of the serialized property map, for change detection
pub fn properties_hash(handler: &dyn Handler) -> ContentHash {
    calculate_hash(properties(handler).to_string().as_bytes())
}

/// Full sectioned document: properties, request, response, headers and
/// optionally feed entries
pub fn all_properties(handler: &dyn Handler, with_entries: bool) -> Value {
    let mut sections = vec![
        section("Properties", properties(handler)),
        section("PropertiesHash", json!(hex::encode(properties_hash(handler)))),
        section("Request", request_to_json(handler.request())),
    ];

    if let Some(response) = handler.response() {
        sections.push(section("Streams", json!({ "Text": handler.contents() })));

        let mut data = response_to_json(&response, false);
        if let Some(data) = data.as_object_mut() {
            // A blocked URL never gets this far.
            data.insert("is_allowed".into(), json!(true));
        }
        sections.push(section("Response", data));
        sections.push(section("Headers", json!(response.headers)));
    }

    if with_entries {
        let entries: Vec<Value> = handler.entries().iter().map(entry_to_json).collect();
        sections.push(section("Entries", Value::Array(entries)));
    }

    Value::Array(sections)
}

fn section(name: &str, data: Value) -> Value {
    json!({ "name": name, "data": data })
}

fn entry_to_json(entry: &FeedEntry) -> Value {
    serde_json::to_value(entry).unwrap_or(Value::Null)
}
