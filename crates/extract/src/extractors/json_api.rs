// ABOUTME: Extracts events from a remote JSON API response.
// ABOUTME: Locates the event list via a configured path or common envelopes, then reads fields by override or heuristic.

use eventfeed_feed::{absolute_url, EventDraft, EventRecord};
use serde_json::Value;

use super::SourceContext;
use crate::error::ExtractError;
use crate::resource::ACCEPT_JSON;
use crate::source::{FieldMap, FieldPath};
use crate::value::{first_text, lookup, normalize_image, value_text};

/// Envelope keys tried, in order, when no list path is configured.
const ENVELOPE_KEYS: &[&str] = &["events", "data", "items", "results"];

const TITLE_KEYS: &[&str] = &["title", "name"];
const LINK_KEYS: &[&str] = &["url", "link"];
const DATE_KEYS: &[&str] = &["start_date", "start", "date"];
const IMAGE_KEYS: &[&str] = &["image", "featured_image", "images"];

pub async fn extract(cx: &SourceContext<'_>) -> Result<Vec<EventRecord>, ExtractError> {
    let api = cx.locator("FetchJson")?;
    let body = cx.fetch_text(api, ACCEPT_JSON, "FetchJson").await?;
    let document: Value = serde_json::from_str(&body)
        .map_err(|e| ExtractError::parse(api, "ParseJson", Some(e.into())))?;

    let drafts = drafts_from_document(&document, cx.config.map.as_ref(), api);
    Ok(cx.finish_drafts(drafts, api))
}

/// Reads one draft per event-like object in `document`.
pub fn drafts_from_document(document: &Value, map: Option<&FieldMap>, api: &str) -> Vec<EventDraft> {
    let empty = FieldMap::default();
    let map = map.unwrap_or(&empty);
    event_list(document, map.path.as_ref())
        .iter()
        .map(|object| draft_from_object(object, map, api))
        .collect()
}

/// The list of event objects: the configured path if it names an array, else an
/// envelope array, else the document itself when it is an array.
pub fn event_list<'a>(document: &'a Value, path: Option<&FieldPath>) -> &'a [Value] {
    let located = match path.filter(|p| !p.is_empty()) {
        Some(path) => lookup(document, path).and_then(Value::as_array),
        None => ENVELOPE_KEYS
            .iter()
            .filter_map(|key| document.get(*key))
            .find_map(Value::as_array),
    };
    located
        .or_else(|| document.as_array())
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn draft_from_object(object: &Value, map: &FieldMap, api: &str) -> EventDraft {
    let title = field_text(object, map.title.as_ref(), TITLE_KEYS);
    let link = field_text(object, map.link.as_ref(), LINK_KEYS);
    let date = field_text(object, map.date.as_ref(), DATE_KEYS);
    let venue = match map.venue.as_ref() {
        Some(path) => lookup(object, path).and_then(value_text),
        None => lookup(object, &FieldPath::parse("venue.name"))
            .and_then(value_text)
            .or_else(|| object.get("venue").and_then(value_text)),
    }
    .unwrap_or_default();

    let image_value = match map.image.as_ref() {
        Some(path) => lookup(object, path),
        None => IMAGE_KEYS
            .iter()
            .filter_map(|key| object.get(*key))
            .find(|v| !v.is_null()),
    };
    let resolved_link = if link.is_empty() {
        String::new()
    } else {
        absolute_url(&link, api)
    };
    let image = normalize_image(image_value, &[resolved_link.as_str(), api]);

    EventDraft {
        title,
        link,
        date,
        venue,
        image,
        summary: String::new(),
    }
}

fn field_text(object: &Value, path: Option<&FieldPath>, defaults: &[&str]) -> String {
    match path {
        Some(path) => lookup(object, path).and_then(value_text),
        None => first_text(object, defaults),
    }
    .unwrap_or_default()
}
