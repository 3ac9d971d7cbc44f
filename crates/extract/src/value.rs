// ABOUTME: Helpers over loosely typed JSON: deep path lookup, text coercion, and polymorphic image values.
// ABOUTME: Shared by the JSON API, JSON-LD, and detail-page extractors.

use eventfeed_feed::{clean_text, resolve_image_url};
use serde_json::Value;

use crate::source::FieldPath;

/// Follows `path` through objects (by key) and arrays (by numeric index).
pub fn lookup<'a>(value: &'a Value, path: &FieldPath) -> Option<&'a Value> {
    path.segments()
        .iter()
        .try_fold(value, |current, segment| match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
        .filter(|v| !v.is_null())
}

/// Coerces a scalar JSON value into cleaned text. Objects and arrays yield nothing.
pub fn value_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => clean_text(s),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Text at the first key of `keys` holding a non-empty scalar.
pub fn first_text(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| value.get(*key))
        .find_map(value_text)
}

/// Returns true when a JSON-LD `@type` (string or array) names `expected`.
pub fn has_type(node: &Value, expected: &str) -> bool {
    match node.get("@type") {
        Some(Value::String(s)) => s == expected,
        Some(Value::Array(types)) => types.iter().any(|t| t.as_str() == Some(expected)),
        _ => false,
    }
}

/// The three shapes an image field takes in the wild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageValue {
    PlainUrl(String),
    ObjectWithUrl(String),
    List(Vec<ImageValue>),
}

impl ImageValue {
    /// Classifies a JSON value; anything that cannot carry a URL yields `None`.
    pub fn from_json(value: &Value) -> Option<ImageValue> {
        match value {
            Value::String(s) if !s.trim().is_empty() => Some(ImageValue::PlainUrl(s.trim().to_string())),
            Value::Object(map) => ["url", "contentUrl", "src"]
                .iter()
                .filter_map(|key| map.get(*key))
                .find_map(|v| v.as_str().map(str::trim).filter(|s| !s.is_empty()))
                .map(|s| ImageValue::ObjectWithUrl(s.to_string())),
            Value::Array(items) => {
                let list: Vec<ImageValue> = items.iter().filter_map(ImageValue::from_json).collect();
                if list.is_empty() {
                    None
                } else {
                    Some(ImageValue::List(list))
                }
            }
            _ => None,
        }
    }

    /// The first URL that resolves to an absolute URL against `bases`.
    pub fn resolve(&self, bases: &[&str]) -> String {
        match self {
            ImageValue::PlainUrl(url) | ImageValue::ObjectWithUrl(url) => resolve_image_url(url, bases),
            ImageValue::List(items) => items
                .iter()
                .map(|item| item.resolve(bases))
                .find(|url| !url.is_empty())
                .unwrap_or_default(),
        }
    }
}

/// Normalizes any image-shaped JSON value to an absolute URL, or empty.
pub fn normalize_image(value: Option<&Value>, bases: &[&str]) -> String {
    value
        .and_then(ImageValue::from_json)
        .map(|image| image.resolve(bases))
        .unwrap_or_default()
}
