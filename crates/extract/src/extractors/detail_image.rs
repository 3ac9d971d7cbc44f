// ABOUTME: Recovers a missing item image by fetching the item's own detail page.
// ABOUTME: Prefers og:image, then the image of an Event/Article/WebPage JSON-LD node; never fails.

use std::collections::HashMap;

use eventfeed_feed::resolve_image_url;
use scraper::{Html, Selector};
use serde_json::Value;

use super::jsonld::script_blocks;
use crate::resource::{Fetcher, ACCEPT_HTML};
use crate::value::{has_type, normalize_image};

const IMAGE_NODE_TYPES: &[&str] = &["Event", "Article", "WebPage"];

/// Fetches `url` and mines it for an image. Returns an empty string on any failure.
pub async fn fetch_detail_image(fetcher: &dyn Fetcher, url: &str, user_agent: &str) -> String {
    let headers = HashMap::from([
        ("Accept".to_string(), ACCEPT_HTML.to_string()),
        ("User-Agent".to_string(), user_agent.to_string()),
    ]);
    let response = match fetcher.get(url, &headers).await {
        Ok(response) if response.is_success() => response,
        Ok(response) => {
            tracing::debug!(url, status = response.status, "detail page returned error status");
            return String::new();
        }
        Err(e) => {
            tracing::debug!(url, error = %e, "detail page fetch failed");
            return String::new();
        }
    };
    let page_url = response.final_url.clone();
    image_from_html(&response.text(), &page_url)
}

/// The og:image, else the first resolvable JSON-LD image, else empty.
pub fn image_from_html(html: &str, page_url: &str) -> String {
    if let Some(og) = og_image(html) {
        let resolved = resolve_image_url(&og, &[page_url]);
        if !resolved.is_empty() {
            return resolved;
        }
    }

    for block in script_blocks(html) {
        let Ok(parsed) = serde_json::from_str::<Value>(block.trim()) else {
            continue;
        };
        let candidates: Vec<&Value> = match &parsed {
            Value::Array(items) => items.iter().collect(),
            other => {
                let mut nodes = vec![other];
                if let Some(Value::Array(graph)) = other.get("@graph") {
                    nodes.extend(graph.iter());
                }
                nodes
            }
        };
        let found = candidates
            .into_iter()
            .filter(|node| IMAGE_NODE_TYPES.iter().any(|t| has_type(node, t)))
            .map(|node| normalize_image(node.get("image"), &[page_url]))
            .find(|url| !url.is_empty());
        if let Some(url) = found {
            return url;
        }
    }
    String::new()
}

fn og_image(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(r#"meta[property="og:image"], meta[name="og:image"]"#).ok()?;
    document
        .select(&selector)
        .filter_map(|el| el.value().attr("content"))
        .map(str::trim)
        .find(|content| !content.is_empty())
        .map(str::to_string)
}
