// ABOUTME: Extracts Event nodes from the JSON-LD blocks embedded in a rendered page.
// ABOUTME: Each block parses independently; arrays, singletons, @graph, and nested event lists are flattened.

use eventfeed_feed::{absolute_url, EventDraft, EventRecord};
use scraper::{Html, Selector};
use serde_json::Value;

use super::SourceContext;
use crate::error::ExtractError;
use crate::page::Page;
use crate::value::{first_text, has_type, normalize_image, value_text};

const EVENT_TYPE: &str = "Event";

/// Navigates to the source page, settles, and reads its structured data.
pub async fn extract(
    page: &mut dyn Page,
    cx: &SourceContext<'_>,
) -> Result<Vec<EventRecord>, ExtractError> {
    let url = cx.locator("NavigateJsonLd")?;
    page.goto(url, cx.options.navigation_timeout)
        .await
        .map_err(|e| ExtractError::page(url, "NavigateJsonLd", Some(e.into())))?;
    tokio::time::sleep(cx.config.settle_delay(cx.options.default_wait_ms)).await;

    let html = page
        .content()
        .await
        .map_err(|e| ExtractError::page(url, "ReadContent", Some(e.into())))?;
    Ok(records_from_html(&html, cx, url))
}

/// Event records from every JSON-LD block in `html`.
pub fn records_from_html(html: &str, cx: &SourceContext<'_>, page_url: &str) -> Vec<EventRecord> {
    let blocks = script_blocks(html);
    let drafts = event_nodes(&blocks)
        .into_iter()
        .map(|node| draft_from_node(&node, page_url));
    cx.finish_drafts(drafts, page_url)
}

/// Text of every `application/ld+json` script element.
pub fn script_blocks(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("script[type]") else {
        return Vec::new();
    };
    document
        .select(&selector)
        .filter(|el| {
            el.value()
                .attr("type")
                .is_some_and(|t| t.trim().eq_ignore_ascii_case("application/ld+json"))
        })
        .map(|el| el.text().collect::<String>())
        .collect()
}

/// Parses each block, skipping malformed ones, and collects Event-typed nodes.
pub fn event_nodes(blocks: &[String]) -> Vec<Value> {
    let mut events = Vec::new();
    for (index, block) in blocks.iter().enumerate() {
        let parsed: Value = match serde_json::from_str(block.trim()) {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!(block = index, error = %e, "skipping malformed JSON-LD block");
                continue;
            }
        };
        for node in flatten(&parsed) {
            if has_type(node, EVENT_TYPE) {
                events.push(node.clone());
            }
            events.extend(nested_events(node).cloned());
        }
    }
    events
}

/// Top-level array items or the singleton, plus any `@graph` members.
fn flatten(value: &Value) -> Vec<&Value> {
    let top: Vec<&Value> = match value {
        Value::Array(items) => items.iter().collect(),
        Value::Object(_) => vec![value],
        _ => Vec::new(),
    };
    let mut nodes = Vec::with_capacity(top.len());
    for node in top {
        nodes.push(node);
        if let Some(Value::Array(graph)) = node.get("@graph") {
            nodes.extend(graph.iter());
        }
    }
    nodes
}

fn nested_events(node: &Value) -> impl Iterator<Item = &Value> {
    let list: &[Value] = match node.get("event") {
        Some(Value::Array(items)) => items,
        Some(single @ Value::Object(_)) => std::slice::from_ref(single),
        _ => &[],
    };
    list.iter().filter(|event| has_type(event, EVENT_TYPE))
}

fn draft_from_node(node: &Value, page_url: &str) -> EventDraft {
    let link = first_text(node, &["url"]).unwrap_or_default();
    let resolved_link = if link.is_empty() {
        page_url.to_string()
    } else {
        absolute_url(&link, page_url)
    };
    let venue = match node.get("location") {
        Some(Value::Array(places)) => places
            .iter()
            .find_map(|place| place.get("name").and_then(value_text)),
        Some(place) => place.get("name").and_then(value_text),
        None => None,
    }
    .unwrap_or_default();

    EventDraft {
        title: first_text(node, &["name"]).unwrap_or_default(),
        link,
        date: first_text(node, &["startDate", "startTime"]).unwrap_or_default(),
        venue,
        image: normalize_image(node.get("image"), &[resolved_link.as_str(), page_url]),
        summary: String::new(),
    }
}
