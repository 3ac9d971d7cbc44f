// ABOUTME: Extracts events from a rendered page by resolving item and per-field selector candidates.
// ABOUTME: Reloads once when nothing matched and fills missing images from item detail pages.

use std::collections::HashMap;

use eventfeed_feed::image_utils::{background_image_url, first_srcset_url};
use eventfeed_feed::{absolute_url, clean_text, resolve_image_url, EventDraft, EventRecord};
use scraper::{ElementRef, Html, Selector};

use super::detail_image::fetch_detail_image;
use super::SourceContext;
use crate::error::ExtractError;
use crate::page::{Page, PageConditioner};
use crate::selector::{compile_candidates, first_value, resolve_selector};
use crate::source::Selectors;

/// Image attributes in priority order, before `srcset` and inline styles.
const IMAGE_ATTRS: &[&str] = &["src", "data-src", "data-original", "data-lazy", "data-image"];

/// Result of one navigate-and-scrape pass.
struct Attempt {
    items_found: usize,
    records: Vec<EventRecord>,
}

/// Navigates, conditions, and scrapes; reloads once if no items were found.
///
/// Returns a `NoSelectorMatch` error when no item candidate ever matched.
pub async fn extract(
    page: &mut dyn Page,
    cx: &SourceContext<'_>,
    conditioner: &dyn PageConditioner,
) -> Result<Vec<EventRecord>, ExtractError> {
    let url = cx.locator("NavigateDom")?;
    let headers = HashMap::from([(
        "Accept-Language".to_string(),
        "en-US,en;q=0.9".to_string(),
    )]);
    if let Err(e) = page.set_extra_headers(headers).await {
        tracing::debug!(source = %cx.config.key, error = %e, "could not set page headers");
    }

    match attempt(page, cx, conditioner, url).await {
        Ok(first) if first.items_found > 0 => Ok(first.records),
        Err(e) if !e.is_no_selector_match() => Err(e),
        _ => {
            tracing::info!(source = %cx.config.key, "no items on first pass, reloading");
            attempt(page, cx, conditioner, url).await.map(|a| a.records)
        }
    }
}

async fn attempt(
    page: &mut dyn Page,
    cx: &SourceContext<'_>,
    conditioner: &dyn PageConditioner,
    url: &str,
) -> Result<Attempt, ExtractError> {
    page.goto(url, cx.options.navigation_timeout)
        .await
        .map_err(|e| ExtractError::page(url, "NavigateDom", Some(e.into())))?;
    tokio::time::sleep(cx.config.settle_delay(cx.options.default_wait_ms)).await;
    if let Err(e) = conditioner.condition(page).await {
        tracing::debug!(source = %cx.config.key, error = %e, "page conditioning failed");
    }

    let item_selector = resolve_selector(
        page,
        &cx.config.selectors.item_candidates(),
        cx.options.selector_timeout,
        cx.options.poll_interval,
    )
    .await
    .ok_or_else(|| ExtractError::no_selector_match(&cx.config.key, "ResolveItems"))?;
    tracing::debug!(source = %cx.config.key, selector = %item_selector, "item selector resolved");

    let html = page
        .content()
        .await
        .map_err(|e| ExtractError::page(url, "ReadContent", Some(e.into())))?;
    let drafts = drafts_from_html(&html, &item_selector, &cx.config.selectors, url);
    let items_found = drafts.len();

    let mut selected = cx.select_drafts(drafts, url);
    if cx.options.detail_images {
        fill_detail_images(&mut selected, cx, url).await;
    }
    let ctx = cx.record_context(url);
    Ok(Attempt {
        items_found,
        records: selected.into_iter().map(|draft| draft.finish(&ctx)).collect(),
    })
}

async fn fill_detail_images(drafts: &mut [EventDraft], cx: &SourceContext<'_>, page_url: &str) {
    for draft in drafts.iter_mut().filter(|d| d.image.is_empty() && !d.link.trim().is_empty()) {
        let detail_url = absolute_url(&draft.link, page_url);
        draft.image = fetch_detail_image(cx.fetcher, &detail_url, &cx.options.user_agent).await;
    }
}

/// One draft per matched item element that has a title or a link.
pub fn drafts_from_html(
    html: &str,
    item_selector: &str,
    selectors: &Selectors,
    page_url: &str,
) -> Vec<EventDraft> {
    let Ok(items) = Selector::parse(item_selector) else {
        return Vec::new();
    };
    let title = compile_candidates(&selectors.title_candidates());
    let link = compile_candidates(&selectors.link_candidates());
    let date = compile_candidates(&selectors.date_candidates());
    let image = compile_candidates(&selectors.image_candidates());

    let document = Html::parse_document(html);
    document
        .select(&items)
        .map(|item| EventDraft {
            title: first_value(item, &title, element_text).unwrap_or_default(),
            link: first_value(item, &link, |el| attr(el, "href"))
                .or_else(|| attr(item, "href"))
                .unwrap_or_default(),
            date: first_value(item, &date, |el| element_text(el).or_else(|| attr(el, "datetime")))
                .unwrap_or_default(),
            venue: String::new(),
            image: first_value(item, &image, image_source)
                .map(|src| resolve_image_url(&src, &[page_url]))
                .unwrap_or_default(),
            summary: String::new(),
        })
        .filter(|draft| !draft.is_blank())
        .collect()
}

fn element_text(el: ElementRef<'_>) -> Option<String> {
    Some(clean_text(&el.text().collect::<String>())).filter(|t| !t.is_empty())
}

fn attr(el: ElementRef<'_>, name: &str) -> Option<String> {
    el.value()
        .attr(name)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn image_source(el: ElementRef<'_>) -> Option<String> {
    IMAGE_ATTRS
        .iter()
        .find_map(|name| attr(el, name))
        .or_else(|| attr(el, "srcset").and_then(|s| first_srcset_url(&s)))
        .or_else(|| attr(el, "style").and_then(|s| background_image_url(&s)))
}
