// ABOUTME: Extracts entries from RSS 2.0, RSS 1.0 (RDF), and Atom feeds via feed-rs.
// ABOUTME: A small quick-xml pass keeps the raw date text per entry, which feed-rs only exposes parsed.

use eventfeed_feed::image_utils::first_img_src;
use eventfeed_feed::{clean_text, resolve_image_url, resolve_url, strip_html, EventDraft, EventRecord};
use feed_rs::model::{Entry, Feed, FeedType, Text};
use quick_xml::events::Event;
use quick_xml::Reader;

use super::SourceContext;
use crate::error::ExtractError;
use crate::resource::ACCEPT_FEED;

/// Date elements in priority order, matched by qualified name.
const DATE_TAGS: [&str; 4] = ["pubDate", "updated", "published", "dc:date"];

pub async fn extract(cx: &SourceContext<'_>) -> Result<Vec<EventRecord>, ExtractError> {
    let feed_url = cx.locator("FetchRss")?;
    let body = cx.fetch_text(feed_url, ACCEPT_FEED, "FetchRss").await?;
    let drafts = drafts_from_feed(&body, feed_url)?;
    Ok(cx.finish_drafts(drafts, feed_url))
}

/// One draft per item or entry, in document order.
pub fn drafts_from_feed(xml: &str, feed_url: &str) -> Result<Vec<EventDraft>, ExtractError> {
    let feed = feed_rs::parser::Builder::new()
        .base_uri(Some(feed_url))
        .build()
        .parse(xml.as_bytes())
        .map_err(|e| ExtractError::parse(feed_url, "ParseRss", Some(anyhow::anyhow!("{}", e))))?;
    let raw_dates = raw_entry_dates(xml);

    Ok(feed
        .entries
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            let raw_date = raw_dates.get(idx).and_then(Option::as_deref);
            draft_from_entry(&feed, entry, raw_date, feed_url)
        })
        .collect())
}

fn draft_from_entry(feed: &Feed, entry: &Entry, raw_date: Option<&str>, feed_url: &str) -> EventDraft {
    let link = entry_link(entry);
    let html = entry_html(feed, entry);
    let date = raw_date
        .map(str::to_string)
        .or_else(|| entry.published.or(entry.updated).map(|dt| dt.to_rfc3339()))
        .unwrap_or_default();

    let resolved_link = resolve_url(&link, Some(feed_url)).unwrap_or_default();
    let image = entry_image(entry, &html)
        .map(|src| resolve_image_url(&src, &[resolved_link.as_str(), feed_url]))
        .unwrap_or_default();

    EventDraft {
        title: entry.title.as_ref().map(text_value).unwrap_or_default(),
        link,
        date,
        venue: String::new(),
        image,
        summary: strip_html(&html),
    }
}

/// Plain text as-is; `type="html"` text has its markup removed.
fn text_value(text: &Text) -> String {
    if text.content_type.essence().to_string() == "text/html" {
        strip_html(&text.content)
    } else {
        clean_text(&text.content)
    }
}

/// Description markup: `content:encoded` before `description` for RSS, `summary` before
/// `content` for Atom.
fn entry_html(feed: &Feed, entry: &Entry) -> String {
    let summary = entry
        .summary
        .as_ref()
        .map(|t| t.content.trim().to_string())
        .filter(|s| !s.is_empty());
    let content = entry
        .content
        .as_ref()
        .and_then(|c| c.body.as_deref())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
    let ordered = if feed.feed_type == FeedType::Atom {
        summary.or(content)
    } else {
        content.or(summary)
    };
    ordered.unwrap_or_default()
}

/// Alternate link, then the first non-enclosure link, then an id that is itself a URL.
fn entry_link(entry: &Entry) -> String {
    let is_enclosure = |rel: Option<&str>| rel == Some("enclosure");
    entry
        .links
        .iter()
        .find(|l| l.rel.as_deref() == Some("alternate"))
        .or_else(|| entry.links.iter().find(|l| !is_enclosure(l.rel.as_deref())))
        .map(|l| l.href.trim().to_string())
        .filter(|href| !href.is_empty())
        .or_else(|| {
            let id = entry.id.trim();
            (id.starts_with("http://") || id.starts_with("https://")).then(|| id.to_string())
        })
        .unwrap_or_default()
}

/// Image media and enclosures, then thumbnails, then any media URL, then the first inline `<img>`.
fn entry_image(entry: &Entry, html: &str) -> Option<String> {
    let is_image = |mime: Option<String>| mime.is_some_and(|m| m.to_lowercase().starts_with("image/"));
    let media_urls = || {
        entry.media.iter().flat_map(|m| m.content.iter()).filter_map(|c| {
            c.url
                .as_ref()
                .map(|u| (u.to_string(), c.content_type.as_ref().map(|m| m.to_string())))
        })
    };
    let enclosure_links = || {
        entry
            .links
            .iter()
            .filter(|l| l.rel.as_deref() == Some("enclosure"))
            .map(|l| (l.href.clone(), l.media_type.clone()))
    };

    media_urls()
        .chain(enclosure_links())
        .find(|(_, mime)| is_image(mime.clone()))
        .map(|(url, _)| url)
        .or_else(|| {
            entry
                .media
                .iter()
                .flat_map(|m| m.thumbnails.iter())
                .map(|t| t.image.uri.clone())
                .find(|uri| !uri.trim().is_empty())
        })
        .or_else(|| media_urls().chain(enclosure_links()).map(|(url, _)| url).next())
        .or_else(|| first_img_src(html))
}

/// Raw date text per item or entry, by document order. feed-rs drops dates it cannot
/// parse; the record normalizer understands more formats.
fn raw_entry_dates(xml: &str) -> Vec<Option<String>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut dates = Vec::new();
    let mut current: Option<[Option<String>; 4]> = None;
    let mut reading: Option<usize> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                let local = name.rsplit(':').next().unwrap_or(&name);
                if matches!(local, "item" | "entry") {
                    current = Some(Default::default());
                } else if current.is_some() {
                    reading = DATE_TAGS.iter().position(|tag| *tag == name);
                }
            }
            Ok(Event::Empty(ref e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if matches!(name.rsplit(':').next(), Some("item" | "entry")) && current.is_none() {
                    dates.push(None);
                }
            }
            Ok(Event::Text(ref e)) => {
                if let (Some(slot), Some(found)) = (reading, current.as_mut()) {
                    let text = e.decode().map(|s| s.trim().to_string()).unwrap_or_default();
                    if !text.is_empty() && found[slot].is_none() {
                        found[slot] = Some(text);
                    }
                }
            }
            Ok(Event::End(ref e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                let local = name.rsplit(':').next().unwrap_or(&name);
                if matches!(local, "item" | "entry") {
                    if let Some(found) = current.take() {
                        dates.push(found.into_iter().flatten().next());
                    }
                }
                reading = None;
            }
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
    }
    dates
}
