// ABOUTME: Extracts events from ICS calendar text by VEVENT block and line-prefix matching.
// ABOUTME: Unfolds continuation lines and unescapes text values; ICS carries no images.

use eventfeed_feed::{EventDraft, EventRecord};

use super::SourceContext;
use crate::error::ExtractError;
use crate::resource::ACCEPT_CALENDAR;

const EVENT_DELIMITER: &str = "BEGIN:VEVENT";

/// The fields read from one VEVENT block. Missing properties are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IcsEvent {
    pub summary: String,
    pub url: String,
    pub dtstart: String,
    pub location: String,
}

pub async fn extract(cx: &SourceContext<'_>) -> Result<Vec<EventRecord>, ExtractError> {
    let calendar_url = cx.locator("FetchIcs")?;
    let text = cx.fetch_text(calendar_url, ACCEPT_CALENDAR, "FetchIcs").await?;

    let drafts = parse_calendar(&text).into_iter().map(|event| EventDraft {
        title: event.summary,
        link: event.url,
        date: event.dtstart,
        venue: event.location,
        image: String::new(),
        summary: String::new(),
    });
    Ok(cx.finish_drafts(drafts, calendar_url))
}

/// Splits calendar text into VEVENT blocks, discarding the preamble.
pub fn parse_calendar(text: &str) -> Vec<IcsEvent> {
    let unfolded = unfold_lines(text);
    unfolded
        .split(EVENT_DELIMITER)
        .skip(1)
        .map(parse_event_block)
        .collect()
}

fn parse_event_block(block: &str) -> IcsEvent {
    IcsEvent {
        summary: unescape_text(&property(block, "SUMMARY")),
        url: property(block, "URL"),
        dtstart: property(block, "DTSTART"),
        location: unescape_text(&property(block, "LOCATION")),
    }
}

/// Value of the first line whose name is `key`, with or without parameters.
fn property(block: &str, key: &str) -> String {
    block
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .find_map(|line| {
            let rest = line.strip_prefix(key)?;
            if !(rest.starts_with(':') || rest.starts_with(';')) {
                return None;
            }
            rest.split_once(':').map(|(_, value)| value.trim().to_string())
        })
        .unwrap_or_default()
}

/// Joins folded continuation lines (those starting with a space or tab) onto their predecessor.
pub fn unfold_lines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for line in text.lines() {
        let line = line.trim_end_matches('\r');
        match line.strip_prefix(' ').or_else(|| line.strip_prefix('\t')) {
            Some(continuation) if !out.is_empty() => out.push_str(continuation),
            _ => {
                if !out.is_empty() {
                    out.push('\n');
                }
                out.push_str(line);
            }
        }
    }
    out
}

fn unescape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => out.push(' '),
            Some(escaped) => out.push(escaped),
            None => out.push('\\'),
        }
    }
    out
}
