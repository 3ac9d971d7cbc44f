// ABOUTME: Builds immutable EventRecords from the raw fields an extractor pulled out.
// ABOUTME: Applies town prefix, link fallback, venue fallback, guid derivation, and date normalization.

use chrono::{DateTime, Utc};

use crate::filter::{filter_blob, FilterMatcher};
use crate::html_utils::{clean_text, join_segments, normalize_key};
use crate::image_utils::absolute_url;
use crate::models::EventRecord;
use crate::time_parse::normalize_pub_date;

/// Per-source values every record of that source shares.
#[derive(Debug, Clone)]
pub struct RecordContext<'a> {
    /// URL the source was read from; base for relative links and the link fallback.
    pub source_url: &'a str,
    pub town: &'a str,
    /// Configured venue, used when an item carries none.
    pub venue: &'a str,
    /// Run time; substituted for missing or unparseable dates.
    pub now: DateTime<Utc>,
}

/// Raw fields of one extracted item, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventDraft {
    pub title: String,
    pub link: String,
    /// Date exactly as the source wrote it.
    pub date: String,
    pub venue: String,
    /// Absolute image URL or empty.
    pub image: String,
    /// Free text (feed summaries). Replaces the date in the description when present.
    pub summary: String,
}

impl EventDraft {
    /// An item with neither title nor link is not an event.
    pub fn is_blank(&self) -> bool {
        self.title.trim().is_empty() && self.link.trim().is_empty()
    }

    /// Text the source filter is evaluated against.
    pub fn blob(&self, ctx: &RecordContext<'_>) -> String {
        filter_blob(&self.title, &self.date, self.venue_or(ctx), &self.summary)
    }

    /// True when the draft has content and passes the source filter.
    pub fn passes(&self, ctx: &RecordContext<'_>, filter: &FilterMatcher) -> bool {
        !self.is_blank() && filter.accepts(&self.blob(ctx))
    }

    fn venue_or<'a>(&'a self, ctx: &RecordContext<'a>) -> &'a str {
        if self.venue.trim().is_empty() {
            ctx.venue
        } else {
            &self.venue
        }
    }

    /// Produces the final record.
    pub fn finish(self, ctx: &RecordContext<'_>) -> EventRecord {
        let venue = clean_text(self.venue_or(ctx));
        let town = clean_text(ctx.town);
        let date = clean_text(&self.date);

        let base_title = clean_text(&self.title);
        let title = if town.is_empty() {
            base_title
        } else {
            format!("[{town}] {base_title}")
        };

        let link = if self.link.trim().is_empty() {
            ctx.source_url.trim().to_string()
        } else {
            absolute_url(&self.link, ctx.source_url)
        };

        let summary = clean_text(&self.summary);
        let detail = if summary.is_empty() { &date } else { &summary };
        let description = join_segments([venue.as_str(), detail.as_str()]);

        let guid = format!("{}#{}#{}", link, normalize_key(&title), normalize_key(&date));

        EventRecord {
            pub_date: normalize_pub_date(&date, ctx.now),
            title,
            link,
            guid,
            description,
            image: self.image.trim().to_string(),
            town,
            venue,
        }
    }
}
