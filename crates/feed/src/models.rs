// ABOUTME: Core data models shared by every extractor and the feed assembler.
// ABOUTME: EventRecord is the normalized post-extraction unit; ChannelMeta describes the output channel.

use serde::{Deserialize, Serialize};

/// A normalized event, produced by any extractor mode.
///
/// Records are built once through [`crate::record::EventDraft`] and never mutated
/// afterwards; merging only drops or reorders whole records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Display title, prefixed with `[Town] ` when the source sets a town.
    pub title: String,
    /// Absolute URL of the event (falls back to the source URL).
    pub link: String,
    /// Stable identity: link + normalized title + normalized date.
    pub guid: String,
    /// RFC 822 date in GMT.
    pub pub_date: String,
    /// Venue and raw date text joined with an em-dash.
    pub description: String,
    /// Absolute image URL, or empty.
    pub image: String,
    pub town: String,
    pub venue: String,
}

impl EventRecord {
    /// Returns true when the record carries an image URL.
    pub fn has_image(&self) -> bool {
        !self.image.is_empty()
    }
}

/// Static channel metadata written at the top of the assembled feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelMeta {
    pub title: String,
    pub link: String,
    pub description: String,
}

impl Default for ChannelMeta {
    fn default() -> Self {
        Self {
            title: "Local Events".to_string(),
            link: "https://example.com/events".to_string(),
            description: "Aggregated event listings from local venues and calendars".to_string(),
        }
    }
}
