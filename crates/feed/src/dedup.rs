// ABOUTME: Merge and de-duplication of per-source record lists into the aggregate feed.
// ABOUTME: First record per normalized (title, description, link) key wins; result is capped.

use std::collections::HashSet;

use crate::html_utils::normalize_key;
use crate::models::EventRecord;

/// Default maximum number of items in the assembled feed.
pub const DEFAULT_FEED_CAP: usize = 500;

/// Identity used to collapse near-duplicates across sources.
pub fn dedup_key(record: &EventRecord) -> String {
    format!(
        "{}|{}|{}",
        normalize_key(&record.title),
        normalize_key(&record.description),
        normalize_key(&record.link)
    )
}

/// Drops every record whose key was already seen, preserving order.
pub fn dedup(records: Vec<EventRecord>) -> Vec<EventRecord> {
    let mut seen = HashSet::with_capacity(records.len());
    records
        .into_iter()
        .filter(|record| seen.insert(dedup_key(record)))
        .collect()
}

/// Concatenates per-source lists in order, de-duplicates, and keeps the first `cap`.
pub fn merge_and_dedup<I>(per_source: I, cap: usize) -> Vec<EventRecord>
where
    I: IntoIterator<Item = Vec<EventRecord>>,
{
    let merged: Vec<EventRecord> = per_source.into_iter().flatten().collect();
    let mut unique = dedup(merged);
    unique.truncate(cap);
    unique
}
