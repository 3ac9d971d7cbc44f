// ABOUTME: Integration tests for record building, merging, and RSS assembly.
// ABOUTME: Exercises the path from EventDraft to the serialized feed document.

use chrono::{TimeZone, Utc};
use eventfeed_feed::{
    assemble_feed, merge_and_dedup, ChannelMeta, EventDraft, EventRecord, FeedStyle,
    RecordContext,
};
use pretty_assertions::assert_eq;

fn ctx() -> RecordContext<'static> {
    RecordContext {
        source_url: "https://x.example/calendar",
        town: "Roswell",
        venue: "",
        now: Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
    }
}

fn draft(title: &str, image: &str) -> EventDraft {
    EventDraft {
        title: title.into(),
        link: format!("/e/{}", title.to_lowercase().replace(' ', "-")),
        date: "2024-06-07".into(),
        venue: "The Hall".into(),
        image: image.into(),
        ..Default::default()
    }
}

#[test]
fn full_feed_contains_item_fields_and_media() {
    let records = vec![draft("Jazz Night", "https://x.example/poster.png").finish(&ctx())];
    let xml = assemble_feed(
        &ChannelMeta::default(),
        &records,
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
        FeedStyle::Full,
    )
    .unwrap();

    assert!(xml.contains(r#"<rss version="2.0" xmlns:media="http://search.yahoo.com/mrss/">"#));
    assert!(xml.contains("<title>[Roswell] Jazz Night</title>"));
    assert!(xml.contains("<link>https://x.example/e/jazz-night</link>"));
    assert!(xml.contains("<pubDate>Fri, 07 Jun 2024 00:00:00 GMT</pubDate>"));
    assert!(xml.contains("<category>Roswell</category>"));
    assert!(xml.contains("<category>The Hall</category>"));
    assert!(xml.contains(r#"<media:content url="https://x.example/poster.png" medium="image" type="image/png""#));
    assert!(xml.contains(r#"<enclosure url="https://x.example/poster.png" type="image/png" length="0""#));
    assert!(xml.contains(
        r#"<![CDATA[<img src="https://x.example/poster.png" alt="" /><br/>The Hall — 2024-06-07]]>"#
    ));
}

#[test]
fn item_without_image_has_no_enclosure() {
    let records = vec![draft("Trivia", "").finish(&ctx())];
    let xml = assemble_feed(
        &ChannelMeta::default(),
        &records,
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
        FeedStyle::Full,
    )
    .unwrap();

    assert!(xml.contains("<title>[Roswell] Trivia</title>"));
    assert!(!xml.contains("<enclosure"));
    assert!(!xml.contains("media:content"));
    assert!(xml.contains("<![CDATA[The Hall — 2024-06-07]]>"));
}

#[test]
fn cap_keeps_first_five_hundred_in_order() {
    let records: Vec<EventRecord> = (0..700)
        .map(|i| draft(&format!("Show {i}"), "").finish(&ctx()))
        .collect();

    let merged = merge_and_dedup(vec![records.clone()], 500);
    assert_eq!(merged.len(), 500);
    assert_eq!(merged, records[..500].to_vec());

    let xml = assemble_feed(
        &ChannelMeta::default(),
        &merged,
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
        FeedStyle::Full,
    )
    .unwrap();
    assert_eq!(xml.matches("<item>").count(), 500);
}

#[test]
fn identical_drafts_are_idempotent() {
    let a = draft("Jazz Night", "").finish(&ctx());
    let b = draft("Jazz Night", "").finish(&ctx());
    assert_eq!(a, b);
    assert_eq!(merge_and_dedup(vec![vec![a.clone()], vec![b]], 500), vec![a]);
}
