// ABOUTME: Serializes the final record list into an RSS 2.0 document with Media RSS extensions.
// ABOUTME: Writes channel metadata, build date, and one item per record with image enclosure/media tags.

use std::io::Cursor;

use chrono::{DateTime, Utc};
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::FeedError;
use crate::html_utils::escape_html;
use crate::image_utils::image_mime_type;
use crate::models::{ChannelMeta, EventRecord};
use crate::time_parse::format_pub_date;

const MEDIA_NS: &str = "http://search.yahoo.com/mrss/";

/// Which optional item elements the assembler writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedStyle {
    /// Categories, `media:content`, and `enclosure` included.
    #[default]
    Full,
    /// Only title, link, guid, pubDate, and description.
    Minimal,
}

type XmlWriter = Writer<Cursor<Vec<u8>>>;

/// Builds the feed document.
///
/// `build_date` becomes `lastBuildDate`; pass the run time so output is reproducible.
pub fn assemble_feed(
    channel: &ChannelMeta,
    records: &[EventRecord],
    build_date: DateTime<Utc>,
    style: FeedStyle,
) -> Result<String, FeedError> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

    emit(&mut writer, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut rss = BytesStart::new("rss");
    rss.push_attribute(("version", "2.0"));
    if style == FeedStyle::Full {
        rss.push_attribute(("xmlns:media", MEDIA_NS));
    }
    emit(&mut writer, Event::Start(rss))?;
    emit(&mut writer, Event::Start(BytesStart::new("channel")))?;

    text_element(&mut writer, "title", &channel.title)?;
    text_element(&mut writer, "link", &channel.link)?;
    text_element(&mut writer, "description", &channel.description)?;
    text_element(&mut writer, "lastBuildDate", &format_pub_date(build_date))?;

    for record in records {
        write_item(&mut writer, record, style)?;
    }

    emit(&mut writer, Event::End(BytesEnd::new("channel")))?;
    emit(&mut writer, Event::End(BytesEnd::new("rss")))?;

    let bytes = writer.into_inner().into_inner();
    String::from_utf8(bytes).map_err(FeedError::encoding)
}

fn write_item(writer: &mut XmlWriter, record: &EventRecord, style: FeedStyle) -> Result<(), FeedError> {
    emit(writer, Event::Start(BytesStart::new("item")))?;

    text_element(writer, "title", &record.title)?;
    text_element(writer, "link", &record.link)?;

    let mut guid = BytesStart::new("guid");
    guid.push_attribute(("isPermaLink", "false"));
    emit(writer, Event::Start(guid))?;
    emit(writer, Event::Text(BytesText::new(&record.guid)))?;
    emit(writer, Event::End(BytesEnd::new("guid")))?;

    text_element(writer, "pubDate", &record.pub_date)?;

    emit(writer, Event::Start(BytesStart::new("description")))?;
    emit(writer, Event::CData(BytesCData::new(description_html(record))))?;
    emit(writer, Event::End(BytesEnd::new("description")))?;

    if style == FeedStyle::Full {
        for category in [&record.town, &record.venue] {
            if !category.trim().is_empty() {
                text_element(writer, "category", category)?;
            }
        }

        if record.has_image() {
            let mime = image_mime_type(&record.image);

            let mut media = BytesStart::new("media:content");
            media.push_attribute(("url", record.image.as_str()));
            media.push_attribute(("medium", "image"));
            media.push_attribute(("type", mime.as_str()));
            emit(writer, Event::Empty(media))?;

            let mut enclosure = BytesStart::new("enclosure");
            enclosure.push_attribute(("url", record.image.as_str()));
            enclosure.push_attribute(("type", mime.as_str()));
            enclosure.push_attribute(("length", "0"));
            emit(writer, Event::Empty(enclosure))?;
        }
    }

    emit(writer, Event::End(BytesEnd::new("item")))
}

/// Escaped description, prefixed with an inline image when present.
///
/// Escaping guarantees the text never contains `]]>`, so it is safe inside CDATA.
fn description_html(record: &EventRecord) -> String {
    let text = escape_html(&record.description);
    if record.has_image() {
        format!(r#"<img src="{}" alt="" /><br/>{}"#, escape_html(&record.image), text)
    } else {
        text
    }
}

fn text_element(writer: &mut XmlWriter, name: &str, value: &str) -> Result<(), FeedError> {
    emit(writer, Event::Start(BytesStart::new(name)))?;
    emit(writer, Event::Text(BytesText::new(value)))?;
    emit(writer, Event::End(BytesEnd::new(name)))
}

fn emit(writer: &mut XmlWriter, event: Event<'_>) -> Result<(), FeedError> {
    writer.write_event(event).map_err(FeedError::write)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn build_date() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn description_gets_image_prefix() {
        let record = EventRecord {
            description: "Tom & Jerry".into(),
            image: "https://x.example/a.png".into(),
            ..Default::default()
        };
        assert_eq!(
            description_html(&record),
            r#"<img src="https://x.example/a.png" alt="" /><br/>Tom &amp; Jerry"#
        );
    }

    #[test]
    fn minimal_style_omits_media() {
        let record = EventRecord {
            title: "Show".into(),
            image: "https://x.example/a.png".into(),
            town: "Roswell".into(),
            ..Default::default()
        };
        let xml =
            assemble_feed(&ChannelMeta::default(), &[record], build_date(), FeedStyle::Minimal)
                .unwrap();
        assert!(!xml.contains("media:content"));
        assert!(!xml.contains("<enclosure"));
        assert!(!xml.contains("<category>"));
        assert!(!xml.contains("xmlns:media"));
    }

    #[test]
    fn empty_feed_still_has_channel() {
        let xml = assemble_feed(&ChannelMeta::default(), &[], build_date(), FeedStyle::Full).unwrap();
        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(xml.contains("<lastBuildDate>Sat, 01 Jun 2024 12:00:00 GMT</lastBuildDate>"));
        assert!(!xml.contains("<item>"));
    }
}
