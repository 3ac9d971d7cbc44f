// ABOUTME: Loads the source-list file: strips JS-style comments, then maps loose records to SourceConfig.
// ABOUTME: Accepts a bare array of sources or an object with channel metadata, maxItems, and sources.

use std::fs;
use std::path::Path;

use anyhow::Context;
use eventfeed_extract::{FieldMap, Mode, Selectors, SourceConfig};
use eventfeed_feed::{ChannelMeta, Filter};
use serde::Deserialize;

/// Everything the source-list file configures.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileConfig {
    pub channel: ChannelMeta,
    pub max_items: Option<usize>,
    pub sources: Vec<SourceConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawFile {
    Sources(Vec<RawSource>),
    Full(RawDocument),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDocument {
    #[serde(default)]
    channel: Option<RawChannel>,
    #[serde(default)]
    max_items: Option<usize>,
    #[serde(default)]
    sources: Vec<RawSource>,
}

#[derive(Debug, Default, Deserialize)]
struct RawChannel {
    title: Option<String>,
    link: Option<String>,
    description: Option<String>,
}

/// A selector field written either as `"a, b"` or as `["a", "b"]`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SelectorList {
    Joined(String),
    List(Vec<String>),
}

impl SelectorList {
    fn into_candidates(self) -> Vec<String> {
        match self {
            SelectorList::Joined(s) => split_candidates(&s),
            SelectorList::List(list) => list
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawSelectors {
    item: Option<SelectorList>,
    title: Option<SelectorList>,
    link: Option<SelectorList>,
    date: Option<SelectorList>,
    image: Option<SelectorList>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSource {
    key: String,
    mode: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    api: Option<String>,
    #[serde(default)]
    ics: Option<String>,
    #[serde(default)]
    rss: Option<String>,
    #[serde(default)]
    map: Option<FieldMap>,
    #[serde(default)]
    selectors: Option<RawSelectors>,
    #[serde(default)]
    town: Option<String>,
    #[serde(default)]
    venue: Option<String>,
    #[serde(default)]
    wait_ms: Option<u64>,
    #[serde(default)]
    max: Option<usize>,
    #[serde(default)]
    filters: Option<Filter>,
}

impl RawSource {
    fn into_source_config(self) -> SourceConfig {
        let selectors = self.selectors.unwrap_or_default();
        let candidates =
            |list: Option<SelectorList>| list.map(SelectorList::into_candidates).unwrap_or_default();
        SourceConfig {
            mode: Mode::from(self.mode.as_str()),
            url: self.url,
            api: self.api,
            ics: self.ics,
            rss: self.rss,
            map: self.map,
            selectors: Selectors {
                item: candidates(selectors.item),
                title: candidates(selectors.title),
                link: candidates(selectors.link),
                date: candidates(selectors.date),
                image: candidates(selectors.image),
            },
            town: self.town.unwrap_or_default(),
            venue: self.venue.unwrap_or_default(),
            wait_ms: self.wait_ms,
            max: self.max,
            filters: self.filters.unwrap_or_default(),
            key: self.key,
        }
    }
}

/// Reads and parses the source-list file at `path`.
pub fn load(path: &Path) -> anyhow::Result<FileConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading source list {}", path.display()))?;
    parse(&text).with_context(|| format!("parsing source list {}", path.display()))
}

pub fn parse(text: &str) -> anyhow::Result<FileConfig> {
    let raw: RawFile = serde_json::from_str(&strip_comments(text))?;
    let config = match raw {
        RawFile::Sources(sources) => FileConfig {
            sources: sources.into_iter().map(RawSource::into_source_config).collect(),
            ..Default::default()
        },
        RawFile::Full(doc) => {
            let defaults = ChannelMeta::default();
            let channel = doc.channel.unwrap_or_default();
            FileConfig {
                channel: ChannelMeta {
                    title: channel.title.unwrap_or(defaults.title),
                    link: channel.link.unwrap_or(defaults.link),
                    description: channel.description.unwrap_or(defaults.description),
                },
                max_items: doc.max_items,
                sources: doc.sources.into_iter().map(RawSource::into_source_config).collect(),
            }
        }
    };
    Ok(config)
}

/// Removes `//` line comments and `/* */` block comments that sit outside string literals.
pub fn strip_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut in_string = false;

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            match c {
                '\\' => {
                    if let Some(next) = chars.next() {
                        out.push(next);
                    }
                }
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        let lookahead = chars.peek().copied();
        match (c, lookahead) {
            ('"', _) => {
                in_string = true;
                out.push(c);
            }
            ('/', Some('/')) => {
                for next in chars.by_ref() {
                    if next == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            ('/', Some('*')) => {
                chars.next();
                let mut prev = '\0';
                for next in chars.by_ref() {
                    if prev == '*' && next == '/' {
                        break;
                    }
                    prev = next;
                }
                out.push(' ');
            }
            _ => out.push(c),
        }
    }
    out
}

/// Splits `"a, b:is(c, d)"` on top-level commas only.
fn split_candidates(joined: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut current = String::new();
    for c in joined.chars() {
        match c {
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            _ => {}
        }
        if c == ',' && depth == 0 {
            parts.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
    }
    parts.push(current);
    parts
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use eventfeed_extract::FieldPath;
    use pretty_assertions::assert_eq;

    #[test]
    fn comments_outside_strings_are_removed() {
        let text = r#"[
  // the hall
  {"key": "hall", /* inline */ "mode": "ics", "ics": "https://x.example/a//b.ics"}
]"#;
        let stripped = strip_comments(text);
        assert!(!stripped.contains("the hall"));
        assert!(!stripped.contains("inline"));
        assert!(stripped.contains("https://x.example/a//b.ics"));
    }

    #[test]
    fn escaped_quotes_keep_string_state() {
        let stripped = strip_comments(r#"{"a": "say \"//hi\"" } // gone"#);
        assert_eq!(stripped.trim_end(), r#"{"a": "say \"//hi\"" }"#);
    }

    #[test]
    fn bare_array_uses_default_channel() {
        let config = parse(r#"[{"key":"pub","mode":"rss","rss":"https://x.example/feed"}]"#).unwrap();
        assert_eq!(config.channel, ChannelMeta::default());
        assert_eq!(config.max_items, None);
        assert_eq!(config.sources.len(), 1);
        assert_eq!(config.sources[0].mode, Mode::Rss);
        assert_eq!(config.sources[0].locator(), Some("https://x.example/feed"));
    }

    #[test]
    fn full_document_with_loose_fields() {
        let config = parse(
            r#"{
  "channel": {"title": "Roswell Events"},
  "maxItems": 40,
  "sources": [
    {
      "key": "club", "mode": "DOM", "url": "https://club.example/events",
      "waitMs": 500, "max": 10, "town": "Roswell",
      "selectors": {"item": ".event, li:is(.a, .b)", "title": ["h3", " "]},
      "filters": {"include": ["jazz"]}
    },
    {
      "key": "api", "mode": "json", "api": "https://api.example/e",
      "map": {"path": "data.events", "title": "attributes.name"}
    },
    {"key": "odd", "mode": "xml", "url": "https://x.example"}
  ]
}"#,
        )
        .unwrap();

        assert_eq!(config.channel.title, "Roswell Events");
        assert_eq!(config.channel.link, ChannelMeta::default().link);
        assert_eq!(config.max_items, Some(40));

        let club = &config.sources[0];
        assert_eq!(club.mode, Mode::Dom);
        assert_eq!(club.wait_ms, Some(500));
        assert_eq!(club.max, Some(10));
        assert_eq!(club.selectors.item, vec![".event", "li:is(.a, .b)"]);
        assert_eq!(club.selectors.title, vec!["h3"]);
        assert_eq!(club.filters.include, vec!["jazz"]);

        let map = config.sources[1].map.as_ref().unwrap();
        assert_eq!(map.path, Some(FieldPath::parse("data.events")));
        assert_eq!(map.title.as_ref().unwrap().segments().to_vec(), vec!["attributes", "name"]);

        assert_eq!(config.sources[2].mode, Mode::Unknown("xml".into()));
    }

    #[test]
    fn malformed_file_is_an_error() {
        assert!(parse("{ not json").is_err());
    }
}
