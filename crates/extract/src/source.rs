// ABOUTME: Strongly typed source configuration consumed by the extractors.
// ABOUTME: Defines Mode, SourceConfig, per-field selector candidate lists, and JSON field-path overrides.

use std::fmt;
use std::time::Duration;

use eventfeed_feed::Filter;
use serde::{Deserialize, Serialize};

/// Default settle delay after navigation.
pub const DEFAULT_WAIT_MS: u64 = 2000;
/// Default per-source item cap.
pub const DEFAULT_MAX_ITEMS: usize = 150;

pub const DEFAULT_ITEM_SELECTORS: &[&str] = &[
    ".tribe-events-calendar-list__event",
    ".event-item",
    ".event",
    ".events-list li",
    "li.event",
    "article",
    ".card",
];
pub const DEFAULT_TITLE_SELECTORS: &[&str] = &[
    ".event-title",
    ".title",
    "h3",
    "h2",
    "h4",
    "a",
];
pub const DEFAULT_LINK_SELECTORS: &[&str] = &["a[href]"];
pub const DEFAULT_DATE_SELECTORS: &[&str] = &[
    "time",
    ".event-date",
    ".date",
    "[datetime]",
    ".when",
];
pub const DEFAULT_IMAGE_SELECTORS: &[&str] = &["img", "[data-src]", "[style*=background]"];

/// Extraction strategy for a source.
///
/// Unrecognised names are kept as [`Mode::Unknown`] so one bad entry skips only its
/// own source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Mode {
    Dom,
    JsonLd,
    Json,
    Ics,
    Rss,
    Unknown(String),
}

impl From<String> for Mode {
    fn from(s: String) -> Self {
        Mode::from(s.as_str())
    }
}

impl From<&str> for Mode {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "dom" => Mode::Dom,
            "jsonld" | "json-ld" => Mode::JsonLd,
            "json" => Mode::Json,
            "ics" => Mode::Ics,
            "rss" => Mode::Rss,
            _ => Mode::Unknown(s.to_string()),
        }
    }
}

impl From<Mode> for String {
    fn from(mode: Mode) -> Self {
        mode.to_string()
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Mode::Dom => "dom",
            Mode::JsonLd => "jsonld",
            Mode::Json => "json",
            Mode::Ics => "ics",
            Mode::Rss => "rss",
            Mode::Unknown(name) => name.as_str(),
        };
        write!(f, "{}", s)
    }
}

/// A dotted path into a JSON document, e.g. `data.events` or `images.0.url`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    pub fn parse(path: &str) -> Self {
        FieldPath(
            path.split('.')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for FieldPath {
    fn from(s: String) -> Self {
        FieldPath::parse(&s)
    }
}

impl From<&str> for FieldPath {
    fn from(s: &str) -> Self {
        FieldPath::parse(s)
    }
}

impl From<FieldPath> for String {
    fn from(path: FieldPath) -> Self {
        path.0.join(".")
    }
}

/// Optional JSON field-path overrides for `json` mode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMap {
    /// Path to the list of event objects.
    #[serde(default)]
    pub path: Option<FieldPath>,
    #[serde(default)]
    pub title: Option<FieldPath>,
    #[serde(default)]
    pub link: Option<FieldPath>,
    #[serde(default)]
    pub date: Option<FieldPath>,
    #[serde(default)]
    pub venue: Option<FieldPath>,
    #[serde(default)]
    pub image: Option<FieldPath>,
}

/// Ordered selector candidates per DOM field. Empty lists fall back to the built-in defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selectors {
    #[serde(default)]
    pub item: Vec<String>,
    #[serde(default)]
    pub title: Vec<String>,
    #[serde(default)]
    pub link: Vec<String>,
    #[serde(default)]
    pub date: Vec<String>,
    #[serde(default)]
    pub image: Vec<String>,
}

impl Selectors {
    pub fn item_candidates(&self) -> Vec<String> {
        or_defaults(&self.item, DEFAULT_ITEM_SELECTORS)
    }

    pub fn title_candidates(&self) -> Vec<String> {
        or_defaults(&self.title, DEFAULT_TITLE_SELECTORS)
    }

    pub fn link_candidates(&self) -> Vec<String> {
        or_defaults(&self.link, DEFAULT_LINK_SELECTORS)
    }

    pub fn date_candidates(&self) -> Vec<String> {
        or_defaults(&self.date, DEFAULT_DATE_SELECTORS)
    }

    pub fn image_candidates(&self) -> Vec<String> {
        or_defaults(&self.image, DEFAULT_IMAGE_SELECTORS)
    }
}

fn or_defaults(configured: &[String], defaults: &[&str]) -> Vec<String> {
    let cleaned: Vec<String> = configured
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    if cleaned.is_empty() {
        defaults.iter().map(|s| s.to_string()).collect()
    } else {
        cleaned
    }
}

/// One configured origin of event data. Read-only for the duration of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceConfig {
    pub key: String,
    pub mode: Mode,
    /// Page URL for `dom` and `jsonld`.
    #[serde(default)]
    pub url: Option<String>,
    /// Endpoint for `json`.
    #[serde(default)]
    pub api: Option<String>,
    /// Calendar URL for `ics`.
    #[serde(default)]
    pub ics: Option<String>,
    /// Feed URL for `rss`.
    #[serde(default)]
    pub rss: Option<String>,
    #[serde(default)]
    pub map: Option<FieldMap>,
    #[serde(default)]
    pub selectors: Selectors,
    #[serde(default)]
    pub town: String,
    #[serde(default)]
    pub venue: String,
    #[serde(default)]
    pub wait_ms: Option<u64>,
    #[serde(default)]
    pub max: Option<usize>,
    #[serde(default)]
    pub filters: Filter,
}

impl SourceConfig {
    /// Minimal config for a mode and its locator; everything else defaulted.
    pub fn new(key: impl Into<String>, mode: Mode, locator: impl Into<String>) -> Self {
        let locator = Some(locator.into());
        let mut config = Self {
            key: key.into(),
            mode: mode.clone(),
            url: None,
            api: None,
            ics: None,
            rss: None,
            map: None,
            selectors: Selectors::default(),
            town: String::new(),
            venue: String::new(),
            wait_ms: None,
            max: None,
            filters: Filter::default(),
        };
        match mode {
            Mode::Dom | Mode::JsonLd | Mode::Unknown(_) => config.url = locator,
            Mode::Json => config.api = locator,
            Mode::Ics => config.ics = locator,
            Mode::Rss => config.rss = locator,
        }
        config
    }

    /// The locator the mode reads from, if configured and non-empty.
    pub fn locator(&self) -> Option<&str> {
        let raw = match self.mode {
            Mode::Dom | Mode::JsonLd => self.url.as_deref(),
            Mode::Json => self.api.as_deref(),
            Mode::Ics => self.ics.as_deref(),
            Mode::Rss => self.rss.as_deref(),
            Mode::Unknown(_) => None,
        };
        raw.map(str::trim).filter(|s| !s.is_empty())
    }

    pub fn settle_delay(&self, default_ms: u64) -> Duration {
        Duration::from_millis(self.wait_ms.unwrap_or(default_ms))
    }

    pub fn max_items(&self, default_max: usize) -> usize {
        self.max.filter(|m| *m > 0).unwrap_or(default_max)
    }

    /// The reduced config used when a `dom` source falls back to structured data.
    pub fn structured_data_fallback(&self) -> SourceConfig {
        SourceConfig {
            key: self.key.clone(),
            mode: Mode::JsonLd,
            url: self.url.clone(),
            town: self.town.clone(),
            venue: self.venue.clone(),
            wait_ms: self.wait_ms,
            filters: self.filters.clone(),
            ..SourceConfig::new(self.key.clone(), Mode::JsonLd, String::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn mode_parses_known_and_unknown() {
        assert_eq!(Mode::from("DOM"), Mode::Dom);
        assert_eq!(Mode::from("json-ld"), Mode::JsonLd);
        assert_eq!(Mode::from("xml"), Mode::Unknown("xml".into()));
    }

    #[test]
    fn field_path_parses_dots() {
        let path = FieldPath::parse("data.events.0");
        assert_eq!(path.segments().join("/"), "data/events/0");
        assert!(FieldPath::parse(" . ").is_empty());
    }

    #[test]
    fn selectors_fall_back_to_defaults() {
        let selectors = Selectors {
            title: vec!["  ".into()],
            link: vec![".more a".into()],
            ..Default::default()
        };
        assert_eq!(selectors.title_candidates()[0], DEFAULT_TITLE_SELECTORS[0]);
        assert_eq!(selectors.link_candidates(), vec![".more a".to_string()]);
    }

    #[test]
    fn locator_follows_mode() {
        let json = SourceConfig::new("a", Mode::Json, "https://x.example/api");
        assert_eq!(json.locator(), Some("https://x.example/api"));
        assert_eq!(json.url, None);
        let mut unknown = SourceConfig::new("b", Mode::Unknown("xml".into()), "https://x");
        assert_eq!(unknown.locator(), None);
        unknown.mode = Mode::Dom;
        assert_eq!(unknown.locator(), Some("https://x"));
    }

    #[test]
    fn structured_data_fallback_keeps_only_shared_fields() {
        let mut dom = SourceConfig::new("club", Mode::Dom, "https://x.example/events");
        dom.town = "Roswell".into();
        dom.venue = "Club".into();
        dom.wait_ms = Some(500);
        dom.max = Some(3);
        dom.selectors.item = vec![".row".into()];

        let fallback = dom.structured_data_fallback();
        assert_eq!(fallback.mode, Mode::JsonLd);
        assert_eq!(fallback.url.as_deref(), Some("https://x.example/events"));
        assert_eq!(fallback.town, "Roswell");
        assert_eq!(fallback.wait_ms, Some(500));
        assert_eq!(fallback.max, None);
        assert!(fallback.selectors.item.is_empty());
    }

    #[test]
    fn deserializes_from_json() {
        let config: SourceConfig = serde_json::from_value(serde_json::json!({
            "key": "hall",
            "mode": "json",
            "api": "https://x.example/api",
            "map": { "path": "data.events", "title": "name" },
            "waitMs": 100,
            "filters": { "include": ["jazz"] }
        }))
        .unwrap();
        assert_eq!(config.mode, Mode::Json);
        assert_eq!(config.wait_ms, Some(100));
        let map = config.map.unwrap();
        assert_eq!(map.path, Some(FieldPath::parse("data.events")));
        assert_eq!(config.filters.include, vec!["jazz".to_string()]);
    }
}
