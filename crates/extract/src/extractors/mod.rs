// ABOUTME: The five per-mode extractors plus the detail-page image fallback.
// ABOUTME: SourceContext bundles what every extractor needs; finish_drafts applies filter, cap, and normalization.

pub mod detail_image;
pub mod dom;
pub mod ics;
pub mod json_api;
pub mod jsonld;
pub mod rss;

use eventfeed_feed::{EventDraft, EventRecord, RecordContext};

use crate::error::ExtractError;
use crate::options::HarvestOptions;
use crate::resource::{accept, Fetcher};
use crate::source::SourceConfig;

/// One source's configuration together with the run-wide collaborators.
#[derive(Clone, Copy)]
pub struct SourceContext<'a> {
    pub config: &'a SourceConfig,
    pub options: &'a HarvestOptions,
    pub fetcher: &'a dyn Fetcher,
}

impl<'a> SourceContext<'a> {
    pub fn new(
        config: &'a SourceConfig,
        options: &'a HarvestOptions,
        fetcher: &'a dyn Fetcher,
    ) -> Self {
        Self {
            config,
            options,
            fetcher,
        }
    }

    /// The mode's locator, or a config error naming what is missing.
    pub fn locator(&self, op: &str) -> Result<&'a str, ExtractError> {
        self.config.locator().ok_or_else(|| {
            ExtractError::config(
                &self.config.key,
                op,
                &format!("{} source has no locator", self.config.mode),
            )
        })
    }

    pub fn max_items(&self) -> usize {
        self.config.max_items(self.options.default_max_items)
    }

    pub fn record_context<'b>(&'b self, source_url: &'b str) -> RecordContext<'b> {
        RecordContext {
            source_url,
            town: &self.config.town,
            venue: &self.config.venue,
            now: self.options.now,
        }
    }

    /// GETs `url` with an Accept header and returns the decoded body of a 2xx response.
    pub async fn fetch_text(&self, url: &str, accept_value: &str, op: &str) -> Result<String, ExtractError> {
        let response = self
            .fetcher
            .get(url, &accept(accept_value))
            .await?
            .require_success(url, op)?;
        Ok(response.text())
    }

    /// Drafts that pass the source filter, up to the source's item cap.
    pub fn select_drafts<I>(&self, drafts: I, source_url: &str) -> Vec<EventDraft>
    where
        I: IntoIterator<Item = EventDraft>,
    {
        let ctx = self.record_context(source_url);
        let matcher = self.config.filters.compile();
        drafts
            .into_iter()
            .filter(|draft| draft.passes(&ctx, &matcher))
            .take(self.max_items())
            .collect()
    }

    /// Filters, caps, and normalizes drafts read from `source_url`.
    pub fn finish_drafts<I>(&self, drafts: I, source_url: &str) -> Vec<EventRecord>
    where
        I: IntoIterator<Item = EventDraft>,
    {
        let selected = self.select_drafts(drafts, source_url);
        let ctx = self.record_context(source_url);
        selected.into_iter().map(|draft| draft.finish(&ctx)).collect()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use bytes::Bytes;

    use crate::error::ExtractError;
    use crate::resource::{FetchResponse, Fetcher};

    /// Serves canned bodies by URL; unknown URLs are 404s.
    #[derive(Default)]
    pub struct CannedFetcher {
        pub routes: HashMap<String, (u16, String)>,
        pub requests: Mutex<Vec<String>>,
    }

    impl CannedFetcher {
        pub fn with(mut self, url: &str, status: u16, body: &str) -> Self {
            self.routes.insert(url.to_string(), (status, body.to_string()));
            self
        }
    }

    #[async_trait]
    impl Fetcher for CannedFetcher {
        async fn get(
            &self,
            url: &str,
            _headers: &HashMap<String, String>,
        ) -> Result<FetchResponse, ExtractError> {
            if let Ok(mut requests) = self.requests.lock() {
                requests.push(url.to_string());
            }
            let (status, body) = self
                .routes
                .get(url)
                .cloned()
                .unwrap_or((404, String::new()));
            Ok(FetchResponse {
                status,
                final_url: url.to_string(),
                content_type: Some("text/plain; charset=utf-8".to_string()),
                body: Bytes::from(body),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Mode;
    use eventfeed_feed::Filter;

    fn draft(title: &str) -> EventDraft {
        EventDraft {
            title: title.into(),
            ..Default::default()
        }
    }

    #[test]
    fn finish_drafts_filters_before_capping() {
        let mut config = SourceConfig::new("s", Mode::Json, "https://x.example/api");
        config.max = Some(2);
        config.filters = Filter::new(vec!["jazz".into()], vec!["bingo".into()]);
        let options = HarvestOptions::default();
        let fetcher = testing::CannedFetcher::default();
        let cx = SourceContext::new(&config, &options, &fetcher);

        let records = cx.finish_drafts(
            vec![
                draft("Jazz Bingo"),
                draft("Poetry"),
                draft("Jazz Trio"),
                draft("Late Jazz"),
                draft("Jazz Brunch"),
            ],
            "https://x.example/api",
        );
        let titles: Vec<_> = records.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Jazz Trio", "Late Jazz"]);
    }

    #[test]
    fn missing_locator_is_config_error() {
        let mut config = SourceConfig::new("s", Mode::Ics, "");
        config.ics = None;
        let options = HarvestOptions::default();
        let fetcher = testing::CannedFetcher::default();
        let err = SourceContext::new(&config, &options, &fetcher)
            .locator("FetchIcs")
            .unwrap_err();
        assert!(err.is_config());
    }
}
