// ABOUTME: Run-wide extraction options and the HarvesterBuilder that assembles a Harvester.
// ABOUTME: HarvesterBuilder provides a fluent API over timeouts, identity, collaborators, and the run clock.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::diagnostics::{DiagnosticSink, TracingSink};
use crate::error::ExtractError;
use crate::harvester::Harvester;
use crate::page::{NoConditioning, PageConditioner};
use crate::resource::{Fetcher, HttpFetcher};
use crate::source::{DEFAULT_MAX_ITEMS, DEFAULT_WAIT_MS};

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Knobs shared by every source in a run.
#[derive(Debug, Clone)]
pub struct HarvestOptions {
    /// Bound on page navigation and plain fetches.
    pub navigation_timeout: Duration,
    /// How long the item selector is polled before giving up.
    pub selector_timeout: Duration,
    pub poll_interval: Duration,
    /// Settle delay for sources without `waitMs`.
    pub default_wait_ms: u64,
    /// Item cap for sources without `max`.
    pub default_max_items: usize,
    pub user_agent: String,
    /// Whether DOM items without an image fetch their detail page for one.
    pub detail_images: bool,
    /// Run time; stamped on records whose date is missing or unparseable.
    pub now: DateTime<Utc>,
}

impl Default for HarvestOptions {
    fn default() -> Self {
        Self {
            navigation_timeout: Duration::from_secs(30),
            selector_timeout: Duration::from_secs(12),
            poll_interval: Duration::from_millis(250),
            default_wait_ms: DEFAULT_WAIT_MS,
            default_max_items: DEFAULT_MAX_ITEMS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            detail_images: true,
            now: Utc::now(),
        }
    }
}

/// Builder for constructing Harvester instances with custom configuration.
pub struct HarvesterBuilder {
    opts: HarvestOptions,
    fetcher: Option<Arc<dyn Fetcher>>,
    sink: Option<Arc<dyn DiagnosticSink>>,
    conditioner: Option<Arc<dyn PageConditioner>>,
}

impl HarvesterBuilder {
    /// Create a new HarvesterBuilder with default options.
    pub fn new() -> Self {
        Self {
            opts: HarvestOptions::default(),
            fetcher: None,
            sink: None,
            conditioner: None,
        }
    }

    pub fn navigation_timeout(mut self, timeout: Duration) -> Self {
        self.opts.navigation_timeout = timeout;
        self
    }

    pub fn selector_timeout(mut self, timeout: Duration) -> Self {
        self.opts.selector_timeout = timeout;
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.opts.poll_interval = interval;
        self
    }

    pub fn default_wait_ms(mut self, wait_ms: u64) -> Self {
        self.opts.default_wait_ms = wait_ms;
        self
    }

    pub fn default_max_items(mut self, max: usize) -> Self {
        self.opts.default_max_items = max;
        self
    }

    /// Set the User-Agent used by the default fetcher.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.opts.user_agent = user_agent.into();
        self
    }

    pub fn detail_images(mut self, enabled: bool) -> Self {
        self.opts.detail_images = enabled;
        self
    }

    /// Fix the run clock, e.g. for reproducible output.
    pub fn now(mut self, now: DateTime<Utc>) -> Self {
        self.opts.now = now;
        self
    }

    /// Use a custom fetcher instead of the reqwest-backed default.
    pub fn fetcher(mut self, fetcher: Arc<dyn Fetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    pub fn diagnostic_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn conditioner(mut self, conditioner: Arc<dyn PageConditioner>) -> Self {
        self.conditioner = Some(conditioner);
        self
    }

    /// Build the Harvester. Fails only if the default HTTP client cannot be built.
    pub fn build(self) -> Result<Harvester, ExtractError> {
        let fetcher = match self.fetcher {
            Some(fetcher) => fetcher,
            None => Arc::new(HttpFetcher::new(
                &self.opts.user_agent,
                self.opts.navigation_timeout,
            )?),
        };
        Ok(Harvester::new(
            self.opts,
            fetcher,
            self.sink.unwrap_or_else(|| Arc::new(TracingSink)),
            self.conditioner.unwrap_or_else(|| Arc::new(NoConditioning)),
        ))
    }
}

impl Default for HarvesterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn builder_overrides_defaults() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let harvester = HarvesterBuilder::new()
            .selector_timeout(Duration::from_secs(1))
            .default_max_items(10)
            .detail_images(false)
            .now(now)
            .build()
            .unwrap();
        let opts = harvester.options();
        assert_eq!(opts.selector_timeout, Duration::from_secs(1));
        assert_eq!(opts.default_max_items, 10);
        assert!(!opts.detail_images);
        assert_eq!(opts.now, now);
        assert_eq!(opts.navigation_timeout, Duration::from_secs(30));
        assert_eq!(opts.poll_interval, Duration::from_millis(250));
    }
}
