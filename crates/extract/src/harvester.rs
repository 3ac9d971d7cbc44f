// ABOUTME: Runs every configured source in order, dispatching by mode, and reports per-source outcomes.
// ABOUTME: Owns the DOM -> structured data -> failed fallback and the per-source error boundary.

use std::fmt;
use std::sync::Arc;

use eventfeed_feed::{merge_and_dedup, EventRecord};

use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::error::ExtractError;
use crate::extractors::{dom, ics, json_api, jsonld, rss, SourceContext};
use crate::options::{HarvestOptions, HarvesterBuilder};
use crate::page::{Page, PageConditioner};
use crate::resource::Fetcher;
use crate::source::{Mode, SourceConfig};

/// How one source ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceOutcome {
    Ok(usize),
    /// Ran without error but contributed nothing.
    Empty,
    Failed(String),
    /// Never ran, e.g. an unknown mode.
    Skipped(String),
}

impl fmt::Display for SourceOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceOutcome::Ok(count) => write!(f, "ok ({} events)", count),
            SourceOutcome::Empty => write!(f, "empty"),
            SourceOutcome::Failed(reason) => write!(f, "failed: {}", reason),
            SourceOutcome::Skipped(reason) => write!(f, "skipped: {}", reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceReport {
    pub key: String,
    pub mode: Mode,
    pub outcome: SourceOutcome,
}

/// Outcomes for a whole run, in configuration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub sources: Vec<SourceReport>,
}

impl RunReport {
    pub fn total_events(&self) -> usize {
        self.sources
            .iter()
            .map(|s| match s.outcome {
                SourceOutcome::Ok(count) => count,
                _ => 0,
            })
            .sum()
    }

    pub fn failures(&self) -> impl Iterator<Item = &SourceReport> {
        self.sources
            .iter()
            .filter(|s| matches!(s.outcome, SourceOutcome::Failed(_)))
    }
}

/// Everything a run produced.
#[derive(Debug, Clone, Default)]
pub struct Harvest {
    /// Records per source, in configuration order.
    pub per_source: Vec<Vec<EventRecord>>,
    pub report: RunReport,
}

impl Harvest {
    /// Merged, de-duplicated, and capped records ready for assembly.
    pub fn into_feed_items(self, cap: usize) -> (Vec<EventRecord>, RunReport) {
        (merge_and_dedup(self.per_source, cap), self.report)
    }
}

/// States of the DOM-mode strategy chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DomStage {
    Dom,
    StructuredData,
}

/// Sequential extraction over a list of sources sharing one page.
pub struct Harvester {
    options: HarvestOptions,
    fetcher: Arc<dyn Fetcher>,
    sink: Arc<dyn DiagnosticSink>,
    conditioner: Arc<dyn PageConditioner>,
}

impl Harvester {
    pub fn new(
        options: HarvestOptions,
        fetcher: Arc<dyn Fetcher>,
        sink: Arc<dyn DiagnosticSink>,
        conditioner: Arc<dyn PageConditioner>,
    ) -> Self {
        Self {
            options,
            fetcher,
            sink,
            conditioner,
        }
    }

    /// Returns a builder with default options.
    pub fn builder() -> HarvesterBuilder {
        HarvesterBuilder::new()
    }

    pub fn options(&self) -> &HarvestOptions {
        &self.options
    }

    /// Processes `sources` one at a time. A failing source never stops the run.
    pub async fn run(&self, page: &mut dyn Page, sources: &[SourceConfig]) -> Harvest {
        let mut harvest = Harvest::default();
        for config in sources {
            let (records, outcome) = self.harvest_source(page, config).await;
            harvest.per_source.push(records);
            harvest.report.sources.push(SourceReport {
                key: config.key.clone(),
                mode: config.mode.clone(),
                outcome,
            });
        }
        tracing::info!(
            sources = sources.len(),
            events = harvest.report.total_events(),
            "harvest finished"
        );
        harvest
    }

    /// Runs one source inside the error boundary and captures diagnostics when it yields nothing.
    pub async fn harvest_source(
        &self,
        page: &mut dyn Page,
        config: &SourceConfig,
    ) -> (Vec<EventRecord>, SourceOutcome) {
        if let Mode::Unknown(name) = &config.mode {
            let err = ExtractError::unknown_mode(&config.key, name);
            tracing::warn!(source = %config.key, error = %err, "skipping source");
            return (Vec::new(), SourceOutcome::Skipped(err.to_string()));
        }

        tracing::info!(source = %config.key, mode = %config.mode, "extracting");
        match self.dispatch(page, config).await {
            Ok(records) if !records.is_empty() => {
                tracing::info!(source = %config.key, count = records.len(), "source done");
                let count = records.len();
                (records, SourceOutcome::Ok(count))
            }
            Ok(_) => {
                tracing::warn!(source = %config.key, "source produced no events");
                self.capture(page, config, "no events extracted").await;
                (Vec::new(), SourceOutcome::Empty)
            }
            Err(err) => {
                tracing::warn!(source = %config.key, error = %err, "source failed");
                self.capture(page, config, &err.to_string()).await;
                (Vec::new(), SourceOutcome::Failed(err.to_string()))
            }
        }
    }

    async fn dispatch(
        &self,
        page: &mut dyn Page,
        config: &SourceConfig,
    ) -> Result<Vec<EventRecord>, ExtractError> {
        let cx = SourceContext::new(config, &self.options, self.fetcher.as_ref());
        match &config.mode {
            Mode::Dom => self.dom_with_fallback(page, &cx).await,
            Mode::JsonLd => jsonld::extract(page, &cx).await,
            Mode::Json => json_api::extract(&cx).await,
            Mode::Ics => ics::extract(&cx).await,
            Mode::Rss => rss::extract(&cx).await,
            Mode::Unknown(name) => Err(ExtractError::unknown_mode(&config.key, name)),
        }
    }

    /// DOM first; on zero items, structured data; on zero again, an empty result.
    async fn dom_with_fallback(
        &self,
        page: &mut dyn Page,
        cx: &SourceContext<'_>,
    ) -> Result<Vec<EventRecord>, ExtractError> {
        let fallback_config = cx.config.structured_data_fallback();
        let mut stage = DomStage::Dom;
        loop {
            let result = match stage {
                DomStage::Dom => dom::extract(page, cx, self.conditioner.as_ref()).await,
                DomStage::StructuredData => {
                    let fallback_cx = SourceContext::new(&fallback_config, cx.options, cx.fetcher);
                    jsonld::extract(page, &fallback_cx).await
                }
            };
            match (stage, result) {
                (_, Ok(records)) if !records.is_empty() => return Ok(records),
                (DomStage::Dom, Ok(_)) => {}
                (DomStage::Dom, Err(e)) if e.is_no_selector_match() => {
                    tracing::info!(source = %cx.config.key, "no DOM items, trying structured data");
                }
                (DomStage::Dom, Err(e)) => return Err(e),
                (DomStage::StructuredData, result) => return result,
            }
            stage = DomStage::StructuredData;
        }
    }

    async fn capture(&self, page: &mut dyn Page, config: &SourceConfig, reason: &str) {
        let uses_page = matches!(config.mode, Mode::Dom | Mode::JsonLd);
        let (html, screenshot) = if uses_page {
            (page.content().await.ok(), page.screenshot().await.ok())
        } else {
            (None, None)
        };
        self.sink.record(&Diagnostic {
            source_key: config.key.clone(),
            reason: reason.to_string(),
            html,
            screenshot,
        });
    }
}
