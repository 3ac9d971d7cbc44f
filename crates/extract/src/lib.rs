// ABOUTME: Event extraction library: typed source configs, collaborator traits, and the five per-mode extractors.
// ABOUTME: The Harvester runs sources sequentially against one page and reports per-source outcomes.

//! Turns heterogeneous event listings (rendered pages, JSON-LD, JSON APIs, ICS, RSS/Atom)
//! into normalized [`eventfeed_feed::EventRecord`]s.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use eventfeed_extract::{Harvester, HttpFetcher, Mode, SourceConfig, StaticPage};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), eventfeed_extract::ExtractError> {
//!     let harvester = Harvester::builder().build()?;
//!     let fetcher = HttpFetcher::new(eventfeed_extract::DEFAULT_USER_AGENT, std::time::Duration::from_secs(30))?;
//!     let mut page = StaticPage::new(Arc::new(fetcher));
//!     let sources = vec![SourceConfig::new("hall", Mode::Ics, "https://example.com/cal.ics")];
//!     let harvest = harvester.run(&mut page, &sources).await;
//!     let (items, report) = harvest.into_feed_items(500);
//!     println!("{} items from {} sources", items.len(), report.sources.len());
//!     Ok(())
//! }
//! ```

pub mod diagnostics;
pub mod error;
pub mod extractors;
pub mod harvester;
pub mod options;
pub mod page;
pub mod resource;
pub mod selector;
pub mod source;
pub mod value;

pub use diagnostics::{Diagnostic, DiagnosticSink, TracingSink};
pub use error::{ErrorCode, ExtractError};
pub use extractors::detail_image::fetch_detail_image;
pub use extractors::SourceContext;
pub use harvester::{Harvest, Harvester, RunReport, SourceOutcome, SourceReport};
pub use options::{HarvestOptions, HarvesterBuilder, DEFAULT_USER_AGENT};
pub use page::{AutoScroll, NoConditioning, Page, PageConditioner, PageError, StaticPage};
pub use resource::{FetchResponse, Fetcher, HttpFetcher};
pub use selector::resolve_selector;
pub use source::{FieldMap, FieldPath, Mode, Selectors, SourceConfig};
pub use value::ImageValue;
