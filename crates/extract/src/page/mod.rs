// ABOUTME: The navigable page collaborator used by the dom and jsonld extractors.
// ABOUTME: Defines the Page trait, PageError, and pre-extraction page conditioning strategies.

pub mod conditioning;
pub mod static_page;

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

pub use conditioning::{AutoScroll, NoConditioning, PageConditioner};
pub use static_page::StaticPage;

/// What a page implementation reports when an operation fails.
#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },
    #[error("navigation to {url} timed out after {timeout:?}")]
    Timeout { url: String, timeout: Duration },
    #[error("invalid selector {selector:?}")]
    Selector { selector: String },
    #[error("script evaluation failed: {0}")]
    Evaluate(String),
    #[error("{0} is not supported by this page")]
    Unsupported(&'static str),
}

/// A handle on one navigable page, reused across sources.
///
/// Implementations own session lifecycle; the extractors only drive navigation and
/// read state back.
#[async_trait]
pub trait Page: Send {
    /// Loads `url` and waits for the DOM to be ready, bounded by `timeout`.
    async fn goto(&mut self, url: &str, timeout: Duration) -> Result<(), PageError>;

    /// Headers sent with every subsequent navigation.
    async fn set_extra_headers(&mut self, headers: HashMap<String, String>) -> Result<(), PageError>;

    /// Number of elements currently matching `selector`.
    async fn count(&mut self, selector: &str) -> Result<usize, PageError>;

    /// Serialized HTML of the current document.
    async fn content(&mut self) -> Result<String, PageError>;

    /// Runs a script in the page and returns its JSON result.
    async fn evaluate(&mut self, script: &str) -> Result<Value, PageError>;

    /// PNG screenshot of the current viewport.
    async fn screenshot(&mut self) -> Result<Vec<u8>, PageError>;
}
