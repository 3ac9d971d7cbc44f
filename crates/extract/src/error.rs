// ABOUTME: Error types for source extraction: the ErrorCode enum and the ExtractError struct.
// ABOUTME: Categorized errors with convenience constructors and boolean helpers, caught at the source boundary.

use std::fmt;

/// Error categories for a failed or empty source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// No candidate item selector matched before the timeout.
    NoSelectorMatch,
    /// Non-2xx status or transport failure fetching a source document.
    Fetch,
    /// A whole source document could not be parsed.
    Parse,
    /// The configured mode is not one of the five known modes.
    UnknownMode,
    /// The source configuration lacks what its mode needs.
    Config,
    /// The navigable page failed.
    Page,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::NoSelectorMatch => "no selector matched",
            ErrorCode::Fetch => "fetch error",
            ErrorCode::Parse => "parse error",
            ErrorCode::UnknownMode => "unknown mode",
            ErrorCode::Config => "configuration error",
            ErrorCode::Page => "page error",
        };
        write!(f, "{}", s)
    }
}

/// The error type returned by extractors.
#[derive(Debug, thiserror::Error)]
pub struct ExtractError {
    pub code: ErrorCode,
    /// Source key or URL the error relates to.
    pub target: String,
    pub op: String,
    #[source]
    pub source: Option<anyhow::Error>,
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.op, self.target, self.code)?;
        if let Some(ref src) = self.source {
            write!(f, ": {}", src)?;
        }
        Ok(())
    }
}

impl ExtractError {
    fn new(
        code: ErrorCode,
        target: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self {
            code,
            target: target.into(),
            op: op.into(),
            source,
        }
    }

    /// Create a NoSelectorMatch error.
    pub fn no_selector_match(target: impl Into<String>, op: impl Into<String>) -> Self {
        Self::new(ErrorCode::NoSelectorMatch, target, op, None)
    }

    /// Create a Fetch error.
    pub fn fetch(
        target: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::Fetch, target, op, source)
    }

    /// Create a Parse error.
    pub fn parse(
        target: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::Parse, target, op, source)
    }

    /// Create an UnknownMode error.
    pub fn unknown_mode(target: impl Into<String>, mode: &str) -> Self {
        Self::new(
            ErrorCode::UnknownMode,
            target,
            "Dispatch",
            Some(anyhow::anyhow!("mode {:?} is not supported", mode)),
        )
    }

    /// Create a Config error.
    pub fn config(target: impl Into<String>, op: impl Into<String>, message: &str) -> Self {
        Self::new(
            ErrorCode::Config,
            target,
            op,
            Some(anyhow::anyhow!("{}", message)),
        )
    }

    /// Create a Page error.
    pub fn page(
        target: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::Page, target, op, source)
    }

    /// Returns true if no item selector matched.
    pub fn is_no_selector_match(&self) -> bool {
        self.code == ErrorCode::NoSelectorMatch
    }

    /// Returns true if this is a Fetch error.
    pub fn is_fetch(&self) -> bool {
        self.code == ErrorCode::Fetch
    }

    /// Returns true if this is a Parse error.
    pub fn is_parse(&self) -> bool {
        self.code == ErrorCode::Parse
    }

    /// Returns true if this is an UnknownMode error.
    pub fn is_unknown_mode(&self) -> bool {
        self.code == ErrorCode::UnknownMode
    }

    /// Returns true if this is a Config error.
    pub fn is_config(&self) -> bool {
        self.code == ErrorCode::Config
    }

    /// Returns true if this is a Page error.
    pub fn is_page(&self) -> bool {
        self.code == ErrorCode::Page
    }
}
