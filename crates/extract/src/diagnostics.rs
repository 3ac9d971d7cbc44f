// ABOUTME: Diagnostic capture for sources that produced nothing or failed.
// ABOUTME: The DiagnosticSink trait is infallible by signature; TracingSink only logs.

/// Raw page state at the moment a source came up empty.
#[derive(Debug, Clone, Default)]
pub struct Diagnostic {
    pub source_key: String,
    pub reason: String,
    /// Page HTML, when a page was involved.
    pub html: Option<String>,
    /// PNG bytes, when the page could take one.
    pub screenshot: Option<Vec<u8>>,
}

/// Receives diagnostics. Implementations must swallow their own failures.
pub trait DiagnosticSink: Send + Sync {
    fn record(&self, diagnostic: &Diagnostic);
}

/// Logs a one-line summary of each diagnostic.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn record(&self, diagnostic: &Diagnostic) {
        tracing::warn!(
            source = %diagnostic.source_key,
            reason = %diagnostic.reason,
            html_bytes = diagnostic.html.as_ref().map_or(0, String::len),
            screenshot = diagnostic.screenshot.is_some(),
            "diagnostic captured"
        );
    }
}
