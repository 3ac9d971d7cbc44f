// ABOUTME: Diagnostic sink that writes page HTML, a screenshot, and the reason per source into a directory.
// ABOUTME: Write failures are logged and swallowed so a broken debug dir never affects a run.

use std::fs;
use std::path::PathBuf;

use eventfeed_extract::{Diagnostic, DiagnosticSink};

/// Writes `<key>.html`, `<key>.png`, and `<key>.txt` under `dir`.
#[derive(Debug, Clone)]
pub struct FileSink {
    dir: PathBuf,
}

impl FileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn write(&self, name: &str, contents: &[u8]) {
        let path = self.dir.join(name);
        if let Err(e) = fs::write(&path, contents) {
            tracing::warn!(path = %path.display(), error = %e, "could not write diagnostic file");
        }
    }
}

impl DiagnosticSink for FileSink {
    fn record(&self, diagnostic: &Diagnostic) {
        if let Err(e) = fs::create_dir_all(&self.dir) {
            tracing::warn!(dir = %self.dir.display(), error = %e, "could not create debug dir");
            return;
        }
        let stem = file_stem(&diagnostic.source_key);
        self.write(&format!("{stem}.txt"), diagnostic.reason.as_bytes());
        if let Some(html) = &diagnostic.html {
            self.write(&format!("{stem}.html"), html.as_bytes());
        }
        if let Some(png) = &diagnostic.screenshot {
            self.write(&format!("{stem}.png"), png);
        }
        tracing::info!(source = %diagnostic.source_key, dir = %self.dir.display(), "diagnostics saved");
    }
}

/// Source keys are user-written; keep file names to a safe alphabet.
fn file_stem(key: &str) -> String {
    let stem: String = key
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if stem.is_empty() {
        "source".to_string()
    } else {
        stem
    }
}
