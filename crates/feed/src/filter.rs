// ABOUTME: Per-source include/exclude term filtering over a synthesized text blob.
// ABOUTME: Filter is plain config data; FilterMatcher is its compiled form, evaluated as a pure function.

use aho_corasick::AhoCorasick;
use serde::{Deserialize, Serialize};

/// Include/exclude term sets for a source. Matching is case-insensitive substring.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    #[serde(default)]
    pub include: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl Filter {
    pub fn new(include: Vec<String>, exclude: Vec<String>) -> Self {
        Self { include, exclude }
    }

    /// True when neither term set has a usable term.
    pub fn is_empty(&self) -> bool {
        terms(&self.include).is_empty() && terms(&self.exclude).is_empty()
    }

    /// Compiles the term sets once so every item of a source reuses the automata.
    pub fn compile(&self) -> FilterMatcher {
        FilterMatcher {
            include: build(&self.include),
            exclude: build(&self.exclude),
        }
    }

    /// Convenience for one-off checks; prefer [`Filter::compile`] in loops.
    pub fn accepts(&self, blob: &str) -> bool {
        self.compile().accepts(blob)
    }
}

/// Compiled form of a [`Filter`].
#[derive(Debug, Clone, Default)]
pub struct FilterMatcher {
    include: Option<AhoCorasick>,
    exclude: Option<AhoCorasick>,
}

impl FilterMatcher {
    /// Exclude wins over include; an empty include set accepts everything not excluded.
    pub fn accepts(&self, blob: &str) -> bool {
        let haystack = blob.to_lowercase();
        if let Some(exclude) = &self.exclude {
            if exclude.is_match(&haystack) {
                return false;
            }
        }
        match &self.include {
            Some(include) => include.is_match(&haystack),
            None => true,
        }
    }
}

/// Builds the text blob a filter runs against.
pub fn filter_blob(title: &str, date: &str, venue: &str, description: &str) -> String {
    [title, date, venue, description]
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn terms(raw: &[String]) -> Vec<String> {
    raw.iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

fn build(raw: &[String]) -> Option<AhoCorasick> {
    let terms = terms(raw);
    if terms.is_empty() {
        return None;
    }
    // Construction only fails past the automaton size limit, far beyond a term list.
    AhoCorasick::new(&terms).ok()
}
