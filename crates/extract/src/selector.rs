// ABOUTME: Resolves an ordered selector candidate list against a live page by polling match counts.
// ABOUTME: Also resolves per-item field candidates against a parsed element snapshot.

use std::time::Duration;

use scraper::{ElementRef, Selector};
use tokio::time::Instant;

use crate::page::Page;

/// Polls `candidates` in list order until one matches at least one element.
///
/// Each round checks every candidate; the first in list order with a non-zero count
/// wins. At least one round always runs. Per-candidate errors count as no match.
/// Returns `None` once `timeout` elapses without a match.
pub async fn resolve_selector(
    page: &mut dyn Page,
    candidates: &[String],
    timeout: Duration,
    poll: Duration,
) -> Option<String> {
    let deadline = Instant::now() + timeout;
    loop {
        for candidate in candidates {
            match page.count(candidate).await {
                Ok(n) if n > 0 => return Some(candidate.clone()),
                Ok(_) => {}
                Err(e) => tracing::debug!(selector = %candidate, error = %e, "selector candidate failed"),
            }
        }
        if Instant::now() >= deadline {
            return None;
        }
        tokio::time::sleep(poll.min(deadline.saturating_duration_since(Instant::now()))).await;
    }
}

/// Parses the candidates that are valid CSS, keeping list order.
pub fn compile_candidates(candidates: &[String]) -> Vec<Selector> {
    candidates
        .iter()
        .filter_map(|c| match Selector::parse(c) {
            Ok(selector) => Some(selector),
            Err(_) => {
                tracing::debug!(selector = %c, "skipping unparseable selector");
                None
            }
        })
        .collect()
}

/// First non-empty value produced by `extract` over the candidates, in list order.
///
/// For each candidate every matching descendant is tried before moving on.
pub fn first_value<F>(item: ElementRef<'_>, candidates: &[Selector], mut extract: F) -> Option<String>
where
    F: FnMut(ElementRef<'_>) -> Option<String>,
{
    candidates.iter().find_map(|selector| {
        item.select(selector)
            .find_map(|el| extract(el).filter(|v| !v.trim().is_empty()))
    })
}
