// ABOUTME: eventfeed binary: loads the source list, harvests every source, and writes one RSS feed file.
// ABOUTME: Prints a one-line outcome per source and a total; diagnostics optionally go to a debug directory.

mod config;
mod sink;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use eventfeed_extract::{
    AutoScroll, Harvester, HttpFetcher, RunReport, SourceConfig, SourceOutcome, StaticPage, DEFAULT_USER_AGENT,
};
use eventfeed_feed::{assemble_feed, FeedStyle, DEFAULT_FEED_CAP};
use tracing_subscriber::EnvFilter;

use crate::sink::FileSink;

#[derive(Parser, Debug)]
#[command(
    name = "eventfeed",
    version,
    about = "Aggregate event listings from configured sources into one RSS feed"
)]
struct Args {
    /// Source list (JSON, `//` and `/* */` comments allowed)
    #[arg(long, default_value = "sources.json")]
    config: PathBuf,

    /// Where to write the assembled feed
    #[arg(long, default_value = "public/events.xml")]
    output: PathBuf,

    /// Feed item cap; overrides `maxItems` from the source list
    #[arg(long = "max-items")]
    max_items: Option<usize>,

    /// Save HTML, screenshot, and reason for sources that came up empty
    #[arg(long = "debug-dir")]
    debug_dir: Option<PathBuf>,

    /// Only run the source with this key (repeatable)
    #[arg(long = "only", value_name = "KEY")]
    only: Vec<String>,

    /// Skip fetching detail pages for missing DOM images
    #[arg(long = "no-detail-images")]
    no_detail_images: bool,

    /// Scroll DOM pages in steps before extraction, for lazily loaded listings
    #[arg(long = "auto-scroll")]
    auto_scroll: bool,

    /// Debug-level logging (RUST_LOG takes precedence)
    #[arg(short, long)]
    verbose: bool,

    /// Log as JSON lines on stderr
    #[arg(long = "log-json")]
    log_json: bool,
}

fn init_tracing(verbose: bool, json: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Keeps sources whose key is in `only`, in file order. An empty `only` keeps all.
fn select_sources(sources: Vec<SourceConfig>, only: &[String]) -> Vec<SourceConfig> {
    if only.is_empty() {
        return sources;
    }
    for key in only {
        if !sources.iter().any(|s| &s.key == key) {
            tracing::warn!(source = %key, "--only names a source that is not configured");
        }
    }
    sources
        .into_iter()
        .filter(|s| only.contains(&s.key))
        .collect()
}

fn print_report(report: &RunReport, written: usize, output: &Path) {
    for source in &report.sources {
        println!("{:<24} {:<7} {}", source.key, source.mode.to_string(), source.outcome);
    }
    println!(
        "{} events from {} sources, {} written to {}",
        report.total_events(),
        report.sources.len(),
        written,
        output.display()
    );
}

fn write_feed(path: &Path, xml: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating output directory {}", parent.display()))?;
    }
    fs::write(path, xml).with_context(|| format!("writing feed to {}", path.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose, args.log_json);

    let file = config::load(&args.config)?;
    let sources = select_sources(file.sources, &args.only);
    let cap = args.max_items.or(file.max_items).unwrap_or(DEFAULT_FEED_CAP);
    tracing::info!(sources = sources.len(), cap, "starting run");

    let run_started = Utc::now();
    let fetcher = Arc::new(
        HttpFetcher::new(DEFAULT_USER_AGENT, Duration::from_secs(30))
            .context("building HTTP client")?,
    );
    let mut builder = Harvester::builder()
        .now(run_started)
        .detail_images(!args.no_detail_images)
        .fetcher(fetcher.clone());
    if let Some(dir) = &args.debug_dir {
        builder = builder.diagnostic_sink(Arc::new(FileSink::new(dir)));
    }
    if args.auto_scroll {
        builder = builder.conditioner(Arc::new(AutoScroll::default()));
    }
    let harvester = builder.build()?;

    let mut page = StaticPage::new(fetcher);
    let harvest = harvester.run(&mut page, &sources).await;
    let (items, report) = harvest.into_feed_items(cap);

    for failed in report.failures() {
        if let SourceOutcome::Failed(reason) = &failed.outcome {
            eprintln!("source {} failed: {}", failed.key, reason);
        }
    }

    let xml = assemble_feed(&file.channel, &items, run_started, FeedStyle::Full)?;
    write_feed(&args.output, &xml)?;
    print_report(&report, items.len(), &args.output);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use eventfeed_extract::Mode;
    use pretty_assertions::assert_eq;

    fn keys(sources: &[SourceConfig]) -> Vec<&str> {
        sources.iter().map(|s| s.key.as_str()).collect()
    }

    #[test]
    fn only_keeps_file_order() {
        let sources = vec![
            SourceConfig::new("a", Mode::Ics, "https://x.example/a.ics"),
            SourceConfig::new("b", Mode::Rss, "https://x.example/b.xml"),
            SourceConfig::new("c", Mode::Json, "https://x.example/c.json"),
        ];
        let picked = select_sources(sources.clone(), &["c".into(), "a".into(), "zzz".into()]);
        assert_eq!(keys(&picked), vec!["a", "c"]);
        assert_eq!(select_sources(sources, &[]).len(), 3);
    }

    #[test]
    fn args_defaults() {
        let args = Args::parse_from(["eventfeed"]);
        assert_eq!(args.config, PathBuf::from("sources.json"));
        assert_eq!(args.output, PathBuf::from("public/events.xml"));
        assert_eq!(args.max_items, None);
        assert!(args.only.is_empty());
        assert!(!args.no_detail_images);
        assert!(!args.auto_scroll);
    }

    #[test]
    fn only_is_repeatable() {
        let args = Args::parse_from([
            "eventfeed", "--only", "a", "--only", "b", "--max-items", "20", "--auto-scroll",
        ]);
        assert_eq!(args.only, vec!["a", "b"]);
        assert!(args.auto_scroll);
        assert_eq!(args.max_items, Some(20));
    }
}
