// ABOUTME: Integration tests for the eventfeed binary against mocked HTTP sources.
// ABOUTME: Covers feed output, per-source failure reporting, debug artifacts, and config errors.

use assert_cmd::assert::OutputAssertExt;
use assert_cmd::cargo::CommandCargoExt;
use httpmock::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

fn eventfeed_cmd() -> Command {
    let mut cmd = Command::cargo_bin("eventfeed").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

fn write_config(dir: &Path, body: &str) -> std::path::PathBuf {
    let path = dir.join("sources.json");
    fs::write(&path, body).unwrap();
    path
}

#[test]
fn writes_feed_from_json_source() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/events");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"events":[{"name":"Jazz Night","url":"/e/1","start_date":"2024-05-01","venue":{"name":"The Hall"}}]}"#);
    });

    let temp = TempDir::new().unwrap();
    let config = write_config(
        temp.path(),
        &format!(
            r#"{{
  // channel shown to readers
  "channel": {{"title": "Roswell Events"}},
  "sources": [
    {{"key": "hall", "mode": "json", "api": "{}", "town": "Roswell"}}
  ]
}}"#,
            server.url("/api/events")
        ),
    );
    let output = temp.path().join("public").join("events.xml");

    eventfeed_cmd()
        .arg("--config")
        .arg(&config)
        .arg("--output")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("hall"))
        .stdout(predicate::str::contains("ok (1 events)"));

    let xml = fs::read_to_string(&output).unwrap();
    assert!(xml.contains("<title>Roswell Events</title>"));
    assert!(xml.contains("<title>[Roswell] Jazz Night</title>"));
    assert!(xml.contains(&format!("<link>{}</link>", server.url("/e/1"))));
    assert!(xml.contains("<pubDate>Wed, 01 May 2024 00:00:00 GMT</pubDate>"));
}

#[test]
fn failed_source_is_reported_and_feed_still_written() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/cal.ics");
        then.status(500);
    });

    let temp = TempDir::new().unwrap();
    let config = write_config(
        temp.path(),
        &format!(
            r#"[{{"key": "pub", "mode": "ics", "ics": "{}"}}, {{"key": "odd", "mode": "xml"}}]"#,
            server.url("/cal.ics")
        ),
    );
    let output = temp.path().join("events.xml");
    let debug = temp.path().join("debug");

    eventfeed_cmd()
        .arg("--config")
        .arg(&config)
        .arg("--output")
        .arg(&output)
        .arg("--debug-dir")
        .arg(&debug)
        .assert()
        .success()
        .stderr(predicate::str::contains("source pub failed"))
        .stdout(predicate::str::contains("skipped"))
        .stdout(predicate::str::contains("0 events from 2 sources"));

    let xml = fs::read_to_string(&output).unwrap();
    assert!(xml.contains("<channel>"));
    assert!(!xml.contains("<item>"));
    let reason = fs::read_to_string(debug.join("pub.txt")).unwrap();
    assert!(reason.contains("HTTP status 500"));
}

#[test]
fn only_restricts_sources() {
    let server = MockServer::start();
    let wanted = server.mock(|when, then| {
        when.method(GET).path("/a.json");
        then.status(200).body(r#"[{"title":"A"}]"#);
    });
    let skipped = server.mock(|when, then| {
        when.method(GET).path("/b.json");
        then.status(200).body(r#"[{"title":"B"}]"#);
    });

    let temp = TempDir::new().unwrap();
    let config = write_config(
        temp.path(),
        &format!(
            r#"[{{"key": "a", "mode": "json", "api": "{}"}}, {{"key": "b", "mode": "json", "api": "{}"}}]"#,
            server.url("/a.json"),
            server.url("/b.json")
        ),
    );

    eventfeed_cmd()
        .arg("--config")
        .arg(&config)
        .arg("--output")
        .arg(temp.path().join("out.xml"))
        .arg("--only")
        .arg("a")
        .assert()
        .success();

    wanted.assert_hits(1);
    skipped.assert_hits(0);
}

#[test]
fn missing_config_fails() {
    let temp = TempDir::new().unwrap();
    eventfeed_cmd()
        .arg("--config")
        .arg(temp.path().join("nope.json"))
        .arg("--output")
        .arg(temp.path().join("out.xml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("reading source list"));
    assert!(!temp.path().join("out.xml").exists());
}
