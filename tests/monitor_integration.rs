//! Integration tests for the monitor binary
//!
//! These tests drive `evmon` against a feed file:
//! - Rendering yaml, json and pretty output
//! - Type and log level filtering
//! - Option validation failures
//! - Feed decode failures

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

/// Helper to get the evmon binary path
fn evmon_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // Remove test binary name
    path.pop(); // Remove deps
    path.push("evmon");
    path
}

const FEED: &str = r#"{"type":"logging","timestamp":"2026-01-03T12:00:00Z","location":"node1","metadata":{"level":"dbug","message":"Polling","context":["interval","5s"]}}
{"type":"lifecycle","timestamp":"2026-01-03T12:00:01Z","location":"node1","project":"default","metadata":{"action":"instance-started","source":"/1.0/instances/c1"}}
{"type":"logging","timestamp":"2026-01-03T12:00:02Z","location":"node2","metadata":{"level":"error","message":"Disk failure","context":["pool","tank"]}}
{"type":"lifecycle","timestamp":"2026-01-03T12:00:03Z","project":"other","metadata":{"action":"instance-stopped"}}
"#;

/// Scratch directory holding a config with a `lab` remote reading `feed`
struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new(feed: &str, multi_node: bool) -> Self {
        let dir = TempDir::new().unwrap();
        let feed_path = dir.path().join("events.jsonl");
        fs::write(&feed_path, feed).unwrap();

        let config = format!(
            "default_remote: lab\nremotes:\n  lab:\n    address: {}\n    multi_node: {}\n",
            feed_path.display(),
            multi_node
        );
        fs::write(dir.path().join("evmon.yaml"), config).unwrap();

        Self { dir }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn run(&self, args: &[&str]) -> Output {
        Command::new(evmon_binary())
            .env("EVMON_DIR", self.path())
            .env("XDG_DATA_HOME", self.path().join("data"))
            .env("HOME", self.path())
            .env_remove("EVMON_CONFIG")
            .env_remove("RUST_LOG")
            .args(["--config", &self.path().join("evmon.yaml").display().to_string()])
            .args(args)
            .output()
            .expect("Failed to execute evmon")
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

#[test]
fn test_yaml_is_default() {
    let fixture = Fixture::new(FEED, false);
    let output = fixture.run(&[]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("type: logging"));
    assert!(out.contains("action: instance-started"));
    // Current project only
    assert!(!out.contains("instance-stopped"));

    let docs: Vec<serde_yaml::Value> = out
        .split("\n\n")
        .filter(|doc| !doc.trim().is_empty())
        .map(|doc| serde_yaml::from_str(doc).unwrap())
        .collect();
    assert_eq!(docs.len(), 3);
}

#[test]
fn test_json_all_projects() {
    let fixture = Fixture::new(FEED, false);
    let output = fixture.run(&["lab:", "--format", "json", "--all-projects"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let events: Vec<serde_json::Value> = stdout(&output)
        .split("\n\n")
        .filter(|doc| !doc.trim().is_empty())
        .map(|doc| serde_json::from_str(doc).unwrap())
        .collect();

    assert_eq!(events.len(), 4);
    assert_eq!(events[1]["metadata"]["action"], "instance-started");
    assert_eq!(events[3]["project"], "other");
}

#[test]
fn test_type_filter() {
    let fixture = Fixture::new(FEED, false);
    let output = fixture.run(&["--format=json", "--type", "lifecycle"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("instance-started"));
    assert!(!out.contains("Polling"));
}

#[test]
fn test_pretty_logging() {
    let fixture = Fixture::new(FEED, true);
    let output = fixture.run(&["--pretty", "--type=logging"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("2026-01-03T12:00:00Z DEBUG"));
    assert!(lines[0].contains("[node1] Polling"));
    assert!(lines[0].ends_with("interval=5s"));
    assert!(lines[1].contains("ERROR"));
    assert!(lines[1].contains("[node2] Disk failure"));
}

#[test]
fn test_pretty_loglevel_filter() {
    let fixture = Fixture::new(FEED, false);
    let output = fixture.run(&["--format", "pretty", "--type", "logging", "--loglevel", "info"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(!out.contains("Polling"));
    assert!(out.contains("Disk failure"));
    assert!(!out.contains("[node2]"));
}

#[test]
fn test_pretty_rejects_non_logging_events() {
    let fixture = Fixture::new(FEED, false);
    let output = fixture.run(&["--pretty"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("lifecycle"));
}

#[test]
fn test_invalid_format() {
    let fixture = Fixture::new(FEED, false);
    let output = fixture.run(&["--format", "xml"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("Invalid format: xml"));
    assert!(stdout(&output).is_empty());
}

#[test]
fn test_loglevel_requires_pretty() {
    let fixture = Fixture::new(FEED, false);
    let output = fixture.run(&["--format", "json", "--loglevel", "info"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("Log level filtering can only be used with pretty formatting"));
    assert!(stdout(&output).is_empty());
}

#[test]
fn test_unknown_remote() {
    let fixture = Fixture::new(FEED, false);
    let output = fixture.run(&["nowhere:"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("nowhere"));
}

#[test]
fn test_empty_feed_exits_cleanly() {
    let fixture = Fixture::new("", false);
    let output = fixture.run(&[]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).is_empty());
}

#[test]
fn test_corrupt_feed_fails_after_good_events() {
    let feed = format!("{}{}", FEED.lines().nth(1).unwrap(), "\n{broken\n");
    let fixture = Fixture::new(&feed, false);
    let output = fixture.run(&["--format", "json"]);

    assert!(!output.status.success());
    assert!(stdout(&output).contains("instance-started"));
    assert!(stderr(&output).contains("line 2"));
}
