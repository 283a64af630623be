//! E2E CLI tests covering:
//! - Create, list, status change and delete against a live server
//! - Local validation errors printed per field before any request
//! - Server errors (unknown id, unreachable server) mapped to a failing exit
//! - `bugs health` and `bugs completions`
//!
//! Each test runs `bugs` as a subprocess against an in-process server backed
//! by an in-memory store, with the user config directory pointed at a temp dir.

use assert_cmd::Command;
use bugtrack_core::Gateway;
use bugtrack_core::store::SqliteStore;
use bugtrack_server::ServerHandle;
use predicates::prelude::*;
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Test Harness
// ---------------------------------------------------------------------------

struct Harness {
    server: ServerHandle,
    home: TempDir,
}

fn harness() -> Harness {
    let store = SqliteStore::open(":memory:").expect("open in-memory store");
    let gateway = Gateway::new(Arc::new(store));
    let addr: SocketAddr = "127.0.0.1:0".parse().expect("loopback addr");
    Harness {
        server: bugtrack_server::spawn(gateway, addr).expect("spawn test server"),
        home: TempDir::new().expect("temp dir"),
    }
}

impl Harness {
    /// Build a Command targeting the `bugs` binary and this harness's server.
    fn bugs(&self) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("bugs"));
        cmd.env("HOME", self.home.path());
        cmd.env("XDG_CONFIG_HOME", self.home.path());
        cmd.env_remove("BUGTRACK_URL");
        cmd.env("BUGTRACK_LOG", "error");
        cmd.args(["--server", &self.server.url()]);
        cmd
    }

    /// Create a bug via CLI, return its JSON record.
    fn create(&self, title: &str) -> Value {
        let output = self
            .bugs()
            .args(["create", "--title", title, "--reporter", "QA Tester", "--json"])
            .output()
            .expect("create should not crash");
        assert!(
            output.status.success(),
            "create failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).expect("create --json emits a record")
    }

    fn list(&self) -> Vec<Value> {
        let output = self
            .bugs()
            .args(["list", "--json"])
            .output()
            .expect("list should not crash");
        assert!(output.status.success());
        serde_json::from_slice(&output.stdout).expect("list --json emits an array")
    }
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

#[test]
fn create_applies_server_defaults() {
    let h = harness();
    let bug = h.create("Login button unresponsive");

    assert_eq!(bug["title"], "Login button unresponsive");
    assert_eq!(bug["status"], "open");
    assert_eq!(bug["priority"], "medium");
    assert_eq!(bug["tags"], serde_json::json!([]));
    assert!(bug["id"].as_str().is_some_and(|id| !id.is_empty()));
}

#[test]
fn create_sends_tags_and_normalized_enums() {
    let h = harness();
    let output = h
        .bugs()
        .args([
            "create",
            "--title",
            "Crash on submit",
            "--reporter",
            "QA Tester",
            "--priority",
            "HIGH",
            "--status",
            "In Progress",
            "--tags",
            " ui, regression ,",
            "--json",
        ])
        .output()
        .expect("create should not crash");
    assert!(output.status.success());

    let bug: Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(bug["priority"], "high");
    assert_eq!(bug["status"], "in-progress");
    assert_eq!(bug["tags"], serde_json::json!(["ui", "regression"]));
}

#[test]
fn create_with_due_date() {
    let h = harness();
    let output = h
        .bugs()
        .args([
            "create", "--title", "Due bug", "--reporter", "Sam", "--due", "2024-05-01", "--json",
        ])
        .output()
        .expect("create should not crash");
    assert!(output.status.success());

    let bug: Value = serde_json::from_slice(&output.stdout).expect("json");
    assert!(bug["dueDate"].as_str().is_some_and(|due| due.starts_with("2024-05-01")));

    h.bugs()
        .args(["create", "--title", "Bad due", "--reporter", "Sam", "--due", "someday"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("  dueDate:"));
}

#[test]
fn list_shows_newest_first() {
    let h = harness();
    h.create("First bug");
    h.create("Second bug");

    let titles: Vec<_> = h
        .list()
        .iter()
        .map(|bug| bug["title"].as_str().unwrap_or_default().to_string())
        .collect();
    assert_eq!(titles, vec!["Second bug", "First bug"]);
}

#[test]
fn list_text_mode_has_header_row() {
    let h = harness();
    h.create("Text mode bug");

    h.bugs()
        .args(["list", "--format", "text"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("id\tstatus\tpriority\treporter\ttitle\n"))
        .stdout(predicate::str::contains("open\tmedium\tQA Tester\tText mode bug"));
}

#[test]
fn empty_list_says_so() {
    let h = harness();
    h.bugs()
        .args(["list", "--format", "text"])
        .assert()
        .success()
        .stdout("No bugs found\n");

    h.bugs()
        .args(["list", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[").and(predicate::str::contains("]")));
}

#[test]
fn status_then_filtered_list() {
    let h = harness();
    let keep = h.create("Still open");
    let fixed = h.create("Gets fixed");
    let fixed_id = fixed["id"].as_str().expect("id");

    let output = h
        .bugs()
        .args(["status", fixed_id, "done", "--json"])
        .output()
        .expect("status should not crash");
    assert!(output.status.success());
    let updated: Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(updated["status"], "resolved");
    assert_eq!(updated["title"], "Gets fixed");

    let output = h
        .bugs()
        .args(["list", "--status", "open", "--json"])
        .output()
        .expect("list should not crash");
    let open: Vec<Value> = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(open.len(), 1);
    assert_eq!(open[0]["id"], keep["id"]);
}

#[test]
fn delete_removes_the_bug() {
    let h = harness();
    let bug = h.create("Short lived");
    let id = bug["id"].as_str().expect("id");

    h.bugs()
        .args(["delete", id, "--format", "text"])
        .assert()
        .success()
        .stdout(format!("Deleted {id}\n"));
    assert!(h.list().is_empty());

    h.bugs()
        .args(["delete", id])
        .assert()
        .failure()
        .stderr(predicate::str::contains(format!("Bug with id {id} not found")));
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[test]
fn invalid_create_lists_field_errors() {
    let h = harness();
    h.bugs()
        .args(["create", "--title", "ab", "--reporter", "   ", "--tags", "a,b,c,d,e,f"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error: Validation failed"))
        .stderr(predicate::str::contains(
            "  title: Title must be at least 3 characters long",
        ))
        .stderr(predicate::str::contains("  reporter: Reporter is required"))
        .stderr(predicate::str::contains("  tags:"));
    assert!(h.list().is_empty());
}

#[test]
fn invalid_create_json_error_carries_details() {
    let h = harness();
    let output = h
        .bugs()
        .args(["create", "--title", "ab", "--reporter", "Sam", "--json"])
        .output()
        .expect("create should not crash");
    assert!(!output.status.success());

    let err: Value = serde_json::from_slice(&output.stderr).expect("json error");
    assert_eq!(err["error"]["message"], "Validation failed");
    assert!(err["error"]["details"]["title"].is_string());
}

#[test]
fn status_on_unknown_id_fails_with_404_message() {
    let h = harness();
    let output = h
        .bugs()
        .args(["status", "does-not-exist", "resolved", "--json"])
        .output()
        .expect("status should not crash");
    assert!(!output.status.success());

    let err: Value = serde_json::from_slice(&output.stderr).expect("json error");
    assert_eq!(err["error"]["status"], 404);
    assert_eq!(err["error"]["message"], "Bug with id does-not-exist not found");
}

#[test]
fn ids_with_reserved_characters_reach_the_bug_route() {
    let h = harness();
    for id in ["a/b", "what?x=1"] {
        h.bugs()
            .args(["delete", id])
            .assert()
            .failure()
            .stderr(predicate::str::contains(format!("Bug with id {id} not found")));
    }
}

#[test]
fn unknown_status_value_is_a_usage_error() {
    let h = harness();
    h.bugs()
        .args(["status", "abc", "blocked"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("blocked"));
}

#[test]
fn unreachable_server_fails_cleanly() {
    let h = harness();
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("bugs"));
    cmd.env("HOME", h.home.path())
        .env("XDG_CONFIG_HOME", h.home.path())
        .env("BUGTRACK_LOG", "error")
        .args(["--server", "http://127.0.0.1:9", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error: request to http://127.0.0.1:9"));
}

// ---------------------------------------------------------------------------
// Misc
// ---------------------------------------------------------------------------

#[test]
fn health_reports_ok() {
    let h = harness();
    let output = h
        .bugs()
        .args(["health", "--json"])
        .output()
        .expect("health should not crash");
    assert!(output.status.success());

    let health: Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(health["status"], "ok");
    assert!(health["timestamp"].as_str().is_some_and(|ts| ts.ends_with('Z')));
}

#[test]
fn server_url_from_environment() {
    let h = harness();
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("bugs"));
    cmd.env("HOME", h.home.path())
        .env("XDG_CONFIG_HOME", h.home.path())
        .env("BUGTRACK_LOG", "error")
        .env("BUGTRACK_URL", h.server.url())
        .args(["health", "--format", "text"])
        .assert()
        .success()
        .stdout(predicate::str::contains("status:      ok"));
}

#[test]
fn completions_do_not_need_a_server() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("bugs"));
    cmd.env("BUGTRACK_LOG", "error")
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("bugs"));
}
