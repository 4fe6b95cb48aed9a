//! E2E tests for the analysis commands:
//! `ftree analyze`, `ftree cut-sets`, `ftree importance`, `ftree check`.
//!
//! Covers: JSON result schema, text rows, config-driven limits and output
//! mode, and error codes for unreadable or malformed snapshots.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Test harness helpers
// ---------------------------------------------------------------------------

fn ftree_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("ftree"));
    cmd.current_dir(dir);
    cmd.env("FTREE_LOG", "error");
    cmd.env_remove("FORMAT");
    cmd
}

/// OR(AND(X1, X2), X3) with a conditional event Y1 drawn pointing at the
/// AND gate.
const PUMP_TREE: &str = r#"{
  "nodes": [
    {"id": "top", "type": "gate-or", "label": "Loss of cooling"},
    {"id": "g1", "type": "gate-and", "label": "Both pumps fail"},
    {"id": "x1", "type": "event-circle", "label": "X1", "probability": 0.1},
    {"id": "x2", "type": "event-circle", "label": "X2", "probability": "0.2"},
    {"id": "x3", "type": "event-circle", "label": "X3", "probability": 0.001},
    {"id": "y1", "type": "event-oval", "label": "Y1", "conditionProbability": 0.5}
  ],
  "connections": [
    {"from": "top", "to": "g1"},
    {"from": "top", "to": "x3"},
    {"from": "g1", "to": "x1"},
    {"from": "g1", "to": "x2"},
    {"from": "y1", "to": "g1"}
  ]
}"#;

fn write_tree(dir: &Path, json: &str) -> PathBuf {
    let path = dir.join("tree.json");
    fs::write(&path, json).expect("write snapshot");
    path
}

fn json_output(dir: &Path, args: &[&str]) -> Value {
    let output = ftree_cmd(dir)
        .args(args)
        .args(["--format", "json"])
        .output()
        .expect("ftree should not crash");
    assert!(
        output.status.success(),
        "ftree {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("valid JSON")
}

fn approx(value: &Value, expected: f64) -> bool {
    value.as_f64().is_some_and(|v| (v - expected).abs() < 1e-12)
}

// ---------------------------------------------------------------------------
// ftree analyze
// ---------------------------------------------------------------------------

#[test]
fn analyze_json_has_result_fields() {
    let dir = TempDir::new().expect("tempdir");
    write_tree(dir.path(), PUMP_TREE);

    let json = json_output(dir.path(), &["analyze", "tree.json"]);
    assert_eq!(json["topEventId"], "top");
    assert_eq!(json["cutSetCount"], 2);

    // {x1, x2, y1} = 0.01 and {x3} = 0.001, most probable first.
    let cut_sets = json["minimalCutSets"].as_array().expect("array");
    assert_eq!(cut_sets[0]["events"], serde_json::json!(["x1", "x2", "y1"]));
    assert_eq!(cut_sets[0]["eventNames"], serde_json::json!(["X1", "X2", "Y1"]));
    assert!(approx(&cut_sets[0]["probability"], 0.01));
    assert_eq!(cut_sets[1]["events"], serde_json::json!(["x3"]));
    assert!(approx(&json["topEventProbability"], 0.011));

    let basics = json["basicEventsProbability"].as_array().expect("array");
    assert_eq!(basics.len(), 4);
    // `Y1` has no `X<n>` ordinal and sorts as 0.
    assert_eq!(basics[0]["eventId"], "y1");
    assert_eq!(basics[0]["eventType"], "conditional");
    assert_eq!(basics[1]["eventId"], "x1");
    assert!(approx(&basics[2]["probability"], 0.2));

    let importance = json["structuralImportance"].as_array().expect("array");
    assert_eq!(importance[0]["eventId"], "x3");
    assert!(approx(&importance[0]["structuralImportance"], 0.125));
}

#[test]
fn analyze_with_explicit_root() {
    let dir = TempDir::new().expect("tempdir");
    write_tree(dir.path(), PUMP_TREE);

    let json = json_output(dir.path(), &["analyze", "tree.json", "--root", "g1"]);
    assert_eq!(json["topEventId"], "g1");
    assert_eq!(json["cutSetCount"], 1);
}

#[test]
fn analyze_reads_stdin() {
    let dir = TempDir::new().expect("tempdir");
    let output = ftree_cmd(dir.path())
        .args(["analyze", "-", "--json"])
        .write_stdin(PUMP_TREE)
        .output()
        .expect("ftree should not crash");
    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(json["cutSetCount"], 2);
}

#[test]
fn analyze_pretty_shows_sections() {
    let dir = TempDir::new().expect("tempdir");
    write_tree(dir.path(), PUMP_TREE);

    ftree_cmd(dir.path())
        .args(["analyze", "tree.json", "--format", "pretty"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Top event:"))
        .stdout(predicate::str::contains("Single-point failures"))
        .stdout(predicate::str::contains("blake3:"));
}

#[test]
fn config_output_mode_applies_without_flags() {
    let dir = TempDir::new().expect("tempdir");
    write_tree(dir.path(), PUMP_TREE);
    fs::write(dir.path().join("ftree.toml"), "[report]\noutput = \"json\"\n")
        .expect("write config");

    let output = ftree_cmd(dir.path())
        .args(["analyze", "tree.json"])
        .output()
        .expect("ftree should not crash");
    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(json["topEventId"], "top");
}

#[test]
fn config_limit_aborts_wide_trees() {
    let dir = TempDir::new().expect("tempdir");
    write_tree(dir.path(), PUMP_TREE);
    let config = dir.path().join("limits.toml");
    fs::write(&config, "[analysis]\nmax_cut_sets = 1\n").expect("write config");

    ftree_cmd(dir.path())
        .args(["analyze", "tree.json", "--json", "--config"])
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("E3001"));
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[test]
fn malformed_snapshot_reports_parse_code() {
    let dir = TempDir::new().expect("tempdir");
    write_tree(dir.path(), "{\"nodes\": [");

    let output = ftree_cmd(dir.path())
        .args(["analyze", "tree.json", "--json"])
        .output()
        .expect("ftree should not crash");
    assert!(!output.status.success());
    let json: Value = serde_json::from_slice(&output.stderr).expect("JSON error");
    assert_eq!(json["error"]["error_code"], "E1001");
}

#[test]
fn missing_snapshot_reports_read_code() {
    let dir = TempDir::new().expect("tempdir");

    ftree_cmd(dir.path())
        .args(["cut-sets", "absent.json", "--format", "text"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[E1002]"));
}

#[test]
fn broken_config_reports_config_code() {
    let dir = TempDir::new().expect("tempdir");
    write_tree(dir.path(), PUMP_TREE);
    fs::write(dir.path().join("ftree.toml"), "[analysis\n").expect("write config");

    ftree_cmd(dir.path())
        .args(["analyze", "tree.json", "--format", "text"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E2002"));
}

// ---------------------------------------------------------------------------
// ftree cut-sets / importance
// ---------------------------------------------------------------------------

#[test]
fn cut_sets_text_rows() {
    let dir = TempDir::new().expect("tempdir");
    write_tree(dir.path(), PUMP_TREE);

    ftree_cmd(dir.path())
        .args(["cut-sets", "tree.json", "--format", "text", "--max-order", "1"])
        .assert()
        .success()
        .stdout("0.001\t1\tx3\n");
}

#[test]
fn importance_limit_truncates() {
    let dir = TempDir::new().expect("tempdir");
    write_tree(dir.path(), PUMP_TREE);

    let json = json_output(dir.path(), &["importance", "tree.json", "--limit", "2"]);
    let ranking = json.as_array().expect("array");
    assert_eq!(ranking.len(), 2);
    assert_eq!(ranking[0]["eventId"], "x3");
    assert_eq!(ranking[0]["occurrences"], 1);
    assert_eq!(ranking[0]["totalCutSets"], 2);
}

#[test]
fn empty_snapshot_is_not_an_error() {
    let dir = TempDir::new().expect("tempdir");
    write_tree(dir.path(), "{}");

    let json = json_output(dir.path(), &["analyze", "tree.json"]);
    assert_eq!(json["cutSetCount"], 0);
    assert_eq!(json["topEventProbability"], 0.0);
    assert!(json["topEventId"].is_null());
}

// ---------------------------------------------------------------------------
// ftree check / completions
// ---------------------------------------------------------------------------

#[test]
fn check_reports_and_strict_fails() {
    let dir = TempDir::new().expect("tempdir");
    write_tree(
        dir.path(),
        r#"{"nodes": [{"id": "a", "type": "gate-or"}, {"id": "b", "type": "gate-or"}],
            "connections": [{"from": "a", "to": "b"}, {"from": "b", "to": "a"}]}"#,
    );

    let json = json_output(dir.path(), &["check", "tree.json"]);
    assert_eq!(json["wellFormed"], false);
    assert_eq!(json["cycles"], serde_json::json!([["a", "b"]]));

    ftree_cmd(dir.path())
        .args(["check", "tree.json", "--strict", "--format", "text"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("well_formed\tfalse"));
}

#[test]
fn check_accepts_well_formed_tree() {
    let dir = TempDir::new().expect("tempdir");
    write_tree(
        dir.path(),
        r#"{"nodes": [{"id": "g", "type": "gate-and"},
                      {"id": "x1", "type": "event-circle", "probability": 0.1},
                      {"id": "x2", "type": "event-circle", "probability": 0.2}],
            "connections": [{"from": "g", "to": "x1"}, {"from": "g", "to": "x2"}]}"#,
    );

    let json = json_output(dir.path(), &["check", "tree.json", "--strict"]);
    assert_eq!(json["wellFormed"], true);
    assert_eq!(json["basicEventCount"], 2);
    assert_eq!(json["topEventCandidates"], serde_json::json!(["g"]));
}

#[test]
fn check_lists_ovals_as_candidates() {
    let dir = TempDir::new().expect("tempdir");
    write_tree(dir.path(), PUMP_TREE);

    // Ovals are drawn pointing at their gate, so they are never targets.
    let json = json_output(dir.path(), &["check", "tree.json"]);
    assert_eq!(json["topEventCandidates"], serde_json::json!(["top", "y1"]));
    assert_eq!(json["wellFormed"], false);
}

#[test]
fn completions_generate_script() {
    let dir = TempDir::new().expect("tempdir");
    ftree_cmd(dir.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ftree"));
}

#[test]
fn analyze_survives_cycle_below_root() {
    let dir = TempDir::new().expect("tempdir");
    write_tree(
        dir.path(),
        r#"{"nodes": [{"id": "top", "type": "gate-or"},
                      {"id": "a", "type": "gate-or"},
                      {"id": "b", "type": "gate-or"}],
            "connections": [{"from": "top", "to": "a"}, {"from": "a", "to": "b"},
                            {"from": "b", "to": "a"}]}"#,
    );

    let json = json_output(dir.path(), &["analyze", "tree.json"]);
    assert_eq!(json["topEventId"], "top");
    assert_eq!(json["cutSetCount"], 0);
}
