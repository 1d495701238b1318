//! `compare` and `analyze` over the multi-session fixture.

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use spanweave_testing::{TestWorld, fixtures};

fn world() -> TestWorld {
    TestWorld::new().with_spans("spans.jsonl", &fixtures::multi_session_dataset())
}

#[test]
fn test_compare_json_reports_patterns() {
    let world = world();

    let result = world
        .run(&["--format", "json", "compare", "spans.jsonl"])
        .unwrap();
    assert!(result.success(), "stderr: {}", result.stderr());

    let json = result.json().unwrap();
    let sessions = json.as_array().unwrap();
    // x1 is alone in its trace and has nothing to compare.
    assert_eq!(sessions.len(), 2);

    let alpha = &sessions[0];
    assert_eq!(alpha["session_id"], "alpha");
    assert_eq!(alpha["comparisons"][0]["earlier_span_id"], "a1");
    assert_eq!(alpha["comparisons"][0]["later_span_id"], "a2");
    assert_eq!(alpha["comparisons"][0]["pattern"], "accumulation");
    assert_eq!(alpha["comparisons"][0]["comparison"]["new_count"], 2);

    let beta = &sessions[1];
    assert_eq!(beta["session_id"], "beta");
    assert_eq!(beta["comparisons"][0]["pattern"], "loss");
    assert_eq!(beta["containment"][0]["check"]["is_complete_subset"], false);
}

#[test]
fn test_compare_single_session_plain() {
    let world = world();

    let mut cmd = cargo_bin_cmd!("spanweave");
    world
        .configure_command(&mut cmd)
        .args(["compare", "spans.jsonl", "--session", "1", "--detailed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("alpha"))
        .stdout(predicate::str::contains("what is the weather"));
}

#[test]
fn test_compare_unknown_session_fails() {
    let world = world();

    let mut cmd = cargo_bin_cmd!("spanweave");
    world
        .configure_command(&mut cmd)
        .args(["compare", "spans.jsonl", "--session", "9"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Session 9 not found (3 sessions reconstructed)"));
}

#[test]
fn test_analyze_json_summary() {
    let world = world();

    let result = world
        .run(&["--format", "json", "analyze", "spans.jsonl"])
        .unwrap();
    assert!(result.success(), "stderr: {}", result.stderr());

    let json = result.json().unwrap();
    assert_eq!(json["total_spans"], 6);
    assert_eq!(json["with_session_id"], 5);
    assert_eq!(json["without_session_id"], 1);
    assert_eq!(json["distinct_sessions"], 2);
    assert_eq!(json["unique_traces"], 4);
    assert_eq!(json["child_spans"], 1);
    assert_eq!(json["sessions"]["alpha"], 3);
}

#[test]
fn test_analyze_plain_summary() {
    let world = world();

    let mut cmd = cargo_bin_cmd!("spanweave");
    world
        .configure_command(&mut cmd)
        .args(["analyze", "spans.jsonl"])
        .assert()
        .success()
        .stdout(predicate::str::contains("weather_lookup"));
}
