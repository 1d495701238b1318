//! `query` and `export` write paths.

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use spanweave_testing::{TestWorld, assertions, fixtures};

fn world() -> TestWorld {
    TestWorld::new().with_spans("spans.jsonl", &fixtures::multi_session_dataset())
}

#[test]
fn test_query_search_is_case_insensitive() {
    let world = world();

    let result = world
        .run(&["--format", "json", "query", "spans.jsonl", "--search", "SUNNY"])
        .unwrap();
    assert!(result.success(), "stderr: {}", result.stderr());

    let json = result.json().unwrap();
    assert_eq!(assertions::session_ids(&json).unwrap(), vec!["alpha"]);
    assert_eq!(json[0]["spans"][0]["span_id"], "a2");
}

#[test]
fn test_query_session_id_plain() {
    let world = world();

    let mut cmd = cargo_bin_cmd!("spanweave");
    world
        .configure_command(&mut cmd)
        .args(["query", "spans.jsonl", "--session-id", "alpha"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 3 matching spans in 1 sessions"));
}

#[test]
fn test_query_requires_a_filter() {
    let world = world();

    let mut cmd = cargo_bin_cmd!("spanweave");
    world
        .configure_command(&mut cmd)
        .args(["query", "spans.jsonl"])
        .assert()
        .failure();
}

#[test]
fn test_query_export_writes_json() {
    let world = world();

    let result = world
        .run(&[
            "query",
            "spans.jsonl",
            "--search",
            "refund",
            "--export",
            "refunds.json",
        ])
        .unwrap();
    assert!(result.success(), "stderr: {}", result.stderr());
    assert!(result.stdout().contains("Found 1 matching spans in 1 sessions"));

    let written = std::fs::read_to_string(world.path("refunds.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&written).unwrap();
    assert_eq!(assertions::session_ids(&json).unwrap(), vec!["beta"]);
}

#[test]
fn test_export_csv() {
    let world = TestWorld::new().with_spans("spans.jsonl", &fixtures::single_trace_forest());

    let mut cmd = cargo_bin_cmd!("spanweave");
    world
        .configure_command(&mut cmd)
        .args(["export", "spans.jsonl", "-o", "out.csv", "--as", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 1 sessions (5 spans) to out.csv"));

    let csv = std::fs::read_to_string(world.path("out.csv")).unwrap();
    let mut lines = csv.lines();
    assert_eq!(
        lines.next(),
        Some("session_number,session_id,segment,span_id,trace_id,parent_id,name,kind,start_time,end_time,depth")
    );
    assert_eq!(lines.count(), 5);
}

#[test]
fn test_export_jsonl_json_summary() {
    let world = world();

    let result = world
        .run(&[
            "--format",
            "json",
            "export",
            "spans.jsonl",
            "-o",
            "out/sessions.jsonl",
            "--as",
            "jsonl",
        ])
        .unwrap();
    assert!(result.success(), "stderr: {}", result.stderr());

    let json = result.json().unwrap();
    assert_eq!(json["format"], "jsonl");
    assert_eq!(json["sessions"], 3);
    assert_eq!(json["spans"], 6);

    let written = std::fs::read_to_string(world.path("out/sessions.jsonl")).unwrap();
    let ids: Vec<String> = written
        .lines()
        .map(|l| serde_json::from_str::<serde_json::Value>(l).unwrap()["session_id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(ids, vec!["alpha", "beta", "TX"]);
}
