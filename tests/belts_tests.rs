//! CLI-level integration tests for the `belts` binary: stdin in, one JSON
//! object on stdout, exit code per status (§6.1, §8).

use assert_cmd::Command;
use predicates::prelude::*;

fn belts_cmd() -> Command {
    Command::cargo_bin("belts").unwrap()
}

#[test]
fn basic_flow_is_ok_with_exit_0() {
    let input = serde_json::json!({
        "nodes": {"A": {"capacity": 1000}, "B": {"capacity": 1000}, "C": {"capacity": 1000}},
        "edges": [
            {"from": "A", "to": "B", "capacity": 100},
            {"from": "B", "to": "C", "capacity": 100}
        ],
        "sources": [{"node": "A", "supply": 50}],
        "sink": "C"
    });

    belts_cmd()
        .write_stdin(input.to_string())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"status\": \"ok\""))
        .stdout(predicate::str::contains("\"max_flow_per_min\": 50.0"));
}

#[test]
fn unsatisfiable_lower_bound_is_infeasible_with_exit_0() {
    let input = serde_json::json!({
        "nodes": {"A": {"capacity": 500}, "B": {"capacity": 500}},
        "edges": [{"from": "A", "to": "B", "lower_bound": 60, "capacity": 100}],
        "sources": [{"node": "A", "supply": 50}],
        "sink": "B"
    });

    belts_cmd()
        .write_stdin(input.to_string())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"status\": \"infeasible\""));
}

#[test]
fn malformed_json_is_error_with_exit_1() {
    belts_cmd()
        .write_stdin("not json")
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("\"status\": \"error\""));
}

#[test]
fn missing_sink_is_error_with_exit_0() {
    // Input-shape validation errors are a normal result object at exit 0
    // (§6.1, §7); only malformed JSON and an internal solver failure exit 1.
    let input = serde_json::json!({
        "edges": [{"from": "A", "to": "B", "capacity": 10}],
        "sources": [{"node": "A", "supply": 5}]
    });

    belts_cmd()
        .write_stdin(input.to_string())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"status\": \"error\""));
}

#[test]
fn output_keys_are_sorted_lexicographically() {
    let input = serde_json::json!({
        "edges": [{"from": "A", "to": "B", "capacity": 10}],
        "sources": [{"node": "A", "supply": 5}],
        "sink": "B"
    });

    let output = belts_cmd().write_stdin(input.to_string()).output().unwrap();
    let text = String::from_utf8(output.stdout).unwrap();
    let max_flow_pos = text.find("max_flow_per_min").unwrap();
    let status_pos = text.find("status").unwrap();
    assert!(max_flow_pos < status_pos, "keys must sort before \"status\" alphabetically");
}
