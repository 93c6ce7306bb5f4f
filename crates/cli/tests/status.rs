// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

mod common;
use common::*;

#[test]
fn status_prints_first_snapshot() {
    let temp = TempDir::new().unwrap();
    let snapshots = write_states(&temp, &["running", "idle"]);

    qs().arg("status")
        .arg(&snapshots)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"manager_state\": \"running\""))
        .stdout(predicate::str::contains("\"queue_length\": 1"));
}

#[test]
fn status_field_prints_bare_value() {
    let temp = TempDir::new().unwrap();
    let snapshots = write_states(&temp, &["paused"]);

    qs().args(["status", "--field", "manager_state"])
        .arg(&snapshots)
        .assert()
        .success()
        .stdout("paused\n");
}

#[test]
fn status_unknown_field_fails() {
    let temp = TempDir::new().unwrap();
    let snapshots = write_states(&temp, &["idle"]);

    qs().args(["status", "-f", "nope"])
        .arg(&snapshots)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("error: field 'nope' not present"));
}

#[test]
fn status_reports_bad_record_line() {
    let temp = TempDir::new().unwrap();
    let snapshots = write_jsonl(&temp, "status.jsonl", &["{\"manager_state\":\"idle\"}", "[1]"]);

    qs().arg("status")
        .arg(&snapshots)
        .assert()
        .failure()
        .stderr(predicate::str::contains("status.jsonl:2:"))
        .stderr(predicate::str::contains("must be an object"));
}

#[test]
fn status_with_empty_recording_forwards_transport_error() {
    let temp = TempDir::new().unwrap();
    let snapshots = write_jsonl(&temp, "status.jsonl", &[""]);

    qs().arg("status")
        .arg(&snapshots)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no snapshots recorded"));
}

#[test]
fn status_missing_recording_fails() {
    let temp = TempDir::new().unwrap();

    qs().arg("status")
        .arg(temp.path().join("absent.jsonl"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot read"));
}
