// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use serde_json::json;
use yare::parameterized;

fn sample() -> Snapshot {
    Snapshot::from_value(json!({
        "manager_state": "running",
        "queue_length": 3,
        "paused": false,
    }))
    .unwrap()
}

#[parameterized(
    string_is_bare = { "manager_state", "running" },
    number = { "queue_length", "3" },
    boolean = { "paused", "false" },
)]
fn render_single_field(field: &str, expected: &str) {
    assert_eq!(render(&sample(), Some(field)).unwrap(), expected);
}

#[test]
fn render_whole_snapshot_as_json() {
    let text = render(&sample(), None).unwrap();
    let parsed: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed["queue_length"], 3);
}

#[test]
fn render_missing_field() {
    let err = render(&sample(), Some("missing")).unwrap_err();
    assert!(matches!(err, Error::FieldNotFound(ref f) if f == "missing"));
}
