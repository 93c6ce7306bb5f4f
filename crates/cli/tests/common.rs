// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Allow unused items: test helpers are shared across multiple test binaries,
// and not every test file uses every helper.
#![allow(dead_code)]
#![allow(unused_imports)]

use std::path::PathBuf;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;

pub use predicates::prelude::*;
pub use tempfile::TempDir;

/// Engine settings fast enough for tests.
pub const FAST_CONFIG: &str = "\
[engine]
status_expiration_period_ms = 0
status_polling_period_ms = 10
tick_period_ms = 5

[monitor]
poll_timeout_ms = 10
";

pub fn qs() -> Command {
    let mut cmd = cargo_bin_cmd!("qs-watch");
    cmd.env_remove("QS_WATCH_CONFIG").env("NO_COLOR", "1");
    cmd
}

/// Writes `lines` as a JSONL file inside `temp`.
pub fn write_jsonl(temp: &TempDir, name: &str, lines: &[&str]) -> PathBuf {
    let path = temp.path().join(name);
    let mut content = lines.join("\n");
    content.push('\n');
    std::fs::write(&path, content).unwrap();
    path
}

/// Writes a snapshot recording with one `manager_state` per line.
pub fn write_states(temp: &TempDir, states: &[&str]) -> PathBuf {
    let lines: Vec<String> = states
        .iter()
        .map(|s| format!("{{\"manager_state\":\"{s}\",\"queue_length\":1}}"))
        .collect();
    let lines: Vec<&str> = lines.iter().map(String::as_str).collect();
    write_jsonl(temp, "status.jsonl", &lines)
}

/// Writes [`FAST_CONFIG`] and returns its path.
pub fn fast_config(temp: &TempDir) -> PathBuf {
    let path = temp.path().join("qs.toml");
    std::fs::write(&path, FAST_CONFIG).unwrap();
    path
}
