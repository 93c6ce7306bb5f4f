// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use clap::{Parser, Subcommand};

const AFTER_HELP: &str = "\
Recordings are JSON Lines files: one status reply (a JSON object) or one
console message per line.

Examples:
  qs-watch status status.jsonl
  qs-watch wait status.jsonl --state idle --state paused --timeout-ms 5000
  qs-watch console messages.jsonl --count 10";

#[derive(Parser)]
#[command(name = "qs-watch")]
#[command(about = "Watch a recorded queue server through the status engine")]
#[command(version)]
#[command(after_help = AFTER_HELP)]
pub struct Cli {
    /// Configuration file (TOML). Falls back to $QS_WATCH_CONFIG.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the current status snapshot
    Status {
        /// Snapshot recording
        snapshots: PathBuf,

        /// Bypass the cache and fetch a fresh snapshot
        #[arg(long)]
        reload: bool,

        /// Print a single field instead of the whole snapshot
        #[arg(long, short)]
        field: Option<String>,
    },

    /// Block until the manager reaches one of the given states
    Wait {
        /// Snapshot recording
        snapshots: PathBuf,

        /// Target manager state (repeatable, default: idle)
        #[arg(long, short, value_name = "STATE")]
        state: Vec<String>,

        /// Also accept "paused" when waiting for idle
        #[arg(long, conflicts_with = "state")]
        or_paused: bool,

        /// Give up after this many milliseconds (default: engine config)
        #[arg(long, value_name = "MS")]
        timeout_ms: Option<u64>,
    },

    /// Print console messages collected by the message monitor
    Console {
        /// Message recording
        messages: PathBuf,

        /// Stop after this many messages
        #[arg(long, short = 'n')]
        count: Option<usize>,

        /// Stop when no message arrives for this many milliseconds
        #[arg(long, value_name = "MS", default_value_t = 1000)]
        idle_ms: u64,

        /// Print messages as JSON lines instead of their text
        #[arg(long)]
        json: bool,
    },

    /// Print the effective configuration as TOML
    Config,
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
