// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! qswatch - library behind the `qs-watch` binary.
//!
//! Drives the threaded [`qs_client::StatusEngine`] and
//! [`qs_client::MessageMonitor`] against recorded JSONL files, so wait
//! conditions and message buffering can be exercised without a server.

mod cli;
mod commands;
pub mod env;
pub mod error;
pub mod replay;

pub use cli::{Cli, Command};
pub use error::{Error, Result};
pub use replay::{ReplaySource, ReplayTransport};

use std::time::Duration;

use commands::console::ConsoleArgs;
use commands::wait::Target;

/// Runs one `qs-watch` invocation.
pub fn run(cli: Cli) -> Result<()> {
    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Status { snapshots, reload, field } => {
            commands::status::run(&config, &snapshots, reload, field.as_deref())
        }
        Command::Wait { snapshots, state, or_paused, timeout_ms } => commands::wait::run(
            &config,
            &snapshots,
            Target::from_args(state, or_paused),
            timeout_ms,
        ),
        Command::Console { messages, count, idle_ms, json } => commands::console::run(
            &config,
            &messages,
            ConsoleArgs { count, idle: Duration::from_millis(idle_ms), json },
        ),
        Command::Config => commands::config::run(&config),
    }
}
