// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Write;
use std::path::Path;
use std::time::Duration;

use qs_client::MessageMonitor;
use qs_core::{Message, QsConfig};

use crate::error::Result;
use crate::replay::ReplaySource;

pub struct ConsoleArgs {
    pub count: Option<usize>,
    pub idle: Duration,
    pub json: bool,
}

pub fn run(config: &QsConfig, messages: &Path, args: ConsoleArgs) -> Result<()> {
    let source = ReplaySource::load(messages)?;
    let monitor = MessageMonitor::new(source, config.monitor.clone())?;
    monitor.enable()?;

    let mut out = std::io::stdout().lock();
    let mut printed = 0;
    while args.count.map_or(true, |n| printed < n) {
        match monitor.next_msg(Some(args.idle)) {
            Ok(message) => {
                write_message(&mut out, &message, args.json)?;
                printed += 1;
            }
            Err(qs_core::Error::RequestTimeout { .. }) => break,
            Err(e) => return Err(e.into()),
        }
    }
    out.flush()?;

    let dropped = monitor.dropped();
    if dropped > 0 {
        tracing::warn!(dropped, max_msgs = config.monitor.max_msgs, "message buffer overflowed");
    }
    monitor.disable_wait(config.monitor.poll_timeout() + Duration::from_secs(1))?;
    Ok(())
}

/// Writes the message text, or the raw JSON when asked or when there is none.
pub(crate) fn write_message(out: &mut impl Write, message: &Message, json: bool) -> Result<()> {
    match message.get("msg").and_then(|m| m.as_str()) {
        Some(text) if !json => {
            out.write_all(text.as_bytes())?;
            if !text.ends_with('\n') {
                out.write_all(b"\n")?;
            }
        }
        _ => writeln!(out, "{message}")?,
    }
    Ok(())
}

#[cfg(test)]
#[path = "console_tests.rs"]
mod tests;
