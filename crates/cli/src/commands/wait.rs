// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use qs_client::StatusEngine;
use qs_core::clock::duration_ms;
use qs_core::{conditions, QsConfig, WaitMonitor};

use crate::error::Result;
use crate::replay::ReplayTransport;

/// Which manager states end the wait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Idle,
    IdleOrPaused,
    States(Vec<String>),
}

impl Target {
    pub fn from_args(states: Vec<String>, or_paused: bool) -> Self {
        match (states.is_empty(), or_paused) {
            (false, _) => Target::States(states),
            (true, true) => Target::IdleOrPaused,
            (true, false) => Target::Idle,
        }
    }
}

pub fn run(
    config: &QsConfig,
    snapshots: &Path,
    target: Target,
    timeout_ms: Option<u64>,
) -> Result<()> {
    let transport = Arc::new(ReplayTransport::load(snapshots)?);
    let engine = StatusEngine::new(Arc::clone(&transport), config.engine.clone())?;
    let timeout = timeout_ms.map(Duration::from_millis);
    let monitor = WaitMonitor::new();

    let outcome = match &target {
        Target::Idle => engine.wait_for_idle(timeout, Some(&monitor)),
        Target::IdleOrPaused => engine.wait_for_idle_or_paused(timeout, Some(&monitor)),
        Target::States(states) => {
            let states: Vec<&str> = states.iter().map(String::as_str).collect();
            let timeout = timeout.unwrap_or(engine.config().default_wait_timeout());
            engine.wait_for_condition(
                conditions::manager_state_in(&states),
                timeout,
                Some(&monitor),
            )
        }
    };
    tracing::debug!(
        ?target,
        fetches = transport.fetches(),
        elapsed_ms = duration_ms(monitor.time_elapsed()),
        "wait finished"
    );
    outcome?;

    let reached = engine
        .cached_status()
        .and_then(|s| s.manager_state().map(str::to_string))
        .unwrap_or_default();
    engine.close();
    println!("{reached}");
    Ok(())
}

#[cfg(test)]
#[path = "wait_tests.rs"]
mod tests;
