// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Ready-made conditions over `manager_state`.

use std::sync::Arc;

use crate::snapshot::Snapshot;
use crate::waiter::Condition;

pub const STATE_IDLE: &str = "idle";
pub const STATE_PAUSED: &str = "paused";

/// Holds while `manager_state` equals `state`.
pub fn manager_state_is(state: &str) -> Condition {
    let state = state.to_string();
    Arc::new(move |s: &Snapshot| s.manager_state() == Some(state.as_str()))
}

/// Holds while `manager_state` is any of `states`.
pub fn manager_state_in(states: &[&str]) -> Condition {
    let states: Vec<String> = states.iter().map(|s| s.to_string()).collect();
    Arc::new(move |s: &Snapshot| {
        s.manager_state().is_some_and(|current| states.iter().any(|st| st == current))
    })
}

pub fn idle() -> Condition {
    manager_state_is(STATE_IDLE)
}

pub fn idle_or_paused() -> Condition {
    manager_state_in(&[STATE_IDLE, STATE_PAUSED])
}

#[cfg(test)]
#[path = "conditions_tests.rs"]
mod tests;
