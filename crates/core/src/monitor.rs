// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! One-shot cancellation token for condition-waits.
//!
//! A [`WaitMonitor`] is handed to a wait call by the caller that may want to
//! abort it from another thread or task. Clones share state, so cancelling
//! any clone cancels every wait the monitor is attached to.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Callback run once when a monitor is cancelled.
pub type CancelCallback = Box<dyn FnOnce() + Send + 'static>;

/// Handle for removing a registered cancel callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackId(u64);

#[derive(Default)]
struct MonitorState {
    time_start: Option<Instant>,
    time_finished: Option<Instant>,
    timeout: Option<Duration>,
    cancelled: bool,
    next_callback: u64,
    callbacks: Vec<(CallbackId, CancelCallback)>,
}

/// Cancellation token and timing record for one wait.
#[derive(Clone, Default)]
pub struct WaitMonitor {
    inner: Arc<Mutex<MonitorState>>,
}

impl WaitMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MonitorState> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Records the start of a wait with the given timeout.
    ///
    /// Called by the engines when a wait begins; restarting a monitor
    /// clears any previous finish time but keeps a prior cancellation.
    pub fn begin(&self, timeout: Duration) {
        let mut state = self.state();
        state.time_start = Some(Instant::now());
        state.time_finished = None;
        state.timeout = Some(timeout);
    }

    /// Freezes `time_elapsed` at the moment the wait resolved.
    pub fn finish(&self) {
        let mut state = self.state();
        if state.time_start.is_some() && state.time_finished.is_none() {
            state.time_finished = Some(Instant::now());
        }
    }

    pub fn set_timeout(&self, timeout: Duration) {
        self.state().timeout = Some(timeout);
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.state().timeout
    }

    pub fn time_start(&self) -> Option<Instant> {
        self.state().time_start
    }

    /// Time since the wait began, stopped at the point it resolved.
    /// Zero if no wait has used this monitor yet.
    pub fn time_elapsed(&self) -> Duration {
        let state = self.state();
        match (state.time_start, state.time_finished) {
            (Some(start), Some(end)) => end.saturating_duration_since(start),
            (Some(start), None) => start.elapsed(),
            (None, _) => Duration::ZERO,
        }
    }

    /// Registers a callback to run when the monitor is cancelled.
    ///
    /// If the monitor is already cancelled the callback runs immediately and
    /// the returned id refers to nothing.
    pub fn add_cancel_callback<F>(&self, callback: F) -> CallbackId
    where
        F: FnOnce() + Send + 'static,
    {
        let mut state = self.state();
        let id = CallbackId(state.next_callback);
        state.next_callback += 1;
        if state.cancelled {
            drop(state);
            callback();
            return id;
        }
        state.callbacks.push((id, Box::new(callback)));
        id
    }

    /// Drops a callback that has not run yet. Returns false if it already ran
    /// or was removed.
    pub fn remove_cancel_callback(&self, id: CallbackId) -> bool {
        let mut state = self.state();
        let before = state.callbacks.len();
        state.callbacks.retain(|(registered, _)| *registered != id);
        state.callbacks.len() != before
    }

    /// Runs and clears all cancel callbacks, then marks the monitor cancelled.
    ///
    /// A second call finds an empty callback list and changes nothing.
    pub fn cancel(&self) {
        let callbacks = std::mem::take(&mut self.state().callbacks);
        for (_, callback) in callbacks {
            callback();
        }
        self.state().cancelled = true;
    }

    pub fn is_cancelled(&self) -> bool {
        self.state().cancelled
    }

    /// Number of callbacks still waiting for a cancel.
    pub fn pending_callbacks(&self) -> usize {
        self.state().callbacks.len()
    }
}

impl std::fmt::Debug for WaitMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state();
        f.debug_struct("WaitMonitor")
            .field("timeout", &state.timeout)
            .field("cancelled", &state.cancelled)
            .field("callbacks", &state.callbacks.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "monitor_tests.rs"]
mod tests;
