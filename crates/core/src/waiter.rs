// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Registry of pending condition-waits.
//!
//! Every waiter is evaluated against each new snapshot and on every poll
//! tick. Evaluation order per waiter:
//!
//! 1. condition holds → [`Resolution::Satisfied`]
//! 2. monitor cancelled → [`Resolution::Cancelled`]
//! 3. deadline passed → [`Resolution::TimedOut`]
//!
//! A resolved waiter leaves the registry in the same evaluation that
//! resolved it. Waiters whose caller has gone away are dropped on sight.

use std::sync::Arc;
use std::time::Duration;

use crate::clock::deadline_after;
use crate::error::{Error, Result};
use crate::monitor::WaitMonitor;
use crate::snapshot::Snapshot;

/// Predicate over a status snapshot.
pub type Condition = Arc<dyn Fn(&Snapshot) -> bool + Send + Sync>;

/// One-shot completion handle for a blocked or suspended caller.
///
/// The threaded and async engines each provide their own implementation;
/// the registry and engine state only need to hand over a value and to know
/// whether anyone is still listening.
pub trait Notifier<T>: Send {
    /// Releases the caller with `value`.
    fn notify(self, value: T);

    /// True once the receiving side has been dropped.
    fn is_abandoned(&self) -> bool;
}

/// Identifier of a registered waiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WaiterId(u64);

/// Terminal state of a waiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Satisfied,
    TimedOut,
    Cancelled,
}

impl Resolution {
    /// The value handed to the waiting caller.
    pub fn into_result(self, timeout: Duration) -> Result<()> {
        match self {
            Resolution::Satisfied => Ok(()),
            Resolution::TimedOut => Err(Error::WaitTimeout { timeout }),
            Resolution::Cancelled => Err(Error::WaitCancelled),
        }
    }
}

/// A registered condition-wait.
pub struct Waiter<N> {
    id: WaiterId,
    condition: Condition,
    deadline_ms: u64,
    timeout: Duration,
    monitor: WaitMonitor,
    notifier: N,
}

impl<N> Waiter<N> {
    pub fn id(&self) -> WaiterId {
        self.id
    }

    pub fn deadline_ms(&self) -> u64 {
        self.deadline_ms
    }

    /// Classifies the waiter against the current snapshot. `None` means still pending.
    pub fn evaluate(&self, snapshot: Option<&Snapshot>, now_ms: u64) -> Option<Resolution> {
        if snapshot.is_some_and(|s| (self.condition)(s)) {
            Some(Resolution::Satisfied)
        } else if self.monitor.is_cancelled() {
            Some(Resolution::Cancelled)
        } else if now_ms > self.deadline_ms {
            Some(Resolution::TimedOut)
        } else {
            None
        }
    }
}

/// A waiter that has left the registry and still has to be told why.
pub struct ResolvedWaiter<N> {
    pub id: WaiterId,
    pub resolution: Resolution,
    timeout: Duration,
    monitor: WaitMonitor,
    notifier: N,
}

impl<N: Notifier<Result<()>>> ResolvedWaiter<N> {
    /// Stops the monitor clock and releases the caller.
    pub fn deliver(self) {
        self.monitor.finish();
        self.notifier.notify(self.resolution.into_result(self.timeout));
    }

    /// Releases the caller with an error unrelated to the condition (engine shutdown).
    pub fn fail(self, error: Error) {
        self.monitor.finish();
        self.notifier.notify(Err(error));
    }
}

/// Collection of pending waiters in registration order.
pub struct WaiterRegistry<N> {
    waiters: Vec<Waiter<N>>,
    next_id: u64,
}

impl<N> Default for WaiterRegistry<N> {
    fn default() -> Self {
        WaiterRegistry { waiters: Vec::new(), next_id: 0 }
    }
}

impl<N: Notifier<Result<()>>> WaiterRegistry<N> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.waiters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waiters.is_empty()
    }

    pub fn contains(&self, id: WaiterId) -> bool {
        self.waiters.iter().any(|w| w.id == id)
    }

    /// Adds a waiter whose deadline is `timeout` after `now_ms`.
    pub fn register(
        &mut self,
        condition: Condition,
        timeout: Duration,
        now_ms: u64,
        monitor: WaitMonitor,
        notifier: N,
    ) -> WaiterId {
        let id = WaiterId(self.next_id);
        self.next_id += 1;
        self.waiters.push(Waiter {
            id,
            condition,
            deadline_ms: deadline_after(now_ms, timeout),
            timeout,
            monitor,
            notifier,
        });
        id
    }

    /// Removes a waiter without notifying it. Returns false if it was already gone.
    pub fn remove(&mut self, id: WaiterId) -> bool {
        let before = self.waiters.len();
        self.waiters.retain(|w| w.id != id);
        self.waiters.len() != before
    }

    /// Evaluates every waiter and takes out the resolved and abandoned ones.
    pub fn evaluate(&mut self, snapshot: Option<&Snapshot>, now_ms: u64) -> Vec<ResolvedWaiter<N>> {
        let mut resolved = Vec::new();
        let mut pending = Vec::with_capacity(self.waiters.len());

        for waiter in self.waiters.drain(..) {
            if waiter.notifier.is_abandoned() {
                tracing::debug!(waiter = waiter.id.0, "dropping abandoned waiter");
                continue;
            }
            match waiter.evaluate(snapshot, now_ms) {
                Some(resolution) => {
                    tracing::debug!(waiter = waiter.id.0, ?resolution, "waiter resolved");
                    resolved.push(ResolvedWaiter {
                        id: waiter.id,
                        resolution,
                        timeout: waiter.timeout,
                        monitor: waiter.monitor,
                        notifier: waiter.notifier,
                    });
                }
                None => pending.push(waiter),
            }
        }

        self.waiters = pending;
        resolved
    }

    /// Takes out every waiter, e.g. when the engine closes.
    pub fn drain(&mut self) -> Vec<ResolvedWaiter<N>> {
        self.waiters
            .drain(..)
            .map(|w| ResolvedWaiter {
                id: w.id,
                resolution: Resolution::Cancelled,
                timeout: w.timeout,
                monitor: w.monitor,
                notifier: w.notifier,
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "waiter_tests.rs"]
mod tests;
