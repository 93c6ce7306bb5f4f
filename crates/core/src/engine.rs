// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Poll loop tick logic shared by the threaded and async engines.
//!
//! [`EngineState`] owns the status cache, the pending status requests and
//! the waiter registry. A driver holds it behind its own lock and runs one
//! cycle per tick:
//!
//! 1. [`EngineState::begin_cycle`] decides whether the tick has anything to
//!    do and whether a fetch is needed.
//! 2. For [`CyclePlan::Fetch`] the driver releases the lock, calls the
//!    transport, and re-acquires the lock.
//! 3. [`EngineState::finish_cycle`] stores the outcome, collects every
//!    pending request and every resolved waiter into [`Deliveries`].
//! 4. The driver releases the lock and calls [`Deliveries::deliver`].
//!
//! Nothing in this module blocks, sleeps or performs I/O.

use std::time::Duration;

use crate::cache::StatusCache;
use crate::clock::duration_ms;
use crate::config::EngineConfig;
use crate::error::{Error, Result, TransportError, TransportResult};
use crate::monitor::WaitMonitor;
use crate::snapshot::Snapshot;
use crate::waiter::{Condition, Notifier, ResolvedWaiter, WaiterId, WaiterRegistry};

/// What the driver has to do for the current tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePlan {
    /// Nothing pending; sleep until the next tick or a wake-up.
    Idle,
    /// Serve requests and evaluate waiters from the cached snapshot.
    Evaluate,
    /// Fetch a new snapshot, then call `finish_cycle` with the outcome.
    Fetch,
}

/// Status engine state guarded by a driver's lock.
///
/// `N` completes condition-waits, `R` completes status requests.
pub struct EngineState<N, R> {
    config: EngineConfig,
    cache: StatusCache,
    waiters: WaiterRegistry<N>,
    requests: Vec<R>,
    fetch_in_flight: bool,
    closed: bool,
    last_poll_ms: Option<u64>,
}

impl<N, R> EngineState<N, R>
where
    N: Notifier<Result<()>>,
    R: Notifier<Result<Snapshot>>,
{
    pub fn new(config: EngineConfig) -> Self {
        EngineState {
            config,
            cache: StatusCache::new(),
            waiters: WaiterRegistry::new(),
            requests: Vec::new(),
            fetch_in_flight: false,
            closed: false,
            last_poll_ms: None,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn fetch_in_flight(&self) -> bool {
        self.fetch_in_flight
    }

    pub fn cached_status(&self) -> Option<Snapshot> {
        self.cache.snapshot().cloned()
    }

    pub fn last_error(&self) -> Option<TransportError> {
        self.cache.last_error().cloned()
    }

    pub fn pending_status_requests(&self) -> usize {
        self.requests.len()
    }

    pub fn pending_waiters(&self) -> usize {
        self.waiters.len()
    }

    /// Queues a status request to be completed by the next cycle.
    ///
    /// With `reload` the cache is invalidated, unless a fetch is already in
    /// flight: that fetch is recent enough and its result is shared.
    pub fn request_status(&mut self, reload: bool, notifier: R) -> Result<()> {
        if self.closed {
            return Err(Error::EngineClosed);
        }
        if reload && !self.fetch_in_flight {
            self.cache.invalidate();
        }
        self.requests.push(notifier);
        Ok(())
    }

    /// Marks the cached snapshot stale so the next request reloads it.
    pub fn invalidate_status(&mut self) {
        self.cache.invalidate();
    }

    /// Registers a condition-wait with a deadline `timeout` after `now_ms`.
    pub fn register_waiter(
        &mut self,
        condition: Condition,
        timeout: Duration,
        now_ms: u64,
        monitor: WaitMonitor,
        notifier: N,
    ) -> Result<WaiterId> {
        if self.closed {
            return Err(Error::EngineClosed);
        }
        Ok(self.waiters.register(condition, timeout, now_ms, monitor, notifier))
    }

    /// Removes a waiter whose caller stopped waiting. Idempotent.
    pub fn remove_waiter(&mut self, id: WaiterId) -> bool {
        self.waiters.remove(id)
    }

    /// True once the polling period has elapsed since the last waiter poll.
    /// The first poll after waiters appear is due immediately.
    fn poll_due(&self, now_ms: u64) -> bool {
        if self.waiters.is_empty() {
            return false;
        }
        match self.last_poll_ms {
            None => true,
            Some(last) => match now_ms.checked_sub(last) {
                Some(since) => since >= self.config.status_polling_period_ms,
                None => true,
            },
        }
    }

    /// Decides what the current tick does.
    pub fn begin_cycle(&mut self, now_ms: u64) -> CyclePlan {
        if self.closed || self.fetch_in_flight {
            return CyclePlan::Idle;
        }
        if self.waiters.is_empty() {
            // A poll streak restarts with the next waiter.
            self.last_poll_ms = None;
        }

        let poll_due = self.poll_due(now_ms);
        if self.requests.is_empty() && !poll_due {
            return if self.waiters.is_empty() { CyclePlan::Idle } else { CyclePlan::Evaluate };
        }
        if poll_due {
            self.last_poll_ms = Some(now_ms);
        }

        if self.cache.needs_fetch(
            now_ms,
            self.config.status_expiration_period(),
            self.config.status_max_age(),
        ) {
            self.fetch_in_flight = true;
            tracing::debug!(
                requests = self.requests.len(),
                waiters = self.waiters.len(),
                "fetching status"
            );
            CyclePlan::Fetch
        } else {
            CyclePlan::Evaluate
        }
    }

    /// Applies the outcome of a cycle. `outcome` is `None` for
    /// [`CyclePlan::Evaluate`] and the transport result for [`CyclePlan::Fetch`].
    pub fn finish_cycle(
        &mut self,
        now_ms: u64,
        outcome: Option<TransportResult<Snapshot>>,
    ) -> Deliveries<N, R> {
        self.fetch_in_flight = false;

        let status = match outcome {
            Some(Ok(snapshot)) => {
                self.cache.store(snapshot.clone(), now_ms);
                Ok(snapshot)
            }
            Some(Err(e)) => {
                tracing::warn!(error = %e, "status fetch failed");
                self.cache.record_error(e.clone());
                Err(e)
            }
            None => self.cache.snapshot().cloned().ok_or_else(|| {
                TransportError::RequestFailed("no status snapshot available".to_string())
            }),
        };

        let requests = std::mem::take(&mut self.requests);
        let waiters = self.waiters.evaluate(self.cache.snapshot(), now_ms);
        if !requests.is_empty() || !waiters.is_empty() {
            tracing::debug!(
                requests = requests.len(),
                waiters = waiters.len(),
                ok = status.is_ok(),
                "cycle complete"
            );
        }

        Deliveries { requests, status: Some(status), waiters, closed: false }
    }

    /// Closes the engine and hands back everyone still waiting.
    pub fn close(&mut self) -> Deliveries<N, R> {
        self.closed = true;
        let requests = std::mem::take(&mut self.requests);
        let waiters = self.waiters.drain();
        if !requests.is_empty() || !waiters.is_empty() {
            tracing::info!(
                requests = requests.len(),
                waiters = waiters.len(),
                "releasing callers on close"
            );
        }
        Deliveries { requests, status: None, waiters, closed: true }
    }

    /// How long a driver may sleep before the next tick.
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.config.tick_period_ms.max(1))
    }

    /// Milliseconds since the cached snapshot was fetched.
    pub fn cache_age_ms(&self, now_ms: u64) -> Option<u64> {
        self.cache.age(now_ms).map(duration_ms)
    }
}

/// Callers to release after a cycle, delivered outside the lock.
#[must_use = "deliveries release blocked callers"]
pub struct Deliveries<N, R> {
    requests: Vec<R>,
    status: Option<TransportResult<Snapshot>>,
    waiters: Vec<ResolvedWaiter<N>>,
    closed: bool,
}

impl<N, R> Deliveries<N, R>
where
    N: Notifier<Result<()>>,
    R: Notifier<Result<Snapshot>>,
{
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty() && self.waiters.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn requests(&self) -> usize {
        self.requests.len()
    }

    #[cfg(test)]
    pub(crate) fn waiters(&self) -> &[ResolvedWaiter<N>] {
        &self.waiters
    }

    /// Releases every caller collected by the cycle.
    pub fn deliver(self) {
        for request in self.requests {
            let value = match &self.status {
                Some(status) => status.clone().map_err(Error::from),
                None => Err(Error::EngineClosed),
            };
            request.notify(value);
        }
        for waiter in self.waiters {
            if self.closed {
                waiter.fail(Error::EngineClosed);
            } else {
                waiter.deliver();
            }
        }
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
