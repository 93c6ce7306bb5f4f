// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Status engine driven by a background OS thread.
//!
//! Callers block on their own completion slot. The poll thread is the only
//! place the transport is called; it sleeps on a condvar between ticks and
//! is woken early by status requests, new waiters and monitor cancellation.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, Weak};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use qs_core::conditions;
use qs_core::{
    CallbackId, ClockSource, Condition, CyclePlan, EngineConfig, EngineState, Error, Params, Result,
    Snapshot, SystemClock, TransportError, WaitMonitor, WaiterId,
};

use super::slot::{self, SlotSender};
use crate::transport::{Transport, STATUS_METHOD};

const POLL_THREAD_NAME: &str = "qs-status-poll";

type State = EngineState<SlotSender<Result<()>>, SlotSender<Result<Snapshot>>>;

struct Inner {
    engine: State,
    /// Set by anything that wants the poll thread to run a cycle now.
    wake: bool,
}

struct Shared {
    inner: Mutex<Inner>,
    signal: Condvar,
    clock: Arc<dyn ClockSource>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn wake(&self) {
        self.lock().wake = true;
        self.signal.notify_all();
    }
}

/// Blocking status cache, request coalescer and condition-wait engine.
pub struct StatusEngine {
    shared: Arc<Shared>,
    config: EngineConfig,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl StatusEngine {
    /// Starts the poll thread using the system clock.
    pub fn new<T>(transport: T, config: EngineConfig) -> Result<Self>
    where
        T: Transport + 'static,
    {
        Self::with_clock(transport, config, Arc::new(SystemClock))
    }

    /// Starts the poll thread with an injected clock.
    pub fn with_clock<T>(
        transport: T,
        config: EngineConfig,
        clock: Arc<dyn ClockSource>,
    ) -> Result<Self>
    where
        T: Transport + 'static,
    {
        config.validate()?;
        let shared = Arc::new(Shared {
            inner: Mutex::new(Inner { engine: EngineState::new(config.clone()), wake: false }),
            signal: Condvar::new(),
            clock,
        });

        let loop_shared = Arc::clone(&shared);
        let worker = thread::Builder::new()
            .name(POLL_THREAD_NAME.to_string())
            .spawn(move || poll_loop(loop_shared, transport))?;
        tracing::debug!(thread = POLL_THREAD_NAME, "status poll loop started");

        Ok(StatusEngine { shared, config, worker: Mutex::new(Some(worker)) })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the status snapshot, fetching it if the cache is stale.
    ///
    /// With `reload` the cache is bypassed, unless a fetch is already in
    /// flight, in which case its result is returned.
    pub fn get_status(&self, reload: bool) -> Result<Snapshot> {
        let (sender, slot) = slot::channel();
        {
            let mut inner = self.shared.lock();
            inner.engine.request_status(reload, sender)?;
            inner.wake = true;
        }
        self.shared.signal.notify_all();
        slot.wait().unwrap_or(Err(Error::EngineClosed))
    }

    /// Reloads status from the server.
    pub fn ping(&self) -> Result<Snapshot> {
        self.get_status(true)
    }

    pub fn invalidate_status(&self) {
        self.shared.lock().engine.invalidate_status();
    }

    /// Most recent snapshot without touching the server.
    pub fn cached_status(&self) -> Option<Snapshot> {
        self.shared.lock().engine.cached_status()
    }

    pub fn last_error(&self) -> Option<TransportError> {
        self.shared.lock().engine.last_error()
    }

    pub fn pending_status_requests(&self) -> usize {
        self.shared.lock().engine.pending_status_requests()
    }

    pub fn pending_waiters(&self) -> usize {
        self.shared.lock().engine.pending_waiters()
    }

    pub fn is_closed(&self) -> bool {
        self.shared.lock().engine.is_closed()
    }

    /// Blocks until `condition` holds, `timeout` passes, or `monitor` is cancelled.
    pub fn wait_for_condition(
        &self,
        condition: Condition,
        timeout: Duration,
        monitor: Option<&WaitMonitor>,
    ) -> Result<()> {
        let monitor = monitor.cloned().unwrap_or_default();
        monitor.begin(timeout);

        let (sender, slot) = slot::channel();
        let id = {
            let mut inner = self.shared.lock();
            let now = self.shared.clock.now_ms();
            inner.engine.register_waiter(condition, timeout, now, monitor.clone(), sender)?
        };
        let weak: Weak<Shared> = Arc::downgrade(&self.shared);
        let callback = monitor.add_cancel_callback(move || {
            if let Some(shared) = weak.upgrade() {
                shared.wake();
            }
        });
        let _guard = WaiterGuard { shared: &self.shared, id, monitor: &monitor, callback };
        self.shared.wake();

        slot.wait().unwrap_or(Err(Error::EngineClosed))
    }

    /// Waits for `manager_state == "idle"`.
    pub fn wait_for_idle(&self, timeout: Option<Duration>, monitor: Option<&WaitMonitor>) -> Result<()> {
        let timeout = timeout.unwrap_or(self.config.default_wait_timeout());
        self.wait_for_condition(conditions::idle(), timeout, monitor)
    }

    /// Waits for `manager_state` to be `"idle"` or `"paused"`.
    pub fn wait_for_idle_or_paused(
        &self,
        timeout: Option<Duration>,
        monitor: Option<&WaitMonitor>,
    ) -> Result<()> {
        let timeout = timeout.unwrap_or(self.config.default_wait_timeout());
        self.wait_for_condition(conditions::idle_or_paused(), timeout, monitor)
    }

    /// Stops the poll thread and releases every blocked caller with
    /// [`Error::EngineClosed`]. Safe to call more than once.
    pub fn close(&self) {
        let deliveries = {
            let mut inner = self.shared.lock();
            if inner.engine.is_closed() {
                None
            } else {
                inner.wake = true;
                Some(inner.engine.close())
            }
        };
        self.shared.signal.notify_all();
        if let Some(deliveries) = deliveries {
            deliveries.deliver();
        }

        let worker = self.worker.lock().unwrap_or_else(|e| e.into_inner()).take();
        if let Some(handle) = worker {
            if handle.join().is_err() {
                tracing::warn!(thread = POLL_THREAD_NAME, "status poll loop panicked");
            } else {
                tracing::debug!(thread = POLL_THREAD_NAME, "status poll loop stopped");
            }
        }
    }
}

impl Drop for StatusEngine {
    fn drop(&mut self) {
        self.close();
    }
}

/// Removes a waiter and its cancel callback on every exit path of
/// `wait_for_condition`.
struct WaiterGuard<'a> {
    shared: &'a Shared,
    id: WaiterId,
    monitor: &'a WaitMonitor,
    callback: CallbackId,
}

impl Drop for WaiterGuard<'_> {
    fn drop(&mut self) {
        self.shared.lock().engine.remove_waiter(self.id);
        self.monitor.remove_cancel_callback(self.callback);
    }
}

fn poll_loop<T: Transport>(shared: Arc<Shared>, transport: T) {
    let params = Params::new();
    loop {
        {
            let mut inner = shared.lock();
            if inner.engine.is_closed() {
                break;
            }
            inner.wake = false;
            let now = shared.clock.now_ms();
            match inner.engine.begin_cycle(now) {
                CyclePlan::Idle => {}
                CyclePlan::Evaluate => {
                    let deliveries = inner.engine.finish_cycle(now, None);
                    drop(inner);
                    deliveries.deliver();
                }
                CyclePlan::Fetch => {
                    drop(inner);
                    let outcome = transport.fetch(STATUS_METHOD, &params);
                    let now = shared.clock.now_ms();
                    let deliveries = shared.lock().engine.finish_cycle(now, Some(outcome));
                    deliveries.deliver();
                }
            }
        }

        let inner = shared.lock();
        if inner.wake || inner.engine.is_closed() {
            continue;
        }
        let tick = inner.engine.tick_period();
        let _unused = shared
            .signal
            .wait_timeout_while(inner, tick, |i| !i.wake && !i.engine.is_closed())
            .unwrap_or_else(|e| e.into_inner());
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
