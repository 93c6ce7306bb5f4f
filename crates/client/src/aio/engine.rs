// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Status engine driven by a tokio task.
//!
//! Same tick logic as the threaded engine. Callers await a oneshot
//! receiver instead of blocking, the loop sleeps on a [`Notify`] between
//! ticks, and shutdown goes through a [`CancellationToken`].

use std::sync::{Arc, Mutex as StdMutex, Weak};
use std::time::Duration;

use qs_core::conditions;
use qs_core::{
    CallbackId, ClockSource, Condition, CyclePlan, EngineConfig, EngineState, Error, Notifier,
    Params, Result, Snapshot, SystemClock, TransportError, WaitMonitor, WaiterId,
};
use tokio::sync::{oneshot, Mutex, Notify};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::transport::{AsyncTransport, STATUS_METHOD};

/// Completes a suspended caller through a oneshot channel.
pub(crate) struct OneshotNotifier<T>(oneshot::Sender<T>);

impl<T: Send> Notifier<T> for OneshotNotifier<T> {
    fn notify(self, value: T) {
        // The receiver may have been dropped; nobody is left to tell.
        let _ = self.0.send(value);
    }

    fn is_abandoned(&self) -> bool {
        self.0.is_closed()
    }
}

type State = EngineState<OneshotNotifier<Result<()>>, OneshotNotifier<Result<Snapshot>>>;

struct Shared {
    state: Mutex<State>,
    wake: Notify,
    clock: Arc<dyn ClockSource>,
}

/// Async status cache, request coalescer and condition-wait engine.
///
/// Must be created inside a tokio runtime.
pub struct AsyncStatusEngine {
    shared: Arc<Shared>,
    config: EngineConfig,
    shutdown: CancellationToken,
    task: StdMutex<Option<JoinHandle<()>>>,
}

impl AsyncStatusEngine {
    pub fn new<T>(transport: T, config: EngineConfig) -> Result<Self>
    where
        T: AsyncTransport + 'static,
    {
        Self::with_clock(transport, config, Arc::new(SystemClock))
    }

    pub fn with_clock<T>(
        transport: T,
        config: EngineConfig,
        clock: Arc<dyn ClockSource>,
    ) -> Result<Self>
    where
        T: AsyncTransport + 'static,
    {
        config.validate()?;
        let shared = Arc::new(Shared {
            state: Mutex::new(EngineState::new(config.clone())),
            wake: Notify::new(),
            clock,
        });
        let shutdown = CancellationToken::new();

        let task = tokio::spawn(poll_loop(Arc::clone(&shared), transport, shutdown.clone()));
        tracing::debug!("status poll task started");

        Ok(AsyncStatusEngine { shared, config, shutdown, task: StdMutex::new(Some(task)) })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the status snapshot, fetching it if the cache is stale.
    pub async fn get_status(&self, reload: bool) -> Result<Snapshot> {
        let (tx, rx) = oneshot::channel();
        self.shared.state.lock().await.request_status(reload, OneshotNotifier(tx))?;
        self.shared.wake.notify_one();
        rx.await.unwrap_or(Err(Error::EngineClosed))
    }

    pub async fn ping(&self) -> Result<Snapshot> {
        self.get_status(true).await
    }

    pub async fn invalidate_status(&self) {
        self.shared.state.lock().await.invalidate_status();
    }

    pub async fn cached_status(&self) -> Option<Snapshot> {
        self.shared.state.lock().await.cached_status()
    }

    pub async fn last_error(&self) -> Option<TransportError> {
        self.shared.state.lock().await.last_error()
    }

    pub async fn pending_status_requests(&self) -> usize {
        self.shared.state.lock().await.pending_status_requests()
    }

    pub async fn pending_waiters(&self) -> usize {
        self.shared.state.lock().await.pending_waiters()
    }

    pub async fn is_closed(&self) -> bool {
        self.shared.state.lock().await.is_closed()
    }

    /// Suspends until `condition` holds, `timeout` passes, or `monitor` is cancelled.
    ///
    /// Dropping the returned future unregisters the waiter.
    pub async fn wait_for_condition(
        &self,
        condition: Condition,
        timeout: Duration,
        monitor: Option<&WaitMonitor>,
    ) -> Result<()> {
        let monitor = monitor.cloned().unwrap_or_default();
        monitor.begin(timeout);

        let (tx, rx) = oneshot::channel();
        let id = {
            let mut state = self.shared.state.lock().await;
            let now = self.shared.clock.now_ms();
            state.register_waiter(condition, timeout, now, monitor.clone(), OneshotNotifier(tx))?
        };
        let weak: Weak<Shared> = Arc::downgrade(&self.shared);
        let callback = monitor.add_cancel_callback(move || {
            if let Some(shared) = weak.upgrade() {
                shared.wake.notify_one();
            }
        });
        let _guard = WaiterGuard {
            shared: Arc::clone(&self.shared),
            id,
            monitor: monitor.clone(),
            callback,
        };
        self.shared.wake.notify_one();

        rx.await.unwrap_or(Err(Error::EngineClosed))
    }

    pub async fn wait_for_idle(
        &self,
        timeout: Option<Duration>,
        monitor: Option<&WaitMonitor>,
    ) -> Result<()> {
        let timeout = timeout.unwrap_or(self.config.default_wait_timeout());
        self.wait_for_condition(conditions::idle(), timeout, monitor).await
    }

    pub async fn wait_for_idle_or_paused(
        &self,
        timeout: Option<Duration>,
        monitor: Option<&WaitMonitor>,
    ) -> Result<()> {
        let timeout = timeout.unwrap_or(self.config.default_wait_timeout());
        self.wait_for_condition(conditions::idle_or_paused(), timeout, monitor).await
    }

    /// Stops the poll task and releases every suspended caller with
    /// [`Error::EngineClosed`]. Safe to call more than once.
    pub async fn close(&self) {
        let deliveries = {
            let mut state = self.shared.state.lock().await;
            if state.is_closed() {
                None
            } else {
                Some(state.close())
            }
        };
        if let Some(deliveries) = deliveries {
            deliveries.deliver();
        }
        self.shutdown.cancel();

        let task = self.task.lock().unwrap_or_else(|e| e.into_inner()).take();
        if let Some(task) = task {
            match task.await {
                Ok(()) => tracing::debug!("status poll task stopped"),
                Err(e) => tracing::warn!(error = %e, "status poll task failed"),
            }
        }
    }
}

impl Drop for AsyncStatusEngine {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// Unregisters a waiter when its future completes or is dropped.
///
/// If the state lock is busy the entry is left behind; the next cycle sees
/// its closed channel and discards it. The cancel callback is always removed.
struct WaiterGuard {
    shared: Arc<Shared>,
    id: WaiterId,
    monitor: WaitMonitor,
    callback: CallbackId,
}

impl Drop for WaiterGuard {
    fn drop(&mut self) {
        if let Ok(mut state) = self.shared.state.try_lock() {
            state.remove_waiter(self.id);
        }
        self.monitor.remove_cancel_callback(self.callback);
    }
}

async fn poll_loop<T: AsyncTransport>(
    shared: Arc<Shared>,
    transport: T,
    shutdown: CancellationToken,
) {
    let params = Params::new();
    loop {
        {
            let mut state = shared.state.lock().await;
            if state.is_closed() {
                break;
            }
            let now = shared.clock.now_ms();
            match state.begin_cycle(now) {
                CyclePlan::Idle => {}
                CyclePlan::Evaluate => {
                    let deliveries = state.finish_cycle(now, None);
                    drop(state);
                    deliveries.deliver();
                }
                CyclePlan::Fetch => {
                    drop(state);
                    let outcome = tokio::select! {
                        _ = shutdown.cancelled() => break,
                        outcome = transport.fetch(STATUS_METHOD, &params) => outcome,
                    };
                    let now = shared.clock.now_ms();
                    let deliveries = shared.state.lock().await.finish_cycle(now, Some(outcome));
                    deliveries.deliver();
                }
            }
        }

        let tick = shared.state.lock().await.tick_period();
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = shared.wake.notified() => {}
            _ = tokio::time::sleep(tick) => {}
        }
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
