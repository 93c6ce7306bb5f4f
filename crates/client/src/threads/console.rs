// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Background message monitor driven by an OS thread.
//!
//! Serves console output and system-info streams alike: the ingester
//! subscribes to a [`MessageSource`], pulls with `poll_timeout` and pushes
//! into a bounded buffer that callers drain with [`MessageMonitor::next_msg`].

use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use qs_core::{Error, IngestLifecycle, IngestState, Message, MessageBuffer, MonitorConfig, Result};

use crate::transport::MessageSource;

const INGEST_THREAD_NAME: &str = "qs-msg-ingest";

struct Inner {
    lifecycle: IngestLifecycle,
    buffer: MessageBuffer,
}

struct Shared {
    inner: Mutex<Inner>,
    message_ready: Condvar,
    stopped: Condvar,
    config: MonitorConfig,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Bounded, lossy-on-overflow background message ingester.
pub struct MessageMonitor {
    shared: Arc<Shared>,
    source: Arc<dyn MessageSource>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl MessageMonitor {
    pub fn new<S>(source: S, config: MonitorConfig) -> Result<Self>
    where
        S: MessageSource + 'static,
    {
        config.validate()?;
        let buffer = MessageBuffer::new(config.max_msgs);
        Ok(MessageMonitor {
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner { lifecycle: IngestLifecycle::new(), buffer }),
                message_ready: Condvar::new(),
                stopped: Condvar::new(),
                config,
            }),
            source: Arc::new(source),
            worker: Mutex::new(None),
        })
    }

    /// Starts collecting messages. Does nothing if already enabled.
    pub fn enable(&self) -> Result<()> {
        let mut inner = self.shared.lock();
        if !inner.lifecycle.request_enable() {
            return Ok(());
        }

        let shared = Arc::clone(&self.shared);
        let source = Arc::clone(&self.source);
        let spawned = thread::Builder::new()
            .name(INGEST_THREAD_NAME.to_string())
            .spawn(move || ingest(&shared, source.as_ref()));
        let handle = match spawned {
            Ok(handle) => handle,
            Err(e) => {
                // Nothing is running; roll the lifecycle back.
                inner.lifecycle.request_disable();
                inner.lifecycle.try_stop();
                return Err(e.into());
            }
        };
        drop(inner);

        let previous = self.worker.lock().unwrap_or_else(|e| e.into_inner()).replace(handle);
        if let Some(previous) = previous {
            // A previous ingester has already passed `try_stop`.
            let _ = previous.join();
        }
        Ok(())
    }

    /// Asks the ingester to stop and returns immediately.
    pub fn disable(&self) {
        if self.shared.lock().lifecycle.request_disable() {
            tracing::debug!("message monitor disabling");
        }
    }

    /// Disables and waits until the ingester has stopped.
    pub fn disable_wait(&self, timeout: Duration) -> Result<()> {
        self.disable();
        let inner = self.shared.lock();
        let (inner, _) = self
            .shared
            .stopped
            .wait_timeout_while(inner, timeout, |i| i.lifecycle.is_running())
            .unwrap_or_else(|e| e.into_inner());
        if inner.lifecycle.is_running() {
            return Err(Error::ShutdownTimeout { timeout });
        }
        drop(inner);

        let worker = self.worker.lock().unwrap_or_else(|e| e.into_inner()).take();
        if let Some(handle) = worker {
            if handle.join().is_err() {
                tracing::warn!(thread = INGEST_THREAD_NAME, "message ingester panicked");
            }
        }
        Ok(())
    }

    /// Discards every buffered message.
    pub fn clear(&self) {
        self.shared.lock().buffer.clear();
    }

    /// Pops the oldest buffered message.
    ///
    /// With no timeout (or a zero one) this never blocks. Otherwise it waits
    /// up to `timeout` for a message to arrive.
    pub fn next_msg(&self, timeout: Option<Duration>) -> Result<Message> {
        let mut inner = self.shared.lock();
        if let Some(message) = inner.buffer.pop() {
            return Ok(message);
        }
        let Some(timeout) = timeout.filter(|t| !t.is_zero()) else {
            return Err(Error::RequestTimeout { timeout: Duration::ZERO });
        };

        let (mut inner, _) = self
            .shared
            .message_ready
            .wait_timeout_while(inner, timeout, |i| i.buffer.is_empty())
            .unwrap_or_else(|e| e.into_inner());
        inner.buffer.pop().ok_or(Error::RequestTimeout { timeout })
    }

    /// True while `Enabling` or `Enabled`.
    pub fn enabled(&self) -> bool {
        self.shared.lock().lifecycle.is_enabled()
    }

    pub fn state(&self) -> IngestState {
        self.shared.lock().lifecycle.state()
    }

    pub fn buffered(&self) -> usize {
        self.shared.lock().buffer.len()
    }

    /// Messages discarded because the buffer was full.
    pub fn dropped(&self) -> u64 {
        self.shared.lock().buffer.dropped()
    }
}

impl Drop for MessageMonitor {
    fn drop(&mut self) {
        self.disable();
        let worker = self.worker.lock().unwrap_or_else(|e| e.into_inner()).take();
        if let Some(handle) = worker {
            let _ = handle.join();
        }
    }
}

fn ingest(shared: &Shared, source: &dyn MessageSource) {
    let poll_timeout = shared.config.poll_timeout();
    shared.lock().buffer.clear();

    loop {
        if let Err(e) = source.subscribe() {
            tracing::warn!(error = %e, "message source subscribe failed");
        }
        shared.lock().lifecycle.ingester_started();
        tracing::info!("message monitor enabled");

        loop {
            if !shared.lock().lifecycle.should_continue() {
                break;
            }
            match source.receive(poll_timeout) {
                Ok(Some(message)) => {
                    let stored = shared.lock().buffer.push(message);
                    if stored {
                        shared.message_ready.notify_all();
                    } else {
                        tracing::trace!("message buffer full, message dropped");
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(error = %e, "message receive failed");
                    thread::sleep(poll_timeout);
                }
            }
        }

        if let Err(e) = source.unsubscribe() {
            tracing::warn!(error = %e, "message source unsubscribe failed");
        }

        let mut inner = shared.lock();
        if inner.lifecycle.try_stop() {
            drop(inner);
            shared.stopped.notify_all();
            tracing::info!("message monitor disabled");
            return;
        }
        tracing::debug!("message monitor re-enabled while stopping");
    }
}

#[cfg(test)]
#[path = "console_tests.rs"]
mod tests;
