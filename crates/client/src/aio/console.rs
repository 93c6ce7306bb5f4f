// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Background message monitor driven by a tokio task.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use qs_core::{Error, IngestLifecycle, IngestState, Message, MessageBuffer, MonitorConfig, Result};
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;

use crate::transport::AsyncMessageSource;

struct Inner {
    lifecycle: IngestLifecycle,
    buffer: MessageBuffer,
}

struct Shared {
    inner: Mutex<Inner>,
    message_ready: Notify,
    state_tx: watch::Sender<IngestState>,
    config: MonitorConfig,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Applies a lifecycle transition and publishes the resulting state.
    fn transition<R>(&self, f: impl FnOnce(&mut IngestLifecycle) -> R) -> R {
        let mut inner = self.lock();
        let result = f(&mut inner.lifecycle);
        self.state_tx.send_replace(inner.lifecycle.state());
        result
    }

    fn should_continue(&self) -> bool {
        self.lock().lifecycle.should_continue()
    }

    fn push(&self, message: Message) -> bool {
        self.lock().buffer.push(message)
    }

    fn pop(&self) -> Option<Message> {
        self.lock().buffer.pop()
    }
}

/// Async counterpart of [`crate::threads::MessageMonitor`].
pub struct AsyncMessageMonitor {
    shared: Arc<Shared>,
    source: Arc<dyn AsyncMessageSource>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl AsyncMessageMonitor {
    pub fn new<S>(source: S, config: MonitorConfig) -> Result<Self>
    where
        S: AsyncMessageSource + 'static,
    {
        config.validate()?;
        let (state_tx, _) = watch::channel(IngestState::Disabled);
        let buffer = MessageBuffer::new(config.max_msgs);
        Ok(AsyncMessageMonitor {
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner { lifecycle: IngestLifecycle::new(), buffer }),
                message_ready: Notify::new(),
                state_tx,
                config,
            }),
            source: Arc::new(source),
            task: Mutex::new(None),
        })
    }

    /// Starts collecting messages. Must be called inside a tokio runtime.
    pub fn enable(&self) {
        if !self.shared.transition(|l| l.request_enable()) {
            return;
        }
        let task = tokio::spawn(ingest(Arc::clone(&self.shared), Arc::clone(&self.source)));
        // The previous ingester, if any, has already passed `try_stop`.
        self.task.lock().unwrap_or_else(|e| e.into_inner()).replace(task);
    }

    pub fn disable(&self) {
        if self.shared.transition(|l| l.request_disable()) {
            tracing::debug!("message monitor disabling");
        }
    }

    /// Disables and waits until the ingester has stopped.
    pub async fn disable_wait(&self, timeout: Duration) -> Result<()> {
        self.disable();
        let mut state_rx = self.shared.state_tx.subscribe();
        let stopped = tokio::time::timeout(
            timeout,
            state_rx.wait_for(|state| *state == IngestState::Disabled),
        )
        .await
        .is_ok_and(|seen| seen.is_ok());
        if !stopped {
            return Err(Error::ShutdownTimeout { timeout });
        }

        let task = self.task.lock().unwrap_or_else(|e| e.into_inner()).take();
        if let Some(task) = task {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "message ingester failed");
            }
        }
        Ok(())
    }

    pub fn clear(&self) {
        self.shared.lock().buffer.clear();
    }

    /// Pops the oldest buffered message, waiting up to `timeout` if given.
    pub async fn next_msg(&self, timeout: Option<Duration>) -> Result<Message> {
        if let Some(message) = self.shared.pop() {
            return Ok(message);
        }
        let Some(timeout) = timeout.filter(|t| !t.is_zero()) else {
            return Err(Error::RequestTimeout { timeout: Duration::ZERO });
        };

        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let notified = self.shared.message_ready.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if let Some(message) = self.shared.pop() {
                return Ok(message);
            }
            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return self.shared.pop().ok_or(Error::RequestTimeout { timeout });
            }
        }
    }

    pub fn enabled(&self) -> bool {
        self.shared.lock().lifecycle.is_enabled()
    }

    pub fn state(&self) -> IngestState {
        self.shared.lock().lifecycle.state()
    }

    pub fn buffered(&self) -> usize {
        self.shared.lock().buffer.len()
    }

    pub fn dropped(&self) -> u64 {
        self.shared.lock().buffer.dropped()
    }
}

impl Drop for AsyncMessageMonitor {
    fn drop(&mut self) {
        self.disable();
    }
}

async fn ingest(shared: Arc<Shared>, source: Arc<dyn AsyncMessageSource>) {
    let poll_timeout = shared.config.poll_timeout();
    shared.lock().buffer.clear();

    loop {
        if let Err(e) = source.subscribe().await {
            tracing::warn!(error = %e, "message source subscribe failed");
        }
        shared.transition(|l| l.ingester_started());
        tracing::info!("message monitor enabled");

        while shared.should_continue() {
            match source.receive(poll_timeout).await {
                Ok(Some(message)) => {
                    if shared.push(message) {
                        shared.message_ready.notify_waiters();
                    } else {
                        tracing::trace!("message buffer full, message dropped");
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(error = %e, "message receive failed");
                    tokio::time::sleep(poll_timeout).await;
                }
            }
        }

        if let Err(e) = source.unsubscribe().await {
            tracing::warn!(error = %e, "message source unsubscribe failed");
        }
        if shared.transition(|l| l.try_stop()) {
            tracing::info!("message monitor disabled");
            return;
        }
        tracing::debug!("message monitor re-enabled while stopping");
    }
}

#[cfg(test)]
#[path = "console_tests.rs"]
mod tests;
