// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! One-shot completion slot for a blocked thread.

use std::sync::{Arc, Condvar, Mutex, MutexGuard};

use qs_core::Notifier;

enum SlotState<T> {
    Pending,
    Ready(T),
    /// The sender went away without a value.
    Dropped,
}

struct SlotInner<T> {
    state: Mutex<SlotState<T>>,
    ready: Condvar,
}

impl<T> SlotInner<T> {
    fn lock(&self) -> MutexGuard<'_, SlotState<T>> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn complete(&self, state: SlotState<T>) {
        *self.lock() = state;
        self.ready.notify_all();
    }
}

/// Sending half, stored in the engine state.
pub(crate) struct SlotSender<T> {
    inner: Option<Arc<SlotInner<T>>>,
}

/// Receiving half, held by the blocked caller.
pub(crate) struct Slot<T> {
    inner: Arc<SlotInner<T>>,
}

pub(crate) fn channel<T>() -> (SlotSender<T>, Slot<T>) {
    let inner = Arc::new(SlotInner { state: Mutex::new(SlotState::Pending), ready: Condvar::new() });
    (SlotSender { inner: Some(Arc::clone(&inner)) }, Slot { inner })
}

impl<T: Send> Notifier<T> for SlotSender<T> {
    fn notify(mut self, value: T) {
        if let Some(inner) = self.inner.take() {
            inner.complete(SlotState::Ready(value));
        }
    }

    fn is_abandoned(&self) -> bool {
        self.inner.as_ref().is_none_or(|inner| Arc::strong_count(inner) == 1)
    }
}

impl<T> Drop for SlotSender<T> {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.take() {
            inner.complete(SlotState::Dropped);
        }
    }
}

impl<T> Slot<T> {
    /// Blocks until a value arrives. `None` if the sender was dropped first.
    pub(crate) fn wait(self) -> Option<T> {
        let guard = self.inner.lock();
        let mut guard = self
            .inner
            .ready
            .wait_while(guard, |state| matches!(state, SlotState::Pending))
            .unwrap_or_else(|e| e.into_inner());
        match std::mem::replace(&mut *guard, SlotState::Dropped) {
            SlotState::Ready(value) => Some(value),
            SlotState::Pending | SlotState::Dropped => None,
        }
    }
}

#[cfg(test)]
#[path = "slot_tests.rs"]
mod tests;
