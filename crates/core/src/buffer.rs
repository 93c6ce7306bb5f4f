// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded FIFO for background messages.

use std::collections::VecDeque;

use serde_json::Value;

/// An opaque message from a console or system-info stream.
pub type Message = Value;

/// Fixed-capacity FIFO that drops new messages when full.
///
/// A capacity of 0 disables storage entirely.
#[derive(Debug, Clone)]
pub struct MessageBuffer {
    queue: VecDeque<Message>,
    capacity: usize,
    dropped: u64,
}

impl MessageBuffer {
    pub fn new(capacity: usize) -> Self {
        MessageBuffer { queue: VecDeque::with_capacity(capacity.min(1024)), capacity, dropped: 0 }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.queue.len() >= self.capacity
    }

    /// Messages discarded because the buffer was full.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Appends a message. Returns false if it was discarded.
    pub fn push(&mut self, message: Message) -> bool {
        if self.capacity == 0 {
            return false;
        }
        if self.is_full() {
            self.dropped += 1;
            return false;
        }
        self.queue.push_back(message);
        true
    }

    pub fn pop(&mut self) -> Option<Message> {
        self.queue.pop_front()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }
}

#[cfg(test)]
#[path = "buffer_tests.rs"]
mod tests;
