// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Scripted transports and message sources shared by engine and monitor tests.

#![allow(clippy::unwrap_used)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

use qs_core::{Message, Params, Snapshot, TransportError, TransportResult};
use serde_json::json;

use crate::transport::{
    AsyncMessageSource, AsyncTransport, MessageSource, Transport, TransportFuture,
};

pub fn snapshot(state: &str) -> Snapshot {
    Snapshot::from_value(json!({ "manager_state": state, "items_in_queue": 0 })).unwrap()
}

/// Polls `check` until it holds or `timeout` passes.
pub fn wait_until(timeout: Duration, mut check: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if check() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    check()
}

/// Transport that replays a script of replies, repeating the last one.
///
/// An optional gate holds every fetch until it is opened, so tests can pile
/// up concurrent requests behind one in-flight fetch.
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<TransportResult<Snapshot>>>,
    last: Mutex<Option<TransportResult<Snapshot>>>,
    calls: AtomicUsize,
    methods: Mutex<Vec<String>>,
    gate: Mutex<bool>,
    gate_opened: Condvar,
}

impl ScriptedTransport {
    pub fn new(replies: Vec<TransportResult<Snapshot>>) -> Self {
        ScriptedTransport {
            replies: Mutex::new(replies.into()),
            last: Mutex::new(None),
            calls: AtomicUsize::new(0),
            methods: Mutex::new(Vec::new()),
            gate: Mutex::new(true),
            gate_opened: Condvar::new(),
        }
    }

    pub fn states(states: &[&str]) -> Self {
        Self::new(states.iter().map(|s| Ok(snapshot(s))).collect())
    }

    pub fn failing(error: TransportError) -> Self {
        Self::new(vec![Err(error)])
    }

    /// Holds fetches until [`ScriptedTransport::open`] is called.
    pub fn closed_gate(self) -> Self {
        *self.gate.lock().unwrap() = false;
        self
    }

    pub fn open(&self) {
        *self.gate.lock().unwrap() = true;
        self.gate_opened.notify_all();
    }

    fn is_open(&self) -> bool {
        *self.gate.lock().unwrap()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn methods(&self) -> Vec<String> {
        self.methods.lock().unwrap().clone()
    }

    fn next_reply(&self, method: &str) -> TransportResult<Snapshot> {
        self.methods.lock().unwrap().push(method.to_string());
        let next = self.replies.lock().unwrap().pop_front();
        let mut last = self.last.lock().unwrap();
        if let Some(reply) = next {
            *last = Some(reply);
        }
        last.clone().unwrap_or(Err(TransportError::Closed))
    }
}

impl Transport for ScriptedTransport {
    fn fetch(&self, method: &str, _params: &Params) -> TransportResult<Snapshot> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.gate.lock().unwrap();
        drop(self.gate_opened.wait_while(gate, |open| !*open).unwrap());
        self.next_reply(method)
    }
}

impl AsyncTransport for ScriptedTransport {
    fn fetch<'a>(&'a self, method: &'a str, _params: &'a Params) -> TransportFuture<'a, Snapshot> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            while !self.is_open() {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
            self.next_reply(method)
        })
    }
}

/// Message source backed by a queue the test pushes into.
#[derive(Default)]
pub struct ScriptedSource {
    queue: Mutex<VecDeque<TransportResult<Message>>>,
    subscribes: AtomicUsize,
    unsubscribes: AtomicUsize,
    receives: AtomicUsize,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, message: Message) {
        self.queue.lock().unwrap().push_back(Ok(message));
    }

    pub fn push_error(&self, error: TransportError) {
        self.queue.lock().unwrap().push_back(Err(error));
    }

    pub fn remaining(&self) -> usize {
        self.queue.lock().unwrap().len()
    }

    pub fn subscribes(&self) -> usize {
        self.subscribes.load(Ordering::SeqCst)
    }

    pub fn unsubscribes(&self) -> usize {
        self.unsubscribes.load(Ordering::SeqCst)
    }

    pub fn receives(&self) -> usize {
        self.receives.load(Ordering::SeqCst)
    }

    fn pop(&self) -> Option<TransportResult<Message>> {
        self.receives.fetch_add(1, Ordering::SeqCst);
        self.queue.lock().unwrap().pop_front()
    }
}

impl MessageSource for ScriptedSource {
    fn subscribe(&self) -> TransportResult<()> {
        self.subscribes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn unsubscribe(&self) -> TransportResult<()> {
        self.unsubscribes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn receive(&self, timeout: Duration) -> TransportResult<Option<Message>> {
        match self.pop() {
            Some(reply) => reply.map(Some),
            None => {
                std::thread::sleep(timeout);
                Ok(None)
            }
        }
    }
}

impl AsyncMessageSource for ScriptedSource {
    fn subscribe(&self) -> TransportFuture<'_, ()> {
        Box::pin(async move { MessageSource::subscribe(self) })
    }

    fn unsubscribe(&self) -> TransportFuture<'_, ()> {
        Box::pin(async move { MessageSource::unsubscribe(self) })
    }

    fn receive(&self, timeout: Duration) -> TransportFuture<'_, Option<Message>> {
        Box::pin(async move {
            match self.pop() {
                Some(reply) => reply.map(Some),
                None => {
                    tokio::time::sleep(timeout).await;
                    Ok(None)
                }
            }
        })
    }
}
