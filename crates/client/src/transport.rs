// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Transport and message-source abstractions.
//!
//! The engines never talk to the network themselves. They are handed a
//! transport that performs one request/reply round trip, and the message
//! monitors are handed a source they can subscribe to and pull from.
//! Production code plugs in the real client; tests plug in scripted mocks.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use qs_core::{Message, Params, Snapshot, TransportResult};

/// Method name the engines use for status requests.
pub const STATUS_METHOD: &str = "status";

/// Boxed future returned by the async traits.
pub type TransportFuture<'a, T> = Pin<Box<dyn Future<Output = TransportResult<T>> + Send + 'a>>;

/// Blocking request/reply transport.
pub trait Transport: Send + Sync {
    /// Sends `method` with `params` and waits for the decoded reply.
    fn fetch(&self, method: &str, params: &Params) -> TransportResult<Snapshot>;
}

/// Async request/reply transport.
pub trait AsyncTransport: Send + Sync {
    fn fetch<'a>(&'a self, method: &'a str, params: &'a Params) -> TransportFuture<'a, Snapshot>;
}

/// Blocking subscribe/pull message stream.
pub trait MessageSource: Send + Sync {
    fn subscribe(&self) -> TransportResult<()>;

    fn unsubscribe(&self) -> TransportResult<()>;

    /// Waits up to `timeout` for the next message.
    ///
    /// Returns `Ok(None)` if nothing arrived in time.
    fn receive(&self, timeout: Duration) -> TransportResult<Option<Message>>;
}

/// Async subscribe/pull message stream.
pub trait AsyncMessageSource: Send + Sync {
    fn subscribe(&self) -> TransportFuture<'_, ()>;

    fn unsubscribe(&self) -> TransportFuture<'_, ()>;

    /// Waits up to `timeout` for the next message; `Ok(None)` on timeout.
    fn receive(&self, timeout: Duration) -> TransportFuture<'_, Option<Message>>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn fetch(&self, method: &str, params: &Params) -> TransportResult<Snapshot> {
        (**self).fetch(method, params)
    }
}

impl<T: AsyncTransport + ?Sized> AsyncTransport for Arc<T> {
    fn fetch<'a>(&'a self, method: &'a str, params: &'a Params) -> TransportFuture<'a, Snapshot> {
        (**self).fetch(method, params)
    }
}

impl<S: MessageSource + ?Sized> MessageSource for Arc<S> {
    fn subscribe(&self) -> TransportResult<()> {
        (**self).subscribe()
    }

    fn unsubscribe(&self) -> TransportResult<()> {
        (**self).unsubscribe()
    }

    fn receive(&self, timeout: Duration) -> TransportResult<Option<Message>> {
        (**self).receive(timeout)
    }
}

impl<S: AsyncMessageSource + ?Sized> AsyncMessageSource for Arc<S> {
    fn subscribe(&self) -> TransportFuture<'_, ()> {
        (**self).subscribe()
    }

    fn unsubscribe(&self) -> TransportFuture<'_, ()> {
        (**self).unsubscribe()
    }

    fn receive(&self, timeout: Duration) -> TransportFuture<'_, Option<Message>> {
        (**self).receive(timeout)
    }
}
