// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! qs-client: Status sync engines and message monitors
//!
//! Two realizations of the same engine:
//!
//! ```text
//!             ┌──────────────┐   fetch("status")   ┌─────────────┐
//! callers ───►│ StatusEngine │────────────────────►│  Transport  │
//!  (block /   │  poll loop   │◄────────────────────│   (trait)   │
//!   await)    └──────────────┘      Snapshot       └─────────────┘
//!                    │
//!                    ▼
//!          qs_core::EngineState (cache, requests, waiters)
//! ```
//!
//! - [`threads`]: background OS threads, blocking callers
//! - [`aio`]: tokio tasks, async callers

pub mod aio;
pub mod threads;
pub mod transport;

pub use aio::{AsyncMessageMonitor, AsyncStatusEngine};
pub use qs_core::{
    conditions, Condition, EngineConfig, Error, IngestState, Message, MonitorConfig, QsConfig,
    Result, Snapshot, TransportError, WaitMonitor,
};
pub use threads::{MessageMonitor, StatusEngine};
pub use transport::{
    AsyncMessageSource, AsyncTransport, MessageSource, Transport, TransportFuture, STATUS_METHOD,
};

#[cfg(test)]
mod test_helpers;
