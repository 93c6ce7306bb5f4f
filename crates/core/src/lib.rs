// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! qs-core: Status sync and condition-wait primitives
//!
//! This crate holds everything that does not depend on how callers block:
//! snapshots and their cache, the waiter registry, the poll loop tick logic,
//! wait monitors, the message buffer and ingest lifecycle, configuration,
//! and errors. The threaded and async engines in `qs-client` drive it.

pub mod buffer;
pub mod cache;
pub mod clock;
pub mod conditions;
pub mod config;
pub mod engine;
pub mod error;
pub mod lifecycle;
pub mod monitor;
pub mod snapshot;
pub mod waiter;

pub use buffer::{Message, MessageBuffer};
pub use cache::StatusCache;
pub use clock::{ClockSource, ManualClock, SystemClock};
pub use config::{EngineConfig, MonitorConfig, QsConfig};
pub use engine::{CyclePlan, Deliveries, EngineState};
pub use error::{Error, Result, TransportError, TransportResult};
pub use lifecycle::{IngestLifecycle, IngestState};
pub use monitor::{CallbackId, WaitMonitor};
pub use snapshot::{Params, Snapshot};
pub use waiter::{Condition, Notifier, Resolution, WaiterId, WaiterRegistry};
