// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Thread-based realization.
//!
//! The poll loop and the message ingester each run on a named background
//! thread. Callers block on a mutex/condvar pair until they are released.

mod console;
mod engine;
mod slot;

pub use console::MessageMonitor;
pub use engine::StatusEngine;
