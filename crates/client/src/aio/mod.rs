// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Cooperative realization on tokio.
//!
//! The poll loop and the message ingester are spawned tasks; callers
//! await instead of blocking. Built for a current-thread runtime but works
//! on any tokio runtime.

mod console;
mod engine;

pub use console::AsyncMessageMonitor;
pub use engine::AsyncStatusEngine;
