// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Cached status snapshot and its freshness rules.

use std::time::Duration;

use crate::clock::duration_ms;
use crate::error::TransportError;
use crate::snapshot::Snapshot;

#[derive(Debug, Clone)]
struct CacheEntry {
    snapshot: Snapshot,
    fetched_at_ms: u64,
}

/// Most recently fetched snapshot, when it was fetched, and the last fetch error.
///
/// A snapshot and its fetch time are stored together, so one is never
/// present without the other.
#[derive(Debug, Clone, Default)]
pub struct StatusCache {
    entry: Option<CacheEntry>,
    last_error: Option<TransportError>,
    invalidated: bool,
}

impl StatusCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.entry.as_ref().map(|e| &e.snapshot)
    }

    pub fn fetched_at_ms(&self) -> Option<u64> {
        self.entry.as_ref().map(|e| e.fetched_at_ms)
    }

    pub fn last_error(&self) -> Option<&TransportError> {
        self.last_error.as_ref()
    }

    /// Age of the cached snapshot, or `None` if there is no snapshot or the
    /// clock has moved behind the fetch time.
    pub fn age(&self, now_ms: u64) -> Option<Duration> {
        let fetched_at = self.fetched_at_ms()?;
        now_ms.checked_sub(fetched_at).map(Duration::from_millis)
    }

    /// True if a snapshot exists, has not been invalidated, and is younger
    /// than `expiration`.
    pub fn is_fresh(&self, now_ms: u64, expiration: Duration) -> bool {
        if self.invalidated {
            return false;
        }
        match self.age(now_ms) {
            Some(age) => duration_ms(age) < duration_ms(expiration),
            None => false,
        }
    }

    /// Whether the next cycle has to go to the transport.
    ///
    /// `max_age` is a hard ceiling applied on top of the expiration period.
    pub fn needs_fetch(&self, now_ms: u64, expiration: Duration, max_age: Duration) -> bool {
        if !self.is_fresh(now_ms, expiration) {
            return true;
        }
        self.age(now_ms).is_none_or(|age| age > max_age)
    }

    /// Marks the cached snapshot stale so the next cycle reloads it.
    pub fn invalidate(&mut self) {
        self.invalidated = true;
    }

    pub fn is_invalidated(&self) -> bool {
        self.invalidated
    }

    /// Replaces the cached snapshot after a successful fetch.
    pub fn store(&mut self, snapshot: Snapshot, now_ms: u64) {
        self.entry = Some(CacheEntry { snapshot, fetched_at_ms: now_ms });
        self.last_error = None;
        self.invalidated = false;
    }

    /// Records a failed fetch. The previous snapshot, if any, is kept.
    pub fn record_error(&mut self, error: TransportError) {
        self.last_error = Some(error);
    }
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
