// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Replay of recorded status snapshots and console messages.
//!
//! Recordings are JSON Lines files: one status reply or one message per
//! line. Blank lines are skipped.

use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use qs_client::{MessageSource, Transport, STATUS_METHOD};
use qs_core::{Message, Params, Snapshot, TransportError, TransportResult};
use serde_json::Value;

use crate::error::{Error, Result};

/// Reads every record of a JSONL recording.
pub fn read_records(path: &Path) -> Result<Vec<Value>> {
    Ok(read_numbered(path)?.into_iter().map(|(_, record)| record).collect())
}

/// Reads records paired with their 1-based line numbers.
fn read_numbered(path: &Path) -> Result<Vec<(usize, Value)>> {
    let file = File::open(path).map_err(|source| Error::ReadRecording {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);
    let mut records = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(&line).map_err(|e| Error::InvalidRecord {
            path: path.to_path_buf(),
            line: index + 1,
            reason: e.to_string(),
        })?;
        records.push((index + 1, record));
    }

    Ok(records)
}

/// Answers status requests from a recording, one snapshot per fetch.
///
/// Once the recording is exhausted the last snapshot is repeated, as a
/// server that stopped changing would.
pub struct ReplayTransport {
    snapshots: Vec<Snapshot>,
    next: Mutex<usize>,
}

impl ReplayTransport {
    pub fn new(snapshots: Vec<Snapshot>) -> Self {
        ReplayTransport { snapshots, next: Mutex::new(0) }
    }

    /// Loads a snapshot recording. Every record must be a JSON object.
    pub fn load(path: &Path) -> Result<Self> {
        let mut snapshots = Vec::new();
        for (line, record) in read_numbered(path)? {
            let snapshot = Snapshot::from_value(record).map_err(|e| Error::InvalidRecord {
                path: path.to_path_buf(),
                line,
                reason: e.to_string(),
            })?;
            snapshots.push(snapshot);
        }
        tracing::debug!(count = snapshots.len(), path = %path.display(), "loaded snapshots");
        Ok(Self::new(snapshots))
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Number of fetches answered so far.
    pub fn fetches(&self) -> usize {
        *self.next.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Transport for ReplayTransport {
    fn fetch(&self, method: &str, _params: &Params) -> TransportResult<Snapshot> {
        if method != STATUS_METHOD {
            return Err(TransportError::RequestFailed(format!("unknown method: {method}")));
        }
        let last = self
            .snapshots
            .len()
            .checked_sub(1)
            .ok_or_else(|| TransportError::RequestFailed("no snapshots recorded".into()))?;

        let mut next = self.next.lock().unwrap_or_else(|e| e.into_inner());
        let snapshot = self.snapshots[(*next).min(last)].clone();
        *next += 1;
        Ok(snapshot)
    }
}

struct SourceState {
    pending: VecDeque<Message>,
    subscribed: bool,
}

/// Feeds recorded console messages to a message monitor.
///
/// Messages are only delivered while subscribed. An exhausted recording
/// behaves like a quiet stream: `receive` waits out its timeout.
pub struct ReplaySource {
    state: Mutex<SourceState>,
}

impl ReplaySource {
    pub fn new(messages: Vec<Message>) -> Self {
        ReplaySource {
            state: Mutex::new(SourceState { pending: messages.into(), subscribed: false }),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let messages = read_records(path)?;
        tracing::debug!(count = messages.len(), path = %path.display(), "loaded messages");
        Ok(Self::new(messages))
    }

    pub fn remaining(&self) -> usize {
        self.lock().pending.len()
    }

    fn lock(&self) -> MutexGuard<'_, SourceState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl MessageSource for ReplaySource {
    fn subscribe(&self) -> TransportResult<()> {
        self.lock().subscribed = true;
        Ok(())
    }

    fn unsubscribe(&self) -> TransportResult<()> {
        self.lock().subscribed = false;
        Ok(())
    }

    fn receive(&self, timeout: Duration) -> TransportResult<Option<Message>> {
        let next = {
            let mut state = self.lock();
            if !state.subscribed {
                return Err(TransportError::Closed);
            }
            state.pending.pop_front()
        };
        if next.is_none() {
            std::thread::sleep(timeout);
        }
        Ok(next)
    }
}

#[cfg(test)]
#[path = "replay_tests.rs"]
mod tests;
