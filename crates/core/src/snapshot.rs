// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Immutable server status snapshots.
//!
//! A snapshot is whatever mapping the server returned for a `status`
//! request. The engine never looks inside it except through conditions, and
//! never mutates it: a newer snapshot replaces an older one wholesale.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{TransportError, TransportResult};

/// Request parameters passed to a transport.
pub type Params = Map<String, Value>;

/// One point-in-time view of the remote server state.
///
/// Cloning is cheap: clones share the same underlying map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot(Arc<Map<String, Value>>);

impl Snapshot {
    pub fn new(fields: Map<String, Value>) -> Self {
        Snapshot(Arc::new(fields))
    }

    /// Wraps a decoded reply. Anything but a JSON object is a protocol error.
    pub fn from_value(value: Value) -> TransportResult<Self> {
        match value {
            Value::Object(fields) => Ok(Snapshot::new(fields)),
            other => Err(TransportError::Protocol(format!(
                "status reply must be an object, got {}",
                type_name(&other)
            ))),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(Value::as_u64)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    /// The `manager_state` field reported by the queue server
    /// (`idle`, `executing_queue`, `paused`, ...).
    pub fn manager_state(&self) -> Option<&str> {
        self.get_str("manager_state")
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True if both handles point at the same fetched snapshot.
    pub fn same_fetch(&self, other: &Snapshot) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl From<Map<String, Value>> for Snapshot {
    fn from(fields: Map<String, Value>) -> Self {
        Snapshot::new(fields)
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
