// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for qs-core operations.

use std::time::Duration;

use thiserror::Error;

/// Errors reported by a transport or message source.
///
/// The engine never interprets these: a failed fetch is handed unchanged to
/// every caller that was waiting on that cycle, which is why the type is
/// `Clone`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Could not reach the server.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The server did not answer in time.
    #[error("request timeout: {0}")]
    Timeout(String),

    /// The server answered but rejected the request.
    #[error("request failed: {0}")]
    RequestFailed(String),

    /// The reply could not be decoded.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The connection or stream is closed.
    #[error("transport closed")]
    Closed,
}

/// Result type for transport operations.
pub type TransportResult<T> = std::result::Result<T, TransportError>;

/// All possible errors that can occur in qs-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("wait timed out after {timeout:?}")]
    WaitTimeout { timeout: Duration },

    #[error("wait was cancelled")]
    WaitCancelled,

    #[error("request timeout: no message was received (timeout={timeout:?})")]
    RequestTimeout { timeout: Duration },

    #[error("message monitor did not stop within {timeout:?}")]
    ShutdownTimeout { timeout: Duration },

    #[error("engine is closed")]
    EngineClosed,

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns true for the two outcomes of a condition-wait that did not succeed.
    pub fn is_wait_failure(&self) -> bool {
        matches!(self, Error::WaitTimeout { .. } | Error::WaitCancelled)
    }
}

/// A specialized Result type for qs-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
