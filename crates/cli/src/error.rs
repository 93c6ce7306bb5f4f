// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use thiserror::Error;

/// Errors reported by `qs-watch`.
///
/// Engine and monitor failures pass through unchanged; the rest describe
/// problems with the recording files handed on the command line.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] qs_core::Error),

    #[error("cannot read {}: {source}", path.display())]
    ReadRecording {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{}:{line}: {reason}", path.display())]
    InvalidRecord {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("field '{0}' not present in status")]
    FieldNotFound(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Process exit code: 2 when a wait ended without its condition, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Core(e) if e.is_wait_failure() => 2,
            _ => 1,
        }
    }
}

/// A specialized Result type for `qs-watch` operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
