// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod config;
pub mod console;
pub mod status;
pub mod wait;

use std::path::Path;

use qs_core::QsConfig;

use crate::env;
use crate::error::Result;

/// Resolves the configuration: `--config`, then `$QS_WATCH_CONFIG`, then defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<QsConfig> {
    let path = explicit.map(Path::to_path_buf).or_else(env::config_path);
    match path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config");
            Ok(QsConfig::load(&path)?)
        }
        None => Ok(QsConfig::default()),
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
