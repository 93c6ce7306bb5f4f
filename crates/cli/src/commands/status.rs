// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;

use qs_client::StatusEngine;
use qs_core::{QsConfig, Snapshot};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::replay::ReplayTransport;

pub fn run(config: &QsConfig, snapshots: &Path, reload: bool, field: Option<&str>) -> Result<()> {
    let transport = ReplayTransport::load(snapshots)?;
    let engine = StatusEngine::new(transport, config.engine.clone())?;
    let status = engine.get_status(reload)?;
    engine.close();

    println!("{}", render(&status, field)?);
    Ok(())
}

/// Renders the whole snapshot as pretty JSON, or one field of it.
///
/// String fields print bare so they can be used from shell scripts.
pub(crate) fn render(status: &Snapshot, field: Option<&str>) -> Result<String> {
    let Some(name) = field else {
        return Ok(serde_json::to_string_pretty(status.fields())?);
    };
    match status.get(name) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(value) => Ok(value.to_string()),
        None => Err(Error::FieldNotFound(name.to_string())),
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
