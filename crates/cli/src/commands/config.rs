// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use qs_core::QsConfig;

use crate::error::Result;

pub fn run(config: &QsConfig) -> Result<()> {
    print!("{}", config.to_toml_string()?);
    Ok(())
}
