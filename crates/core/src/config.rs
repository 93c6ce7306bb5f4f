// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Engine and message-monitor configuration.
//!
//! Stored as TOML with every duration written in milliseconds:
//!
//! ```toml
//! [engine]
//! status_expiration_period_ms = 500
//! status_polling_period_ms = 1000
//!
//! [monitor]
//! max_msgs = 10000
//! ```
//!
//! Missing fields take their defaults, so an empty file is a valid config.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Status engine timing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// A cached snapshot younger than this is reused without a fetch.
    #[serde(default = "default_status_expiration_period_ms")]
    pub status_expiration_period_ms: u64,
    /// How often status is reloaded while waiters are pending.
    #[serde(default = "default_status_polling_period_ms")]
    pub status_polling_period_ms: u64,
    /// Poll loop tick.
    #[serde(default = "default_tick_period_ms")]
    pub tick_period_ms: u64,
    /// Hard ceiling on cache age regardless of the expiration period.
    #[serde(default = "default_status_max_age_ms")]
    pub status_max_age_ms: u64,
    /// Timeout used by `wait_for_idle` and friends when none is given.
    #[serde(default = "default_wait_timeout_ms")]
    pub default_wait_timeout_ms: u64,
}

fn default_status_expiration_period_ms() -> u64 {
    500
}

fn default_status_polling_period_ms() -> u64 {
    1_000
}

fn default_tick_period_ms() -> u64 {
    100
}

fn default_status_max_age_ms() -> u64 {
    60_000
}

fn default_wait_timeout_ms() -> u64 {
    600_000
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            status_expiration_period_ms: default_status_expiration_period_ms(),
            status_polling_period_ms: default_status_polling_period_ms(),
            tick_period_ms: default_tick_period_ms(),
            status_max_age_ms: default_status_max_age_ms(),
            default_wait_timeout_ms: default_wait_timeout_ms(),
        }
    }
}

impl EngineConfig {
    pub fn status_expiration_period(&self) -> Duration {
        Duration::from_millis(self.status_expiration_period_ms)
    }

    pub fn status_polling_period(&self) -> Duration {
        Duration::from_millis(self.status_polling_period_ms)
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_period_ms)
    }

    pub fn status_max_age(&self) -> Duration {
        Duration::from_millis(self.status_max_age_ms)
    }

    pub fn default_wait_timeout(&self) -> Duration {
        Duration::from_millis(self.default_wait_timeout_ms)
    }

    /// Rejects settings the poll loop cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.tick_period_ms == 0 {
            return Err(Error::Config("tick_period_ms must be positive".to_string()));
        }
        if self.status_max_age_ms == 0 {
            return Err(Error::Config("status_max_age_ms must be positive".to_string()));
        }
        Ok(())
    }
}

/// Background message monitor settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Timeout of each receive call made by the ingester.
    #[serde(default = "default_poll_timeout_ms")]
    pub poll_timeout_ms: u64,
    /// Buffer capacity. 0 disables storage.
    #[serde(default = "default_max_msgs")]
    pub max_msgs: usize,
}

fn default_poll_timeout_ms() -> u64 {
    1_000
}

fn default_max_msgs() -> usize {
    10_000
}

impl Default for MonitorConfig {
    fn default() -> Self {
        MonitorConfig { poll_timeout_ms: default_poll_timeout_ms(), max_msgs: default_max_msgs() }
    }
}

impl MonitorConfig {
    pub fn poll_timeout(&self) -> Duration {
        Duration::from_millis(self.poll_timeout_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.poll_timeout_ms == 0 {
            return Err(Error::Config("poll_timeout_ms must be positive".to_string()));
        }
        Ok(())
    }
}

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QsConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub monitor: MonitorConfig,
}

impl QsConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: QsConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;
        config.engine.validate()?;
        config.monitor.validate()?;
        Ok(config)
    }

    /// Loads configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read {}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// Renders the configuration back to TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("failed to serialize config: {}", e)))
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
