// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use tempfile::TempDir;

#[test]
fn defaults_match_client_library() {
    let config = QsConfig::default();
    assert_eq!(config.engine.status_expiration_period(), Duration::from_millis(500));
    assert_eq!(config.engine.status_polling_period(), Duration::from_secs(1));
    assert_eq!(config.engine.tick_period(), Duration::from_millis(100));
    assert_eq!(config.engine.status_max_age(), Duration::from_secs(60));
    assert_eq!(config.engine.default_wait_timeout(), Duration::from_secs(600));
    assert_eq!(config.monitor.poll_timeout(), Duration::from_secs(1));
    assert_eq!(config.monitor.max_msgs, 10_000);
}

#[test]
fn empty_document_is_default() {
    let config = QsConfig::from_toml_str("").unwrap();
    assert_eq!(config, QsConfig::default());
}

#[test]
fn partial_sections_keep_other_defaults() {
    let config = QsConfig::from_toml_str(
        r#"
[engine]
status_expiration_period_ms = 1000

[monitor]
max_msgs = 0
"#,
    )
    .unwrap();

    assert_eq!(config.engine.status_expiration_period_ms, 1_000);
    assert_eq!(config.engine.status_polling_period_ms, 1_000);
    assert_eq!(config.monitor.max_msgs, 0);
    assert_eq!(config.monitor.poll_timeout_ms, 1_000);
}

#[test]
fn zero_tick_is_rejected() {
    let err = QsConfig::from_toml_str("[engine]\ntick_period_ms = 0\n").unwrap_err();
    assert!(matches!(err, Error::Config(ref msg) if msg.contains("tick_period_ms")));
}

#[test]
fn zero_poll_timeout_is_rejected() {
    let err = QsConfig::from_toml_str("[monitor]\npoll_timeout_ms = 0\n").unwrap_err();
    assert!(matches!(err, Error::Config(ref msg) if msg.contains("poll_timeout_ms")));
}

#[test]
fn malformed_toml_is_a_config_error() {
    let err = QsConfig::from_toml_str("[engine\n").unwrap_err();
    assert!(err.to_string().contains("failed to parse config"));
}

#[test]
fn load_round_trips_through_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("qs.toml");

    let mut config = QsConfig::default();
    config.engine.tick_period_ms = 25;
    config.monitor.max_msgs = 2;
    std::fs::write(&path, config.to_toml_string().unwrap()).unwrap();

    assert_eq!(QsConfig::load(&path).unwrap(), config);
}

#[test]
fn load_missing_file_names_path() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("absent.toml");
    let err = QsConfig::load(&path).unwrap_err();
    assert!(err.to_string().contains("absent.toml"));
}
