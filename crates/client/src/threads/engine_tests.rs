// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::test_helpers::{snapshot, wait_until, ScriptedTransport};
use qs_core::ManualClock;
use std::time::Instant;

fn fast_config() -> EngineConfig {
    EngineConfig {
        status_expiration_period_ms: 0,
        status_polling_period_ms: 20,
        tick_period_ms: 5,
        ..EngineConfig::default()
    }
}

fn never() -> Condition {
    Arc::new(|_: &Snapshot| false)
}

#[test]
fn get_status_fetches_through_poll_loop() {
    let transport = Arc::new(ScriptedTransport::states(&["idle"]));
    let engine = StatusEngine::new(Arc::clone(&transport), fast_config()).unwrap();

    let status = engine.get_status(false).unwrap();
    assert_eq!(status.manager_state(), Some("idle"));
    assert_eq!(transport.calls(), 1);
    assert_eq!(transport.methods(), vec![STATUS_METHOD.to_string()]);
    assert!(engine.cached_status().unwrap().same_fetch(&status));
}

#[test]
fn concurrent_reloads_share_one_fetch() {
    let transport = Arc::new(ScriptedTransport::states(&["idle"]).closed_gate());
    let engine = Arc::new(StatusEngine::new(Arc::clone(&transport), fast_config()).unwrap());

    let callers: Vec<_> = (0..8)
        .map(|_| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || engine.get_status(true))
        })
        .collect();

    // All callers queue up behind the single in-flight fetch.
    assert!(wait_until(Duration::from_secs(5), || {
        engine.pending_status_requests() == 8 && transport.calls() == 1
    }));
    transport.open();

    let results: Vec<Snapshot> =
        callers.into_iter().map(|h| h.join().unwrap().unwrap()).collect();
    assert_eq!(transport.calls(), 1);
    assert!(results.iter().all(|s| s.same_fetch(&results[0])));
}

#[test]
fn concurrent_callers_share_one_error() {
    let transport = Arc::new(
        ScriptedTransport::failing(TransportError::ConnectionFailed("refused".into()))
            .closed_gate(),
    );
    let engine = Arc::new(StatusEngine::new(Arc::clone(&transport), fast_config()).unwrap());

    let callers: Vec<_> = (0..4)
        .map(|_| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || engine.get_status(true))
        })
        .collect();
    assert!(wait_until(Duration::from_secs(5), || engine.pending_status_requests() == 4));
    transport.open();

    for handle in callers {
        let err = handle.join().unwrap().unwrap_err();
        assert!(matches!(err, Error::Transport(TransportError::ConnectionFailed(_))));
    }
    assert_eq!(transport.calls(), 1);
    assert!(matches!(engine.last_error(), Some(TransportError::ConnectionFailed(_))));
}

#[test]
fn fresh_cache_avoids_fetch() {
    let clock = Arc::new(ManualClock::new(1_000_000));
    let transport = Arc::new(ScriptedTransport::states(&["idle"]));
    let config = EngineConfig { status_expiration_period_ms: 1_000, ..fast_config() };
    let engine = StatusEngine::with_clock(Arc::clone(&transport), config, clock.clone()).unwrap();

    engine.get_status(false).unwrap();
    clock.advance(Duration::from_millis(100));
    engine.get_status(false).unwrap();
    assert_eq!(transport.calls(), 1);

    clock.advance(Duration::from_millis(1_500));
    engine.get_status(false).unwrap();
    assert_eq!(transport.calls(), 2);
}

#[test]
fn ping_and_invalidate_force_reload() {
    let clock = Arc::new(ManualClock::new(0));
    let transport = Arc::new(ScriptedTransport::states(&["idle"]));
    let config = EngineConfig { status_expiration_period_ms: 60_000, ..fast_config() };
    let engine = StatusEngine::with_clock(Arc::clone(&transport), config, clock).unwrap();

    engine.get_status(false).unwrap();
    engine.ping().unwrap();
    assert_eq!(transport.calls(), 2);

    engine.invalidate_status();
    engine.get_status(false).unwrap();
    assert_eq!(transport.calls(), 3);

    engine.get_status(false).unwrap();
    assert_eq!(transport.calls(), 3);
}

#[test]
fn waiter_resolves_on_third_snapshot() {
    let transport = Arc::new(ScriptedTransport::states(&["running", "running", "idle"]));
    let engine = StatusEngine::new(Arc::clone(&transport), fast_config()).unwrap();

    engine.wait_for_idle(Some(Duration::from_secs(5)), None).unwrap();
    assert_eq!(transport.calls(), 3);
    assert_eq!(engine.pending_waiters(), 0);
}

#[test]
fn wait_times_out_within_a_tick() {
    let transport = Arc::new(ScriptedTransport::states(&["running"]));
    let engine = StatusEngine::new(transport, fast_config()).unwrap();
    let monitor = WaitMonitor::new();

    let start = Instant::now();
    let err = engine
        .wait_for_condition(never(), Duration::from_millis(200), Some(&monitor))
        .unwrap_err();
    let elapsed = start.elapsed();

    assert!(matches!(err, Error::WaitTimeout { timeout } if timeout == Duration::from_millis(200)));
    assert!(elapsed >= Duration::from_millis(200), "{elapsed:?}");
    assert!(elapsed < Duration::from_millis(600), "{elapsed:?}");
    assert!(monitor.time_elapsed() >= Duration::from_millis(200));
    assert_eq!(monitor.timeout(), Some(Duration::from_millis(200)));
    assert_eq!(engine.pending_waiters(), 0);
}

#[test]
fn cancel_releases_waiter() {
    let transport = Arc::new(ScriptedTransport::states(&["running"]));
    let engine = Arc::new(StatusEngine::new(transport, fast_config()).unwrap());
    let monitor = WaitMonitor::new();

    let waiter = {
        let engine = Arc::clone(&engine);
        let monitor = monitor.clone();
        thread::spawn(move || {
            engine.wait_for_condition(never(), Duration::from_secs(30), Some(&monitor))
        })
    };
    assert!(wait_until(Duration::from_secs(5), || engine.pending_waiters() == 1));

    let start = Instant::now();
    monitor.cancel();
    let result = waiter.join().unwrap();
    assert!(matches!(result, Err(Error::WaitCancelled)));
    assert!(start.elapsed() < Duration::from_secs(1));
    assert_eq!(engine.pending_waiters(), 0);
}

#[test]
fn reused_monitor_keeps_no_stale_callbacks() {
    let transport = Arc::new(ScriptedTransport::states(&["idle"]));
    let engine = StatusEngine::new(transport, fast_config()).unwrap();
    let monitor = WaitMonitor::new();

    for _ in 0..20 {
        engine.wait_for_idle(Some(Duration::from_secs(5)), Some(&monitor)).unwrap();
    }
    assert_eq!(monitor.pending_callbacks(), 0);

    let err = engine
        .wait_for_condition(never(), Duration::from_millis(20), Some(&monitor))
        .unwrap_err();
    assert!(matches!(err, Error::WaitTimeout { .. }));
    assert_eq!(monitor.pending_callbacks(), 0);
}

#[test]
fn satisfied_condition_ignores_earlier_cancel() {
    let transport = Arc::new(ScriptedTransport::states(&["idle"]));
    let engine = StatusEngine::new(transport, fast_config()).unwrap();
    let monitor = WaitMonitor::new();
    monitor.cancel();

    engine.wait_for_idle(Some(Duration::from_secs(5)), Some(&monitor)).unwrap();
}

#[test]
fn close_releases_blocked_callers() {
    let transport = Arc::new(ScriptedTransport::states(&["running"]));
    let engine = Arc::new(StatusEngine::new(transport, fast_config()).unwrap());

    let waiter = {
        let engine = Arc::clone(&engine);
        thread::spawn(move || engine.wait_for_condition(never(), Duration::from_secs(30), None))
    };
    assert!(wait_until(Duration::from_secs(5), || engine.pending_waiters() == 1));

    engine.close();
    assert!(matches!(waiter.join().unwrap(), Err(Error::EngineClosed)));
    assert!(engine.is_closed());
    assert!(matches!(engine.get_status(false), Err(Error::EngineClosed)));
    assert!(matches!(
        engine.wait_for_condition(never(), Duration::from_secs(1), None),
        Err(Error::EngineClosed)
    ));

    // Closing twice is harmless.
    engine.close();
}

#[test]
fn close_releases_request_behind_stuck_fetch() {
    let transport = Arc::new(ScriptedTransport::states(&["idle"]).closed_gate());
    let engine = Arc::new(StatusEngine::new(Arc::clone(&transport), fast_config()).unwrap());

    let caller = {
        let engine = Arc::clone(&engine);
        thread::spawn(move || engine.get_status(false))
    };
    assert!(wait_until(Duration::from_secs(5), || transport.calls() == 1));

    let closer = {
        let engine = Arc::clone(&engine);
        thread::spawn(move || engine.close())
    };
    assert!(matches!(caller.join().unwrap(), Err(Error::EngineClosed)));

    // The poll thread can only exit once the fetch returns.
    transport.open();
    closer.join().unwrap();
}

#[test]
fn wait_for_idle_or_paused_accepts_paused() {
    let transport = Arc::new(ScriptedTransport::new(vec![Ok(snapshot("paused"))]));
    let engine = StatusEngine::new(transport, fast_config()).unwrap();
    engine.wait_for_idle_or_paused(Some(Duration::from_secs(5)), None).unwrap();
}

#[test]
fn zero_tick_is_rejected() {
    let transport = ScriptedTransport::states(&["idle"]);
    let config = EngineConfig { tick_period_ms: 0, ..EngineConfig::default() };
    assert!(matches!(StatusEngine::new(transport, config), Err(Error::Config(_))));
}
