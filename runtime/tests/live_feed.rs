//! End-to-end checks of the live driver with channel and collecting sinks.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use datagen_core::clock::SystemClock;
use datagen_core::config::DatagenConfig;
use datagen_core::events::EventKind;
use datagen_runtime::{ChannelSink, LiveDriver, TokioScheduler};
use datagen_testing::mocks::{CollectingSink, StaticRunHistory};
use std::sync::Arc;
use std::time::Duration;

// Intervals compressed so a minute of virtual time covers several causal
// chains and at least one full session.
fn fast_config() -> DatagenConfig {
    let mut cfg = DatagenConfig::default();
    cfg.history.seed = Some(99);
    cfg.history.window_days = 1;
    cfg.orders.interval_ms = 500;
    cfg.orders.cancellation_ratio = 1.0;
    cfg.orders.min_cancel_delay_ms = 1_000;
    cfg.orders.max_cancel_delay_ms = 2_000;
    cfg.orders.max_publish_delay_secs = 0;
    cfg.orders.duplicates_ratio = 0.0;
    cfg.orders.false_positive_interval_ms = 5_000;
    cfg.orders.suspicious_interval_ms = 10_000;
    cfg.transactions.interval_ms = 400;
    cfg.sessions.click_min_delay_ms = 100;
    cfg.sessions.click_max_delay_ms = 300;
    cfg.sessions.inter_session_gap_ms = 1_000;
    cfg.sessions.duplicates_ratio = 0.0;
    cfg
}

#[tokio::test(start_paused = true)]
async fn live_feed_produces_chains_sessions_and_follow_ups() {
    let (sink, mut events) = ChannelSink::pair();
    let driver = LiveDriver::new(
        fast_config(),
        Arc::new(SystemClock),
        Arc::new(TokioScheduler::new()),
        Arc::new(sink),
    );

    let handles = driver.spawn(42).expect("fleet must build");
    tokio::time::sleep(Duration::from_secs(60)).await;
    for handle in &handles {
        handle.abort();
    }

    let mut records = Vec::new();
    while let Ok(record) = events.try_recv() {
        records.push(record);
    }

    for kind in [
        EventKind::Order,
        EventKind::Cancellation,
        EventKind::Transaction,
        EventKind::Click,
        EventKind::StockMovement,
        EventKind::SensorReading,
    ] {
        assert!(
            records.iter().any(|r| r.payload.kind() == kind),
            "no {kind:?} events in live feed"
        );
    }

    // Every scheduled cancellation that fired references an order already
    // delivered: the delay is strictly positive and delivery is in order.
    let order_count = records
        .iter()
        .filter(|r| r.payload.kind() == EventKind::Order)
        .count();
    let cancellation_count = records
        .iter()
        .filter(|r| r.payload.kind() == EventKind::Cancellation)
        .count();
    assert!(order_count > 10);
    assert!(cancellation_count > 5);
    assert!(cancellation_count <= order_count);
}

#[tokio::test(start_paused = true)]
async fn duplicate_policy_applies_at_delivery() {
    let mut cfg = fast_config();
    cfg.transactions.duplicates_ratio = 1.0;

    let (sink, mut events) = ChannelSink::pair();
    let driver = LiveDriver::new(
        cfg,
        Arc::new(SystemClock),
        Arc::new(TokioScheduler::new()),
        Arc::new(sink),
    );

    let handles = driver.spawn(7).expect("fleet must build");
    tokio::time::sleep(Duration::from_secs(10)).await;
    for handle in &handles {
        handle.abort();
    }

    let mut transactions = Vec::new();
    while let Ok(record) = events.try_recv() {
        if record.payload.kind() == EventKind::Transaction {
            transactions.push(record);
        }
    }
    assert!(!transactions.is_empty());
    assert_eq!(transactions.len() % 2, 0, "transactions must come in pairs");
    for pair in transactions.chunks(2) {
        assert_eq!(pair[0], pair[1], "duplicate must be adjacent and identical");
    }
}

#[test]
fn backfill_is_skipped_after_a_prior_run() {
    let sink = Arc::new(CollectingSink::new());
    let driver = LiveDriver::new(
        fast_config(),
        Arc::new(SystemClock),
        Arc::new(TokioScheduler::new()),
        Arc::clone(&sink) as Arc<dyn datagen_core::sink::EventSink>,
    );

    let enqueued = driver
        .run_backfill(&StaticRunHistory::with_prior_run())
        .expect("skip path cannot fail");
    assert_eq!(enqueued, 0);
    assert!(sink.records().is_empty());
}

#[test]
fn first_start_backfills_a_sorted_window() {
    let mut cfg = fast_config();
    // Slow cadences keep the one-day replay small.
    cfg.orders.interval_ms = 3_600_000;
    cfg.orders.false_positive_interval_ms = 7_200_000;
    cfg.orders.suspicious_interval_ms = 14_400_000;
    cfg.orders.min_cancel_delay_ms = 300_000;
    cfg.orders.max_cancel_delay_ms = 7_200_000;
    cfg.stock.interval_ms = 3_600_000;
    cfg.stock.out_of_stock_interval_ms = 14_400_000;
    cfg.telemetry.badge_interval_ms = 3_600_000;
    cfg.telemetry.sensor_interval_ms = 1_800_000;
    cfg.telemetry.anomaly_interval_ms = 14_400_000;
    cfg.transactions.interval_ms = 1_800_000;
    cfg.returns.interval_ms = 7_200_000;
    cfg.returns.review_interval_ms = 7_200_000;
    cfg.customers.interval_ms = 7_200_000;
    cfg.sessions.per_event_interval_ms = 600_000;
    cfg.sessions.inter_session_gap_ms = 1_800_000;

    let sink = Arc::new(CollectingSink::new());
    let driver = LiveDriver::new(
        cfg,
        Arc::new(SystemClock),
        Arc::new(TokioScheduler::new()),
        Arc::clone(&sink) as Arc<dyn datagen_core::sink::EventSink>,
    );

    let enqueued = driver
        .run_backfill(&StaticRunHistory::first_start())
        .expect("backfill must succeed");
    let records = sink.records();
    assert_eq!(records.len(), enqueued);
    assert!(enqueued > 0);
    assert!(
        records
            .windows(2)
            .all(|w| w[0].timestamp <= w[1].timestamp)
    );
}
