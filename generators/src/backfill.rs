//! One-shot history backfill.
//!
//! On first start the datagen seeds its output with a bounded window of
//! history so downstream consumers have data to aggregate immediately. The
//! backfill replays the whole fleet against a synthetic clock, merges the
//! streams with a stable sort on the authoritative timestamp, drops
//! follow-ups that land past the backfill horizon, and injects duplicates
//! last so duplicated records stay adjacent.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use datagen_core::config::DatagenConfig;
use datagen_core::envelope::{Emission, EventRecord};
use datagen_core::error::DatagenError;
use datagen_core::variates::{entropy_rng, seeded_rng};
use rand::RngCore;

use crate::fleet::build_fleet;
use crate::series::{offset_by, replay_window, with_duplicates};
use crate::session::SessionEngine;

/// Generates the historical window `[now - window_days, now)`.
///
/// With `history.seed` set the output is fully deterministic for a given
/// `now`; otherwise the seed is drawn from entropy.
pub fn generate_history(
    cfg: &DatagenConfig,
    now: DateTime<Utc>,
) -> Result<Vec<EventRecord>, DatagenError> {
    let seed = cfg
        .history
        .seed
        .unwrap_or_else(|| entropy_rng().next_u64());
    let from = now - ChronoDuration::days(i64::from(cfg.history.window_days));
    tracing::info!(%from, %now, seed, "generating history backfill");

    let mut fleet = build_fleet(cfg, seed)?;

    let mut records = Vec::new();
    for generator in &mut fleet.generators {
        records.extend(replay_window(generator.as_mut(), from, now));
    }
    records.extend(replay_sessions(&mut fleet.sessions, from, now)?);

    // Stable sort keeps the intra-tick emission order for equal timestamps.
    records.sort_by_key(|record| record.timestamp);
    records.retain(|record| record.timestamp < now);

    let mut delivery_rng = seeded_rng(seed.wrapping_add(1));
    let mut out = Vec::with_capacity(records.len());
    for record in records {
        let ratio = cfg.duplicates_ratio_for(record.payload.kind());
        out.extend(with_duplicates(&mut delivery_rng, ratio, record));
    }

    tracing::info!(events = out.len(), "history backfill complete");
    Ok(out)
}

/// Replays back-to-back sessions over the window with a synthetic clock:
/// each event advances the clock by the configured per-event interval, and
/// sessions are separated by the inter-session gap.
fn replay_sessions(
    engine: &mut SessionEngine,
    from: DateTime<Utc>,
    until: DateTime<Utc>,
) -> Result<Vec<EventRecord>, DatagenError> {
    let mut records = Vec::new();
    let mut cursor = from;
    while cursor < until {
        let (mut session, entry) = engine.start(cursor)?;
        records.extend(entry.into_iter().map(Emission::into_record));
        while !session.ended && cursor < until {
            cursor = offset_by(cursor, engine.per_event_interval());
            records.extend(
                engine
                    .step(&mut session, cursor)
                    .into_iter()
                    .map(Emission::into_record),
            );
        }
        cursor = offset_by(cursor, engine.session_gap());
    }
    Ok(records)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect
mod tests {
    use super::*;
    use datagen_core::events::EventKind;

    // A slowed-down configuration so a one-day window stays small.
    fn test_config() -> DatagenConfig {
        let mut cfg = DatagenConfig::default();
        cfg.history.window_days = 1;
        cfg.history.seed = Some(307);
        cfg.orders.interval_ms = 3_600_000;
        cfg.orders.false_positive_interval_ms = 7_200_000;
        cfg.orders.suspicious_interval_ms = 14_400_000;
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
        cfg
    }

    #[test]
    fn history_is_bounded_and_sorted() {
        let cfg = test_config();
        let now = Utc::now();
        let from = now - ChronoDuration::days(1);
        let records = generate_history(&cfg, now).unwrap();

        assert!(!records.is_empty());
        assert!(records.iter().all(|r| r.timestamp >= from));
        assert!(records.iter().all(|r| r.timestamp < now));
        assert!(
            records
                .windows(2)
                .all(|w| w[0].timestamp <= w[1].timestamp)
        );
    }

    #[test]
    fn seeded_history_is_reproducible() {
        let cfg = test_config();
        let now = Utc::now();
        let a = generate_history(&cfg, now).unwrap();
        let b = generate_history(&cfg, now).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn history_mixes_event_kinds() {
        let cfg = test_config();
        let records = generate_history(&cfg, Utc::now()).unwrap();
        for kind in [
            EventKind::Order,
            EventKind::StockMovement,
            EventKind::SensorReading,
            EventKind::Transaction,
            EventKind::Click,
            EventKind::ReturnRequest,
        ] {
            assert!(
                records.iter().any(|r| r.payload.kind() == kind),
                "no {kind:?} events in history"
            );
        }
    }

    #[test]
    fn duplicates_stay_adjacent() {
        let mut cfg = test_config();
        cfg.orders.duplicates_ratio = 1.0;
        let records = generate_history(&cfg, Utc::now()).unwrap();

        let mut i = 0;
        let mut saw_order = false;
        while i < records.len() {
            if records[i].payload.kind() == EventKind::Order {
                saw_order = true;
                assert_eq!(records[i + 1], records[i], "duplicate not adjacent");
                i += 2;
            } else {
                i += 1;
            }
        }
        assert!(saw_order);
    }

    #[test]
    fn cancellations_never_precede_their_order() {
        let cfg = test_config();
        let records = generate_history(&cfg, Utc::now()).unwrap();
        let mut seen_orders = std::collections::HashSet::new();
        let mut checked = 0;
        for record in &records {
            match &record.payload {
                datagen_core::events::EventPayload::Order(order) => {
                    seen_orders.insert(order.id.clone());
                },
                datagen_core::events::EventPayload::Cancellation(cancellation) => {
                    // The order either appeared earlier in the stream, or its
                    // tick predates the window start.
                    if cancellation.order.timestamp >= records[0].timestamp {
                        assert!(
                            seen_orders.contains(&cancellation.order.id),
                            "cancellation before its order"
                        );
                        checked += 1;
                    }
                },
                _ => {},
            }
        }
        assert!(checked > 0, "no in-window cancellations to check");
    }
}
