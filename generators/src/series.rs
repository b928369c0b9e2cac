//! The generic periodic/historical generator contract.
//!
//! Every entity generator implements [`EventGenerator`]: a cadence plus a
//! per-timestamp production function. That split lets the single
//! [`replay_window`] routine backfill any generator over a historical
//! window, and lets the live driver tick any generator on its own interval.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use datagen_core::envelope::{Emission, EventRecord};
use datagen_core::events::EventKind;
use datagen_core::variates::happens;
use rand::Rng;
use smallvec::{SmallVec, smallvec};
use std::time::Duration;

/// A generator that turns a timestamp into zero or more emissions.
///
/// `produce` is synchronous and CPU-bound; delayed follow-ups come back as
/// [`Emission::After`] descriptions with fully materialized records.
pub trait EventGenerator: Send {
    /// Production cadence.
    fn interval(&self) -> Duration;

    /// The event kind whose delivery policy (publish jitter, duplicate
    /// ratio) paces this generator in live mode.
    fn policy_kind(&self) -> EventKind;

    /// Produce the emissions for one tick at `at`.
    fn produce(&mut self, at: DateTime<Utc>) -> SmallVec<[Emission; 4]>;
}

/// Replays a generator across a historical window at its fixed cadence.
///
/// The cursor starts at `from`, calls `produce` and advances by the
/// generator's interval until it reaches `until`. Delayed follow-ups are
/// materialized at their derived timestamps; the caller is responsible for
/// the global sort and the horizon filter.
pub fn replay_window(
    generator: &mut dyn EventGenerator,
    from: DateTime<Utc>,
    until: DateTime<Utc>,
) -> Vec<EventRecord> {
    let step = match ChronoDuration::from_std(generator.interval()) {
        Ok(step) if step > ChronoDuration::zero() => step,
        _ => {
            tracing::error!("generator interval is zero or out of range, skipping replay");
            return Vec::new();
        },
    };

    let mut records = Vec::new();
    let mut cursor = from;
    while cursor < until {
        for emission in generator.produce(cursor) {
            records.push(emission.into_record());
        }
        cursor += step;
    }
    records
}

/// Shifts a trigger timestamp by a follow-up delay.
#[must_use]
pub fn offset_by(at: DateTime<Utc>, delay: Duration) -> DateTime<Utc> {
    at + ChronoDuration::from_std(delay).unwrap_or_else(|_| ChronoDuration::zero())
}

/// Applies duplicate injection to one record: with probability `ratio` the
/// record is emitted twice, back to back.
pub fn with_duplicates(
    rng: &mut impl Rng,
    ratio: f64,
    record: EventRecord,
) -> SmallVec<[EventRecord; 2]> {
    if happens(rng, ratio) {
        smallvec![record.clone(), record]
    } else {
        smallvec![record]
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect
mod tests {
    use super::*;
    use datagen_core::events::{EventPayload, Transaction, TransactionState};
    use datagen_core::variates::seeded_rng;

    struct OnePerTick {
        produced: u32,
    }

    impl EventGenerator for OnePerTick {
        fn interval(&self) -> Duration {
            Duration::from_secs(60)
        }

        fn policy_kind(&self) -> EventKind {
            EventKind::Transaction
        }

        fn produce(&mut self, at: DateTime<Utc>) -> SmallVec<[Emission; 4]> {
            self.produced += 1;
            smallvec![Emission::now(EventPayload::Transaction(Transaction {
                id: self.produced,
                state: TransactionState::Started,
                amount: 1.0,
                timestamp: at,
            }))]
        }
    }

    #[test]
    fn replay_covers_window_at_cadence() {
        let mut generator = OnePerTick { produced: 0 };
        let until = Utc::now();
        let from = until - ChronoDuration::hours(1);
        let records = replay_window(&mut generator, from, until);

        // One event per minute over one hour.
        assert_eq!(records.len(), 60);
        assert_eq!(records[0].timestamp, from);
        assert!(records.iter().all(|r| r.timestamp < until));
        assert!(records.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }

    #[test]
    fn duplicates_at_extreme_ratios() {
        let mut rng = seeded_rng(3);
        let record = EventRecord::from_payload(EventPayload::Transaction(Transaction {
            id: 1,
            state: TransactionState::Started,
            amount: 1.0,
            timestamp: Utc::now(),
        }));

        assert_eq!(with_duplicates(&mut rng, 1.0, record.clone()).len(), 2);
        assert_eq!(with_duplicates(&mut rng, 0.0, record).len(), 1);
    }
}
