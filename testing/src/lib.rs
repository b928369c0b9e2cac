//! # Datagen Testing
//!
//! Testing utilities and mock collaborators for the datagen crates.
//!
//! This crate provides:
//! - Mock implementations of the collaborator traits (`Clock`, `Scheduler`,
//!   `EventSink`, `RunHistory`)
//! - A virtual-time scheduler for driving delayed follow-ups in tests
//! - Test logging setup
//!
//! ## Example
//!
//! ```
//! use datagen_testing::mocks::{CollectingSink, FakeScheduler, test_clock};
//! use datagen_core::clock::Clock;
//!
//! let clock = test_clock();
//! let scheduler = FakeScheduler::new();
//! let sink = CollectingSink::new();
//!
//! assert_eq!(clock.now(), clock.now());
//! assert_eq!(scheduler.pending(), 0);
//! assert!(sink.records().is_empty());
//! ```

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use datagen_core::clock::Clock;
use datagen_core::envelope::EventRecord;
use datagen_core::scheduler::{ScheduledTask, Scheduler, TaskHandle};
use datagen_core::sink::{EventSink, RunHistory};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

fn lock_or_recover<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Mock implementations of the collaborator traits.
pub mod mocks {
    use super::{
        ChronoDuration, Clock, DateTime, Duration, EventRecord, EventSink, Mutex, RunHistory,
        ScheduledTask, Scheduler, TaskHandle, Utc, lock_or_recover,
    };

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use datagen_testing::mocks::FixedClock;
    /// use datagen_core::clock::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// let time2 = clock.now();
    /// assert_eq!(time1, time2); // Always the same!
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Manually advanced clock for tests that need time to move.
    #[derive(Debug)]
    pub struct SteppingClock {
        time: Mutex<DateTime<Utc>>,
    }

    impl SteppingClock {
        /// Create a stepping clock starting at `time`
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self {
                time: Mutex::new(time),
            }
        }

        /// Advance the clock by `by`
        pub fn advance(&self, by: Duration) {
            let mut time = lock_or_recover(&self.time);
            *time += ChronoDuration::from_std(by).unwrap_or_else(|_| ChronoDuration::zero());
        }
    }

    impl Clock for SteppingClock {
        fn now(&self) -> DateTime<Utc> {
            *lock_or_recover(&self.time)
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }

    struct PendingTask {
        due: Duration,
        task: ScheduledTask,
    }

    struct SchedulerInner {
        virtual_now: Duration,
        next_handle: u64,
        pending: Vec<PendingTask>,
    }

    /// Virtual-time scheduler.
    ///
    /// Tasks run only when the caller advances virtual time past their due
    /// point, in due order. Tasks scheduled by a running task participate
    /// in the same advance when they fall inside it.
    pub struct FakeScheduler {
        inner: Mutex<SchedulerInner>,
    }

    impl FakeScheduler {
        /// Create an empty scheduler at virtual time zero
        #[must_use]
        pub const fn new() -> Self {
            Self {
                inner: Mutex::new(SchedulerInner {
                    virtual_now: Duration::ZERO,
                    next_handle: 0,
                    pending: Vec::new(),
                }),
            }
        }

        /// Number of tasks waiting for their due time
        #[must_use]
        pub fn pending(&self) -> usize {
            lock_or_recover(&self.inner).pending.len()
        }

        /// Advance virtual time by `by`, running every task that comes due.
        pub fn advance(&self, by: Duration) {
            let target = lock_or_recover(&self.inner).virtual_now + by;
            loop {
                let next = {
                    let mut inner = lock_or_recover(&self.inner);
                    let due_idx = inner
                        .pending
                        .iter()
                        .enumerate()
                        .filter(|(_, p)| p.due <= target)
                        .min_by_key(|(_, p)| p.due)
                        .map(|(idx, _)| idx);
                    match due_idx {
                        Some(idx) => {
                            let pending = inner.pending.swap_remove(idx);
                            inner.virtual_now = pending.due;
                            Some(pending.task)
                        },
                        None => {
                            inner.virtual_now = target;
                            None
                        },
                    }
                };
                // Run outside the lock so tasks can schedule follow-ups.
                match next {
                    Some(task) => task(),
                    None => break,
                }
            }
        }
    }

    impl Default for FakeScheduler {
        fn default() -> Self {
            Self::new()
        }
    }

    impl Scheduler for FakeScheduler {
        fn schedule(&self, after: Duration, task: ScheduledTask) -> TaskHandle {
            let mut inner = lock_or_recover(&self.inner);
            let handle = TaskHandle::new(inner.next_handle);
            inner.next_handle += 1;
            let due = inner.virtual_now + after;
            inner.pending.push(PendingTask { due, task });
            handle
        }
    }

    /// Sink that collects every enqueued record for later assertions.
    #[derive(Default)]
    pub struct CollectingSink {
        records: Mutex<Vec<EventRecord>>,
    }

    impl CollectingSink {
        /// Create an empty sink
        #[must_use]
        pub const fn new() -> Self {
            Self {
                records: Mutex::new(Vec::new()),
            }
        }

        /// Snapshot of everything enqueued so far
        #[must_use]
        pub fn records(&self) -> Vec<EventRecord> {
            lock_or_recover(&self.records).clone()
        }

        /// Drain the collected records
        #[must_use]
        pub fn take(&self) -> Vec<EventRecord> {
            std::mem::take(&mut lock_or_recover(&self.records))
        }
    }

    impl EventSink for CollectingSink {
        fn enqueue(&self, record: EventRecord) {
            lock_or_recover(&self.records).push(record);
        }
    }

    /// Run-history stub answering a fixed value.
    #[derive(Debug, Clone, Copy)]
    pub struct StaticRunHistory {
        prior_run: bool,
    }

    impl StaticRunHistory {
        /// History that reports a prior run (backfill is skipped)
        #[must_use]
        pub const fn with_prior_run() -> Self {
            Self { prior_run: true }
        }

        /// History that reports a first start (backfill runs)
        #[must_use]
        pub const fn first_start() -> Self {
            Self { prior_run: false }
        }
    }

    impl RunHistory for StaticRunHistory {
        fn has_prior_run_evidence(&self) -> bool {
            self.prior_run
        }
    }
}

/// Install a compact tracing subscriber for a test binary. Repeated calls
/// are no-ops.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .with_test_writer()
        .compact()
        .try_init();
}

// Re-export commonly used items
pub use mocks::{CollectingSink, FakeScheduler, FixedClock, StaticRunHistory, test_clock};

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect
mod tests {
    use super::mocks::*;
    use datagen_core::clock::Clock;
    use datagen_core::scheduler::Scheduler;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    #[test]
    fn fixed_clock_never_moves() {
        let clock = test_clock();
        assert_eq!(clock.now(), clock.now());
    }

    #[test]
    fn stepping_clock_advances() {
        let clock = SteppingClock::new(test_clock().now());
        let before = clock.now();
        clock.advance(Duration::from_secs(90));
        assert_eq!(clock.now() - before, chrono::Duration::seconds(90));
    }

    #[test]
    fn scheduler_runs_tasks_in_due_order() {
        let scheduler = FakeScheduler::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for (delay, tag) in [(30_u64, "late"), (10, "early"), (20, "middle")] {
            let order = Arc::clone(&order);
            scheduler.schedule(
                Duration::from_secs(delay),
                Box::new(move || super::lock_or_recover(&order).push(tag)),
            );
        }

        scheduler.advance(Duration::from_secs(25));
        assert_eq!(*super::lock_or_recover(&order), vec!["early", "middle"]);
        assert_eq!(scheduler.pending(), 1);

        scheduler.advance(Duration::from_secs(5));
        assert_eq!(
            *super::lock_or_recover(&order),
            vec!["early", "middle", "late"]
        );
    }

    #[test]
    fn tasks_can_schedule_follow_ups_within_an_advance() {
        let scheduler = Arc::new(FakeScheduler::new());
        let fired = Arc::new(AtomicU32::new(0));

        let inner_scheduler = Arc::clone(&scheduler);
        let inner_fired = Arc::clone(&fired);
        scheduler.schedule(
            Duration::from_secs(1),
            Box::new(move || {
                inner_fired.fetch_add(1, Ordering::SeqCst);
                let chained = Arc::clone(&inner_fired);
                inner_scheduler.schedule(
                    Duration::from_secs(1),
                    Box::new(move || {
                        chained.fetch_add(1, Ordering::SeqCst);
                    }),
                );
            }),
        );

        scheduler.advance(Duration::from_secs(5));
        assert_eq!(fired.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn collecting_sink_keeps_enqueue_order() {
        use datagen_core::envelope::EventRecord;
        use datagen_core::events::{EventPayload, Transaction, TransactionState};
        use datagen_core::sink::EventSink;

        let sink = CollectingSink::new();
        for id in 1..=3 {
            sink.enqueue(EventRecord::from_payload(EventPayload::Transaction(
                Transaction {
                    id,
                    state: TransactionState::Started,
                    amount: 5.0,
                    timestamp: test_clock().now(),
                },
            )));
        }
        let keys: Vec<_> = sink.records().iter().map(|r| r.key.clone()).collect();
        assert_eq!(keys, vec!["txn-1", "txn-2", "txn-3"]);
        assert_eq!(sink.take().len(), 3);
        assert!(sink.records().is_empty());
    }

    #[test]
    fn run_history_stubs_answer_fixedly() {
        use datagen_core::sink::RunHistory;
        assert!(StaticRunHistory::with_prior_run().has_prior_run_evidence());
        assert!(!StaticRunHistory::first_start().has_prior_run_evidence());
    }
}
