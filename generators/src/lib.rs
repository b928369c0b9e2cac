//! Generator fleet for the retail demo feed.
//!
//! This crate holds the pure generation logic: per-entity generators, the
//! causal order chains, the session and transaction state machines, the
//! review corpus and the one-shot history backfill. Everything here is
//! synchronous and deterministic under a seed; pacing, scheduling and
//! delivery live in the runtime crate.

pub mod backfill;
pub mod catalog;
pub mod chains;
pub mod customers;
pub mod fleet;
pub mod orders;
pub mod returns;
pub mod series;
pub mod session;
pub mod stock;
pub mod telemetry;
pub mod transactions;

pub use backfill::generate_history;
pub use fleet::{Fleet, build_fleet};
pub use series::EventGenerator;
pub use session::{SessionEngine, SessionState};

use std::sync::{Mutex, MutexGuard};

/// Locks a mutex, recovering the guard if a writer panicked mid-update.
/// The shared stores hold plain data, so a poisoned value is still usable.
pub(crate) fn lock_or_recover<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
