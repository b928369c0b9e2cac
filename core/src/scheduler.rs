//! Scheduler abstraction for delayed follow-up work.
//!
//! The hosting collaborator provides "run this after N milliseconds"; the
//! core never blocks waiting on it and never needs to cancel a scheduled
//! task. Injecting the scheduler keeps the generators testable without real
//! wall-clock waits — a fake scheduler can fast-forward time
//! deterministically.

use std::time::Duration;

/// A deferred unit of work handed to the scheduler.
pub type ScheduledTask = Box<dyn FnOnce() + Send + 'static>;

/// Opaque handle for a scheduled task.
///
/// The core never cancels scheduled work; the handle exists so hosts that
/// track outstanding tasks have something to key on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskHandle(u64);

impl TaskHandle {
    /// Creates a handle from a raw id
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw id
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Scheduler trait - fire-and-forget delayed execution
pub trait Scheduler: Send + Sync {
    /// Schedule `task` to run once, `after` the given delay.
    fn schedule(&self, after: Duration, task: ScheduledTask) -> TaskHandle;
}
