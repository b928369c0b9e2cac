//! Tokio-backed follow-up scheduling.

use datagen_core::scheduler::{ScheduledTask, Scheduler, TaskHandle};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Fire-and-forget scheduler on top of the tokio timer.
///
/// Must be used from within a tokio runtime. Scheduled tasks are detached;
/// the handle identifies the task in logs but carries no cancellation.
#[derive(Debug, Default)]
pub struct TokioScheduler {
    next_handle: AtomicU64,
}

impl TokioScheduler {
    /// Creates a scheduler.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            next_handle: AtomicU64::new(0),
        }
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, after: Duration, task: ScheduledTask) -> TaskHandle {
        let handle = TaskHandle::new(self.next_handle.fetch_add(1, Ordering::Relaxed));
        tokio::spawn(async move {
            tokio::time::sleep(after).await;
            task();
        });
        handle
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::AtomicBool;

    #[tokio::test(start_paused = true)]
    async fn task_fires_after_its_delay() {
        let scheduler = TokioScheduler::new();
        let fired = Arc::new(AtomicBool::new(false));

        let flag = Arc::clone(&fired);
        scheduler.schedule(
            Duration::from_secs(60),
            Box::new(move || flag.store(true, Ordering::SeqCst)),
        );

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert!(!fired.load(Ordering::SeqCst));

        tokio::time::sleep(Duration::from_secs(31)).await;
        assert!(fired.load(Ordering::SeqCst));
    }

    #[test]
    fn handles_are_distinct() {
        let scheduler = TokioScheduler::new();
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let _guard = runtime.enter();
        let a = scheduler.schedule(Duration::from_secs(1), Box::new(|| {}));
        let b = scheduler.schedule(Duration::from_secs(1), Box::new(|| {}));
        assert_ne!(a, b);
    }
}
