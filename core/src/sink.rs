//! Delivery-side traits provided by the hosting collaborator.

use crate::envelope::EventRecord;

/// Accepts produced events for delivery.
///
/// Delivery is fire-and-forget: the core never sees the outcome. Duplicates
/// are deliberately injected upstream of this trait, so implementations must
/// not deduplicate.
pub trait EventSink: Send + Sync {
    /// Enqueue one produced event.
    fn enqueue(&self, record: EventRecord);
}

/// External persisted-offset check deciding whether the one-time history
/// backfill should run.
///
/// The host answers from whatever offset store it keeps; the core only asks
/// the boolean question.
pub trait RunHistory: Send + Sync {
    /// Returns true when any prior run left persisted evidence behind.
    fn has_prior_run_evidence(&self) -> bool;
}
