//! Event envelope and emission descriptions.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::time::Duration;

use crate::events::EventPayload;

/// Destination-topic hint for a produced event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Topic(&'static str);

impl Topic {
    /// Creates a topic from a static name
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    /// Returns the topic name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        self.0
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The envelope every produced event travels in: a destination-topic hint, a
/// unique key, the authoritative timestamp, and the structured payload.
///
/// The timestamp is the field all ordering and invariants key off; for
/// delayed follow-ups it is derived additively from the trigger event.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EventRecord {
    /// Destination-topic hint
    pub topic: Topic,
    /// Unique delivery key
    pub key: String,
    /// Authoritative event timestamp
    pub timestamp: DateTime<Utc>,
    /// Structured payload
    pub payload: EventPayload,
}

impl EventRecord {
    /// Builds the envelope for a payload, deriving topic and key from it.
    #[must_use]
    pub fn new(payload: EventPayload, timestamp: DateTime<Utc>) -> Self {
        Self {
            topic: payload.kind().topic(),
            key: payload.key(),
            timestamp,
            payload,
        }
    }

    /// Builds the envelope stamped with the payload's own timestamp.
    #[must_use]
    pub fn from_payload(payload: EventPayload) -> Self {
        let timestamp = payload.timestamp();
        Self::new(payload, timestamp)
    }
}

/// A delivery description returned by a generator tick.
///
/// Emissions are *not* delivered by the generator itself; they describe what
/// the hosting driver should do — deliver immediately, or schedule a
/// follow-up after a delay. A delayed record already carries its final
/// timestamp (`trigger + delay`), which is what lets the history backfill
/// materialize follow-ups eagerly and rely on a single global sort.
#[derive(Debug, Clone, PartialEq)]
pub enum Emission {
    /// Deliver immediately
    Now(EventRecord),
    /// Deliver after `delay`; the record timestamp is already trigger+delay
    After {
        /// Delay from the trigger event
        delay: Duration,
        /// The fully materialized follow-up record
        record: EventRecord,
    },
}

impl Emission {
    /// Immediate emission of a payload stamped with its own timestamp.
    #[must_use]
    pub fn now(payload: EventPayload) -> Self {
        Self::Now(EventRecord::from_payload(payload))
    }

    /// Delayed emission; the payload must already carry the derived
    /// (trigger + delay) timestamp.
    #[must_use]
    pub fn after(delay: Duration, payload: EventPayload) -> Self {
        Self::After {
            delay,
            record: EventRecord::from_payload(payload),
        }
    }

    /// The wrapped record.
    #[must_use]
    pub const fn record(&self) -> &EventRecord {
        match self {
            Self::Now(record) | Self::After { record, .. } => record,
        }
    }

    /// Unwraps into the record, discarding delivery timing.
    #[must_use]
    pub fn into_record(self) -> EventRecord {
        match self {
            Self::Now(record) | Self::After { record, .. } => record,
        }
    }

    /// The delivery delay, if this is a scheduled follow-up.
    #[must_use]
    pub const fn delay(&self) -> Option<Duration> {
        match self {
            Self::Now(_) => None,
            Self::After { delay, .. } => Some(*delay),
        }
    }
}
