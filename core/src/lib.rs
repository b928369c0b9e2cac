//! # Datagen Core
//!
//! Core types and traits for the retail datagen: the event envelope and
//! domain event model, random-variate utilities, environment traits for
//! injected dependencies, and the configuration surface.
//!
//! ## Core Concepts
//!
//! - **`EventPayload`**: tagged sum type with one variant per business event
//!   kind (orders, cancellations, sessions, returns, telemetry, ...)
//! - **`EventRecord`**: the envelope — destination topic hint, unique key,
//!   authoritative timestamp, structured payload
//! - **`Emission`**: an effect-style *description* of delivery — either
//!   immediate or delayed by a fixed offset from its trigger
//! - **Environment traits**: `Clock`, `Scheduler`, `EventSink` and
//!   `RunHistory` abstract the hosting collaborator so generators stay
//!   synchronous and deterministic under test
//!
//! ## Architecture Principles
//!
//! - Generators are pure CPU-bound state machines; all I/O lives behind the
//!   environment traits
//! - Delayed follow-ups carry timestamps derived *additively* from their
//!   trigger event, so a global stable sort by timestamp yields a causally
//!   consistent sequence
//! - Configuration is validated upstream; this crate trusts the values it is
//!   handed

// Re-export commonly used types
pub use chrono::{DateTime, Utc};

pub mod clock;
pub mod config;
pub mod envelope;
pub mod error;
pub mod events;
pub mod scheduler;
pub mod sink;
pub mod variates;

pub use clock::{Clock, SystemClock};
pub use config::DatagenConfig;
pub use envelope::{Emission, EventRecord, Topic};
pub use error::DatagenError;
pub use events::{EventKind, EventPayload};
pub use scheduler::{ScheduledTask, Scheduler, TaskHandle};
pub use sink::{EventSink, RunHistory};
