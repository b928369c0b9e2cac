//! # Datagen Runtime
//!
//! Live runtime for the datagen: the tokio-backed scheduler, the delivery
//! sinks, and the driver that ticks the generator fleet.
//!
//! The generator crates stay synchronous and collaborator-agnostic; this
//! crate is where wall-clock pacing, publish jitter, duplicate injection
//! and delayed follow-up scheduling actually happen.
//!
//! ## Example
//!
//! ```ignore
//! use datagen_runtime::{ChannelSink, LiveDriver, MarkerRunHistory, TokioScheduler};
//! use datagen_core::clock::SystemClock;
//! use datagen_core::config::DatagenConfig;
//! use std::sync::Arc;
//!
//! let cfg = DatagenConfig::default();
//! let (sink, mut events) = ChannelSink::pair();
//! let driver = LiveDriver::new(
//!     cfg,
//!     Arc::new(SystemClock),
//!     Arc::new(TokioScheduler::new()),
//!     Arc::new(sink),
//! );
//!
//! let history = MarkerRunHistory::new("/var/lib/datagen/run-marker".into());
//! driver.run_backfill(&history)?;
//! let handles = driver.spawn(42)?;
//! # Ok::<(), datagen_core::error::DatagenError>(())
//! ```

/// Live generation driver
pub mod driver;

/// Tokio-backed scheduler
pub mod scheduler;

/// Delivery sinks and run history
pub mod sink;

pub use driver::LiveDriver;
pub use scheduler::TokioScheduler;
pub use sink::{ChannelSink, LogSink, MarkerRunHistory};
