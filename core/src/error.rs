//! Error types shared across the datagen crates.

use thiserror::Error;

/// Errors surfaced by datagen construction and orchestration.
///
/// A missing or malformed review corpus is fatal: the returns/reviews
/// generators cannot start without their reference dataset. Everything else
/// the generators hit at runtime is either recovered locally (and logged) or
/// a programmer error.
#[derive(Debug, Error)]
pub enum DatagenError {
    /// The review reference dataset could not be read.
    #[error("review corpus unavailable: {0}")]
    CorpusRead(#[from] std::io::Error),

    /// The review reference dataset could not be parsed.
    #[error("review corpus malformed: {0}")]
    CorpusFormat(#[from] serde_json::Error),

    /// The review reference dataset parsed but is unusable.
    #[error("review corpus invalid: {0}")]
    CorpusInvalid(&'static str),

    /// Session-id generation kept colliding with live sessions.
    #[error("session registry exhausted after {attempts} id attempts")]
    SessionRegistryFull {
        /// How many insert-or-regenerate attempts were made
        attempts: u32,
    },
}
