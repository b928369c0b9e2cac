//! Payment transaction sequences over a small fixed id pool.
//!
//! Each id walks STARTED → PROCESSING → PROCESSING → (COMPLETED | restart).
//! The amount is redrawn independently on every event. State lives in the
//! generator instance, so two generators never interfere.

use chrono::{DateTime, Utc};
use datagen_core::config::TransactionsConfig;
use datagen_core::envelope::Emission;
use datagen_core::events::{EventKind, EventPayload, Transaction, TransactionState};
use datagen_core::variates::{happens, int_between, price_between};
use rand::Rng;
use rand::rngs::SmallRng;
use smallvec::{SmallVec, smallvec};
use std::collections::HashMap;
use std::time::Duration;

use crate::series::EventGenerator;

#[derive(Debug, Clone, Copy)]
struct SequenceEntry {
    state: TransactionState,
    processing_seen: u8,
}

/// Per-id sequence table driving the transaction state machine.
#[derive(Debug, Default)]
pub struct TransactionStates {
    entries: HashMap<u32, SequenceEntry>,
}

impl TransactionStates {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances the sequence for `id` by one step and returns the resulting
    /// transaction event.
    pub fn advance(
        &mut self,
        rng: &mut impl Rng,
        cfg: &TransactionsConfig,
        id: u32,
        at: DateTime<Utc>,
    ) -> Transaction {
        let next = match self.entries.get(&id) {
            None => SequenceEntry {
                state: TransactionState::Started,
                processing_seen: 0,
            },
            Some(entry) => match entry.state {
                TransactionState::Started => SequenceEntry {
                    state: TransactionState::Processing,
                    processing_seen: 1,
                },
                TransactionState::Processing if entry.processing_seen < 2 => SequenceEntry {
                    state: TransactionState::Processing,
                    processing_seen: entry.processing_seen + 1,
                },
                TransactionState::Processing => {
                    if happens(rng, cfg.completion_ratio) {
                        SequenceEntry {
                            state: TransactionState::Completed,
                            processing_seen: entry.processing_seen,
                        }
                    } else {
                        // Stalled payment: the sequence restarts.
                        SequenceEntry {
                            state: TransactionState::Started,
                            processing_seen: 0,
                        }
                    }
                },
                // A completed entry is removed below, so this only guards
                // against future table edits.
                TransactionState::Completed => SequenceEntry {
                    state: TransactionState::Started,
                    processing_seen: 0,
                },
            },
        };

        if next.state == TransactionState::Completed {
            self.entries.remove(&id);
        } else {
            self.entries.insert(id, next);
        }

        Transaction {
            id,
            state: next.state,
            // Independent draw per event, not carried across the sequence.
            amount: price_between(rng, cfg.min_amount, cfg.max_amount),
            timestamp: at,
        }
    }
}

/// Periodic transaction events over the configured id pool.
pub struct TransactionGenerator {
    cfg: TransactionsConfig,
    rng: SmallRng,
    states: TransactionStates,
}

impl TransactionGenerator {
    /// Creates the generator with an empty sequence table.
    #[must_use]
    pub fn new(cfg: TransactionsConfig, rng: SmallRng) -> Self {
        Self {
            cfg,
            rng,
            states: TransactionStates::new(),
        }
    }
}

impl EventGenerator for TransactionGenerator {
    fn interval(&self) -> Duration {
        Duration::from_millis(self.cfg.interval_ms)
    }

    fn policy_kind(&self) -> EventKind {
        EventKind::Transaction
    }

    fn produce(&mut self, at: DateTime<Utc>) -> SmallVec<[Emission; 4]> {
        let id = int_between(&mut self.rng, 1, i64::from(self.cfg.pool_size)) as u32;
        let transaction = self.states.advance(&mut self.rng, &self.cfg, id, at);
        smallvec![Emission::now(EventPayload::Transaction(transaction))]
    }
}
