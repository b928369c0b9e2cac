//! Assembly of the full generator fleet from one configuration and seed.
//!
//! The fleet is what both the history backfill and the live driver run:
//! every periodic generator boxed behind [`EventGenerator`], plus the
//! session engine, all sharing one product catalog, one review corpus and
//! one recent-registrations buffer.

use datagen_core::config::DatagenConfig;
use datagen_core::error::DatagenError;
use datagen_core::variates::seeded_rng;
use rand::RngCore;
use std::sync::{Arc, Mutex};

use crate::catalog::ProductCatalog;
use crate::chains::{FalsePositiveFlow, NormalOrderFlow, SuspiciousOrderFlow};
use crate::customers::{NewCustomerGenerator, RecentCustomers, SharedRecentCustomers};
use crate::orders::OrderFactory;
use crate::returns::{ReturnRequestGenerator, ReviewCorpus, ReviewGenerator};
use crate::series::EventGenerator;
use crate::session::SessionEngine;
use crate::stock::{OutOfStockGenerator, StockMovementGenerator};
use crate::telemetry::{BadgeInGenerator, SensorReadingGenerator};
use crate::transactions::TransactionGenerator;

/// How many catalog combinations carry the synthetic size issue.
const FLAGGED_PRODUCTS: usize = 3;

/// The assembled fleet: periodic generators plus the session engine and
/// the shared stores they hang off.
pub struct Fleet {
    /// Every periodic generator, ready for ticking or replay
    pub generators: Vec<Box<dyn EventGenerator>>,
    /// The session engine (sessions pace themselves, so it is not a
    /// periodic generator)
    pub sessions: SessionEngine,
    /// Shared product catalog
    pub catalog: Arc<ProductCatalog>,
    /// Shared review corpus
    pub corpus: Arc<ReviewCorpus>,
    /// Shared recent-registrations buffer
    pub recent: SharedRecentCustomers,
}

/// Builds the fleet. All randomness descends from `seed`, so the same seed
/// and configuration produce the same fleet behavior.
pub fn build_fleet(cfg: &DatagenConfig, seed: u64) -> Result<Fleet, DatagenError> {
    let mut master = seeded_rng(seed);

    let catalog = Arc::new(ProductCatalog::new(&mut master, FLAGGED_PRODUCTS));
    let corpus = Arc::new(ReviewCorpus::load(cfg.returns.corpus_path.as_deref())?);
    let recent: SharedRecentCustomers = Arc::new(Mutex::new(RecentCustomers::new(
        cfg.customers.recent_capacity,
    )));

    let generators: Vec<Box<dyn EventGenerator>> = vec![
        Box::new(NormalOrderFlow::new(
            cfg.orders.clone(),
            seeded_rng(master.next_u64()),
            OrderFactory::new(cfg.orders.clone(), Arc::clone(&catalog), "ord"),
        )),
        Box::new(FalsePositiveFlow::new(
            cfg.orders.clone(),
            seeded_rng(master.next_u64()),
            OrderFactory::new(cfg.orders.clone(), Arc::clone(&catalog), "fp"),
        )),
        Box::new(SuspiciousOrderFlow::new(
            cfg.orders.clone(),
            seeded_rng(master.next_u64()),
            OrderFactory::new(cfg.orders.clone(), Arc::clone(&catalog), "susp"),
        )),
        Box::new(StockMovementGenerator::new(
            cfg.stock.clone(),
            seeded_rng(master.next_u64()),
            Arc::clone(&catalog),
        )),
        Box::new(OutOfStockGenerator::new(
            cfg.stock.clone(),
            seeded_rng(master.next_u64()),
            Arc::clone(&catalog),
        )),
        Box::new(BadgeInGenerator::new(
            cfg.telemetry.clone(),
            seeded_rng(master.next_u64()),
        )),
        Box::new(SensorReadingGenerator::normal(
            cfg.telemetry.clone(),
            seeded_rng(master.next_u64()),
        )),
        Box::new(SensorReadingGenerator::anomalous(
            cfg.telemetry.clone(),
            seeded_rng(master.next_u64()),
        )),
        Box::new(TransactionGenerator::new(
            cfg.transactions.clone(),
            seeded_rng(master.next_u64()),
        )),
        Box::new(ReturnRequestGenerator::new(
            cfg.returns.clone(),
            seeded_rng(master.next_u64()),
            Arc::clone(&catalog),
            Arc::clone(&corpus),
        )),
        Box::new(ReviewGenerator::new(
            cfg.returns.clone(),
            seeded_rng(master.next_u64()),
            Arc::clone(&catalog),
            Arc::clone(&corpus),
        )),
        Box::new(NewCustomerGenerator::new(
            cfg.customers.clone(),
            seeded_rng(master.next_u64()),
            OrderFactory::new(cfg.orders.clone(), Arc::clone(&catalog), "web-first"),
            Arc::clone(&recent),
        )),
    ];

    let sessions = SessionEngine::new(
        cfg.sessions.clone(),
        seeded_rng(master.next_u64()),
        Arc::clone(&catalog),
        Arc::clone(&recent),
    );

    Ok(Fleet {
        generators,
        sessions,
        catalog,
        corpus,
        recent,
    })
}
