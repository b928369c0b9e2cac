//! Warehouse stock movements and out-of-stock notices.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use datagen_core::config::StockConfig;
use datagen_core::envelope::Emission;
use datagen_core::events::{EventKind, EventPayload, OutOfStock, Product, StockMovement};
use datagen_core::variates::{int_between, pick};
use rand::Rng;
use rand::rngs::SmallRng;
use smallvec::{SmallVec, smallvec};
use std::sync::Arc;
use std::time::Duration;

use crate::catalog::ProductCatalog;
use crate::series::EventGenerator;

/// Builds an out-of-stock notice with a restock estimate a few days out.
pub fn out_of_stock(
    rng: &mut impl Rng,
    at: DateTime<Utc>,
    product: Product,
    restock_min_days: u32,
    restock_max_days: u32,
) -> OutOfStock {
    let days = int_between(rng, i64::from(restock_min_days), i64::from(restock_max_days));
    OutOfStock {
        id: format!("oos-{:08x}", rng.next_u32()),
        product,
        estimated_restock: at + ChronoDuration::days(days),
        timestamp: at,
    }
}

/// Periodic signed stock adjustments across the warehouse fleet.
pub struct StockMovementGenerator {
    cfg: StockConfig,
    rng: SmallRng,
    catalog: Arc<ProductCatalog>,
    seq: u64,
}

impl StockMovementGenerator {
    /// Creates the generator over the shared catalog.
    #[must_use]
    pub const fn new(cfg: StockConfig, rng: SmallRng, catalog: Arc<ProductCatalog>) -> Self {
        Self {
            cfg,
            rng,
            catalog,
            seq: 0,
        }
    }
}

impl EventGenerator for StockMovementGenerator {
    fn interval(&self) -> Duration {
        Duration::from_millis(self.cfg.interval_ms)
    }

    fn policy_kind(&self) -> EventKind {
        EventKind::StockMovement
    }

    fn produce(&mut self, at: DateTime<Utc>) -> SmallVec<[Emission; 4]> {
        self.seq += 1;
        let movement = StockMovement {
            id: format!("stk-{:08}", self.seq),
            warehouse: pick(&mut self.rng, &self.cfg.warehouses).clone(),
            product: self.catalog.random(&mut self.rng),
            quantity_change: int_between(
                &mut self.rng,
                i64::from(self.cfg.min_change),
                i64::from(self.cfg.max_change),
            ) as i32,
            timestamp: at,
        };
        smallvec![Emission::now(EventPayload::StockMovement(movement))]
    }
}

/// Standalone out-of-stock notices, independent of any session.
pub struct OutOfStockGenerator {
    cfg: StockConfig,
    rng: SmallRng,
    catalog: Arc<ProductCatalog>,
}

impl OutOfStockGenerator {
    /// Creates the generator over the shared catalog.
    #[must_use]
    pub const fn new(cfg: StockConfig, rng: SmallRng, catalog: Arc<ProductCatalog>) -> Self {
        Self { cfg, rng, catalog }
    }
}

impl EventGenerator for OutOfStockGenerator {
    fn interval(&self) -> Duration {
        Duration::from_millis(self.cfg.out_of_stock_interval_ms)
    }

    fn policy_kind(&self) -> EventKind {
        EventKind::OutOfStock
    }

    fn produce(&mut self, at: DateTime<Utc>) -> SmallVec<[Emission; 4]> {
        let product = self.catalog.random(&mut self.rng);
        let notice = out_of_stock(
            &mut self.rng,
            at,
            product,
            self.cfg.restock_min_days,
            self.cfg.restock_max_days,
        );
        smallvec![Emission::now(EventPayload::OutOfStock(notice))]
    }
}
