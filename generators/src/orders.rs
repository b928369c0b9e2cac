//! Order and cancellation builders shared by every order-producing chain.
//!
//! A single [`OrderFactory`] owns the id sequences so that every order id in
//! a run is unique regardless of which chain produced it. Chains get their
//! own factory with a distinguishing id prefix.

use chrono::{DateTime, Utc};
use datagen_core::config::OrdersConfig;
use datagen_core::events::{Cancellation, Customer, Order};
use datagen_core::variates::{int_between, pick, price_between};
use rand::Rng;
use std::sync::Arc;

use crate::catalog::ProductCatalog;
use crate::customers;

/// Builder for orders and their cancellations.
pub struct OrderFactory {
    cfg: OrdersConfig,
    catalog: Arc<ProductCatalog>,
    id_prefix: String,
    order_seq: u64,
    cancel_seq: u64,
}

impl OrderFactory {
    /// Creates a factory; `id_prefix` distinguishes the producing chain in
    /// order and cancellation ids.
    #[must_use]
    pub fn new(cfg: OrdersConfig, catalog: Arc<ProductCatalog>, id_prefix: &str) -> Self {
        Self {
            cfg,
            catalog,
            id_prefix: id_prefix.to_string(),
            order_seq: 0,
            cancel_seq: 0,
        }
    }

    /// An order for a freshly synthesized customer, with quantity and unit
    /// price drawn from the configured normal ranges.
    pub fn order(&mut self, rng: &mut impl Rng, at: DateTime<Utc>) -> Order {
        let customer = customers::customer(rng);
        self.order_for_customer(rng, at, customer)
    }

    /// An order for a known customer, with normal quantity and price ranges.
    pub fn order_for_customer(
        &mut self,
        rng: &mut impl Rng,
        at: DateTime<Utc>,
        customer: Customer,
    ) -> Order {
        let quantity = int_between(
            rng,
            i64::from(self.cfg.min_quantity),
            i64::from(self.cfg.max_quantity),
        ) as u32;
        self.build(rng, at, customer, quantity)
    }

    /// An unusually large order, used by the suspicious chain.
    pub fn large_order(
        &mut self,
        rng: &mut impl Rng,
        at: DateTime<Utc>,
        customer: Customer,
    ) -> Order {
        let quantity = int_between(
            rng,
            i64::from(self.cfg.large_min_quantity),
            i64::from(self.cfg.large_max_quantity),
        ) as u32;
        self.build(rng, at, customer, quantity)
    }

    /// A minimal single-unit order, used by the false-positive chain.
    pub fn small_order(
        &mut self,
        rng: &mut impl Rng,
        at: DateTime<Utc>,
        customer: Customer,
    ) -> Order {
        self.build(rng, at, customer, 1)
    }

    /// A cancellation for an existing order with a random stated reason.
    pub fn cancellation(
        &mut self,
        rng: &mut impl Rng,
        at: DateTime<Utc>,
        order: Order,
    ) -> Cancellation {
        self.cancel_seq += 1;
        Cancellation {
            id: format!("{}-cxl-{:08}", self.id_prefix, self.cancel_seq),
            order,
            reason: pick(rng, &self.cfg.cancellation_reasons).clone(),
            timestamp: at,
        }
    }

    fn build(
        &mut self,
        rng: &mut impl Rng,
        at: DateTime<Utc>,
        customer: Customer,
        quantity: u32,
    ) -> Order {
        self.order_seq += 1;
        Order {
            id: format!("{}-ord-{:08}", self.id_prefix, self.order_seq),
            customer,
            product: self.catalog.random(rng),
            unit_price: price_between(rng, self.cfg.min_price, self.cfg.max_price),
            quantity,
            region: pick(rng, &self.cfg.regions).clone(),
            timestamp: at,
        }
    }
}
