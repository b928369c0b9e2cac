//! The three order flows: normal, false-positive and suspicious.
//!
//! Each flow emits a self-consistent causal chain per tick. Follow-up
//! emissions carry timestamps derived from the trigger plus their delay, so
//! one flow tick is replayable into history as-is.

use chrono::{DateTime, Utc};
use datagen_core::config::OrdersConfig;
use datagen_core::envelope::Emission;
use datagen_core::events::{Customer, EventKind, EventPayload, Order};
use datagen_core::variates::{happens, int_between, price_between, round2};
use rand::Rng;
use rand::rngs::SmallRng;
use smallvec::{SmallVec, smallvec};
use std::time::Duration;

use crate::orders::OrderFactory;
use crate::series::{EventGenerator, offset_by};

/// Ordinary orders; a configured share is cancelled after a delay.
pub struct NormalOrderFlow {
    cfg: OrdersConfig,
    rng: SmallRng,
    factory: OrderFactory,
}

impl NormalOrderFlow {
    /// Creates the flow around a shared order factory.
    #[must_use]
    pub const fn new(cfg: OrdersConfig, rng: SmallRng, factory: OrderFactory) -> Self {
        Self { cfg, rng, factory }
    }
}

impl EventGenerator for NormalOrderFlow {
    fn interval(&self) -> Duration {
        Duration::from_millis(self.cfg.interval_ms)
    }

    fn policy_kind(&self) -> EventKind {
        EventKind::Order
    }

    fn produce(&mut self, at: DateTime<Utc>) -> SmallVec<[Emission; 4]> {
        let order = self.factory.order(&mut self.rng, at);
        let mut out = smallvec![Emission::now(EventPayload::Order(order.clone()))];

        if happens(&mut self.rng, self.cfg.cancellation_ratio) {
            let delay = cancel_delay(&mut self.rng, &self.cfg);
            let cancellation =
                self.factory
                    .cancellation(&mut self.rng, offset_by(at, delay), order);
            out.push(Emission::after(
                delay,
                EventPayload::Cancellation(cancellation),
            ));
        }
        out
    }
}

/// A pattern that superficially resembles manipulation but is benign: one
/// large order, a small same-product order from the same customer at a
/// reduced price while it is still open, then the large order's
/// cancellation.
pub struct FalsePositiveFlow {
    cfg: OrdersConfig,
    rng: SmallRng,
    factory: OrderFactory,
}

impl FalsePositiveFlow {
    /// Creates the flow around a shared order factory.
    #[must_use]
    pub const fn new(cfg: OrdersConfig, rng: SmallRng, factory: OrderFactory) -> Self {
        Self { cfg, rng, factory }
    }
}

impl EventGenerator for FalsePositiveFlow {
    fn interval(&self) -> Duration {
        Duration::from_millis(self.cfg.false_positive_interval_ms)
    }

    fn policy_kind(&self) -> EventKind {
        EventKind::Order
    }

    fn produce(&mut self, at: DateTime<Utc>) -> SmallVec<[Emission; 4]> {
        let customer = crate::customers::customer(&mut self.rng);
        let large = self
            .factory
            .large_order(&mut self.rng, at, customer.clone());

        let cancel_after = cancel_delay(&mut self.rng, &self.cfg);
        // The small order lands strictly inside the open window.
        let small_after = Duration::from_millis(int_between(
            &mut self.rng,
            0,
            cancel_after.as_millis().saturating_sub(1) as i64,
        ) as u64);

        let mut small =
            self.factory
                .small_order(&mut self.rng, offset_by(at, small_after), customer);
        small.product = large.product.clone();
        let reduction = price_between(&mut self.rng, 0.01, self.cfg.max_price_variation);
        small.unit_price = round2((large.unit_price - reduction).max(0.01));

        let cancellation =
            self.factory
                .cancellation(&mut self.rng, offset_by(at, cancel_after), large.clone());

        smallvec![
            Emission::now(EventPayload::Order(large)),
            Emission::after(small_after, EventPayload::Order(small)),
            Emission::after(cancel_after, EventPayload::Cancellation(cancellation)),
        ]
    }
}

/// The manipulation-shaped pattern: a known-suspicious customer places and
/// cancels up to `max_cancelled_orders` large orders back to back, then
/// buys a single unit of the same product at a reduced price.
pub struct SuspiciousOrderFlow {
    cfg: OrdersConfig,
    rng: SmallRng,
    factory: OrderFactory,
}

impl SuspiciousOrderFlow {
    /// Creates the flow around a shared order factory.
    #[must_use]
    pub const fn new(cfg: OrdersConfig, rng: SmallRng, factory: OrderFactory) -> Self {
        Self { cfg, rng, factory }
    }

    fn roster_customer(&mut self) -> Customer {
        let idx = int_between(
            &mut self.rng,
            0,
            self.cfg.suspicious_customers.len() as i64 - 1,
        ) as usize;
        Customer {
            id: format!("suspect-{idx:02}"),
            name: self.cfg.suspicious_customers[idx].clone(),
        }
    }
}

impl EventGenerator for SuspiciousOrderFlow {
    fn interval(&self) -> Duration {
        Duration::from_millis(self.cfg.suspicious_interval_ms)
    }

    fn policy_kind(&self) -> EventKind {
        EventKind::Order
    }

    fn produce(&mut self, at: DateTime<Utc>) -> SmallVec<[Emission; 4]> {
        let customer = self.roster_customer();
        let pairs = int_between(&mut self.rng, 1, i64::from(self.cfg.max_cancelled_orders)) as u32;

        let mut out = SmallVec::new();
        let mut offset = Duration::ZERO;
        let mut reference: Option<Order> = None;

        for _ in 0..pairs {
            let mut order =
                self.factory
                    .large_order(&mut self.rng, offset_by(at, offset), customer.clone());
            // Every order in the chain targets the same product at the same
            // list price.
            match &reference {
                Some(first) => {
                    order.product = first.product.clone();
                    order.unit_price = first.unit_price;
                },
                None => reference = Some(order.clone()),
            }
            out.push(Emission::after(offset, EventPayload::Order(order.clone())));

            offset += cancel_delay(&mut self.rng, &self.cfg);
            let cancellation =
                self.factory
                    .cancellation(&mut self.rng, offset_by(at, offset), order);
            out.push(Emission::after(
                offset,
                EventPayload::Cancellation(cancellation),
            ));
        }

        let mut small =
            self.factory
                .small_order(&mut self.rng, offset_by(at, offset), customer);
        if let Some(first) = &reference {
            small.product = first.product.clone();
            let reduction = price_between(&mut self.rng, 0.01, self.cfg.max_price_variation);
            small.unit_price = round2((first.unit_price - reduction).max(0.01));
        }
        out.push(Emission::after(offset, EventPayload::Order(small)));
        out
    }
}

fn cancel_delay(rng: &mut impl Rng, cfg: &OrdersConfig) -> Duration {
    Duration::from_millis(int_between(
        rng,
        cfg.min_cancel_delay_ms as i64,
        cfg.max_cancel_delay_ms as i64,
    ) as u64)
}
