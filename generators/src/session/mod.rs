//! The online-session engine.
//!
//! A session is a small state machine: it starts on a page view, walks the
//! weighted transition tables in [`transitions`], and ends by completing a
//! checkout, abandoning, or reaching a dead end. The engine owns the
//! registry of active session ids and the logged-in customer binding; cart
//! contents live in the per-session [`SessionState`].

use chrono::{DateTime, Utc};
use datagen_core::config::SessionsConfig;
use datagen_core::envelope::Emission;
use datagen_core::error::DatagenError;
use datagen_core::events::{
    AbandonedOrder, ClickEvent, EventPayload, OnlineOrder, OrderLine, Product, SessionEventKind,
};
use datagen_core::variates::{happens, int_between, pick, price_between};
use rand::rngs::SmallRng;
use rand::{Rng, RngCore};
use smallvec::{SmallVec, smallvec};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use crate::catalog::ProductCatalog;
use crate::customers::{self, SharedRecentCustomers};
use crate::series::offset_by;
use crate::stock::out_of_stock;

pub mod state;
pub mod transitions;
pub mod urls;

pub use state::SessionState;

/// Drives online sessions from start to termination.
pub struct SessionEngine {
    cfg: SessionsConfig,
    rng: SmallRng,
    catalog: Arc<ProductCatalog>,
    recent: SharedRecentCustomers,
    active: HashSet<String>,
    order_seq: u64,
}

impl SessionEngine {
    /// Creates an engine with an empty session registry.
    #[must_use]
    pub fn new(
        cfg: SessionsConfig,
        rng: SmallRng,
        catalog: Arc<ProductCatalog>,
        recent: SharedRecentCustomers,
    ) -> Self {
        Self {
            cfg,
            rng,
            catalog,
            recent,
            active: HashSet::new(),
            order_seq: 0,
        }
    }

    /// Starts a new session and emits its entry click.
    ///
    /// Half of the sessions are marketing-attributed: they carry a UTM
    /// query on every URL and a referrer on the entry click.
    pub fn start(
        &mut self,
        at: DateTime<Utc>,
    ) -> Result<(SessionState, SmallVec<[Emission; 4]>), DatagenError> {
        let id = self.register_id()?;

        let (utm_query, referrer) = if happens(&mut self.rng, 0.5) {
            let query = urls::utm_query(&mut self.rng);
            // An unparseable attribution query drops the referrer but keeps
            // the UTM tagging on the session's URLs.
            let referrer = match urls::source_of(&query) {
                "" => {
                    tracing::warn!(%query, "attribution query has no source, dropping referrer");
                    None
                },
                source => Some(urls::referrer_for(source)),
            };
            (Some(query), referrer)
        } else {
            (None, None)
        };

        let session = SessionState {
            id: id.clone(),
            customer: None,
            cart: Vec::new(),
            last_event: Some(SessionEventKind::PageView),
            events_emitted: 1,
            utm_query,
            referrer,
            ended: false,
        };

        let entry = ClickEvent {
            session_id: id,
            event_type: SessionEventKind::PageView,
            url: urls::page_url(SessionEventKind::PageView, None, session.utm_query.as_deref()),
            referrer: session.referrer.clone(),
            product: None,
            cart_size: 0,
            timestamp: at,
        };
        Ok((session, smallvec![Emission::now(EventPayload::Click(entry))]))
    }

    /// Advances a session by one browsing step.
    ///
    /// Emits the click for the drawn event, plus the online order (and a
    /// possible delayed out-of-stock) on checkout completion, or the
    /// abandoned-cart event when a logged-in session walks away. Anonymous
    /// abandonments end the session silently.
    pub fn step(&mut self, session: &mut SessionState, at: DateTime<Utc>) -> SmallVec<[Emission; 4]> {
        if session.ended {
            tracing::error!(session_id = %session.id, "step called on an ended session");
            return SmallVec::new();
        }

        if !session.cart.is_empty() && happens(&mut self.rng, self.cfg.abandonment_rate) {
            return self.finish_abandoned(session, at);
        }

        let Some(kind) = transitions::next_event(&mut self.rng, session, self.cfg.max_cart_products)
        else {
            self.end(session);
            return SmallVec::new();
        };

        let mut cart_product: Option<Product> = None;
        let mut url_product: Option<Product> = None;
        match kind {
            SessionEventKind::AddToCart => {
                let product = self.catalog.random(&mut self.rng);
                session.cart.push(product.clone());
                url_product = Some(product.clone());
                cart_product = Some(product);
            },
            SessionEventKind::RemoveFromCart => {
                let idx = self.rng.gen_range(0..session.cart.len());
                let product = session.cart.remove(idx);
                url_product = Some(product.clone());
                cart_product = Some(product);
            },
            SessionEventKind::ProductView => {
                url_product = Some(self.catalog.random(&mut self.rng));
            },
            SessionEventKind::Login => {
                let picked = {
                    let recent = crate::lock_or_recover(&self.recent);
                    recent.pick(&mut self.rng)
                };
                session.customer =
                    Some(picked.unwrap_or_else(|| customers::online_customer(&mut self.rng)));
            },
            _ => {},
        }

        let click = ClickEvent {
            session_id: session.id.clone(),
            event_type: kind,
            url: urls::page_url(kind, url_product.as_ref(), session.utm_query.as_deref()),
            referrer: None,
            product: cart_product,
            cart_size: session.cart.len() as u32,
            timestamp: at,
        };
        session.last_event = Some(kind);
        session.events_emitted += 1;

        let mut out = smallvec![Emission::now(EventPayload::Click(click))];

        if kind == SessionEventKind::CheckoutComplete {
            out.extend(self.checkout(session, at));
            self.end(session);
            return out;
        }

        // Overlong sessions count as abandonment.
        if session.events_emitted >= self.cfg.max_session_events {
            out.extend(self.finish_abandoned(session, at));
        }
        out
    }

    /// Random inter-click delay for live pacing.
    pub fn click_delay(&mut self) -> Duration {
        Duration::from_millis(int_between(
            &mut self.rng,
            self.cfg.click_min_delay_ms as i64,
            self.cfg.click_max_delay_ms as i64,
        ) as u64)
    }

    /// Gap between one session ending and the next starting.
    #[must_use]
    pub const fn session_gap(&self) -> Duration {
        Duration::from_millis(self.cfg.inter_session_gap_ms)
    }

    /// Synthetic clock advance per event during history replay.
    #[must_use]
    pub const fn per_event_interval(&self) -> Duration {
        Duration::from_millis(self.cfg.per_event_interval_ms)
    }

    /// Number of currently active sessions.
    #[must_use]
    pub fn active_sessions(&self) -> usize {
        self.active.len()
    }

    fn register_id(&mut self) -> Result<String, DatagenError> {
        for _ in 0..self.cfg.registry_max_attempts {
            let candidate = format!("sess-{:08x}", self.rng.next_u32());
            if !self.active.contains(&candidate) {
                self.active.insert(candidate.clone());
                return Ok(candidate);
            }
        }
        Err(DatagenError::SessionRegistryFull {
            attempts: self.cfg.registry_max_attempts,
        })
    }

    fn end(&mut self, session: &mut SessionState) {
        self.active.remove(&session.id);
        session.ended = true;
    }

    fn finish_abandoned(
        &mut self,
        session: &mut SessionState,
        at: DateTime<Utc>,
    ) -> SmallVec<[Emission; 4]> {
        self.end(session);
        match &session.customer {
            Some(customer) if !session.cart.is_empty() => {
                smallvec![Emission::now(EventPayload::AbandonedOrder(AbandonedOrder {
                    session_id: session.id.clone(),
                    customer: customer.clone(),
                    cart: session.cart.clone(),
                    timestamp: at,
                }))]
            },
            _ => SmallVec::new(),
        }
    }

    fn checkout(&mut self, session: &SessionState, at: DateTime<Utc>) -> SmallVec<[Emission; 4]> {
        let Some(customer) = session.customer.clone() else {
            tracing::error!(session_id = %session.id, "checkout completed without a login");
            return SmallVec::new();
        };

        let mut lines: Vec<OrderLine> = Vec::new();
        for product in &session.cart {
            match lines
                .iter_mut()
                .find(|line| line.product.long_description() == product.long_description())
            {
                Some(line) => line.quantity += 1,
                None => lines.push(OrderLine {
                    product: product.clone(),
                    quantity: 1,
                    unit_price: price_between(&mut self.rng, self.cfg.min_price, self.cfg.max_price),
                }),
            }
        }

        let mut shipping = customers::address(&mut self.rng, "shipping");
        if !self.cfg.cities.is_empty() {
            shipping.city = pick(&mut self.rng, &self.cfg.cities).clone();
        }
        let billing = if happens(&mut self.rng, self.cfg.reuse_address_ratio) {
            let mut billing = shipping.clone();
            billing.label = "billing".to_string();
            billing
        } else {
            customers::address(&mut self.rng, "billing")
        };

        self.order_seq += 1;
        let order = OnlineOrder {
            id: format!("web-ord-{:08}", self.order_seq),
            customer,
            lines: lines.clone(),
            shipping_address: shipping,
            billing_address: billing,
            timestamp: at,
        };
        let mut out = smallvec![Emission::now(EventPayload::OnlineOrder(order))];

        if !lines.is_empty() && happens(&mut self.rng, self.cfg.out_of_stock_ratio) {
            let delay = Duration::from_millis(int_between(
                &mut self.rng,
                self.cfg.out_of_stock_min_delay_ms as i64,
                self.cfg.out_of_stock_max_delay_ms as i64,
            ) as u64);
            let product = pick(&mut self.rng, &lines).product.clone();
            let notice = out_of_stock(
                &mut self.rng,
                offset_by(at, delay),
                product,
                self.cfg.restock_min_days,
                self.cfg.restock_max_days,
            );
            out.push(Emission::after(delay, EventPayload::OutOfStock(notice)));
        }
        out
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic
mod tests {
    use super::*;
    use crate::customers::RecentCustomers;
    use datagen_core::variates::seeded_rng;
    use std::sync::Mutex;

    fn engine(cfg: SessionsConfig, seed: u64) -> SessionEngine {
        let mut rng = seeded_rng(seed);
        let catalog = Arc::new(ProductCatalog::new(&mut rng, 3));
        let recent = Arc::new(Mutex::new(RecentCustomers::new(8)));
        SessionEngine::new(cfg, seeded_rng(seed + 1), catalog, recent)
    }

    fn run_to_end(
        engine: &mut SessionEngine,
        at: DateTime<Utc>,
    ) -> Vec<datagen_core::envelope::EventRecord> {
        let (mut session, entry) = engine.start(at).unwrap();
        let mut records: Vec<_> = entry.into_iter().map(Emission::into_record).collect();
        let mut cursor = at;
        while !session.ended {
            cursor = offset_by(cursor, engine.per_event_interval());
            records.extend(engine.step(&mut session, cursor).into_iter().map(Emission::into_record));
        }
        records
    }

    #[test]
    fn session_opens_with_an_attributable_page_view() {
        let mut engine = engine(SessionsConfig::default(), 179);
        let (session, emissions) = engine.start(Utc::now()).unwrap();
        assert_eq!(engine.active_sessions(), 1);

        let EventPayload::Click(entry) = &emissions[0].record().payload else {
            panic!("entry emission must be a click");
        };
        assert_eq!(entry.event_type, SessionEventKind::PageView);
        assert_eq!(entry.cart_size, 0);
        assert_eq!(entry.session_id, session.id);
        // Attribution is all-or-nothing.
        assert_eq!(session.utm_query.is_some(), session.referrer.is_some());
        if let Some(query) = &session.utm_query {
            assert!(entry.url.contains(query.as_str()));
        }
    }

    #[test]
    fn exhausted_registry_is_reported() {
        let cfg = SessionsConfig {
            registry_max_attempts: 0,
            ..SessionsConfig::default()
        };
        let mut engine = engine(cfg, 181);
        let err = engine.start(Utc::now()).unwrap_err();
        assert!(matches!(
            err,
            DatagenError::SessionRegistryFull { attempts: 0 }
        ));
    }

    #[test]
    fn carts_stay_legal_across_many_sessions() {
        let cfg = SessionsConfig::default();
        let mut engine = engine(cfg.clone(), 191);
        for _ in 0..100 {
            let records = run_to_end(&mut engine, Utc::now());
            let mut cart = 0_i64;
            for record in &records {
                if let EventPayload::Click(click) = &record.payload {
                    match click.event_type {
                        SessionEventKind::AddToCart => {
                            assert!(click.product.is_some());
                            cart += 1;
                        },
                        SessionEventKind::RemoveFromCart => {
                            assert!(click.product.is_some());
                            cart -= 1;
                        },
                        _ => {},
                    }
                    assert!(cart >= 0, "cart went negative");
                    assert!(cart <= cfg.max_cart_products as i64);
                    assert_eq!(i64::from(click.cart_size), cart);
                }
            }
        }
        assert_eq!(engine.active_sessions(), 0);
    }

    #[test]
    fn completed_checkouts_carry_the_cart_and_a_customer() {
        let mut engine = engine(SessionsConfig::default(), 193);
        let mut saw_order = false;
        for _ in 0..300 {
            let records = run_to_end(&mut engine, Utc::now());
            let mut checkout_cart_size = None;
            for record in &records {
                match &record.payload {
                    EventPayload::Click(click)
                        if click.event_type == SessionEventKind::CheckoutComplete =>
                    {
                        checkout_cart_size = Some(click.cart_size);
                    },
                    EventPayload::OnlineOrder(order) => {
                        saw_order = true;
                        assert!(!order.lines.is_empty());
                        let units: u32 = order.lines.iter().map(|l| l.quantity).sum();
                        assert_eq!(Some(units), checkout_cart_size);
                        assert!(!order.customer.id.is_empty());
                        assert_eq!(order.shipping_address.label, "shipping");
                        assert_eq!(order.billing_address.label, "billing");
                    },
                    _ => {},
                }
            }
        }
        assert!(saw_order, "no session completed a checkout in 300 runs");
    }

    #[test]
    fn anonymous_abandonment_is_silent() {
        // Abandon on the first possible step by maxing the abandonment rate.
        let cfg = SessionsConfig {
            abandonment_rate: 1.0,
            ..SessionsConfig::default()
        };
        let mut engine = engine(cfg, 197);
        for _ in 0..100 {
            let records = run_to_end(&mut engine, Utc::now());
            for record in &records {
                if let EventPayload::AbandonedOrder(abandoned) = &record.payload {
                    // Only logged-in customers leave a trace.
                    assert!(!abandoned.customer.id.is_empty());
                    assert!(!abandoned.cart.is_empty());
                }
            }
        }
    }

    #[test]
    fn step_on_ended_session_is_a_no_op() {
        let mut engine = engine(SessionsConfig::default(), 199);
        let (mut session, _) = engine.start(Utc::now()).unwrap();
        session.ended = true;
        assert!(engine.step(&mut session, Utc::now()).is_empty());
    }
}
