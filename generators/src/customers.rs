//! Customer synthesis, the recent-registrations buffer, and the
//! new-customer generator with its first-order correlation.

use chrono::{DateTime, Utc};
use datagen_core::config::CustomersConfig;
use datagen_core::envelope::Emission;
use datagen_core::events::{Address, Customer, EventKind, EventPayload, NewCustomer, OnlineCustomer};
use datagen_core::variates::{happens, int_between, pick};
use rand::Rng;
use rand::rngs::SmallRng;
use smallvec::{SmallVec, smallvec};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::lock_or_recover;
use crate::orders::OrderFactory;
use crate::series::{EventGenerator, offset_by};

const FIRST_NAMES: &[&str] = &[
    "Ada", "Bruno", "Chiara", "Declan", "Elif", "Farid", "Greta", "Hugo", "Ines", "Jonas", "Keiko",
    "Liam", "Mireille", "Noah", "Olga", "Pavel",
];

const LAST_NAMES: &[&str] = &[
    "Almeida", "Bergström", "Conti", "Dubois", "Eriksen", "Fischer", "Garcia", "Hansen", "Ivanova",
    "Jansen", "Kimura", "Lindqvist", "Moreau", "Novak", "Okafor", "Petrov",
];

const STREETS: &[&str] = &[
    "Market Street",
    "Elm Avenue",
    "Harbor Road",
    "Station Lane",
    "Mill Court",
    "Orchard Way",
];

const CITIES: &[&str] = &[
    "Lisbon", "Gothenburg", "Turin", "Lyon", "Aarhus", "Leipzig", "Valencia", "Bergen",
];

const COUNTRIES: &[&str] = &["Portugal", "Sweden", "Italy", "France", "Denmark", "Germany"];

/// Synthesizes an in-store customer with a generated id.
pub fn customer(rng: &mut impl Rng) -> Customer {
    Customer {
        id: format!("cust-{:08x}", rng.next_u32()),
        name: full_name(rng),
    }
}

/// Synthesizes an online customer with one or two e-mail addresses.
pub fn online_customer(rng: &mut impl Rng) -> OnlineCustomer {
    let name = full_name(rng);
    let handle = name.to_lowercase().replace(' ', ".");
    let mut emails = vec![format!("{handle}@example.com")];
    if happens(rng, 0.3) {
        emails.push(format!("{handle}{}@mailbox.example", int_between(rng, 1, 99)));
    }
    OnlineCustomer {
        id: format!("cust-{:08x}", rng.next_u32()),
        name,
        emails,
    }
}

/// Synthesizes a labeled postal address.
pub fn address(rng: &mut impl Rng, label: &str) -> Address {
    Address {
        label: label.to_string(),
        street: format!("{} {}", int_between(rng, 1, 240), pick(rng, STREETS)),
        city: (*pick(rng, CITIES)).to_string(),
        postal_code: format!("{:05}", int_between(rng, 1_000, 99_999)),
        country: (*pick(rng, COUNTRIES)).to_string(),
    }
}

fn full_name(rng: &mut impl Rng) -> String {
    format!("{} {}", pick(rng, FIRST_NAMES), pick(rng, LAST_NAMES))
}

/// Bounded ring buffer of recently registered online customers.
///
/// Session logins prefer a just-registered customer from this buffer over
/// synthesizing a fresh one. The buffer is an explicit, injected store
/// shared between the registration generator and the session engine — never
/// a process-wide static.
#[derive(Debug)]
pub struct RecentCustomers {
    buffer: VecDeque<OnlineCustomer>,
    capacity: usize,
}

impl RecentCustomers {
    /// Creates an empty buffer bounded at `capacity`.
    #[must_use]
    pub const fn new(capacity: usize) -> Self {
        Self {
            buffer: VecDeque::new(),
            capacity,
        }
    }

    /// Records a registration, evicting the oldest entry when full.
    pub fn push(&mut self, registered: OnlineCustomer) {
        if self.capacity == 0 {
            return;
        }
        if self.buffer.len() == self.capacity {
            self.buffer.pop_front();
        }
        self.buffer.push_back(registered);
    }

    /// Picks a random buffered registration, if any.
    pub fn pick(&self, rng: &mut impl Rng) -> Option<OnlineCustomer> {
        if self.buffer.is_empty() {
            None
        } else {
            self.buffer
                .get(rng.gen_range(0..self.buffer.len()))
                .cloned()
        }
    }

    /// Number of buffered registrations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Whether the buffer is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

/// Handle to the shared recent-registrations buffer.
pub type SharedRecentCustomers = Arc<Mutex<RecentCustomers>>;

/// Periodic online-shop registrations, correlated with a delayed first
/// order for a share of new customers.
pub struct NewCustomerGenerator {
    cfg: CustomersConfig,
    rng: SmallRng,
    factory: OrderFactory,
    recent: SharedRecentCustomers,
}

impl NewCustomerGenerator {
    /// Creates the generator; registrations are pushed into `recent`.
    #[must_use]
    pub const fn new(
        cfg: CustomersConfig,
        rng: SmallRng,
        factory: OrderFactory,
        recent: SharedRecentCustomers,
    ) -> Self {
        Self {
            cfg,
            rng,
            factory,
            recent,
        }
    }
}

impl EventGenerator for NewCustomerGenerator {
    fn interval(&self) -> Duration {
        Duration::from_millis(self.cfg.interval_ms)
    }

    fn policy_kind(&self) -> EventKind {
        EventKind::NewCustomer
    }

    fn produce(&mut self, at: DateTime<Utc>) -> SmallVec<[Emission; 4]> {
        let registered = online_customer(&mut self.rng);
        lock_or_recover(&self.recent).push(registered.clone());

        let mut out = smallvec![Emission::now(EventPayload::NewCustomer(NewCustomer {
            customer: registered.clone(),
            timestamp: at,
        }))];

        if happens(&mut self.rng, self.cfg.first_order_ratio) {
            let delay = Duration::from_millis(int_between(
                &mut self.rng,
                self.cfg.first_order_min_delay_ms as i64,
                self.cfg.first_order_max_delay_ms as i64,
            ) as u64);
            let order = self.factory.order_for_customer(
                &mut self.rng,
                offset_by(at, delay),
                registered.as_customer(),
            );
            out.push(Emission::after(delay, EventPayload::Order(order)));
        }
        out
    }
}
