//! Configuration surface consumed by the generators.
//!
//! Values are validated upstream; the core trusts them once passed in.
//! Every sub-config carries the per-kind delivery policy (interval,
//! duplicate ratio, max publish delay) alongside its domain ranges and
//! fixed lists.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::events::EventKind;

/// Top-level configuration for the whole datagen.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct DatagenConfig {
    /// Order flows (normal, false-positive, suspicious)
    pub orders: OrdersConfig,
    /// Online-activity sessions
    pub sessions: SessionsConfig,
    /// Returns and reviews
    pub returns: ReturnsConfig,
    /// Payment transaction sequences
    pub transactions: TransactionsConfig,
    /// Warehouse stock
    pub stock: StockConfig,
    /// Badge and sensor telemetry
    pub telemetry: TelemetryConfig,
    /// Online-shop registrations
    pub customers: CustomersConfig,
    /// One-time history backfill
    pub history: HistoryConfig,
    /// Timestamp render format used by delivery-side formatting
    pub timestamp_format: String,
}

impl Default for DatagenConfig {
    fn default() -> Self {
        Self {
            orders: OrdersConfig::default(),
            sessions: SessionsConfig::default(),
            returns: ReturnsConfig::default(),
            transactions: TransactionsConfig::default(),
            stock: StockConfig::default(),
            telemetry: TelemetryConfig::default(),
            customers: CustomersConfig::default(),
            history: HistoryConfig::default(),
            timestamp_format: "%Y-%m-%dT%H:%M:%S%.3fZ".to_string(),
        }
    }
}

impl DatagenConfig {
    /// Duplicate-injection ratio for a given event kind.
    #[must_use]
    pub const fn duplicates_ratio_for(&self, kind: EventKind) -> f64 {
        match kind {
            EventKind::Order | EventKind::Cancellation => self.orders.duplicates_ratio,
            EventKind::OnlineOrder
            | EventKind::AbandonedOrder
            | EventKind::OutOfStock
            | EventKind::Click => self.sessions.duplicates_ratio,
            EventKind::ReturnRequest | EventKind::ProductReview => self.returns.duplicates_ratio,
            EventKind::Transaction => self.transactions.duplicates_ratio,
            EventKind::StockMovement => self.stock.duplicates_ratio,
            EventKind::BadgeIn | EventKind::SensorReading => self.telemetry.duplicates_ratio,
            EventKind::NewCustomer => self.customers.duplicates_ratio,
        }
    }

    /// Maximum publish-delay jitter, in seconds, for a given event kind.
    #[must_use]
    pub const fn max_publish_delay_for(&self, kind: EventKind) -> u64 {
        match kind {
            EventKind::Order | EventKind::Cancellation => self.orders.max_publish_delay_secs,
            EventKind::OnlineOrder
            | EventKind::AbandonedOrder
            | EventKind::OutOfStock
            | EventKind::Click => self.sessions.max_publish_delay_secs,
            EventKind::ReturnRequest | EventKind::ProductReview => {
                self.returns.max_publish_delay_secs
            },
            EventKind::Transaction => self.transactions.max_publish_delay_secs,
            EventKind::StockMovement => self.stock.max_publish_delay_secs,
            EventKind::BadgeIn | EventKind::SensorReading => self.telemetry.max_publish_delay_secs,
            EventKind::NewCustomer => self.customers.max_publish_delay_secs,
        }
    }
}

/// Order flow configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct OrdersConfig {
    /// Normal order cadence, milliseconds
    pub interval_ms: u64,
    /// False-positive pricing-pattern cadence, milliseconds
    pub false_positive_interval_ms: u64,
    /// Suspicious pricing-pattern cadence, milliseconds
    pub suspicious_interval_ms: u64,
    /// Duplicate-injection ratio
    pub duplicates_ratio: f64,
    /// Max publish-delay jitter, seconds
    pub max_publish_delay_secs: u64,
    /// Unit price range, inclusive
    pub min_price: f64,
    /// See `min_price`
    pub max_price: f64,
    /// Quantity range for ordinary orders
    pub min_quantity: u32,
    /// See `min_quantity`
    pub max_quantity: u32,
    /// Quantity range for the "large" orders in manipulation-shaped chains
    pub large_min_quantity: u32,
    /// See `large_min_quantity`
    pub large_max_quantity: u32,
    /// Probability a normal order gets cancelled
    pub cancellation_ratio: f64,
    /// Cancellation delay range, milliseconds
    pub min_cancel_delay_ms: u64,
    /// See `min_cancel_delay_ms`
    pub max_cancel_delay_ms: u64,
    /// Upper bound on large-order/cancellation pairs in a suspicious chain
    pub max_cancelled_orders: u32,
    /// Max price reduction of the final small order in a suspicious chain
    pub max_price_variation: f64,
    /// The fixed "known-suspicious" customer roster
    pub suspicious_customers: Vec<String>,
    /// Sales regions
    pub regions: Vec<String>,
    /// Cancellation reasons
    pub cancellation_reasons: Vec<String>,
}

impl Default for OrdersConfig {
    fn default() -> Self {
        Self {
            interval_ms: 5_000,
            false_positive_interval_ms: 120_000,
            suspicious_interval_ms: 300_000,
            duplicates_ratio: 0.05,
            max_publish_delay_secs: 10,
            min_price: 5.0,
            max_price: 60.0,
            min_quantity: 1,
            max_quantity: 5,
            large_min_quantity: 20,
            large_max_quantity: 50,
            cancellation_ratio: 0.3,
            min_cancel_delay_ms: 300_000,
            max_cancel_delay_ms: 7_200_000,
            max_cancelled_orders: 3,
            max_price_variation: 5.0,
            suspicious_customers: vec![
                "Carmen Sandiego".to_string(),
                "Arsene Lupin".to_string(),
                "Thomas Crown".to_string(),
            ],
            regions: vec![
                "North".to_string(),
                "South".to_string(),
                "East".to_string(),
                "West".to_string(),
                "Central".to_string(),
            ],
            cancellation_reasons: vec![
                "customer-request".to_string(),
                "payment-failed".to_string(),
                "suspected-fraud".to_string(),
                "address-invalid".to_string(),
            ],
        }
    }
}

/// Online session configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionsConfig {
    /// Live inter-click delay range, milliseconds
    pub click_min_delay_ms: u64,
    /// See `click_min_delay_ms`
    pub click_max_delay_ms: u64,
    /// Synthetic clock advance per session event during history backfill
    pub per_event_interval_ms: u64,
    /// Gap between one session ending and the next starting
    pub inter_session_gap_ms: u64,
    /// Hard cap on events per session; exceeding it counts as abandonment
    pub max_session_events: u32,
    /// Cart capacity; `ADD_TO_CART` is unreachable at this size
    pub max_cart_products: usize,
    /// Per-step abandonment probability while the cart is non-empty
    pub abandonment_rate: f64,
    /// Probability the billing address reuses the shipping address
    pub reuse_address_ratio: f64,
    /// Probability an online order triggers a delayed out-of-stock
    pub out_of_stock_ratio: f64,
    /// Out-of-stock follow-up delay range, milliseconds
    pub out_of_stock_min_delay_ms: u64,
    /// See `out_of_stock_min_delay_ms`
    pub out_of_stock_max_delay_ms: u64,
    /// Estimated restocking window, days ahead of the out-of-stock moment
    pub restock_min_days: u32,
    /// See `restock_min_days`
    pub restock_max_days: u32,
    /// Unit price range for cart lines
    pub min_price: f64,
    /// See `min_price`
    pub max_price: f64,
    /// City override pool for shipping addresses; empty means no override
    pub cities: Vec<String>,
    /// Bound on session-id insert-or-regenerate attempts
    pub registry_max_attempts: u32,
    /// Duplicate-injection ratio
    pub duplicates_ratio: f64,
    /// Max publish-delay jitter, seconds
    pub max_publish_delay_secs: u64,
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            click_min_delay_ms: 2_000,
            click_max_delay_ms: 30_000,
            per_event_interval_ms: 15_000,
            inter_session_gap_ms: 60_000,
            max_session_events: 20,
            max_cart_products: 5,
            abandonment_rate: 0.1,
            reuse_address_ratio: 0.7,
            out_of_stock_ratio: 0.1,
            out_of_stock_min_delay_ms: 60_000,
            out_of_stock_max_delay_ms: 1_800_000,
            restock_min_days: 3,
            restock_max_days: 14,
            min_price: 5.0,
            max_price: 60.0,
            cities: Vec::new(),
            registry_max_attempts: 8,
            duplicates_ratio: 0.02,
            max_publish_delay_secs: 0,
        }
    }
}

/// Returns and reviews configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ReturnsConfig {
    /// Return-request cadence, milliseconds
    pub interval_ms: u64,
    /// Standalone review cadence, milliseconds
    pub review_interval_ms: u64,
    /// Probability a return request schedules a delayed review
    pub review_ratio: f64,
    /// Review follow-up delay range, milliseconds
    pub review_min_delay_ms: u64,
    /// See `review_min_delay_ms`
    pub review_max_delay_ms: u64,
    /// Duplicate-injection ratio (also governs review duplication)
    pub duplicates_ratio: f64,
    /// Probability a returned product is drawn from the size-issue set
    pub product_with_size_issue_ratio: f64,
    /// Probability a review for a flagged product comes from the size-issue
    /// pool
    pub review_with_size_issue_ratio: f64,
    /// Max distinct products per return request
    pub max_return_items: u32,
    /// Max quantity per returned product
    pub max_return_quantity: u32,
    /// Return reasons
    pub return_reasons: Vec<String>,
    /// Review corpus location; `None` uses the bundled reference dataset
    pub corpus_path: Option<PathBuf>,
    /// Max publish-delay jitter, seconds
    pub max_publish_delay_secs: u64,
}

impl Default for ReturnsConfig {
    fn default() -> Self {
        Self {
            interval_ms: 120_000,
            review_interval_ms: 180_000,
            review_ratio: 0.4,
            review_min_delay_ms: 3_600_000,
            review_max_delay_ms: 86_400_000,
            duplicates_ratio: 0.1,
            product_with_size_issue_ratio: 0.3,
            review_with_size_issue_ratio: 0.8,
            max_return_items: 3,
            max_return_quantity: 4,
            return_reasons: vec![
                "wrong-size".to_string(),
                "damaged".to_string(),
                "not-as-described".to_string(),
                "changed-mind".to_string(),
            ],
            corpus_path: None,
            max_publish_delay_secs: 30,
        }
    }
}

/// Payment transaction configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TransactionsConfig {
    /// Transaction cadence, milliseconds
    pub interval_ms: u64,
    /// Size of the fixed transaction id pool
    pub pool_size: u32,
    /// Probability of completing after the second PROCESSING
    pub completion_ratio: f64,
    /// Amount range
    pub min_amount: f64,
    /// See `min_amount`
    pub max_amount: f64,
    /// Duplicate-injection ratio
    pub duplicates_ratio: f64,
    /// Max publish-delay jitter, seconds
    pub max_publish_delay_secs: u64,
}

impl Default for TransactionsConfig {
    fn default() -> Self {
        Self {
            interval_ms: 10_000,
            pool_size: 5,
            completion_ratio: 0.2,
            min_amount: 10.0,
            max_amount: 1_000.0,
            duplicates_ratio: 0.0,
            max_publish_delay_secs: 5,
        }
    }
}

/// Warehouse stock configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct StockConfig {
    /// Stock movement cadence, milliseconds
    pub interval_ms: u64,
    /// Standalone out-of-stock cadence, milliseconds
    pub out_of_stock_interval_ms: u64,
    /// Warehouse names
    pub warehouses: Vec<String>,
    /// Signed quantity-change range
    pub min_change: i32,
    /// See `min_change`
    pub max_change: i32,
    /// Estimated restocking window, days
    pub restock_min_days: u32,
    /// See `restock_min_days`
    pub restock_max_days: u32,
    /// Duplicate-injection ratio
    pub duplicates_ratio: f64,
    /// Max publish-delay jitter, seconds
    pub max_publish_delay_secs: u64,
}

impl Default for StockConfig {
    fn default() -> Self {
        Self {
            interval_ms: 30_000,
            out_of_stock_interval_ms: 600_000,
            warehouses: vec![
                "Reno".to_string(),
                "Marseille".to_string(),
                "Hamburg".to_string(),
                "Osaka".to_string(),
            ],
            min_change: -40,
            max_change: 80,
            restock_min_days: 3,
            restock_max_days: 14,
            duplicates_ratio: 0.0,
            max_publish_delay_secs: 20,
        }
    }
}

/// Badge and sensor telemetry configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Badge-in cadence, milliseconds
    pub badge_interval_ms: u64,
    /// Normal sensor cadence, milliseconds
    pub sensor_interval_ms: u64,
    /// Anomalous sensor cadence, milliseconds
    pub anomaly_interval_ms: u64,
    /// Number of simulated sensors
    pub sensor_count: u32,
    /// Measurement unit
    pub unit: String,
    /// Normal reading range
    pub normal_min: f64,
    /// See `normal_min`
    pub normal_max: f64,
    /// Anomalous reading range
    pub anomalous_min: f64,
    /// See `anomalous_min`
    pub anomalous_max: f64,
    /// Badge-carrying employees
    pub employees: Vec<String>,
    /// Badge gates
    pub gates: Vec<String>,
    /// Duplicate-injection ratio
    pub duplicates_ratio: f64,
    /// Max publish-delay jitter, seconds
    pub max_publish_delay_secs: u64,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            badge_interval_ms: 45_000,
            sensor_interval_ms: 15_000,
            anomaly_interval_ms: 900_000,
            sensor_count: 10,
            unit: "°C".to_string(),
            normal_min: 15.0,
            normal_max: 30.0,
            anomalous_min: 60.0,
            anomalous_max: 95.0,
            employees: vec![
                "Dana Whitfield".to_string(),
                "Luis Moreno".to_string(),
                "Priya Nair".to_string(),
                "Tomasz Kowalski".to_string(),
                "Aiko Tanaka".to_string(),
            ],
            gates: vec![
                "north-entrance".to_string(),
                "loading-dock".to_string(),
                "office-wing".to_string(),
            ],
            duplicates_ratio: 0.0,
            max_publish_delay_secs: 5,
        }
    }
}

/// Online-shop registration configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomersConfig {
    /// Registration cadence, milliseconds
    pub interval_ms: u64,
    /// Capacity of the recently-registered ring buffer
    pub recent_capacity: usize,
    /// Probability a registration schedules a delayed first order
    pub first_order_ratio: f64,
    /// First-order delay range, milliseconds
    pub first_order_min_delay_ms: u64,
    /// See `first_order_min_delay_ms`
    pub first_order_max_delay_ms: u64,
    /// Duplicate-injection ratio
    pub duplicates_ratio: f64,
    /// Max publish-delay jitter, seconds
    pub max_publish_delay_secs: u64,
}

impl Default for CustomersConfig {
    fn default() -> Self {
        Self {
            interval_ms: 240_000,
            recent_capacity: 32,
            first_order_ratio: 0.6,
            first_order_min_delay_ms: 60_000,
            first_order_max_delay_ms: 3_600_000,
            duplicates_ratio: 0.0,
            max_publish_delay_secs: 10,
        }
    }
}

/// History backfill configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Historical window length in days
    pub window_days: u32,
    /// Seed for deterministic backfill; `None` seeds from entropy
    pub seed: Option<u64>,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            window_days: 7,
            seed: None,
        }
    }
}
