//! Domain event model for the retail demo feed.
//!
//! Every event is an immutable value type; the tagged [`EventPayload`] sum
//! carries exactly one variant per business event kind, and the envelope in
//! [`crate::envelope`] adds the topic hint, key and authoritative timestamp.
//!
//! Cancellations carry the cancelled order *by value* so downstream
//! consumers never need a join to see what was cancelled.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::envelope::Topic;

/// An in-store customer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    /// Generated customer id
    pub id: String,
    /// Full name
    pub name: String,
}

/// An online-shop customer; unlike [`Customer`] it may carry e-mail
/// addresses collected at registration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OnlineCustomer {
    /// Generated customer id
    pub id: String,
    /// Full name
    pub name: String,
    /// Registered e-mail addresses (possibly empty)
    pub emails: Vec<String>,
}

impl OnlineCustomer {
    /// Projects the online customer onto the plain in-store shape.
    #[must_use]
    pub fn as_customer(&self) -> Customer {
        Customer {
            id: self.id.clone(),
            name: self.name.clone(),
        }
    }
}

/// A catalog product. Descriptions are composed from size, material, style
/// and the fixed product name.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Fixed product family name
    pub name: String,
    /// Garment size
    pub size: String,
    /// Fabric
    pub material: String,
    /// Cut
    pub style: String,
    /// Synthetic defect tag used to correlate reviews and returns around
    /// "wrong size" complaints
    pub has_size_issue: bool,
}

impl Product {
    /// Size-less description, as used by reviews.
    #[must_use]
    pub fn short_description(&self) -> String {
        format!("{} {} {}", self.material, self.style, self.name)
    }

    /// Full description including the size.
    #[must_use]
    pub fn long_description(&self) -> String {
        format!("{} {} {} {}", self.size, self.material, self.style, self.name)
    }
}

/// An in-store order. Quantity and price are chosen once and never mutated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Order id
    pub id: String,
    /// Ordering customer
    pub customer: Customer,
    /// Ordered product
    pub product: Product,
    /// Unit price, two decimals
    pub unit_price: f64,
    /// Ordered quantity
    pub quantity: u32,
    /// Sales region
    pub region: String,
    /// When the order was placed
    pub timestamp: DateTime<Utc>,
}

/// Cancellation of a previously placed order. The timestamp is strictly
/// after the order timestamp by a randomized delay.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cancellation {
    /// Cancellation id
    pub id: String,
    /// The cancelled order, by value
    pub order: Order,
    /// Cancellation reason
    pub reason: String,
    /// When the cancellation happened
    pub timestamp: DateTime<Utc>,
}

/// Warehouse stock level change.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StockMovement {
    /// Movement id
    pub id: String,
    /// Warehouse the movement happened in
    pub warehouse: String,
    /// Affected product
    pub product: Product,
    /// Signed quantity change
    pub quantity_change: i32,
    /// When the movement was recorded
    pub timestamp: DateTime<Utc>,
}

/// Employee badge-in at a gate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BadgeIn {
    /// Event id
    pub id: String,
    /// Badge id
    pub badge_id: String,
    /// Badge holder
    pub employee_name: String,
    /// Gate the badge was presented at
    pub gate: String,
    /// When the badge was read
    pub timestamp: DateTime<Utc>,
}

/// Store sensor telemetry reading.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    /// Event id
    pub id: String,
    /// Reporting sensor
    pub sensor_id: String,
    /// Measured value
    pub value: f64,
    /// Measurement unit
    pub unit: String,
    /// Whether this reading came from the anomalous variant of the sensor
    /// generator
    pub anomalous: bool,
    /// When the reading was taken
    pub timestamp: DateTime<Utc>,
}

/// A freshly registered online customer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewCustomer {
    /// The registered customer
    pub customer: OnlineCustomer,
    /// Registration time
    pub timestamp: DateTime<Utc>,
}

/// A named postal address.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Address {
    /// Address label, e.g. "billing"
    pub label: String,
    /// Street and number
    pub street: String,
    /// City
    pub city: String,
    /// Postal code
    pub postal_code: String,
    /// Country
    pub country: String,
}

/// One line of an online order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    /// Ordered product
    pub product: Product,
    /// Quantity
    pub quantity: u32,
    /// Unit price, two decimals
    pub unit_price: f64,
}

/// An order placed through the online shop at checkout completion.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OnlineOrder {
    /// Order id
    pub id: String,
    /// Ordering customer
    pub customer: OnlineCustomer,
    /// Ordered lines (the session cart at checkout)
    pub lines: Vec<OrderLine>,
    /// Shipping address
    pub shipping_address: Address,
    /// Billing address (possibly identical to shipping)
    pub billing_address: Address,
    /// When the order was placed
    pub timestamp: DateTime<Utc>,
}

/// Cart contents dropped by a logged-in customer who abandoned the session.
/// Anonymous abandonments are not recorded.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AbandonedOrder {
    /// Session that was abandoned
    pub session_id: String,
    /// The logged-in customer who walked away
    pub customer: OnlineCustomer,
    /// Cart contents at abandonment
    pub cart: Vec<Product>,
    /// When the abandonment was detected
    pub timestamp: DateTime<Utc>,
}

/// A product going out of stock, with an estimated restocking date.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OutOfStock {
    /// Event id
    pub id: String,
    /// The product that ran out
    pub product: Product,
    /// Estimated restocking date
    pub estimated_restock: DateTime<Utc>,
    /// When the out-of-stock was detected
    pub timestamp: DateTime<Utc>,
}

/// The browsing states an online session can be in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionEventKind {
    /// Plain page view
    PageView,
    /// Catalog search
    Search,
    /// Product detail view
    ProductView,
    /// Product added to the cart
    AddToCart,
    /// Product removed from the cart
    RemoveFromCart,
    /// Cart page view
    CartView,
    /// Checkout started
    CheckoutStart,
    /// Checkout completed (terminal; the online order follows)
    CheckoutComplete,
    /// Customer logged in
    Login,
}

impl fmt::Display for SessionEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::PageView => "PAGE_VIEW",
            Self::Search => "SEARCH",
            Self::ProductView => "PRODUCT_VIEW",
            Self::AddToCart => "ADD_TO_CART",
            Self::RemoveFromCart => "REMOVE_FROM_CART",
            Self::CartView => "CART_VIEW",
            Self::CheckoutStart => "CHECKOUT_START",
            Self::CheckoutComplete => "CHECKOUT_COMPLETE",
            Self::Login => "LOGIN",
        };
        write!(f, "{name}")
    }
}

/// One click in an online session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClickEvent {
    /// Owning session
    pub session_id: String,
    /// The session state this click was emitted from
    pub event_type: SessionEventKind,
    /// Page URL, including the session UTM query string when assigned
    pub url: String,
    /// Marketing referrer, present on attributed session entries only
    pub referrer: Option<String>,
    /// The product involved for cart-scoped clicks
    pub product: Option<Product>,
    /// Cart size after this click
    pub cart_size: u32,
    /// Click time
    pub timestamp: DateTime<Utc>,
}

/// One returned product within a return request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductReturn {
    /// Returned product
    pub product: Product,
    /// Returned quantity
    pub quantity: u32,
    /// Return reason
    pub reason: String,
}

/// A customer return request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReturnRequest {
    /// Request id
    pub id: String,
    /// Returning customer
    pub customer: Customer,
    /// Billing address, always present
    pub billing_address: Address,
    /// Shipping address; optional and possibly identical to billing
    pub shipping_address: Option<Address>,
    /// Returned items
    pub items: Vec<ProductReturn>,
    /// When the request was filed
    pub timestamp: DateTime<Utc>,
}

/// A rated product characteristic. Ranking 2 means "spot on"; anything else
/// indicates an issue.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Characteristic {
    /// Characteristic id, e.g. "size" or "fabric"
    pub id: String,
    /// Ranking in `1..=3`
    pub ranking: u8,
}

impl Characteristic {
    /// A characteristic has an issue when its ranking is not "spot on".
    #[must_use]
    pub const fn has_issue(&self) -> bool {
        self.ranking != 2
    }
}

/// The review body attached to a [`ProductReview`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Review {
    /// Star rating in `1..=5`
    pub rating: u8,
    /// Free-text comment
    pub comment: Option<String>,
    /// Rated characteristics
    pub characteristics: Vec<Characteristic>,
}

/// A product review.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductReview {
    /// Review id
    pub id: String,
    /// Short description of the reviewed product
    pub product_description: String,
    /// Size of the reviewed product
    pub size: String,
    /// The review body
    pub review: Review,
    /// When the review was submitted
    pub timestamp: DateTime<Utc>,
}

/// Transaction lifecycle states.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionState {
    /// Sequence opened
    Started,
    /// In flight; exactly two of these precede a completion
    Processing,
    /// Sequence finished
    Completed,
}

impl fmt::Display for TransactionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Started => write!(f, "STARTED"),
            Self::Processing => write!(f, "PROCESSING"),
            Self::Completed => write!(f, "COMPLETED"),
        }
    }
}

/// One step of a payment-transaction sequence. Ids come from a small fixed
/// pool; the amount is randomized independently per event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction id from the fixed pool
    pub id: u32,
    /// Current lifecycle state
    pub state: TransactionState,
    /// Amount, two decimals
    pub amount: f64,
    /// Event time
    pub timestamp: DateTime<Utc>,
}

/// Tagged sum of every event kind the datagen produces.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventPayload {
    /// In-store order
    Order(Order),
    /// Order cancellation
    Cancellation(Cancellation),
    /// Warehouse stock movement
    StockMovement(StockMovement),
    /// Employee badge-in
    BadgeIn(BadgeIn),
    /// Sensor telemetry
    SensorReading(SensorReading),
    /// Online-shop registration
    NewCustomer(NewCustomer),
    /// Online order
    OnlineOrder(OnlineOrder),
    /// Abandoned cart of a logged-in session
    AbandonedOrder(AbandonedOrder),
    /// Product out of stock
    OutOfStock(OutOfStock),
    /// Session click
    Click(ClickEvent),
    /// Return request
    ReturnRequest(ReturnRequest),
    /// Product review
    ProductReview(ProductReview),
    /// Payment transaction step
    Transaction(Transaction),
}

/// Discriminant of [`EventPayload`], used for topic routing and per-kind
/// delivery policy (duplicate ratio, publish jitter).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// In-store order
    Order,
    /// Order cancellation
    Cancellation,
    /// Warehouse stock movement
    StockMovement,
    /// Employee badge-in
    BadgeIn,
    /// Sensor telemetry
    SensorReading,
    /// Online-shop registration
    NewCustomer,
    /// Online order
    OnlineOrder,
    /// Abandoned cart
    AbandonedOrder,
    /// Product out of stock
    OutOfStock,
    /// Session click
    Click,
    /// Return request
    ReturnRequest,
    /// Product review
    ProductReview,
    /// Payment transaction step
    Transaction,
}

impl EventKind {
    /// Destination-topic hint for this kind.
    #[must_use]
    pub const fn topic(self) -> Topic {
        match self {
            Self::Order => Topic::new("orders"),
            Self::Cancellation => Topic::new("cancellations"),
            Self::StockMovement => Topic::new("stock-movements"),
            Self::BadgeIn => Topic::new("badge-ins"),
            Self::SensorReading => Topic::new("sensor-readings"),
            Self::NewCustomer => Topic::new("new-customers"),
            Self::OnlineOrder => Topic::new("online-orders"),
            Self::AbandonedOrder => Topic::new("abandoned-orders"),
            Self::OutOfStock => Topic::new("out-of-stocks"),
            Self::Click => Topic::new("click-events"),
            Self::ReturnRequest => Topic::new("return-requests"),
            Self::ProductReview => Topic::new("product-reviews"),
            Self::Transaction => Topic::new("transactions"),
        }
    }
}

impl EventPayload {
    /// The kind of this payload.
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::Order(_) => EventKind::Order,
            Self::Cancellation(_) => EventKind::Cancellation,
            Self::StockMovement(_) => EventKind::StockMovement,
            Self::BadgeIn(_) => EventKind::BadgeIn,
            Self::SensorReading(_) => EventKind::SensorReading,
            Self::NewCustomer(_) => EventKind::NewCustomer,
            Self::OnlineOrder(_) => EventKind::OnlineOrder,
            Self::AbandonedOrder(_) => EventKind::AbandonedOrder,
            Self::OutOfStock(_) => EventKind::OutOfStock,
            Self::Click(_) => EventKind::Click,
            Self::ReturnRequest(_) => EventKind::ReturnRequest,
            Self::ProductReview(_) => EventKind::ProductReview,
            Self::Transaction(_) => EventKind::Transaction,
        }
    }

    /// Unique delivery key for this payload.
    #[must_use]
    pub fn key(&self) -> String {
        match self {
            Self::Order(e) => e.id.clone(),
            Self::Cancellation(e) => e.id.clone(),
            Self::StockMovement(e) => e.id.clone(),
            Self::BadgeIn(e) => e.id.clone(),
            Self::SensorReading(e) => e.id.clone(),
            Self::NewCustomer(e) => e.customer.id.clone(),
            Self::OnlineOrder(e) => e.id.clone(),
            Self::AbandonedOrder(e) => e.session_id.clone(),
            Self::OutOfStock(e) => e.id.clone(),
            Self::Click(e) => e.session_id.clone(),
            Self::ReturnRequest(e) => e.id.clone(),
            Self::ProductReview(e) => e.id.clone(),
            Self::Transaction(e) => format!("txn-{}", e.id),
        }
    }

    /// The authoritative event timestamp carried inside the payload.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::Order(e) => e.timestamp,
            Self::Cancellation(e) => e.timestamp,
            Self::StockMovement(e) => e.timestamp,
            Self::BadgeIn(e) => e.timestamp,
            Self::SensorReading(e) => e.timestamp,
            Self::NewCustomer(e) => e.timestamp,
            Self::OnlineOrder(e) => e.timestamp,
            Self::AbandonedOrder(e) => e.timestamp,
            Self::OutOfStock(e) => e.timestamp,
            Self::Click(e) => e.timestamp,
            Self::ReturnRequest(e) => e.timestamp,
            Self::ProductReview(e) => e.timestamp,
            Self::Transaction(e) => e.timestamp,
        }
    }
}
