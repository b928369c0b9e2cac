//! Mutable state of one online browsing session.

use datagen_core::events::{OnlineCustomer, Product, SessionEventKind};

/// Everything the engine tracks about one live session.
///
/// The state is created by [`crate::session::SessionEngine::start`] and
/// mutated step by step until the session ends; once `ended` is set the
/// state is inert.
#[derive(Debug, Clone)]
pub struct SessionState {
    /// Session id, unique among concurrently active sessions
    pub id: String,
    /// Customer bound at login; `None` while anonymous
    pub customer: Option<OnlineCustomer>,
    /// Cart contents, in add order
    pub cart: Vec<Product>,
    /// Most recently emitted browsing event
    pub last_event: Option<SessionEventKind>,
    /// Number of clicks emitted so far
    pub events_emitted: u32,
    /// UTM query string for attributed sessions
    pub utm_query: Option<String>,
    /// Marketing referrer for attributed sessions
    pub referrer: Option<String>,
    /// Whether the session has terminated
    pub ended: bool,
}

impl SessionState {
    /// Whether a customer has logged in.
    #[must_use]
    pub const fn logged_in(&self) -> bool {
        self.customer.is_some()
    }
}
