//! The browsing-state transition tables.
//!
//! Each state carries a static weighted row of candidate successors. Rows
//! are filtered against the session context before the draw: cart-scoped
//! events need a matching cart, checkout needs a logged-in customer, and a
//! full cart makes `ADD_TO_CART` unreachable. An empty filtered row ends
//! the session.

use datagen_core::events::SessionEventKind;
use datagen_core::variates::pick_weighted;
use rand::Rng;

use super::state::SessionState;

type Row = &'static [(SessionEventKind, f64)];

const FROM_PAGE_VIEW: Row = &[
    (SessionEventKind::PageView, 0.30),
    (SessionEventKind::Search, 0.25),
    (SessionEventKind::ProductView, 0.30),
    (SessionEventKind::CartView, 0.10),
    (SessionEventKind::Login, 0.05),
];

const FROM_SEARCH: Row = &[
    (SessionEventKind::ProductView, 0.50),
    (SessionEventKind::Search, 0.20),
    (SessionEventKind::PageView, 0.30),
];

const FROM_PRODUCT_VIEW: Row = &[
    (SessionEventKind::AddToCart, 0.35),
    (SessionEventKind::ProductView, 0.25),
    (SessionEventKind::PageView, 0.20),
    (SessionEventKind::Search, 0.15),
    (SessionEventKind::CartView, 0.05),
];

const FROM_ADD_TO_CART: Row = &[
    (SessionEventKind::ProductView, 0.30),
    (SessionEventKind::CartView, 0.30),
    (SessionEventKind::AddToCart, 0.15),
    (SessionEventKind::PageView, 0.15),
    (SessionEventKind::Search, 0.10),
];

const FROM_REMOVE_FROM_CART: Row = &[
    (SessionEventKind::CartView, 0.40),
    (SessionEventKind::ProductView, 0.30),
    (SessionEventKind::PageView, 0.30),
];

const FROM_CART_VIEW: Row = &[
    (SessionEventKind::CheckoutStart, 0.35),
    (SessionEventKind::ProductView, 0.25),
    (SessionEventKind::PageView, 0.20),
    (SessionEventKind::RemoveFromCart, 0.15),
    (SessionEventKind::Login, 0.05),
];

const FROM_CHECKOUT_START: Row = &[
    (SessionEventKind::CheckoutComplete, 0.70),
    (SessionEventKind::CartView, 0.20),
    (SessionEventKind::PageView, 0.10),
];

const FROM_LOGIN: Row = &[
    (SessionEventKind::PageView, 0.35),
    (SessionEventKind::ProductView, 0.30),
    (SessionEventKind::CartView, 0.25),
    (SessionEventKind::Search, 0.10),
];

const fn row_for(state: SessionEventKind) -> Row {
    match state {
        SessionEventKind::PageView => FROM_PAGE_VIEW,
        SessionEventKind::Search => FROM_SEARCH,
        SessionEventKind::ProductView => FROM_PRODUCT_VIEW,
        SessionEventKind::AddToCart => FROM_ADD_TO_CART,
        SessionEventKind::RemoveFromCart => FROM_REMOVE_FROM_CART,
        SessionEventKind::CartView => FROM_CART_VIEW,
        SessionEventKind::CheckoutStart => FROM_CHECKOUT_START,
        SessionEventKind::Login => FROM_LOGIN,
        // Terminal; the engine never asks for successors.
        SessionEventKind::CheckoutComplete => &[],
    }
}

fn admissible(
    candidate: SessionEventKind,
    session: &SessionState,
    max_cart_products: usize,
) -> bool {
    match candidate {
        SessionEventKind::AddToCart => session.cart.len() < max_cart_products,
        SessionEventKind::RemoveFromCart => !session.cart.is_empty(),
        SessionEventKind::CheckoutStart => !session.cart.is_empty() && session.logged_in(),
        SessionEventKind::Login => !session.logged_in(),
        _ => true,
    }
}

/// Draws the next browsing event, or `None` when the session has nowhere
/// left to go.
pub fn next_event(
    rng: &mut impl Rng,
    session: &SessionState,
    max_cart_products: usize,
) -> Option<SessionEventKind> {
    let last = session.last_event?;
    let candidates: Vec<(SessionEventKind, f64)> = row_for(last)
        .iter()
        .filter(|(candidate, _)| admissible(*candidate, session, max_cart_products))
        .copied()
        .collect();
    if candidates.is_empty() {
        None
    } else {
        Some(*pick_weighted(rng, &candidates))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect
mod tests {
    use super::*;
    use crate::catalog::random_product;
    use datagen_core::variates::seeded_rng;

    fn session(last: SessionEventKind) -> SessionState {
        SessionState {
            id: "sess-test".to_string(),
            customer: None,
            cart: Vec::new(),
            last_event: Some(last),
            events_emitted: 1,
            utm_query: None,
            referrer: None,
            ended: false,
        }
    }

    #[test]
    fn checkout_complete_is_terminal() {
        let mut rng = seeded_rng(139);
        let session = session(SessionEventKind::CheckoutComplete);
        assert_eq!(next_event(&mut rng, &session, 5), None);
    }

    #[test]
    fn cart_events_need_a_matching_cart() {
        let mut rng = seeded_rng(149);
        let empty = session(SessionEventKind::CartView);
        for _ in 0..200 {
            let next = next_event(&mut rng, &empty, 5).unwrap();
            assert_ne!(next, SessionEventKind::RemoveFromCart);
            assert_ne!(next, SessionEventKind::CheckoutStart);
        }
    }

    #[test]
    fn full_cart_blocks_add_to_cart() {
        let mut rng = seeded_rng(151);
        let mut full = session(SessionEventKind::ProductView);
        for _ in 0..3 {
            full.cart.push(random_product(&mut rng));
        }
        for _ in 0..200 {
            assert_ne!(
                next_event(&mut rng, &full, 3).unwrap(),
                SessionEventKind::AddToCart
            );
        }
    }

    #[test]
    fn checkout_needs_login() {
        let mut rng = seeded_rng(157);
        let mut anonymous = session(SessionEventKind::CartView);
        anonymous.cart.push(random_product(&mut rng));
        for _ in 0..200 {
            assert_ne!(
                next_event(&mut rng, &anonymous, 5).unwrap(),
                SessionEventKind::CheckoutStart
            );
        }
    }

    #[test]
    fn logged_in_sessions_never_draw_login_again() {
        let mut rng = seeded_rng(163);
        let mut logged_in = session(SessionEventKind::PageView);
        logged_in.customer = Some(crate::customers::online_customer(&mut rng));
        for _ in 0..200 {
            assert_ne!(
                next_event(&mut rng, &logged_in, 5).unwrap(),
                SessionEventKind::Login
            );
        }
    }
}
