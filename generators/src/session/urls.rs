//! URL and marketing-attribution rendering for session clicks.

use datagen_core::events::{Product, SessionEventKind};
use datagen_core::variates::pick;
use rand::Rng;

const UTM_SOURCES: &[&str] = &["newsletter", "search", "social", "affiliate"];
const UTM_MEDIUMS: &[&str] = &["email", "cpc", "organic", "banner"];
const UTM_CAMPAIGNS: &[&str] = &["spring-drop", "summer-sale", "back-to-school", "clearance"];

/// A random UTM query string for an attributed session entry. Ad-platform
/// sources also get their click-tracking token.
pub fn utm_query(rng: &mut impl Rng) -> String {
    let source = pick(rng, UTM_SOURCES);
    let mut query = format!(
        "?utm_source={source}&utm_medium={}&utm_campaign={}",
        pick(rng, UTM_MEDIUMS),
        pick(rng, UTM_CAMPAIGNS)
    );
    if let Some(param) = click_id_param(source) {
        query.push_str(&format!("&{param}={:016x}", rng.next_u64()));
    }
    query
}

fn click_id_param(source: &str) -> Option<&'static str> {
    match source {
        "search" => Some("gclid"),
        "social" => Some("fbclid"),
        _ => None,
    }
}

/// The referrer site matching a UTM source. Unknown sources fall back to
/// the generic search referrer.
#[must_use]
pub fn referrer_for(source: &str) -> String {
    let host = match source {
        "newsletter" => "mail.example.com",
        "social" => "social.example.com",
        "affiliate" => "deals.example.com",
        _ => "search.example.com",
    };
    format!("https://{host}/")
}

/// Extracts the UTM source back out of a query string built by
/// [`utm_query`].
#[must_use]
pub fn source_of(query: &str) -> &str {
    query
        .strip_prefix("?utm_source=")
        .and_then(|rest| rest.split('&').next())
        .unwrap_or("")
}

fn slug(product: &Product) -> String {
    product.long_description().to_lowercase().replace(' ', "-")
}

/// Renders the page URL for one click, appending the session's UTM query
/// when attributed.
pub fn page_url(kind: SessionEventKind, product: Option<&Product>, query: Option<&str>) -> String {
    let path = match (kind, product) {
        (SessionEventKind::PageView, _) => "/".to_string(),
        (SessionEventKind::Search, _) => "/search".to_string(),
        (SessionEventKind::ProductView, Some(p)) => format!("/product/{}", slug(p)),
        (SessionEventKind::ProductView, None) => "/product".to_string(),
        (SessionEventKind::AddToCart, Some(p)) => format!("/cart/add/{}", slug(p)),
        (SessionEventKind::AddToCart, None) => "/cart/add".to_string(),
        (SessionEventKind::RemoveFromCart, Some(p)) => format!("/cart/remove/{}", slug(p)),
        (SessionEventKind::RemoveFromCart, None) => "/cart/remove".to_string(),
        (SessionEventKind::CartView, _) => "/cart".to_string(),
        (SessionEventKind::CheckoutStart, _) => "/checkout".to_string(),
        (SessionEventKind::CheckoutComplete, _) => "/checkout/complete".to_string(),
        (SessionEventKind::Login, _) => "/login".to_string(),
    };
    match query {
        Some(query) => format!("{path}{query}"),
        None => path,
    }
}
