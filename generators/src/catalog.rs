//! The product catalog: random products plus the fixed "size issue" set.
//!
//! Descriptions are composed from size, material, style and the fixed
//! product name. A small, fixed-size subset of combinations is pre-selected
//! at construction as having a size issue; returns and reviews correlate
//! around that subset.

use datagen_core::events::Product;
use datagen_core::variates::{happens, pick};
use rand::Rng;

/// The fixed product family name.
pub const PRODUCT_NAME: &str = "T-Shirt";

/// Garment sizes.
pub const SIZES: &[&str] = &["XS", "S", "M", "L", "XL", "XXL"];

/// Fabrics.
pub const MATERIALS: &[&str] = &["Cotton", "Linen", "Bamboo", "Polyester", "Merino"];

/// Cuts.
pub const STYLES: &[&str] = &["Classic", "Slim", "Relaxed", "V-Neck", "Crew"];

/// Generates a random product with no size-issue tag.
pub fn random_product(rng: &mut impl Rng) -> Product {
    Product {
        name: PRODUCT_NAME.to_string(),
        size: (*pick(rng, SIZES)).to_string(),
        material: (*pick(rng, MATERIALS)).to_string(),
        style: (*pick(rng, STYLES)).to_string(),
        has_size_issue: false,
    }
}

/// Catalog holding the pre-selected size-issue products.
#[derive(Debug, Clone)]
pub struct ProductCatalog {
    size_issue: Vec<Product>,
}

impl ProductCatalog {
    /// Pre-selects `flagged_count` distinct products as having a size issue.
    pub fn new(rng: &mut impl Rng, flagged_count: usize) -> Self {
        let mut size_issue: Vec<Product> = Vec::with_capacity(flagged_count);
        while size_issue.len() < flagged_count {
            let mut candidate = random_product(rng);
            candidate.has_size_issue = true;
            let duplicate = size_issue
                .iter()
                .any(|p| p.long_description() == candidate.long_description());
            if !duplicate {
                size_issue.push(candidate);
            }
        }
        Self { size_issue }
    }

    /// The pre-selected size-issue products.
    #[must_use]
    pub fn size_issue_products(&self) -> &[Product] {
        &self.size_issue
    }

    /// A random product, tagged if its combination happens to match one of
    /// the pre-selected size-issue products.
    pub fn random(&self, rng: &mut impl Rng) -> Product {
        let candidate = random_product(rng);
        if self
            .size_issue
            .iter()
            .any(|p| p.long_description() == candidate.long_description())
        {
            Product {
                has_size_issue: true,
                ..candidate
            }
        } else {
            candidate
        }
    }

    /// A random product, biased toward the size-issue set with probability
    /// `size_issue_ratio`.
    pub fn random_with_bias(&self, rng: &mut impl Rng, size_issue_ratio: f64) -> Product {
        if !self.size_issue.is_empty() && happens(rng, size_issue_ratio) {
            pick(rng, &self.size_issue).clone()
        } else {
            self.random(rng)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use datagen_core::variates::seeded_rng;

    #[test]
    fn flagged_set_is_distinct_and_sized() {
        let mut rng = seeded_rng(17);
        let catalog = ProductCatalog::new(&mut rng, 4);
        let flagged = catalog.size_issue_products();
        assert_eq!(flagged.len(), 4);
        for (i, a) in flagged.iter().enumerate() {
            assert!(a.has_size_issue);
            for b in &flagged[i + 1..] {
                assert_ne!(a.long_description(), b.long_description());
            }
        }
    }

    #[test]
    fn full_bias_always_yields_flagged_product() {
        let mut rng = seeded_rng(23);
        let catalog = ProductCatalog::new(&mut rng, 3);
        for _ in 0..100 {
            assert!(catalog.random_with_bias(&mut rng, 1.0).has_size_issue);
        }
    }

    #[test]
    fn zero_bias_rarely_yields_flagged_product() {
        let mut rng = seeded_rng(29);
        let catalog = ProductCatalog::new(&mut rng, 3);
        // With zero bias the only flagged products are accidental matches of
        // the 3 flagged combinations out of 6*5*5 = 150.
        let flagged = (0..300)
            .filter(|_| catalog.random_with_bias(&mut rng, 0.0).has_size_issue)
            .count();
        assert!(flagged < 30);
    }
}
