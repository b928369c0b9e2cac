//! Return requests, the review corpus, and product reviews.
//!
//! Reviews are not synthesized from scratch: they are drawn from a curated
//! corpus with a general pool and a size-issue pool. Products flagged with a
//! size issue mostly draw from the latter, which is what gives the stream
//! its learnable correlation.

use chrono::{DateTime, Utc};
use datagen_core::config::ReturnsConfig;
use datagen_core::envelope::Emission;
use datagen_core::error::DatagenError;
use datagen_core::events::{
    EventKind, EventPayload, ProductReturn, ProductReview, Review, ReturnRequest,
};
use datagen_core::variates::{happens, int_between, pick};
use rand::rngs::SmallRng;
use rand::{Rng, RngCore};
use serde::Deserialize;
use smallvec::{SmallVec, smallvec};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::catalog::ProductCatalog;
use crate::customers;
use crate::series::{EventGenerator, offset_by};

#[derive(Debug, Deserialize)]
struct CorpusFile {
    general: Vec<Review>,
    size_issue: Vec<Review>,
}

/// The curated review corpus, split into a general pool and a pool of
/// size-complaint reviews.
#[derive(Debug, Clone)]
pub struct ReviewCorpus {
    general: Vec<Review>,
    size_issue: Vec<Review>,
}

impl ReviewCorpus {
    /// The bundled reference corpus.
    pub fn builtin() -> Result<Self, DatagenError> {
        Self::from_json(include_str!("../data/reviews.json"))
    }

    /// Loads a corpus from a JSON file on disk.
    pub fn from_path(path: &Path) -> Result<Self, DatagenError> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    /// Loads the configured corpus, falling back to the bundled one.
    pub fn load(path: Option<&Path>) -> Result<Self, DatagenError> {
        match path {
            Some(path) => Self::from_path(path),
            None => Self::builtin(),
        }
    }

    /// Parses and validates a corpus from JSON text.
    pub fn from_json(text: &str) -> Result<Self, DatagenError> {
        let file: CorpusFile = serde_json::from_str(text)?;
        if file.general.is_empty() {
            return Err(DatagenError::CorpusInvalid("general review pool is empty"));
        }
        if file.size_issue.is_empty() {
            return Err(DatagenError::CorpusInvalid(
                "size-issue review pool is empty",
            ));
        }
        let all = file.general.iter().chain(&file.size_issue);
        for review in all {
            if !(1..=5).contains(&review.rating) {
                return Err(DatagenError::CorpusInvalid("rating outside 1..=5"));
            }
        }
        Ok(Self {
            general: file.general,
            size_issue: file.size_issue,
        })
    }

    /// Draws a review from the requested pool.
    pub fn pick(&self, rng: &mut impl Rng, size_issue: bool) -> &Review {
        if size_issue {
            pick(rng, &self.size_issue)
        } else {
            pick(rng, &self.general)
        }
    }

    /// The general pool.
    #[must_use]
    pub fn general(&self) -> &[Review] {
        &self.general
    }

    /// The size-complaint pool.
    #[must_use]
    pub fn size_issue(&self) -> &[Review] {
        &self.size_issue
    }
}

fn review_for(
    rng: &mut impl Rng,
    cfg: &ReturnsConfig,
    corpus: &ReviewCorpus,
    product: &datagen_core::events::Product,
    at: DateTime<Utc>,
) -> ProductReview {
    let from_size_pool =
        product.has_size_issue && happens(rng, cfg.review_with_size_issue_ratio);
    ProductReview {
        id: format!("rev-{:08x}", rng.next_u32()),
        product_description: product.short_description(),
        size: product.size.clone(),
        review: corpus.pick(rng, from_size_pool).clone(),
        timestamp: at,
    }
}

/// Periodic return requests, each optionally followed by a delayed review
/// of one of the returned products.
pub struct ReturnRequestGenerator {
    cfg: ReturnsConfig,
    rng: SmallRng,
    catalog: Arc<ProductCatalog>,
    corpus: Arc<ReviewCorpus>,
}

impl ReturnRequestGenerator {
    /// Creates the generator over the shared catalog and corpus.
    #[must_use]
    pub const fn new(
        cfg: ReturnsConfig,
        rng: SmallRng,
        catalog: Arc<ProductCatalog>,
        corpus: Arc<ReviewCorpus>,
    ) -> Self {
        Self {
            cfg,
            rng,
            catalog,
            corpus,
        }
    }
}

impl EventGenerator for ReturnRequestGenerator {
    fn interval(&self) -> Duration {
        Duration::from_millis(self.cfg.interval_ms)
    }

    fn policy_kind(&self) -> EventKind {
        EventKind::ReturnRequest
    }

    fn produce(&mut self, at: DateTime<Utc>) -> SmallVec<[Emission; 4]> {
        let customer = customers::customer(&mut self.rng);
        let billing = customers::address(&mut self.rng, "billing");
        let shipping = happens(&mut self.rng, 0.5)
            .then(|| customers::address(&mut self.rng, "shipping"));

        let item_count =
            int_between(&mut self.rng, 1, i64::from(self.cfg.max_return_items)) as usize;
        let items: Vec<ProductReturn> = (0..item_count)
            .map(|_| ProductReturn {
                product: self
                    .catalog
                    .random_with_bias(&mut self.rng, self.cfg.product_with_size_issue_ratio),
                quantity: int_between(&mut self.rng, 1, i64::from(self.cfg.max_return_quantity))
                    as u32,
                reason: pick(&mut self.rng, &self.cfg.return_reasons).clone(),
            })
            .collect();

        let request = ReturnRequest {
            id: format!("ret-{:08x}", self.rng.next_u32()),
            customer,
            billing_address: billing,
            shipping_address: shipping,
            items: items.clone(),
            timestamp: at,
        };
        let mut out = smallvec![Emission::now(EventPayload::ReturnRequest(request))];

        if happens(&mut self.rng, self.cfg.review_ratio) {
            let delay = Duration::from_millis(int_between(
                &mut self.rng,
                self.cfg.review_min_delay_ms as i64,
                self.cfg.review_max_delay_ms as i64,
            ) as u64);
            let reviewed = pick(&mut self.rng, &items).product.clone();
            let review = review_for(
                &mut self.rng,
                &self.cfg,
                &self.corpus,
                &reviewed,
                offset_by(at, delay),
            );
            out.push(Emission::after(delay, EventPayload::ProductReview(review)));
        }
        out
    }
}

/// Standalone product reviews, uncorrelated with any return.
pub struct ReviewGenerator {
    cfg: ReturnsConfig,
    rng: SmallRng,
    catalog: Arc<ProductCatalog>,
    corpus: Arc<ReviewCorpus>,
}

impl ReviewGenerator {
    /// Creates the generator over the shared catalog and corpus.
    #[must_use]
    pub const fn new(
        cfg: ReturnsConfig,
        rng: SmallRng,
        catalog: Arc<ProductCatalog>,
        corpus: Arc<ReviewCorpus>,
    ) -> Self {
        Self {
            cfg,
            rng,
            catalog,
            corpus,
        }
    }
}

impl EventGenerator for ReviewGenerator {
    fn interval(&self) -> Duration {
        Duration::from_millis(self.cfg.review_interval_ms)
    }

    fn policy_kind(&self) -> EventKind {
        EventKind::ProductReview
    }

    fn produce(&mut self, at: DateTime<Utc>) -> SmallVec<[Emission; 4]> {
        let product = self
            .catalog
            .random_with_bias(&mut self.rng, self.cfg.product_with_size_issue_ratio);
        let review = review_for(&mut self.rng, &self.cfg, &self.corpus, &product, at);
        smallvec![Emission::now(EventPayload::ProductReview(review))]
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic
mod tests {
    use super::*;
    use datagen_core::variates::seeded_rng;

    fn catalog() -> Arc<ProductCatalog> {
        let mut rng = seeded_rng(109);
        Arc::new(ProductCatalog::new(&mut rng, 3))
    }

    #[test]
    fn builtin_corpus_loads_with_both_pools() {
        let corpus = ReviewCorpus::builtin().unwrap();
        assert!(!corpus.general().is_empty());
        assert!(!corpus.size_issue().is_empty());
    }

    #[test]
    fn empty_pool_is_rejected() {
        let err = ReviewCorpus::from_json(r#"{"general": [], "size_issue": []}"#).unwrap_err();
        assert!(matches!(err, DatagenError::CorpusInvalid(_)));
    }

    #[test]
    fn malformed_corpus_is_a_format_error() {
        let err = ReviewCorpus::from_json("not json").unwrap_err();
        assert!(matches!(err, DatagenError::CorpusFormat(_)));
    }

    #[test]
    fn out_of_range_rating_is_rejected() {
        let text = r#"{
            "general": [{"rating": 6, "comment": null, "characteristics": []}],
            "size_issue": [{"rating": 2, "comment": null, "characteristics": []}]
        }"#;
        let err = ReviewCorpus::from_json(text).unwrap_err();
        assert!(matches!(err, DatagenError::CorpusInvalid(_)));
    }

    #[test]
    fn return_request_fields_stay_in_ranges() {
        let cfg = ReturnsConfig::default();
        let corpus = Arc::new(ReviewCorpus::builtin().unwrap());
        let mut generator =
            ReturnRequestGenerator::new(cfg.clone(), seeded_rng(113), catalog(), corpus);
        for _ in 0..100 {
            let emissions = generator.produce(Utc::now());
            let EventPayload::ReturnRequest(request) = &emissions[0].record().payload else {
                panic!("first emission must be the return request");
            };
            assert!(!request.items.is_empty());
            assert!(request.items.len() <= cfg.max_return_items as usize);
            for item in &request.items {
                assert!(item.quantity >= 1 && item.quantity <= cfg.max_return_quantity);
                assert!(cfg.return_reasons.contains(&item.reason));
            }
        }
    }

    #[test]
    fn review_follow_up_matches_a_returned_product() {
        let cfg = ReturnsConfig {
            review_ratio: 1.0,
            ..ReturnsConfig::default()
        };
        let corpus = Arc::new(ReviewCorpus::builtin().unwrap());
        let mut generator =
            ReturnRequestGenerator::new(cfg.clone(), seeded_rng(127), catalog(), corpus);
        for _ in 0..50 {
            let emissions = generator.produce(Utc::now());
            assert_eq!(emissions.len(), 2);
            let EventPayload::ReturnRequest(request) = &emissions[0].record().payload else {
                panic!("first emission must be the return request");
            };
            let EventPayload::ProductReview(review) = &emissions[1].record().payload else {
                panic!("second emission must be the review");
            };
            assert!(request.items.iter().any(|item| {
                item.product.short_description() == review.product_description
                    && item.product.size == review.size
            }));
            let delay = emissions[1].delay().unwrap();
            assert!(delay >= Duration::from_millis(cfg.review_min_delay_ms));
            assert!(delay <= Duration::from_millis(cfg.review_max_delay_ms));
        }
    }

    #[test]
    fn flagged_products_draw_from_the_size_pool() {
        let cfg = ReturnsConfig {
            review_with_size_issue_ratio: 1.0,
            ..ReturnsConfig::default()
        };
        let corpus = ReviewCorpus::builtin().unwrap();
        let mut rng = seeded_rng(131);
        let flagged = catalog().size_issue_products()[0].clone();
        for _ in 0..50 {
            let review = review_for(&mut rng, &cfg, &corpus, &flagged, Utc::now());
            assert!(corpus.size_issue().contains(&review.review));
        }
    }

    #[test]
    fn unflagged_products_draw_from_the_general_pool() {
        let cfg = ReturnsConfig::default();
        let corpus = ReviewCorpus::builtin().unwrap();
        let mut rng = seeded_rng(137);
        let mut plain = crate::catalog::random_product(&mut rng);
        plain.has_size_issue = false;
        for _ in 0..50 {
            let review = review_for(&mut rng, &cfg, &corpus, &plain, Utc::now());
            assert!(corpus.general().contains(&review.review));
        }
    }
}
