//! Random-variate utilities shared by every generator.
//!
//! Rounding is deliberately coarse (prices to two decimals, generic doubles
//! to one) so generated figures look like real retail data rather than raw
//! floating point noise.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Uniform integer draw, inclusive on both ends.
///
/// # Panics
///
/// Panics if `min > max` — ranges are pre-validated configuration.
pub fn int_between(rng: &mut impl Rng, min: i64, max: i64) -> i64 {
    rng.gen_range(min..=max)
}

/// Uniform price draw in `[min, max]`, rounded to two decimals.
///
/// # Panics
///
/// Panics if `min > max`.
pub fn price_between(rng: &mut impl Rng, min: f64, max: f64) -> f64 {
    round2(rng.gen_range(min..=max))
}

/// Uniform double draw in `[min, max]`, rounded to one decimal.
///
/// # Panics
///
/// Panics if `min > max`.
pub fn double_between(rng: &mut impl Rng, min: f64, max: f64) -> f64 {
    round1(rng.gen_range(min..=max))
}

/// Returns true with probability `ratio`.
///
/// # Panics
///
/// Panics if `ratio` is outside `[0, 1]` — ratios are pre-validated
/// configuration.
pub fn happens(rng: &mut impl Rng, ratio: f64) -> bool {
    rng.gen_bool(ratio)
}

/// Uniform pick from a slice.
///
/// # Panics
///
/// Panics if `items` is empty. Selection on an empty list is a programmer
/// error, not a runtime-recoverable condition.
pub fn pick<'a, T>(rng: &mut impl Rng, items: &'a [T]) -> &'a T {
    &items[rng.gen_range(0..items.len())]
}

/// Weighted pick: draws uniformly in `[0, total_weight)` and accumulates
/// weights until the cumulative weight reaches the draw. Ties favor the
/// first entry whose cumulative weight is ≥ the draw.
///
/// # Panics
///
/// Panics if `entries` is empty or the total weight is not positive.
pub fn pick_weighted<'a, T>(rng: &mut impl Rng, entries: &'a [(T, f64)]) -> &'a T {
    let total: f64 = entries.iter().map(|(_, weight)| weight).sum();
    let draw = rng.gen_range(0.0..total);
    let mut cumulative = 0.0;
    for (item, weight) in entries {
        cumulative += weight;
        if cumulative >= draw {
            return item;
        }
    }
    // Floating point accumulation can land a hair short of the total.
    &entries[entries.len() - 1].0
}

/// Current time minus a uniform random offset in `[0, max_offset_secs]`,
/// simulating publish-delay jitter in live mode. An offset of 0 yields
/// exactly `now`.
pub fn now_with_publish_jitter(
    rng: &mut impl Rng,
    now: DateTime<Utc>,
    max_offset_secs: u64,
) -> DateTime<Utc> {
    if max_offset_secs == 0 {
        return now;
    }
    let offset = int_between(rng, 0, max_offset_secs as i64);
    now - ChronoDuration::seconds(offset)
}

/// Rounds to one decimal place.
#[must_use]
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Rounds to two decimal places.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Deterministic small RNG for reproducible generation.
#[must_use]
pub fn seeded_rng(seed: u64) -> SmallRng {
    SmallRng::seed_from_u64(seed)
}

/// Entropy-seeded small RNG for production paths.
#[must_use]
pub fn entropy_rng() -> SmallRng {
    SmallRng::from_entropy()
}
