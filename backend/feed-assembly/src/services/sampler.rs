// ============================================
// Sampling primitives
// ============================================
//
// Weighted pick without replacement, coin toss, normal draw and
// projection into a bounded range. All randomness comes from the
// caller's RNG so a seeded run is reproducible.

use crate::error::{FeedError, Result};
use rand::distributions::{Distribution, WeightedError, WeightedIndex};
use rand::Rng;
use rand_distr::StandardNormal;

/// Index of an item drawn with probability proportional to `weight`.
///
/// Fails on an empty slice, on any negative or non-finite weight, when the
/// weights sum past `f64::MAX`, and when every weight is zero.
pub fn pick_weighted_index<T, R, F>(items: &[T], rng: &mut R, weight: F) -> Result<usize>
where
    R: Rng + ?Sized,
    F: Fn(&T) -> f64,
{
    if items.is_empty() {
        return Err(FeedError::EmptyCandidates);
    }

    let weights: Vec<f64> = items.iter().map(weight).collect();
    if let Some(&bad) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
        return Err(FeedError::InvalidWeight(bad));
    }

    // WeightedIndex panics instead of failing on an overflowing total.
    let total: f64 = weights.iter().sum();
    if !total.is_finite() {
        return Err(FeedError::InvalidWeight(total));
    }

    let dist = WeightedIndex::new(&weights).map_err(|e| match e {
        WeightedError::NoItem => FeedError::EmptyCandidates,
        WeightedError::AllWeightsZero => FeedError::ZeroTotalWeight,
        _ => FeedError::InvalidWeight(weights.iter().sum()),
    })?;

    Ok(dist.sample(rng))
}

/// Draws one item and removes it from `items`.
pub fn pick_weighted<T, R, F>(items: &mut Vec<T>, rng: &mut R, weight: F) -> Result<T>
where
    R: Rng + ?Sized,
    F: Fn(&T) -> f64,
{
    let index = pick_weighted_index(items, rng, weight)?;
    Ok(items.remove(index))
}

/// True with probability `p`. Values outside `[0, 1]` saturate.
pub fn toss_coin<R: Rng + ?Sized>(rng: &mut R, p: f64) -> bool {
    if p.is_nan() || p <= 0.0 {
        return false;
    }
    if p >= 1.0 {
        return true;
    }
    rng.gen_bool(p)
}

/// Standard normal sample.
pub fn normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.sample(StandardNormal)
}

/// Maps `value` from `[0, 1]` onto `[min, max]`, clamping anything outside.
pub fn project(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        return min;
    }
    (min + value * (max - min)).max(min).min(max)
}
