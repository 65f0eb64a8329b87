//! Random subsampling of instances and features.
//!
//! Every function here returns fresh index sets and leaves its inputs
//! untouched. Randomness comes from a caller-owned [`Rng`], so a seeded
//! generator reproduces the same splits.

use crate::error::SamplingError;
use rand::seq::index;
use rand::Rng;

/// The two halves of a split over `0..len`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    /// Indices taken by the requested proportion.
    pub selected: Vec<usize>,
    /// Indices left over, in ascending order.
    pub remainder: Vec<usize>,
}

impl Split {
    /// Total number of indices covered by the split.
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.selected.len() + self.remainder.len()
    }
}

fn check_proportion(p: f64) -> Result<(), SamplingError> {
    if (0.0..=1.0).contains(&p) {
        Ok(())
    } else {
        Err(SamplingError::InvalidProportion(p))
    }
}

/// Number of items a proportion selects out of `len`, rounded down.
pub fn selected_count(len: usize, p: f64) -> Result<usize, SamplingError> {
    check_proportion(p)?;
    Ok(((p * len as f64).floor() as usize).min(len))
}

/// Split `0..len` in order: the first `floor(p * len)` indices are selected.
pub fn split_ordered(len: usize, p: f64) -> Result<Split, SamplingError> {
    let cut = selected_count(len, p)?;
    Ok(Split {
        selected: (0..cut).collect(),
        remainder: (cut..len).collect(),
    })
}

/// Randomly select `floor(p * len)` distinct indices out of `0..len`.
///
/// Selected indices are returned in draw order; the remainder keeps the
/// original order. Together they partition `0..len`.
pub fn split_random<R: Rng + ?Sized>(
    len: usize,
    p: f64,
    rng: &mut R,
) -> Result<Split, SamplingError> {
    let amount = selected_count(len, p)?;
    let selected = index::sample(rng, len, amount).into_vec();

    let mut taken = vec![false; len];
    for &i in &selected {
        taken[i] = true;
    }
    let remainder = (0..len).filter(|&i| !taken[i]).collect();

    Ok(Split {
        selected,
        remainder,
    })
}

/// Choose `n` distinct feature indices out of `0..n_features`, ascending.
///
/// Asking for at least as many features as exist returns all of them.
pub fn select_random_features<R: Rng + ?Sized>(
    n_features: usize,
    n: usize,
    rng: &mut R,
) -> Vec<usize> {
    if n >= n_features {
        return (0..n_features).collect();
    }

    let mut chosen = index::sample(rng, n_features, n).into_vec();
    chosen.sort_unstable();
    chosen
}

/// Choose `ceil(n_features * p)` features, keeping at least one.
pub fn select_features_proportion<R: Rng + ?Sized>(
    n_features: usize,
    p: f64,
    rng: &mut R,
) -> Result<Vec<usize>, SamplingError> {
    check_proportion(p)?;
    let n = ((n_features as f64 * p).ceil() as usize).clamp(1, n_features.max(1));
    Ok(select_random_features(n_features, n, rng))
}
