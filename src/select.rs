//! Top-importance coordinate selection.
//!
//! For the coordinate-based metric, each model is represented by the set of
//! its `p` largest-magnitude weight indices. `p` is derived once per run
//! from the shared vector length, so every model's set is comparable.

use crate::primitives::Vector;
use std::cmp::Ordering;
use std::collections::HashSet;

/// The top-importance coordinate indices of one model's weight vector.
///
/// Only set membership matters; there is no ordering among the indices.
pub type TopIndexSet = HashSet<usize>;

/// Number of top coordinates for a sensitivity fraction over `n` weights.
///
/// `p = max(1, floor(sensitivity * n))` — at least one coordinate is always
/// selected, even for tiny fractions.
///
/// # Examples
///
/// ```
/// use distar::select::top_index_count;
///
/// assert_eq!(top_index_count(0.5, 10), 5);
/// assert_eq!(top_index_count(0.01, 50), 1);
/// ```
#[must_use]
pub fn top_index_count(sensitivity: f32, n: usize) -> usize {
    let p = (sensitivity * n as f32).floor() as usize;
    p.max(1)
}

/// Selects the indices of the `p` largest-magnitude coordinates.
///
/// Ties are broken deterministically by ascending index, so equal inputs
/// always yield equal sets. If `p` exceeds the vector length, every index
/// is returned.
#[must_use]
pub fn top_indices(weights: &Vector<f32>, p: usize) -> TopIndexSet {
    let mut indices: Vec<usize> = (0..weights.len()).collect();
    indices.sort_unstable_by(|&a, &b| {
        weights[b]
            .abs()
            .partial_cmp(&weights[a].abs())
            .unwrap_or(Ordering::Equal)
            .then(a.cmp(&b))
    });
    indices.truncate(p);
    indices.into_iter().collect()
}
