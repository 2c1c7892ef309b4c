//! Pairwise distance metrics over model weight representations.
//!
//! Five metrics, two representation kinds: Euclidean, Cosine,
//! Jensen-Shannon and Wasserstein compare dense weight vectors;
//! the coordinate-based metric compares top-importance index sets.
//!
//! Every function is pure and callable independently. Numeric edge cases
//! (all-zero cosine inputs, zero-sum Jensen-Shannon inputs, empty
//! Wasserstein samples) resolve to documented sentinel values, never
//! errors; only structural problems (length mismatches) are errors.

use crate::error::{DistarError, Result};
use crate::primitives::Vector;
use crate::select::TopIndexSet;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Threshold below which a norm is treated as zero.
///
/// Larger than `f32::EPSILON` for numerical headroom while still only
/// catching degenerate vectors.
pub const NORM_EPSILON: f32 = 1e-9;

/// Floor applied to normalized distributions before the Jensen-Shannon
/// logarithms, avoiding log(0).
pub const DISTRIBUTION_FLOOR: f32 = 1e-12;

/// The available pairwise distance metrics.
///
/// [`DistanceMetric::name`] yields the canonical names used to tag
/// persisted matrices: `"Euclidean"`, `"Cosine"`, `"coordinate-based"`,
/// `"Jensen-Shannon"`, `"Wasserstein"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DistanceMetric {
    /// L2 norm of the elementwise difference
    Euclidean,
    /// One minus cosine similarity
    Cosine,
    /// Top-importance index-set overlap
    CoordinateBased,
    /// Square root of the Jensen-Shannon divergence
    JensenShannon,
    /// 1-D earth-mover distance
    Wasserstein,
}

impl DistanceMetric {
    /// All metrics, in the order matrices are produced.
    pub const ALL: [DistanceMetric; 5] = [
        DistanceMetric::Euclidean,
        DistanceMetric::Cosine,
        DistanceMetric::CoordinateBased,
        DistanceMetric::JensenShannon,
        DistanceMetric::Wasserstein,
    ];

    /// Canonical metric name, as used in result file names.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            DistanceMetric::Euclidean => "Euclidean",
            DistanceMetric::Cosine => "Cosine",
            DistanceMetric::CoordinateBased => "coordinate-based",
            DistanceMetric::JensenShannon => "Jensen-Shannon",
            DistanceMetric::Wasserstein => "Wasserstein",
        }
    }

    /// Whether this metric consumes top-index sets instead of dense vectors.
    #[must_use]
    pub fn uses_top_indices(&self) -> bool {
        matches!(self, DistanceMetric::CoordinateBased)
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DistanceMetric {
    type Err = DistarError;

    fn from_str(s: &str) -> Result<Self> {
        DistanceMetric::ALL
            .into_iter()
            .find(|m| m.name() == s)
            .ok_or_else(|| DistarError::Other(format!("unknown distance metric: {s}")))
    }
}

fn check_same_length(u: &Vector<f32>, v: &Vector<f32>) -> Result<()> {
    if u.len() != v.len() {
        return Err(DistarError::dimension_mismatch("len", u.len(), v.len()));
    }
    Ok(())
}

/// Euclidean (L2) distance between two weight vectors.
///
/// # Errors
///
/// Returns `DimensionMismatch` if the vectors have different lengths.
///
/// # Examples
///
/// ```
/// use distar::metrics::euclidean_distance;
/// use distar::primitives::Vector;
///
/// let u = Vector::from_slice(&[0.0, 0.0]);
/// let v = Vector::from_slice(&[3.0, 4.0]);
/// assert!((euclidean_distance(&u, &v).unwrap() - 5.0).abs() < 1e-6);
/// ```
pub fn euclidean_distance(u: &Vector<f32>, v: &Vector<f32>) -> Result<f32> {
    check_same_length(u, v)?;
    let sum_sq: f32 = u
        .iter()
        .zip(v.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum();
    Ok(sum_sq.sqrt())
}

/// Cosine distance (one minus cosine similarity) between two weight vectors.
///
/// Returns `1.0` when either vector has (effectively) zero norm, where
/// cosine similarity is undefined. The result is clamped to `[0, 2]`
/// against floating-point rounding.
///
/// # Errors
///
/// Returns `DimensionMismatch` if the vectors have different lengths.
pub fn cosine_distance(u: &Vector<f32>, v: &Vector<f32>) -> Result<f32> {
    check_same_length(u, v)?;

    let norm_u = u.norm();
    let norm_v = v.norm();
    if norm_u < NORM_EPSILON || norm_v < NORM_EPSILON {
        return Ok(1.0);
    }

    let similarity = u.dot(v) / (norm_u * norm_v);
    Ok((1.0 - similarity).clamp(0.0, 2.0))
}

/// Coordinate-based distance between two top-index sets.
///
/// `1 − |A ∩ B| / p` for the shared selection size `p`. Both sets have at
/// most `p` members, so the result lies in `[0, 1]`; a model compared with
/// itself overlaps fully and scores `0`.
///
/// # Panics
///
/// Panics if `p` is zero; the selector guarantees `p >= 1`.
#[must_use]
pub fn coordinate_distance(a: &TopIndexSet, b: &TopIndexSet, p: usize) -> f32 {
    assert!(p >= 1, "selection size p must be at least 1");
    let intersection = a.intersection(b).count();
    1.0 - intersection as f32 / p as f32
}

fn kl_divergence(p: &[f32], q: &[f32]) -> f32 {
    p.iter()
        .zip(q.iter())
        .map(|(pi, qi)| pi * (pi / qi).ln())
        .sum()
}

/// Jensen-Shannon distance between two unnormalized distributions.
///
/// Both inputs are taken elementwise-absolute and normalized to sum 1,
/// floored at [`DISTRIBUTION_FLOOR`] to avoid log(0), then the square root
/// of the Jensen-Shannon divergence (natural log) is returned. Values lie
/// in `[0, sqrt(ln 2)] ≈ [0, 0.8326]`; orthogonal one-hot inputs reach the
/// maximum.
///
/// Returns `NaN` when either input sums to zero after taking absolute
/// values — a sentinel, not an error.
///
/// # Errors
///
/// Returns `DimensionMismatch` if the vectors have different lengths.
pub fn jensen_shannon_distance(u: &Vector<f32>, v: &Vector<f32>) -> Result<f32> {
    check_same_length(u, v)?;

    let mut p: Vec<f32> = u.iter().map(|x| x.abs()).collect();
    let mut q: Vec<f32> = v.iter().map(|x| x.abs()).collect();

    let sum_p: f32 = p.iter().sum();
    let sum_q: f32 = q.iter().sum();
    if sum_p == 0.0 || sum_q == 0.0 {
        return Ok(f32::NAN);
    }

    normalize_clipped(&mut p, sum_p);
    normalize_clipped(&mut q, sum_q);

    let m: Vec<f32> = p.iter().zip(q.iter()).map(|(a, b)| 0.5 * (a + b)).collect();
    let divergence = 0.5 * kl_divergence(&p, &m) + 0.5 * kl_divergence(&q, &m);

    // Rounding can push a zero divergence infinitesimally negative.
    Ok(divergence.max(0.0).sqrt())
}

fn normalize_clipped(dist: &mut [f32], sum: f32) {
    for x in dist.iter_mut() {
        *x = (*x / sum).max(DISTRIBUTION_FLOOR);
    }
    let clipped_sum: f32 = dist.iter().sum();
    for x in dist.iter_mut() {
        *x /= clipped_sum;
    }
}

/// 1-D Wasserstein distance (Earth Mover's Distance) between two samples.
///
/// Both samples are sorted; unequal lengths are reconciled by linear
/// resampling to the longer length; the distance is the mean absolute
/// difference of the aligned quantiles. Returns `0.0` if either sample is
/// empty.
#[must_use]
pub fn wasserstein_distance(u: &Vector<f32>, v: &Vector<f32>) -> f32 {
    if u.is_empty() || v.is_empty() {
        return 0.0;
    }

    let mut a: Vec<f32> = u.as_slice().to_vec();
    let mut b: Vec<f32> = v.as_slice().to_vec();
    a.sort_unstable_by(|x, y| x.partial_cmp(y).unwrap_or(Ordering::Equal));
    b.sort_unstable_by(|x, y| x.partial_cmp(y).unwrap_or(Ordering::Equal));

    let n = a.len().max(b.len());
    let a = resample(&a, n);
    let b = resample(&b, n);

    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).abs())
        .sum::<f32>()
        / n as f32
}

/// Resamples a sorted array to a target length by linear interpolation.
fn resample(data: &[f32], target_len: usize) -> Vec<f32> {
    if data.len() == target_len {
        return data.to_vec();
    }
    if data.len() == 1 {
        return vec![data[0]; target_len];
    }

    let mut result = Vec::with_capacity(target_len);
    for i in 0..target_len {
        let t = i as f32 / (target_len - 1) as f32;
        let idx = t * (data.len() - 1) as f32;
        let low = idx.floor() as usize;
        let high = (low + 1).min(data.len() - 1);
        let frac = idx - low as f32;
        result.push(data[low] * (1.0 - frac) + data[high] * frac);
    }
    result
}

#[cfg(test)]
#[path = "metrics_tests.rs"]
mod tests;
