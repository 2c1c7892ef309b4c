//! Distance matrix assembly across a set of model checkpoints.
//!
//! [`ModelDistancesCalculator`] drives the whole run: validate the
//! configuration, flatten checkpoints into weight vectors (skipping
//! unusable models), derive the shared top-index selection, then build one
//! dense `M×M` matrix per metric over every ordered pair, diagonal
//! included. The computation is a stateless batch; the only sequencing
//! constraint is that top-index sets exist before the coordinate-based
//! matrix is assembled.

use crate::error::{DistarError, Result};
use crate::export;
use crate::metrics::{
    cosine_distance, coordinate_distance, euclidean_distance, jensen_shannon_distance,
    wasserstein_distance, DistanceMetric,
};
use crate::model::{ModelCategory, StateDict};
use crate::primitives::{Matrix, Vector};
use crate::select::{top_index_count, top_indices, TopIndexSet};
use std::path::{Path, PathBuf};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// One assembled distance matrix, tagged with its metric.
#[derive(Debug, Clone)]
pub struct MetricMatrix {
    /// The metric that produced this matrix
    pub metric: DistanceMetric,
    /// Dense `M×M` pairwise distances
    pub matrix: Matrix<f32>,
}

/// Computes pairwise distance matrices for one model category.
///
/// # Examples
///
/// ```
/// use distar::calculator::ModelDistancesCalculator;
/// use distar::model::{ModelCategory, StateDict, Tensor};
///
/// let mut calc = ModelDistancesCalculator::new(ModelCategory::Cnn, 0.5, 5).unwrap();
///
/// let mut node = StateDict::new();
/// node.insert("w", Tensor::new(vec![3], vec![1.0, 2.0, 3.0]).unwrap());
/// calc.extract_weights(vec![node.clone(), node]).unwrap();
///
/// let matrices = calc.compute_distance_matrices().unwrap();
/// assert_eq!(matrices.len(), 5);
/// assert_eq!(matrices[0].matrix.shape(), (2, 2));
/// ```
#[derive(Debug)]
pub struct ModelDistancesCalculator {
    category: ModelCategory,
    sensitivity: f32,
    precision: usize,
    weights: Vec<Vector<f32>>,
    top_index_sets: Vec<TopIndexSet>,
    top_count: usize,
}

impl ModelDistancesCalculator {
    /// Creates a calculator, validating the configuration up front.
    ///
    /// `sensitivity` is the fraction of coordinates treated as
    /// top-importance; `precision` is the decimal precision used when
    /// matrices are serialized.
    ///
    /// # Errors
    ///
    /// Returns `InvalidHyperparameter` unless `0 < sensitivity <= 1` and
    /// `precision >= 1`.
    pub fn new(category: ModelCategory, sensitivity: f32, precision: usize) -> Result<Self> {
        if !sensitivity.is_finite() || sensitivity <= 0.0 || sensitivity > 1.0 {
            return Err(DistarError::InvalidHyperparameter {
                param: "sensitivity".to_string(),
                value: format!("{sensitivity}"),
                constraint: "0 < sensitivity <= 1".to_string(),
            });
        }
        if precision < 1 {
            return Err(DistarError::InvalidHyperparameter {
                param: "precision".to_string(),
                value: format!("{precision}"),
                constraint: "precision >= 1".to_string(),
            });
        }

        Ok(Self {
            category,
            sensitivity,
            precision,
            weights: Vec::new(),
            top_index_sets: Vec::new(),
            top_count: 0,
        })
    }

    /// Flattens the given checkpoints into weight vectors and prepares the
    /// shared top-index selection.
    ///
    /// Models that fail to flatten are skipped with a diagnostic and the
    /// run continues with the rest. All surviving vectors must share one
    /// length; `p` and every per-model top-index set are derived from it
    /// before this method returns.
    ///
    /// # Errors
    ///
    /// Returns `NotEnoughModels` if fewer than two usable vectors remain,
    /// and `DimensionMismatch` if vector lengths differ (vectors are never
    /// truncated or padded).
    pub fn extract_weights(&mut self, models: Vec<StateDict>) -> Result<()> {
        let mut weights = Vec::with_capacity(models.len());
        for (idx, model) in models.iter().enumerate() {
            match model.flatten() {
                Ok(w) => weights.push(w),
                Err(e) => eprintln!("Skipping model at index {idx}: {e}"),
            }
        }

        if weights.len() < 2 {
            return Err(DistarError::NotEnoughModels {
                found: weights.len(),
            });
        }

        let n = weights[0].len();
        for w in &weights {
            if w.len() != n {
                return Err(DistarError::dimension_mismatch("len", n, w.len()));
            }
        }

        self.top_count = top_index_count(self.sensitivity, n);
        self.top_index_sets = weights
            .iter()
            .map(|w| top_indices(w, self.top_count))
            .collect();
        self.weights = weights;
        Ok(())
    }

    /// Number of usable models currently loaded.
    #[must_use]
    pub fn n_models(&self) -> usize {
        self.weights.len()
    }

    /// Shared flattened vector length `N` (0 before weights are loaded).
    #[must_use]
    pub fn vector_len(&self) -> usize {
        self.weights.first().map_or(0, Vector::len)
    }

    /// Shared top-index selection size `p` (0 before weights are loaded).
    #[must_use]
    pub fn top_count(&self) -> usize {
        self.top_count
    }

    /// The model category this run compares.
    #[must_use]
    pub fn category(&self) -> ModelCategory {
        self.category
    }

    /// Decimal precision used for serialized matrices.
    #[must_use]
    pub fn precision(&self) -> usize {
        self.precision
    }

    fn pair_distance(&self, metric: DistanceMetric, i: usize, j: usize) -> Result<f32> {
        match metric {
            DistanceMetric::Euclidean => euclidean_distance(&self.weights[i], &self.weights[j]),
            DistanceMetric::Cosine => cosine_distance(&self.weights[i], &self.weights[j]),
            DistanceMetric::CoordinateBased => Ok(coordinate_distance(
                &self.top_index_sets[i],
                &self.top_index_sets[j],
                self.top_count,
            )),
            DistanceMetric::JensenShannon => {
                jensen_shannon_distance(&self.weights[i], &self.weights[j])
            }
            DistanceMetric::Wasserstein => {
                Ok(wasserstein_distance(&self.weights[i], &self.weights[j]))
            }
        }
    }

    fn distance_row(&self, metric: DistanceMetric, i: usize) -> Result<Vec<f32>> {
        (0..self.weights.len())
            .map(|j| self.pair_distance(metric, i, j))
            .collect()
    }

    /// Assembles the `M×M` distance matrix for one metric.
    ///
    /// Every ordered pair `(i, j)` is computed, including the diagonal,
    /// even for symmetric metrics, so the output format stays uniform.
    ///
    /// # Errors
    ///
    /// Returns `NotEnoughModels` if weights haven't been extracted yet.
    pub fn compute_matrix(&self, metric: DistanceMetric) -> Result<Matrix<f32>> {
        let m = self.weights.len();
        if m < 2 {
            return Err(DistarError::NotEnoughModels { found: m });
        }

        #[cfg(feature = "parallel")]
        let rows: Result<Vec<Vec<f32>>> = (0..m)
            .into_par_iter()
            .map(|i| self.distance_row(metric, i))
            .collect();

        #[cfg(not(feature = "parallel"))]
        let rows: Result<Vec<Vec<f32>>> = (0..m).map(|i| self.distance_row(metric, i)).collect();

        Matrix::from_rows(rows?).map_err(DistarError::from)
    }

    /// Assembles one matrix per metric, in [`DistanceMetric::ALL`] order.
    ///
    /// # Errors
    ///
    /// Returns `NotEnoughModels` if weights haven't been extracted yet.
    pub fn compute_distance_matrices(&self) -> Result<Vec<MetricMatrix>> {
        DistanceMetric::ALL
            .into_iter()
            .map(|metric| {
                Ok(MetricMatrix {
                    metric,
                    matrix: self.compute_matrix(metric)?,
                })
            })
            .collect()
    }

    /// Assembles all matrices and writes each to its CSV file under
    /// `out_root`, returning the written paths.
    ///
    /// # Errors
    ///
    /// Propagates assembly errors and I/O failures from the sink.
    pub fn write_csv_reports(&self, out_root: &Path) -> Result<Vec<PathBuf>> {
        let mut paths = Vec::with_capacity(DistanceMetric::ALL.len());
        for report in self.compute_distance_matrices()? {
            paths.push(export::write_distance_matrix(
                out_root,
                &report.matrix,
                report.metric,
                self.category,
                self.precision,
            )?);
        }
        Ok(paths)
    }
}
