//! CSV persistence for assembled distance matrices.
//!
//! One file per metric, under a directory keyed by category:
//! `{root}/{category}/{metric}_distance.csv`. One row per model,
//! comma-delimited, every value rendered with a fixed decimal precision.
//! This table is the durable artifact downstream tooling consumes.

use crate::error::Result;
use crate::metrics::DistanceMetric;
use crate::model::ModelCategory;
use crate::primitives::Matrix;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

/// Renders a matrix as fixed-precision CSV text.
///
/// NaN sentinels (undefined Jensen-Shannon pairs) render as `NaN`.
#[must_use]
pub fn matrix_to_csv(matrix: &Matrix<f32>, precision: usize) -> String {
    let (rows, cols) = matrix.shape();
    let mut out = String::new();
    for i in 0..rows {
        for j in 0..cols {
            if j > 0 {
                out.push(',');
            }
            let _ = write!(out, "{:.precision$}", matrix.get(i, j));
        }
        out.push('\n');
    }
    out
}

/// Writes one metric's distance matrix to its CSV file, creating the
/// category directory as needed. Returns the written path.
///
/// # Errors
///
/// Returns `Io` if the directory or file can't be written.
pub fn write_distance_matrix(
    root: &Path,
    matrix: &Matrix<f32>,
    metric: DistanceMetric,
    category: ModelCategory,
    precision: usize,
) -> Result<PathBuf> {
    let dir = root.join(category.as_str());
    fs::create_dir_all(&dir)?;

    let path = dir.join(format!("{}_distance.csv", metric.name()));
    fs::write(&path, matrix_to_csv(matrix, precision))?;
    Ok(path)
}
