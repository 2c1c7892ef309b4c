//! Distar: pairwise distance matrices for federated model checkpoints.
//!
//! Given the trained checkpoints of a set of nodes sharing one model
//! architecture, distar flattens each into a weight vector and computes
//! five pairwise distance matrices — Euclidean, Cosine, coordinate-based
//! (top-importance index overlap), Jensen-Shannon, and Wasserstein —
//! serialized as fixed-precision CSV, one file per metric. A companion
//! log scanner extracts per-round test-accuracy trends from training
//! logs.
//!
//! # Quick Start
//!
//! ```
//! use distar::prelude::*;
//!
//! // Two tiny "checkpoints" of the same architecture.
//! let mut node = StateDict::new();
//! node.insert("fc.weight", Tensor::new(vec![2, 2], vec![1.0, 2.0, 3.0, 4.0]).unwrap());
//! let other = node.clone();
//!
//! let mut calc = ModelDistancesCalculator::new(ModelCategory::Cnn, 0.5, 5).unwrap();
//! calc.extract_weights(vec![node, other]).unwrap();
//!
//! let reports = calc.compute_distance_matrices().unwrap();
//! assert_eq!(reports.len(), 5);
//! // Identical models: Euclidean distance matrix is all-zero.
//! assert!(reports[0].matrix.as_slice().iter().all(|d| d.abs() < 1e-6));
//! ```
//!
//! # Modules
//!
//! - [`primitives`]: Core Vector and Matrix types
//! - [`model`]: Model categories, state dicts, flattening, checkpoint I/O
//! - [`select`]: Top-importance coordinate selection
//! - [`metrics`]: The five pairwise distance metrics
//! - [`calculator`]: Distance matrix assembly per category
//! - [`export`]: Fixed-precision CSV persistence
//! - [`logs`]: Training-log accuracy-trend extraction
//!
//! Enable the `parallel` feature to assemble matrix rows with Rayon.

pub mod calculator;
pub mod error;
pub mod export;
pub mod logs;
pub mod metrics;
pub mod model;
pub mod prelude;
pub mod primitives;
pub mod select;

pub use calculator::{MetricMatrix, ModelDistancesCalculator};
pub use error::{DistarError, Result};
pub use metrics::DistanceMetric;
pub use model::{ModelCategory, StateDict, Tensor};
pub use primitives::{Matrix, Vector};
