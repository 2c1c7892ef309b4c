//! Convenience re-exports for common usage.
//!
//! # Usage
//!
//! ```
//! use distar::prelude::*;
//! ```

pub use crate::calculator::{MetricMatrix, ModelDistancesCalculator};
pub use crate::error::{DistarError, Result};
pub use crate::logs::AccuracyLog;
pub use crate::metrics::DistanceMetric;
pub use crate::model::{ModelCategory, StateDict, Tensor};
pub use crate::primitives::{Matrix, Vector};
pub use crate::select::{top_index_count, top_indices, TopIndexSet};
