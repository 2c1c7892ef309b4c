//! Core numeric primitives (Vector, Matrix).
//!
//! These types carry the flattened model weights and the assembled
//! distance matrices.

mod matrix;
mod vector;

pub use matrix::Matrix;
pub use vector::Vector;
