//! Vector type for 1D numeric data.

use serde::{Deserialize, Serialize};

/// A 1D vector of numeric values.
///
/// One `Vector<f32>` holds the flattened weights of a single model:
/// every learnable parameter (weights and biases alike) concatenated
/// in a deterministic order.
///
/// # Examples
///
/// ```
/// use distar::primitives::Vector;
///
/// let v = Vector::from_slice(&[3.0, 4.0]);
/// assert_eq!(v.len(), 2);
/// assert!((v.norm() - 5.0).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vector<T> {
    data: Vec<T>,
}

impl<T: Copy> Vector<T> {
    /// Creates a vector from owned data.
    #[must_use]
    pub fn from_vec(data: Vec<T>) -> Self {
        Self { data }
    }

    /// Creates a vector by copying a slice.
    #[must_use]
    pub fn from_slice(data: &[T]) -> Self {
        Self {
            data: data.to_vec(),
        }
    }

    /// Returns the number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the vector has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the underlying data as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Returns an iterator over the elements.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }
}

impl Vector<f32> {
    /// Creates a vector of zeros.
    #[must_use]
    pub fn zeros(len: usize) -> Self {
        Self {
            data: vec![0.0; len],
        }
    }

    /// Computes the dot product with another vector.
    ///
    /// # Panics
    ///
    /// Panics if the vectors have different lengths.
    #[must_use]
    pub fn dot(&self, other: &Self) -> f32 {
        assert_eq!(self.len(), other.len(), "Vectors must have same length");
        self.data
            .iter()
            .zip(other.data.iter())
            .map(|(x, y)| x * y)
            .sum()
    }

    /// Computes the L2 norm.
    #[must_use]
    pub fn norm(&self) -> f32 {
        self.data.iter().map(|x| x * x).sum::<f32>().sqrt()
    }

    /// Computes the sum of all elements.
    #[must_use]
    pub fn sum(&self) -> f32 {
        self.data.iter().sum()
    }

    /// Computes the arithmetic mean. Returns 0.0 for an empty vector.
    #[must_use]
    pub fn mean(&self) -> f32 {
        if self.data.is_empty() {
            return 0.0;
        }
        self.sum() / self.data.len() as f32
    }
}

impl<T> std::ops::Index<usize> for Vector<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.data[index]
    }
}

impl<T: Copy> From<Vec<T>> for Vector<T> {
    fn from(data: Vec<T>) -> Self {
        Self::from_vec(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_slice_len() {
        let v = Vector::from_slice(&[1.0, 2.0, 3.0]);
        assert_eq!(v.len(), 3);
        assert!(!v.is_empty());
    }

    #[test]
    fn test_dot_commutative() {
        let u = Vector::from_slice(&[1.0, 2.0, 3.0]);
        let v = Vector::from_slice(&[4.0, 5.0, 6.0]);
        assert!((u.dot(&v) - v.dot(&u)).abs() < 1e-6);
        assert!((u.dot(&v) - 32.0).abs() < 1e-6);
    }

    #[test]
    fn test_norm() {
        let v = Vector::from_slice(&[-3.0, 4.0]);
        assert!((v.norm() - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_norm_zero_vector() {
        let v = Vector::<f32>::zeros(4);
        assert!(v.norm().abs() < 1e-9);
    }

    #[test]
    fn test_mean_equals_sum_over_len() {
        let v = Vector::from_slice(&[2.0, 4.0, 6.0, 8.0, 10.0]);
        assert!((v.mean() - 6.0).abs() < 1e-6);
    }

    #[test]
    fn test_mean_empty() {
        let v = Vector::<f32>::from_vec(vec![]);
        assert!((v.mean() - 0.0).abs() < 1e-9);
    }

    #[test]
    fn test_index() {
        let v = Vector::from_slice(&[1.0f32, 2.0, 3.0]);
        assert!((v[1] - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_cauchy_schwarz() {
        let u = Vector::from_slice(&[1.0, -2.0, 3.0, 0.5]);
        let v = Vector::from_slice(&[4.0, 0.0, -1.0, 2.0]);
        assert!(u.dot(&v).abs() <= u.norm() * v.norm() + 1e-5);
    }
}
