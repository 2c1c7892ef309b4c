//! Model checkpoints: categories, named parameter collections, flattening.
//!
//! A checkpoint is a [`StateDict`] — named tensors keyed by parameter name,
//! iterated in sorted-name order so flattening is deterministic and
//! identical across every node of one category.

pub mod loader;

use crate::error::{DistarError, Result};
use crate::primitives::Vector;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Supported model architecture families.
///
/// One category per run; all compared checkpoints must share a category so
/// their parameter layouts are comparable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelCategory {
    /// Small convolutional network
    Cnn,
    /// ResNet family
    Resnet,
    /// GoogLeNet family
    Google,
    /// AlexNet family
    Alexnet,
    /// VGG family
    Vgg,
}

impl ModelCategory {
    /// All supported categories.
    pub const ALL: [ModelCategory; 5] = [
        ModelCategory::Cnn,
        ModelCategory::Resnet,
        ModelCategory::Google,
        ModelCategory::Alexnet,
        ModelCategory::Vgg,
    ];

    /// The lowercase directory/file name for this category.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelCategory::Cnn => "cnn",
            ModelCategory::Resnet => "resnet",
            ModelCategory::Google => "google",
            ModelCategory::Alexnet => "alexnet",
            ModelCategory::Vgg => "vgg",
        }
    }
}

impl fmt::Display for ModelCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelCategory {
    type Err = DistarError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "cnn" => Ok(ModelCategory::Cnn),
            "resnet" => Ok(ModelCategory::Resnet),
            "google" => Ok(ModelCategory::Google),
            "alexnet" => Ok(ModelCategory::Alexnet),
            "vgg" => Ok(ModelCategory::Vgg),
            other => Err(DistarError::InvalidCategory {
                name: other.to_string(),
            }),
        }
    }
}

/// A single named parameter: shape plus row-major F32 values.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    /// Tensor shape (e.g., `[64, 3, 3, 3]` for a conv kernel)
    pub shape: Vec<usize>,
    /// Flattened values in row-major order
    pub data: Vec<f32>,
}

impl Tensor {
    /// Creates a tensor, validating that the data length matches the shape.
    ///
    /// # Errors
    ///
    /// Returns `FormatError` if the element count implied by `shape`
    /// doesn't match `data.len()`.
    pub fn new(shape: Vec<usize>, data: Vec<f32>) -> Result<Self> {
        let expected: usize = shape.iter().product();
        if expected != data.len() {
            return Err(DistarError::format_error(format!(
                "tensor shape {shape:?} implies {expected} elements, got {}",
                data.len()
            )));
        }
        Ok(Self { shape, data })
    }

    /// Number of elements.
    #[must_use]
    pub fn numel(&self) -> usize {
        self.data.len()
    }
}

/// A model's named-parameter collection.
///
/// Uses `BTreeMap` for deterministic (sorted-name) iteration, matching the
/// on-disk SafeTensors metadata ordering. Parameter names are unique by
/// construction.
///
/// # Examples
///
/// ```
/// use distar::model::{StateDict, Tensor};
///
/// let mut sd = StateDict::new();
/// sd.insert("fc.weight", Tensor::new(vec![2, 2], vec![1.0, 2.0, 3.0, 4.0]).unwrap());
/// sd.insert("fc.bias", Tensor::new(vec![2], vec![0.1, 0.2]).unwrap());
///
/// let flat = sd.flatten().unwrap();
/// // sorted-name order: fc.bias first, then fc.weight
/// assert_eq!(flat.as_slice(), &[0.1, 0.2, 1.0, 2.0, 3.0, 4.0]);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateDict {
    tensors: BTreeMap<String, Tensor>,
}

impl StateDict {
    /// Creates an empty state dict.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a named tensor, replacing any previous tensor of that name.
    pub fn insert(&mut self, name: impl Into<String>, tensor: Tensor) {
        self.tensors.insert(name.into(), tensor);
    }

    /// Looks up a tensor by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Tensor> {
        self.tensors.get(name)
    }

    /// Number of named parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tensors.len()
    }

    /// Returns true if the dict has no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tensors.is_empty()
    }

    /// Iterates `(name, tensor)` pairs in sorted-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Tensor)> {
        self.tensors.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Total number of scalar parameters across all tensors.
    #[must_use]
    pub fn numel(&self) -> usize {
        self.tensors.values().map(Tensor::numel).sum()
    }

    /// Flattens every parameter (weights and biases) into one vector,
    /// concatenated in sorted-name order.
    ///
    /// # Errors
    ///
    /// Returns `FormatError` if the dict holds no parameter values, either
    /// because it has no tensors at all or because every tensor is
    /// zero-length; the caller skips such models and continues with the
    /// rest. Rejecting zero-length flattens here keeps downstream vector
    /// lengths strictly positive.
    pub fn flatten(&self) -> Result<Vector<f32>> {
        if self.numel() == 0 {
            return Err(DistarError::format_error(
                "state dict holds no parameter values, nothing to flatten",
            ));
        }
        let mut flat = Vec::with_capacity(self.numel());
        for tensor in self.tensors.values() {
            flat.extend_from_slice(&tensor.data);
        }
        Ok(Vector::from_vec(flat))
    }
}
