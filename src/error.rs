//! Error types for distar operations.
//!
//! Provides rich error context for library consumers.

use std::fmt;

/// Main error type for distar operations.
///
/// Covers configuration errors (raised before any computation starts),
/// per-model load/format errors, and shape errors between weight vectors.
/// Numeric edge cases inside the distance metrics (all-zero cosine inputs,
/// zero-sum Jensen-Shannon inputs, empty Wasserstein samples) are never
/// errors; each metric resolves those locally to a sentinel value.
///
/// # Examples
///
/// ```
/// use distar::error::DistarError;
///
/// let err = DistarError::DimensionMismatch {
///     expected: "62006".to_string(),
///     actual: "31003".to_string(),
/// };
/// assert!(err.to_string().contains("dimension mismatch"));
/// ```
#[derive(Debug)]
pub enum DistarError {
    /// Model category is not one of the supported architecture families.
    InvalidCategory {
        /// The rejected category name
        name: String,
    },

    /// Invalid hyperparameter value provided.
    InvalidHyperparameter {
        /// Parameter name
        param: String,
        /// Provided value
        value: String,
        /// Constraint description
        constraint: String,
    },

    /// Weight vector dimensions don't match for the operation.
    DimensionMismatch {
        /// Expected dimensions description
        expected: String,
        /// Actual dimensions found
        actual: String,
    },

    /// Invalid or unrecognized model checkpoint format.
    FormatError {
        /// Error description
        message: String,
    },

    /// Fewer than two usable weight vectors remain after loading.
    NotEnoughModels {
        /// Number of usable models found
        found: usize,
    },

    /// I/O error (file not found, permission denied, etc.).
    Io(std::io::Error),

    /// Serialization/deserialization error.
    Serialization(String),

    /// Generic error with string message.
    Other(String),
}

impl fmt::Display for DistarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DistarError::InvalidCategory { name } => {
                write!(
                    f,
                    "Invalid model category: {name}, expected one of cnn, resnet, google, alexnet, vgg"
                )
            }
            DistarError::InvalidHyperparameter {
                param,
                value,
                constraint,
            } => {
                write!(
                    f,
                    "Invalid hyperparameter: {param} = {value}, expected {constraint}"
                )
            }
            DistarError::DimensionMismatch { expected, actual } => {
                write!(
                    f,
                    "Weight vector dimension mismatch: expected {expected}, got {actual}"
                )
            }
            DistarError::FormatError { message } => {
                write!(f, "Invalid model format: {message}")
            }
            DistarError::NotEnoughModels { found } => {
                write!(
                    f,
                    "Not enough models to compute distances: need at least 2, have {found}"
                )
            }
            DistarError::Io(e) => write!(f, "I/O error: {e}"),
            DistarError::Serialization(msg) => write!(f, "Serialization error: {msg}"),
            DistarError::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for DistarError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DistarError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for DistarError {
    fn from(err: std::io::Error) -> Self {
        DistarError::Io(err)
    }
}

impl From<&str> for DistarError {
    fn from(msg: &str) -> Self {
        DistarError::Other(msg.to_string())
    }
}

impl From<String> for DistarError {
    fn from(msg: String) -> Self {
        DistarError::Other(msg)
    }
}

impl DistarError {
    /// Create a dimension mismatch error with descriptive context
    #[must_use]
    pub fn dimension_mismatch(context: &str, expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch {
            expected: format!("{context}={expected}"),
            actual: format!("{actual}"),
        }
    }

    /// Create a format error from any displayable cause
    #[must_use]
    pub fn format_error(message: impl Into<String>) -> Self {
        Self::FormatError {
            message: message.into(),
        }
    }
}

/// Convenience type alias for Results.
pub type Result<T> = std::result::Result<T, DistarError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_category_display() {
        let err = DistarError::InvalidCategory {
            name: "transformer".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("transformer"));
        assert!(msg.contains("resnet"));
    }

    #[test]
    fn test_dimension_mismatch_display() {
        let err = DistarError::DimensionMismatch {
            expected: "1000".to_string(),
            actual: "500".to_string(),
        };
        assert!(err.to_string().contains("dimension mismatch"));
        assert!(err.to_string().contains("1000"));
    }

    #[test]
    fn test_invalid_hyperparameter_display() {
        let err = DistarError::InvalidHyperparameter {
            param: "sensitivity".to_string(),
            value: "0".to_string(),
            constraint: "0 < sensitivity <= 1".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("sensitivity"));
        assert!(msg.contains("0 < sensitivity <= 1"));
    }

    #[test]
    fn test_not_enough_models_display() {
        let err = DistarError::NotEnoughModels { found: 1 };
        let msg = err.to_string();
        assert!(msg.contains("at least 2"));
        assert!(msg.contains('1'));
    }

    #[test]
    fn test_format_error_helper() {
        let err = DistarError::format_error("missing header");
        assert!(err.to_string().contains("missing header"));
    }

    #[test]
    fn test_dimension_mismatch_helper() {
        let err = DistarError::dimension_mismatch("len", 100, 50);
        let msg = err.to_string();
        assert!(msg.contains("len=100"));
        assert!(msg.contains("50"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such checkpoint");
        let err: DistarError = io_err.into();
        assert!(matches!(err, DistarError::Io(_)));
    }

    #[test]
    fn test_error_source_io() {
        use std::error::Error;
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = DistarError::Io(io_err);
        assert!(err.source().is_some());
    }

    #[test]
    fn test_error_source_other() {
        use std::error::Error;
        let err = DistarError::Other("test".to_string());
        assert!(err.source().is_none());
    }

    #[test]
    fn test_from_str() {
        let err: DistarError = "bad input".into();
        assert_eq!(err.to_string(), "bad input");
    }
}
