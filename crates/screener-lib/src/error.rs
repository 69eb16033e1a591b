//! Error types for the risk screener core.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while normalizing input or running inference.
#[derive(Debug, Error)]
pub enum ScreenerError {
    /// Raw input cannot be reconciled with the columns the model expects.
    #[error("schema mismatch: {reason}")]
    SchemaMismatch { reason: String },

    /// The model's classify or probability-estimation call failed.
    #[error("inference failed: {cause}")]
    Inference { cause: String },

    /// The serialized pipeline could not be loaded.
    #[error("failed to load model {path}: {message}")]
    ModelLoad { path: PathBuf, message: String },

    /// The sidecar schema file could not be read or parsed.
    #[error("failed to read model schema {path}: {message}")]
    Schema { path: PathBuf, message: String },

    /// A numeric field is outside its configured bounds.
    #[error("{field} value {value} outside allowed range [{min}, {max}]")]
    OutOfBounds {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// A categorical field holds a value outside its allowed set.
    #[error("unrecognized {field} value '{value}'")]
    UnknownCategory { field: &'static str, value: String },
}

/// Result type for screener operations.
pub type Result<T> = std::result::Result<T, ScreenerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ScreenerError::Inference {
            cause: "output tensor missing".to_string(),
        };
        assert_eq!(err.to_string(), "inference failed: output tensor missing");

        let err = ScreenerError::OutOfBounds {
            field: "age",
            value: 130.0,
            min: 1.0,
            max: 120.0,
        };
        assert_eq!(
            err.to_string(),
            "age value 130 outside allowed range [1, 120]"
        );
    }
}
