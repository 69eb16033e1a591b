//! Core library for the diabetes risk screener
//!
//! This crate provides the core functionality for:
//! - Input-boundary validation with configurable bounds
//! - Feature normalization and schema reconciliation
//! - ONNX pipeline inference and result adaptation

pub mod bounds;
pub mod error;
pub mod models;
pub mod predictor;

pub use bounds::InputBounds;
pub use error::{Result, ScreenerError};
pub use models::*;
pub use predictor::{
    FeatureNormalizer, InferenceStats, ModelSchema, OnnxClassifier, RiskModel, RiskPredictor,
};
