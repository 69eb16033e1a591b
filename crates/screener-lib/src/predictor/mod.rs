//! Inference pipeline: normalization and prediction

mod adapter;
mod inference;
mod normalizer;

pub use adapter::RiskPredictor;
pub use inference::{InferenceStats, ModelSchema, OnnxClassifier, MAX_INFERENCE_MS};
pub use normalizer::FeatureNormalizer;

use crate::error::Result;
use crate::models::CanonicalFeatureRecord;

/// Narrow interface over the trained classification pipeline.
///
/// Any wrapper around a serialized model implements the two required
/// inference capabilities; schema introspection is optional because
/// not every serialization format preserves the training columns.
pub trait RiskModel: Send + Sync {
    /// Predicted class for a single record: 1 = at risk, 0 = not.
    fn classify(&self, record: &CanonicalFeatureRecord) -> Result<i64>;

    /// Class probabilities `[p_no_risk, p_risk]` for a single record.
    fn estimate_probability(&self, record: &CanonicalFeatureRecord) -> Result<[f32; 2]>;

    /// Columns the pipeline was trained on, in training order, when
    /// the artifact exposes them.
    fn expected_columns(&self) -> Option<&[String]> {
        None
    }

    /// Version identifier of the loaded model artifact.
    fn version(&self) -> &str;
}
