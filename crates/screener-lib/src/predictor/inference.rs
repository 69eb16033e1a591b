//! ONNX Runtime inference using tract
//!
//! Wraps a serialized classification pipeline loaded via tract-onnx.
//! The pipeline is opaque: this wrapper only exposes the two inference
//! capabilities plus optional schema introspection via a sidecar file,
//! since the ONNX export does not preserve training column names.

use super::RiskModel;
use crate::error::{Result, ScreenerError};
use crate::models::{CanonicalFeatureRecord, FeatureValue, DEFAULT_FEATURE_COLUMNS};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tract_onnx::prelude::*;
use tracing::{debug, warn};

/// Maximum inference latency before warning (5ms target)
pub const MAX_INFERENCE_MS: u128 = 5;

type TractModel = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// Sidecar description of the exported pipeline's input schema:
/// training columns in order, plus the category vocabulary the
/// pipeline's encoder was fit with for each text column.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelSchema {
    pub columns: Vec<String>,
    #[serde(default)]
    pub categories: HashMap<String, Vec<String>>,
}

impl ModelSchema {
    /// Load a schema sidecar (JSON) from disk.
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| ScreenerError::Schema {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        serde_json::from_str(&raw).map_err(|e| ScreenerError::Schema {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

/// Category vocabularies of the default training schema, used when no
/// sidecar is available. Alphabetical, matching the encoder's fit order.
fn default_categories() -> HashMap<String, Vec<String>> {
    let mut categories = HashMap::new();
    categories.insert(
        "gender".to_string(),
        vec![
            "Female".to_string(),
            "Male".to_string(),
            "Other".to_string(),
        ],
    );
    categories.insert(
        "smoking_history".to_string(),
        vec![
            "current".to_string(),
            "ever".to_string(),
            "former".to_string(),
            "never".to_string(),
            "not current".to_string(),
        ],
    );
    categories
}

/// ONNX-based classifier using tract for lightweight inference
pub struct OnnxClassifier {
    model: TractModel,
    schema: Option<ModelSchema>,
    categories: HashMap<String, Vec<String>>,
    num_features: usize,
    version: String,
    inference_count: AtomicU64,
    slow_inference_count: AtomicU64,
}

impl OnnxClassifier {
    /// Load the pipeline once at process startup. The optional sidecar
    /// supplies the training columns; without it the classifier falls
    /// back to the default fixed schema.
    pub fn from_path(model_path: &Path, schema_path: Option<&Path>) -> Result<Self> {
        let schema = schema_path.map(ModelSchema::from_path).transpose()?;
        let num_features = schema
            .as_ref()
            .map(|s| s.columns.len())
            .unwrap_or(DEFAULT_FEATURE_COLUMNS.len());

        let model_bytes = std::fs::read(model_path).map_err(|e| ScreenerError::ModelLoad {
            path: model_path.to_path_buf(),
            message: e.to_string(),
        })?;
        let model =
            Self::load_model(&model_bytes, num_features).map_err(|e| ScreenerError::ModelLoad {
                path: model_path.to_path_buf(),
                message: e.to_string(),
            })?;

        let mut categories = default_categories();
        if let Some(schema) = &schema {
            for (column, vocabulary) in &schema.categories {
                categories.insert(column.clone(), vocabulary.clone());
            }
        }

        let version = model_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "unknown".to_string());

        Ok(Self {
            model,
            schema,
            categories,
            num_features,
            version,
            inference_count: AtomicU64::new(0),
            slow_inference_count: AtomicU64::new(0),
        })
    }

    /// Parse and optimize an ONNX pipeline from bytes
    fn load_model(model_bytes: &[u8], num_features: usize) -> TractResult<TractModel> {
        tract_onnx::onnx()
            .model_for_read(&mut std::io::Cursor::new(model_bytes))?
            .with_input_fact(0, f32::fact([1, num_features]).into())?
            .into_optimized()?
            .into_runnable()
    }

    /// Run the pipeline on a single-record batch.
    fn run(&self, record: &CanonicalFeatureRecord) -> Result<TVec<TValue>> {
        if record.len() != self.num_features {
            return Err(ScreenerError::SchemaMismatch {
                reason: format!(
                    "record has {} columns, model expects {}",
                    record.len(),
                    self.num_features
                ),
            });
        }

        let data = encode_record(record, &self.categories)?;
        let input: Tensor = tract_ndarray::Array2::from_shape_vec((1, self.num_features), data)
            .map_err(|e| ScreenerError::Inference {
                cause: e.to_string(),
            })?
            .into();

        let start = Instant::now();
        let outputs = self
            .model
            .run(tvec!(input.into()))
            .map_err(|e| ScreenerError::Inference {
                cause: e.to_string(),
            })?;

        let elapsed = start.elapsed();
        self.inference_count.fetch_add(1, Ordering::Relaxed);
        if elapsed.as_millis() > MAX_INFERENCE_MS {
            self.slow_inference_count.fetch_add(1, Ordering::Relaxed);
            warn!(
                elapsed_ms = elapsed.as_millis(),
                "Inference exceeded {}ms target", MAX_INFERENCE_MS
            );
        } else {
            debug!(elapsed_us = elapsed.as_micros(), "Inference completed");
        }

        Ok(outputs)
    }

    /// Get inference statistics
    pub fn stats(&self) -> InferenceStats {
        InferenceStats {
            total_inferences: self.inference_count.load(Ordering::Relaxed),
            slow_inferences: self.slow_inference_count.load(Ordering::Relaxed),
        }
    }
}

impl RiskModel for OnnxClassifier {
    fn classify(&self, record: &CanonicalFeatureRecord) -> Result<i64> {
        let outputs = self.run(record)?;
        // Exported classifiers emit [label, probabilities]; graphs
        // stripped to a single output carry probabilities only.
        if outputs.len() >= 2 {
            read_class(&outputs[0])
        } else {
            let output = outputs.first().ok_or_else(|| ScreenerError::Inference {
                cause: "model produced no outputs".to_string(),
            })?;
            let probs = read_probabilities(output)?;
            Ok(i64::from(probs[1] >= probs[0]))
        }
    }

    fn estimate_probability(&self, record: &CanonicalFeatureRecord) -> Result<[f32; 2]> {
        let outputs = self.run(record)?;
        let output = outputs.last().ok_or_else(|| ScreenerError::Inference {
            cause: "model produced no outputs".to_string(),
        })?;
        read_probabilities(output)
    }

    fn expected_columns(&self) -> Option<&[String]> {
        self.schema.as_ref().map(|s| s.columns.as_slice())
    }

    fn version(&self) -> &str {
        &self.version
    }
}

/// Encode a canonical record into the pipeline's f32 input row.
///
/// The encoding mirrors what the pipeline was fit with: numerics cast
/// to f32, missing markers as NaN (the pipeline's imputer handles
/// them), and text values by their vocabulary index.
fn encode_record(
    record: &CanonicalFeatureRecord,
    categories: &HashMap<String, Vec<String>>,
) -> Result<Vec<f32>> {
    record
        .iter()
        .map(|(column, value)| match value {
            FeatureValue::Int(v) => Ok(*v as f32),
            FeatureValue::Float(v) => Ok(*v as f32),
            FeatureValue::Missing => Ok(f32::NAN),
            FeatureValue::Text(text) => {
                let vocabulary =
                    categories
                        .get(column)
                        .ok_or_else(|| ScreenerError::SchemaMismatch {
                            reason: format!("no category vocabulary for column '{column}'"),
                        })?;
                vocabulary
                    .iter()
                    .position(|known| known == text)
                    .map(|index| index as f32)
                    .ok_or_else(|| ScreenerError::SchemaMismatch {
                        reason: format!(
                            "value '{text}' not in the model's '{column}' vocabulary"
                        ),
                    })
            }
        })
        .collect()
}

fn read_class(output: &TValue) -> Result<i64> {
    if let Ok(view) = output.to_array_view::<i64>() {
        return view
            .iter()
            .next()
            .copied()
            .ok_or_else(|| ScreenerError::Inference {
                cause: "empty label output".to_string(),
            });
    }
    let view = output
        .to_array_view::<f32>()
        .map_err(|e| ScreenerError::Inference {
            cause: e.to_string(),
        })?;
    let value = view
        .iter()
        .next()
        .copied()
        .ok_or_else(|| ScreenerError::Inference {
            cause: "empty label output".to_string(),
        })?;
    Ok(value.round() as i64)
}

fn read_probabilities(output: &TValue) -> Result<[f32; 2]> {
    let view = output
        .to_array_view::<f32>()
        .map_err(|e| ScreenerError::Inference {
            cause: e.to_string(),
        })?;
    let values: Vec<f32> = view.iter().copied().collect();
    match values.as_slice() {
        [] => Err(ScreenerError::Inference {
            cause: "empty probability output".to_string(),
        }),
        [p_risk] => Ok([1.0 - p_risk, *p_risk]),
        [p_no_risk, p_risk, ..] => Ok([*p_no_risk, *p_risk]),
    }
}

/// Inference statistics
#[derive(Debug, Clone)]
pub struct InferenceStats {
    pub total_inferences: u64,
    pub slow_inferences: u64,
}
