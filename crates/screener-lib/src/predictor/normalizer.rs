//! Feature normalization for model inference
//!
//! Maps a raw patient record into the canonical row the pipeline was
//! trained on: Yes/No flags become 0/1 integers, categorical strings
//! pass through verbatim (the pipeline owns their encoding), and the
//! column set is reconciled against whatever schema the model declares.

use crate::error::{Result, ScreenerError};
use crate::models::{
    BinaryFlag, CanonicalFeatureRecord, FeatureValue, PatientRecord, DEFAULT_FEATURE_COLUMNS,
};
use tracing::debug;

/// Builds canonical feature records from raw input
#[derive(Debug, Clone, Default)]
pub struct FeatureNormalizer;

impl FeatureNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// Normalize a raw record against the model's expected columns.
    ///
    /// With `Some(columns)` the output carries exactly those columns in
    /// that order: expected columns the input cannot supply are present
    /// as [`FeatureValue::Missing`] (the pipeline imputes them), and
    /// input columns the model does not expect are dropped. With `None`
    /// the default training schema applies.
    pub fn normalize(
        &self,
        raw: &PatientRecord,
        expected_columns: Option<&[String]>,
    ) -> Result<CanonicalFeatureRecord> {
        let mut supplied = vec![
            ("age", FeatureValue::Int(i64::from(raw.age))),
            ("gender", FeatureValue::Text(raw.gender.clone())),
            (
                "hypertension",
                FeatureValue::Int(flag_to_int("hypertension", &raw.hypertension)?),
            ),
            (
                "heart_disease",
                FeatureValue::Int(flag_to_int("heart_disease", &raw.heart_disease)?),
            ),
            (
                "smoking_history",
                FeatureValue::Text(raw.smoking_history.clone()),
            ),
            ("bmi", FeatureValue::Float(raw.bmi)),
            ("HbA1c_level", FeatureValue::Float(raw.hba1c_level)),
            (
                "blood_glucose_level",
                FeatureValue::Float(raw.blood_glucose_level),
            ),
        ];

        let fields = match expected_columns {
            Some(columns) => {
                if columns.is_empty() {
                    return Err(ScreenerError::SchemaMismatch {
                        reason: "model declared an empty column list".to_string(),
                    });
                }
                let dropped = supplied
                    .iter()
                    .filter(|(name, _)| !columns.iter().any(|c| c == name))
                    .count();
                if dropped > 0 {
                    debug!(dropped, "Dropping input columns the model does not expect");
                }
                columns
                    .iter()
                    .map(|column| {
                        let value = supplied
                            .iter_mut()
                            .find(|(name, _)| name == column)
                            .map(|(_, value)| std::mem::replace(value, FeatureValue::Missing))
                            .unwrap_or(FeatureValue::Missing);
                        (column.clone(), value)
                    })
                    .collect()
            }
            None => {
                debug!("Model exposes no column list, using default training schema");
                supplied
                    .into_iter()
                    .map(|(name, value)| (name.to_string(), value))
                    .collect()
            }
        };

        Ok(CanonicalFeatureRecord::new(fields))
    }
}

/// Translate an input-boundary boolean into the 0/1 encoding the
/// pipeline was trained on. Labels are matched case-insensitively;
/// numerics must already be 0 or 1.
fn flag_to_int(field: &'static str, flag: &BinaryFlag) -> Result<i64> {
    match flag {
        BinaryFlag::Numeric(0) => Ok(0),
        BinaryFlag::Numeric(1) => Ok(1),
        BinaryFlag::Numeric(other) => Err(ScreenerError::UnknownCategory {
            field,
            value: other.to_string(),
        }),
        BinaryFlag::Label(label) => match label.to_ascii_lowercase().as_str() {
            "yes" => Ok(1),
            "no" => Ok(0),
            _ => Err(ScreenerError::UnknownCategory {
                field,
                value: label.clone(),
            }),
        },
    }
}
