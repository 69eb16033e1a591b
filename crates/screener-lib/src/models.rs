//! Core data models for the risk screener

use serde::{Deserialize, Serialize};

/// Feature columns the pipeline was trained on, in training order.
///
/// Used whenever the model does not expose its own column list.
pub const DEFAULT_FEATURE_COLUMNS: [&str; 8] = [
    "age",
    "gender",
    "hypertension",
    "heart_disease",
    "smoking_history",
    "bmi",
    "HbA1c_level",
    "blood_glucose_level",
];

/// A boolean health attribute as it arrives from the input boundary:
/// either a Yes/No label or an already-encoded 0/1 value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BinaryFlag {
    Numeric(u8),
    Label(String),
}

/// Raw patient attributes for one screening request
///
/// All fields are bound-validated by the input boundary before they
/// reach the normalizer (see [`crate::bounds::InputBounds`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientRecord {
    pub age: u32,
    pub gender: String,
    pub hypertension: BinaryFlag,
    pub heart_disease: BinaryFlag,
    pub smoking_history: String,
    pub bmi: f64,
    #[serde(alias = "HbA1c_level")]
    pub hba1c_level: f64,
    pub blood_glucose_level: f64,
}

/// A single feature cell in the canonical record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FeatureValue {
    Int(i64),
    Float(f64),
    Text(String),
    /// Column the model expects but the input did not supply.
    /// Imputation is the pipeline's job, not ours.
    Missing,
}

/// The exact row shape the model pipeline was fit against: named
/// columns in model order, one value per column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalFeatureRecord {
    fields: Vec<(String, FeatureValue)>,
}

impl CanonicalFeatureRecord {
    pub fn new(fields: Vec<(String, FeatureValue)>) -> Self {
        Self { fields }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn get(&self, column: &str) -> Option<&FeatureValue> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FeatureValue)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }
}

/// Binary screening outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLabel {
    Risk,
    NoRisk,
}

impl RiskLabel {
    pub fn from_class(class: i64) -> Self {
        if class == 1 {
            RiskLabel::Risk
        } else {
            RiskLabel::NoRisk
        }
    }
}

/// Screening result surfaced to the output boundary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub label: RiskLabel,
    /// Probability mass assigned to the at-risk class, in [0, 1].
    pub probability: f32,
    pub model_version: String,
    pub generated_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_flag_accepts_both_encodings() {
        let from_label: BinaryFlag = serde_json::from_str("\"Yes\"").unwrap();
        assert_eq!(from_label, BinaryFlag::Label("Yes".to_string()));

        let from_numeric: BinaryFlag = serde_json::from_str("1").unwrap();
        assert_eq!(from_numeric, BinaryFlag::Numeric(1));
    }

    #[test]
    fn test_patient_record_hba1c_alias() {
        let json = r#"{
            "age": 35,
            "gender": "Male",
            "hypertension": "No",
            "heart_disease": 0,
            "smoking_history": "never",
            "bmi": 25.0,
            "HbA1c_level": 5.5,
            "blood_glucose_level": 100.0
        }"#;
        let record: PatientRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.age, 35);
        assert!((record.hba1c_level - 5.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_label_from_class() {
        assert_eq!(RiskLabel::from_class(1), RiskLabel::Risk);
        assert_eq!(RiskLabel::from_class(0), RiskLabel::NoRisk);
    }

    #[test]
    fn test_record_lookup_preserves_order() {
        let record = CanonicalFeatureRecord::new(vec![
            ("age".to_string(), FeatureValue::Int(35)),
            ("bmi".to_string(), FeatureValue::Float(25.0)),
        ]);
        let columns: Vec<&str> = record.columns().collect();
        assert_eq!(columns, vec!["age", "bmi"]);
        assert_eq!(record.get("age"), Some(&FeatureValue::Int(35)));
        assert_eq!(record.get("glucose"), None);
    }
}
