//! Prediction adapter
//!
//! Turns the model's raw classify/probability outputs into a stable
//! [`RiskAssessment`] behind a single failure boundary: every model
//! fault surfaces as a typed error, never as a panic through the host.

use super::{FeatureNormalizer, RiskModel};
use crate::error::Result;
use crate::models::{CanonicalFeatureRecord, PatientRecord, RiskAssessment, RiskLabel};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Maximum end-to-end assessment latency before warning
const MAX_ASSESS_MS: u128 = 50;

/// Runs single-record risk assessments against an injected model.
///
/// The model handle is constructed once at process startup and shared
/// read-only; the adapter itself holds no per-request state, so one
/// instance serves arbitrarily many sequential requests.
pub struct RiskPredictor {
    model: Arc<dyn RiskModel>,
    normalizer: FeatureNormalizer,
}

impl RiskPredictor {
    pub fn new(model: Arc<dyn RiskModel>) -> Self {
        Self {
            model,
            normalizer: FeatureNormalizer::new(),
        }
    }

    /// Assess one canonical record: positive-class probability, then
    /// the predicted class, mapped to a risk label.
    ///
    /// Deterministic for a fixed model and identical input, so there
    /// is no retry path: a failure is the final outcome for the
    /// request and the caller may resubmit as a new request.
    pub fn assess(&self, record: &CanonicalFeatureRecord) -> Result<RiskAssessment> {
        let start = Instant::now();

        let probabilities = self.model.estimate_probability(record)?;
        let class = self.model.classify(record)?;

        let label = RiskLabel::from_class(class);
        let probability = probabilities[1].clamp(0.0, 1.0);

        let elapsed = start.elapsed();
        if elapsed.as_millis() > MAX_ASSESS_MS {
            warn!(
                elapsed_ms = elapsed.as_millis(),
                "Assessment exceeded {}ms target", MAX_ASSESS_MS
            );
        } else {
            debug!(
                elapsed_us = elapsed.as_micros(),
                class, probability, "Assessment completed"
            );
        }

        Ok(RiskAssessment {
            label,
            probability,
            model_version: self.model.version().to_string(),
            generated_at: chrono::Utc::now().timestamp(),
        })
    }

    /// Full pipeline for one raw record: normalize against whatever
    /// schema the model declares, then assess.
    pub fn screen(&self, raw: &PatientRecord) -> Result<RiskAssessment> {
        let record = self
            .normalizer
            .normalize(raw, self.model.expected_columns())?;
        self.assess(&record)
    }

    /// Columns the underlying model declares, if it exposes them.
    pub fn expected_columns(&self) -> Option<&[String]> {
        self.model.expected_columns()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScreenerError;
    use crate::models::{BinaryFlag, FeatureValue};

    /// Fixed-output model for driving the adapter.
    struct StubModel {
        class: i64,
        probabilities: [f32; 2],
        columns: Option<Vec<String>>,
    }

    impl StubModel {
        fn new(class: i64, probabilities: [f32; 2]) -> Self {
            Self {
                class,
                probabilities,
                columns: None,
            }
        }
    }

    impl RiskModel for StubModel {
        fn classify(&self, _record: &CanonicalFeatureRecord) -> Result<i64> {
            Ok(self.class)
        }

        fn estimate_probability(&self, _record: &CanonicalFeatureRecord) -> Result<[f32; 2]> {
            Ok(self.probabilities)
        }

        fn expected_columns(&self) -> Option<&[String]> {
            self.columns.as_deref()
        }

        fn version(&self) -> &str {
            "stub-v1"
        }
    }

    /// Model whose pipeline fails internally on every call.
    struct FailingModel;

    impl RiskModel for FailingModel {
        fn classify(&self, _record: &CanonicalFeatureRecord) -> Result<i64> {
            Err(ScreenerError::Inference {
                cause: "pipeline raised during classification".to_string(),
            })
        }

        fn estimate_probability(&self, _record: &CanonicalFeatureRecord) -> Result<[f32; 2]> {
            Err(ScreenerError::Inference {
                cause: "pipeline raised during probability estimation".to_string(),
            })
        }

        fn version(&self) -> &str {
            "failing"
        }
    }

    fn sample_record() -> CanonicalFeatureRecord {
        CanonicalFeatureRecord::new(vec![
            ("age".to_string(), FeatureValue::Int(35)),
            ("bmi".to_string(), FeatureValue::Float(25.0)),
        ])
    }

    fn sample_patient() -> PatientRecord {
        PatientRecord {
            age: 35,
            gender: "Male".to_string(),
            hypertension: BinaryFlag::Label("No".to_string()),
            heart_disease: BinaryFlag::Label("No".to_string()),
            smoking_history: "never".to_string(),
            bmi: 25.0,
            hba1c_level: 5.5,
            blood_glucose_level: 100.0,
        }
    }

    #[test]
    fn test_negative_class_maps_to_no_risk() {
        let predictor = RiskPredictor::new(Arc::new(StubModel::new(0, [0.92, 0.08])));
        let assessment = predictor.assess(&sample_record()).unwrap();

        assert_eq!(assessment.label, RiskLabel::NoRisk);
        assert!((assessment.probability - 0.08).abs() < f32::EPSILON);
    }

    #[test]
    fn test_positive_class_maps_to_risk() {
        let predictor = RiskPredictor::new(Arc::new(StubModel::new(1, [0.15, 0.85])));
        let assessment = predictor.assess(&sample_record()).unwrap();

        assert_eq!(assessment.label, RiskLabel::Risk);
        assert!((assessment.probability - 0.85).abs() < f32::EPSILON);
    }

    #[test]
    fn test_assessment_is_deterministic() {
        let predictor = RiskPredictor::new(Arc::new(StubModel::new(1, [0.3, 0.7])));
        let record = sample_record();

        let first = predictor.assess(&record).unwrap();
        let second = predictor.assess(&record).unwrap();
        assert_eq!(first.label, second.label);
        assert_eq!(first.probability, second.probability);
    }

    #[test]
    fn test_probability_clamped_to_unit_interval() {
        let predictor = RiskPredictor::new(Arc::new(StubModel::new(1, [-0.1, 1.2])));
        let assessment = predictor.assess(&sample_record()).unwrap();
        assert!((0.0..=1.0).contains(&assessment.probability));
    }

    #[test]
    fn test_model_failure_surfaces_as_typed_error() {
        let predictor = RiskPredictor::new(Arc::new(FailingModel));
        let err = predictor.assess(&sample_record()).unwrap_err();

        match err {
            ScreenerError::Inference { cause } => assert!(!cause.is_empty()),
            other => panic!("expected inference error, got {other}"),
        }
    }

    #[test]
    fn test_screen_runs_full_pipeline() {
        let predictor = RiskPredictor::new(Arc::new(StubModel::new(0, [0.92, 0.08])));
        let assessment = predictor.screen(&sample_patient()).unwrap();

        assert_eq!(assessment.label, RiskLabel::NoRisk);
        assert_eq!(assessment.model_version, "stub-v1");
    }

    #[test]
    fn test_screen_honors_model_declared_columns() {
        // Reduced three-column schema exposed by the model.
        let model = StubModel {
            class: 1,
            probabilities: [0.2, 0.8],
            columns: Some(vec![
                "age".to_string(),
                "bmi".to_string(),
                "gender".to_string(),
            ]),
        };
        let predictor = RiskPredictor::new(Arc::new(model));

        let assessment = predictor.screen(&sample_patient()).unwrap();
        assert_eq!(assessment.label, RiskLabel::Risk);
        assert_eq!(
            predictor.expected_columns().map(|c| c.len()),
            Some(3)
        );
    }
}
