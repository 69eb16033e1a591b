//! Input-boundary validation
//!
//! Every numeric range and category set here is configuration, not a
//! hardcoded constant: deployments disagree on the glucose upper bound
//! (300 vs 400) and on whether the gender set includes "Other".

use crate::error::{Result, ScreenerError};
use crate::models::PatientRecord;
use serde::Deserialize;

/// Allowed ranges and category sets for raw patient input.
///
/// Defaults match the widest observed variant.
#[derive(Debug, Clone, Deserialize)]
pub struct InputBounds {
    #[serde(default = "default_age_range")]
    pub age: (u32, u32),
    #[serde(default = "default_bmi_range")]
    pub bmi: (f64, f64),
    #[serde(default = "default_hba1c_range")]
    pub hba1c_level: (f64, f64),
    #[serde(default = "default_glucose_range")]
    pub blood_glucose_level: (f64, f64),
    #[serde(default = "default_genders")]
    pub genders: Vec<String>,
    #[serde(default = "default_smoking_histories")]
    pub smoking_histories: Vec<String>,
}

fn default_age_range() -> (u32, u32) {
    (1, 120)
}

fn default_bmi_range() -> (f64, f64) {
    (10.0, 60.0)
}

fn default_hba1c_range() -> (f64, f64) {
    (3.0, 15.0)
}

fn default_glucose_range() -> (f64, f64) {
    (50.0, 400.0)
}

fn default_genders() -> Vec<String> {
    vec!["Male".to_string(), "Female".to_string(), "Other".to_string()]
}

fn default_smoking_histories() -> Vec<String> {
    vec![
        "never".to_string(),
        "former".to_string(),
        "current".to_string(),
        "not current".to_string(),
        "ever".to_string(),
    ]
}

impl Default for InputBounds {
    fn default() -> Self {
        Self {
            age: default_age_range(),
            bmi: default_bmi_range(),
            hba1c_level: default_hba1c_range(),
            blood_glucose_level: default_glucose_range(),
            genders: default_genders(),
            smoking_histories: default_smoking_histories(),
        }
    }
}

impl InputBounds {
    /// Reject any record with a field outside its configured bound.
    ///
    /// Records that pass are safe to hand to the normalizer, which
    /// performs no bound checking of its own.
    pub fn validate(&self, record: &PatientRecord) -> Result<()> {
        check_range("age", f64::from(record.age), self.age.0 as f64, self.age.1 as f64)?;
        check_range("bmi", record.bmi, self.bmi.0, self.bmi.1)?;
        check_range(
            "HbA1c_level",
            record.hba1c_level,
            self.hba1c_level.0,
            self.hba1c_level.1,
        )?;
        check_range(
            "blood_glucose_level",
            record.blood_glucose_level,
            self.blood_glucose_level.0,
            self.blood_glucose_level.1,
        )?;
        check_category("gender", &record.gender, &self.genders)?;
        check_category(
            "smoking_history",
            &record.smoking_history,
            &self.smoking_histories,
        )?;
        Ok(())
    }
}

fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<()> {
    if value < min || value > max {
        return Err(ScreenerError::OutOfBounds {
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}

fn check_category(field: &'static str, value: &str, allowed: &[String]) -> Result<()> {
    if !allowed.iter().any(|a| a == value) {
        return Err(ScreenerError::UnknownCategory {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}
