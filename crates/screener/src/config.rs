//! Screener configuration

use anyhow::Result;
use screener_lib::InputBounds;
use serde::Deserialize;

/// Screener configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ScreenerConfig {
    /// Path to the serialized pipeline artifact
    #[serde(default = "default_model_path")]
    pub model_path: String,

    /// Sidecar schema next to the model, when the export preserved
    /// the training columns
    #[serde(default)]
    pub schema_path: Option<String>,

    /// Patient record JSON file; stdin when unset
    #[serde(default)]
    pub input_path: Option<String>,

    /// Upper bound for blood glucose input (deployments vary: 300 or 400)
    #[serde(default = "default_blood_glucose_max")]
    pub blood_glucose_max: f64,

    /// Comma-separated accepted gender labels
    #[serde(default = "default_genders")]
    pub genders: String,
}

fn default_model_path() -> String {
    "models/diabetes_pipeline.onnx".to_string()
}

fn default_blood_glucose_max() -> f64 {
    400.0
}

fn default_genders() -> String {
    "Male,Female,Other".to_string()
}

impl ScreenerConfig {
    /// Load configuration from the environment
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("SCREENER"))
            .build()?;

        Ok(config.try_deserialize().unwrap_or_else(|_| ScreenerConfig {
            model_path: default_model_path(),
            schema_path: None,
            input_path: None,
            blood_glucose_max: default_blood_glucose_max(),
            genders: default_genders(),
        }))
    }

    /// Input bounds with the configured variant knobs applied
    pub fn bounds(&self) -> InputBounds {
        let mut bounds = InputBounds::default();
        bounds.blood_glucose_level.1 = self.blood_glucose_max;
        bounds.genders = self
            .genders
            .split(',')
            .map(|g| g.trim().to_string())
            .filter(|g| !g.is_empty())
            .collect();
        bounds
    }
}
