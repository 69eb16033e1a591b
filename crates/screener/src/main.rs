//! Risk Screener - single-prediction diabetes risk inference
//!
//! Loads the trained pipeline once at startup, reads one patient
//! record as JSON (file or stdin), and prints the risk assessment.
//! One invocation is one synchronous request-response cycle.

use anyhow::{Context, Result};
use screener_lib::{OnnxClassifier, PatientRecord, RiskPredictor};
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;

const SCREENER_VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!(version = SCREENER_VERSION, "Starting risk-screener");

    let config = config::ScreenerConfig::load()?;
    let bounds = config.bounds();

    // Model artifact loaded once, shared read-only for the process lifetime
    let model = OnnxClassifier::from_path(
        Path::new(&config.model_path),
        config.schema_path.as_deref().map(Path::new),
    )?;
    info!(model = %config.model_path, "Model loaded");

    let predictor = RiskPredictor::new(Arc::new(model));

    let raw = read_patient(config.input_path.as_deref())?;

    match bounds.validate(&raw).and_then(|()| predictor.screen(&raw)) {
        Ok(assessment) => {
            println!("{}", serde_json::to_string_pretty(&assessment)?);
            Ok(())
        }
        Err(err) => {
            // Every failure reaches the output boundary as a visible
            // message; nothing terminates the process unreported.
            error!(error = %err, "Screening failed");
            println!("{}", serde_json::json!({ "error": err.to_string() }));
            std::process::exit(1);
        }
    }
}

fn read_patient(input_path: Option<&str>) -> Result<PatientRecord> {
    let raw = match input_path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading patient record {path}"))?,
        None => std::io::read_to_string(std::io::stdin())
            .context("reading patient record from stdin")?,
    };
    serde_json::from_str(&raw).context("parsing patient record JSON")
}
