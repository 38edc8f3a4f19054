//! Per-body debug snapshot for simulator inputs.
//!
//! Every body is scored with `SurfaceMode::All` so the snapshot always carries
//! a number, whatever the display policy later hides.

use std::fs::File;
use std::path::Path;

use chrono::Local;
use serde::Serialize;

use crate::domain::SurfaceMode;
use crate::error::AppError;
use crate::features::SimBody;
use crate::models::{BodyPrediction, Scorer};
use crate::surface::SurfaceClass;

/// One body's row in the snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BodySnapshot {
    pub name: String,
    pub pl_rade: Option<f64>,
    pub pl_dens: Option<f64>,
    pub surface_class: SurfaceClass,
    pub surface_applicable: bool,
    pub surface_reason: String,
    pub surface_warnings: Vec<String>,
    pub score_raw: Option<f64>,
    pub score_display: Option<f64>,
    pub display_label: String,
    pub input_warnings: Vec<String>,
    pub missing_critical: Vec<String>,
    pub missing_optional: Vec<String>,
    pub prediction_success: bool,
    pub prediction_error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DebugSnapshot {
    pub timestamp: String,
    pub model_version: String,
    pub planets: Vec<BodySnapshot>,
}

impl DebugSnapshot {
    pub fn scored_count(&self) -> usize {
        self.planets.iter().filter(|p| p.prediction_success).count()
    }
}

/// Read a JSON array of simulator bodies.
pub fn load_bodies(path: &Path) -> Result<Vec<SimBody>, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open bodies JSON '{}': {e}", path.display())))?;
    let bodies: Vec<SimBody> =
        serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid bodies JSON: {e}")))?;
    if bodies.is_empty() {
        return Err(AppError::new(3, "Bodies JSON contains no bodies."));
    }
    Ok(bodies)
}

fn body_snapshot(index: usize, body: &SimBody, prediction: BodyPrediction) -> BodySnapshot {
    let success = prediction.result.is_some();
    BodySnapshot {
        name: prediction
            .name
            .unwrap_or_else(|| format!("body-{}", index + 1)),
        pl_rade: body.planet.radius,
        pl_dens: body.planet.density,
        surface_class: prediction.surface.class,
        surface_applicable: prediction.surface.applicable,
        surface_reason: prediction.surface.reason,
        surface_warnings: prediction.surface.warnings,
        score_raw: prediction.score_raw,
        score_display: prediction.score_display,
        display_label: prediction.display_label,
        input_warnings: prediction.mapping.warnings,
        missing_critical: prediction.mapping.missing_critical,
        missing_optional: prediction.mapping.missing_optional,
        prediction_success: success,
        prediction_error: prediction.prediction_error,
    }
}

/// Score every body and collect the diagnostics.
pub fn build_snapshot(scorer: &Scorer, bodies: &[SimBody]) -> DebugSnapshot {
    let planets = bodies
        .iter()
        .enumerate()
        .map(|(i, body)| body_snapshot(i, body, scorer.predict_for_body(body, SurfaceMode::All)))
        .collect::<Vec<_>>();
    tracing::info!(
        bodies = planets.len(),
        scored = planets.iter().filter(|p| p.prediction_success).count(),
        "built debug snapshot"
    );
    DebugSnapshot {
        timestamp: Local::now().to_rfc3339(),
        model_version: scorer.adapter().version().to_string(),
        planets,
    }
}
