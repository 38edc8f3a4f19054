//! End-to-end scoring: canonicalize -> model -> calibrate.

use serde::Serialize;

use crate::domain::{Feature, RawRecord, ScoreResult, SurfaceMode};
use crate::error::Result;
use crate::features::{MappingDiagnostics, MappingOutcome, canonicalize, map_body, SimBody};
use crate::models::adapter::ModelAdapter;
use crate::models::calibration::EarthCalibration;
use crate::reference;
use crate::surface::{self, SurfaceClass, SurfaceClassification};

/// Model adapter plus its Earth calibration. Cheap to clone and shareable
/// across threads.
#[derive(Debug, Clone)]
pub struct Scorer {
    adapter: ModelAdapter,
    calibration: EarthCalibration,
}

impl Scorer {
    pub fn new(adapter: ModelAdapter) -> Result<Self> {
        let calibration = EarthCalibration::new(&adapter)?;
        Ok(Self { adapter, calibration })
    }

    pub fn adapter(&self) -> &ModelAdapter {
        &self.adapter
    }

    pub fn calibration(&self) -> &EarthCalibration {
        &self.calibration
    }

    /// Score one sparse record.
    ///
    /// Component scores and regime tags come from the reference formula so the
    /// result stays explainable whatever model produced the raw score.
    pub fn score_record(&self, record: &RawRecord, is_earth_preset: bool) -> Result<ScoreResult> {
        let canonical = canonicalize(record);
        let raw_score = self.adapter.predict_raw(&canonical.features)?;
        let breakdown = reference::score(&canonical.features);
        Ok(ScoreResult {
            raw_score,
            calibrated_score: self.calibration.calibrate_preset(raw_score, is_earth_preset),
            component_scores: breakdown.components,
            regime_tags: breakdown.regime_tags,
            imputed_fields: canonical.imputation.into_vec(),
        })
    }

    /// Score many records; raw scores are computed with one parallel batch.
    pub fn score_records(&self, records: &[RawRecord]) -> Result<Vec<ScoreResult>> {
        let canonical: Vec<_> = records.iter().map(canonicalize).collect();
        let vectors: Vec<_> = canonical.iter().map(|c| c.features).collect();
        let raw = self.adapter.predict_batch(&vectors)?;
        Ok(canonical
            .into_iter()
            .zip(raw)
            .map(|(c, raw_score)| {
                let breakdown = reference::score(&c.features);
                ScoreResult {
                    raw_score,
                    calibrated_score: self.calibration.calibrate(raw_score),
                    component_scores: breakdown.components,
                    regime_tags: breakdown.regime_tags,
                    imputed_fields: c.imputation.into_vec(),
                }
            })
            .collect())
    }

    /// Score and classify many records under one display policy.
    pub fn score_table(&self, records: &[RawRecord], mode: SurfaceMode) -> Result<Vec<RecordScore>> {
        let results = self.score_records(records)?;
        Ok(records
            .iter()
            .zip(results)
            .map(|(record, result)| {
                let surface = classify_record(record);
                let should_display_score = surface::should_display_score(surface.class, mode);
                RecordScore {
                    display_label: surface::display_label(surface.class, mode).to_string(),
                    should_display_score,
                    surface,
                    result,
                }
            })
            .collect())
    }

    /// Map, classify, score and apply the display policy for a simulator body.
    ///
    /// Never fails: mapping rejections and inference errors are reported in the
    /// returned value with no score, never as a zero score.
    pub fn predict_for_body(&self, body: &SimBody, mode: SurfaceMode) -> BodyPrediction {
        let name = body.planet.name.clone();
        let (record, mapping) = match map_body(body) {
            MappingOutcome::Mapped { record, diagnostics } => (record, diagnostics),
            MappingOutcome::Rejected { diagnostics } => {
                let warnings = diagnostics.warnings.clone();
                return BodyPrediction {
                    name,
                    surface: SurfaceClassification {
                        class: SurfaceClass::Unknown,
                        applicable: false,
                        reason: "Missing critical fields".to_string(),
                        warnings,
                    },
                    display_label: DATA_INCOMPLETE.to_string(),
                    should_display_score: false,
                    score_raw: None,
                    score_display: None,
                    result: None,
                    prediction_error: None,
                    mapping: diagnostics,
                };
            }
        };

        let surface = classify_record(&record);
        let display_label = surface::display_label(surface.class, mode).to_string();
        let should_display_score = surface::should_display_score(surface.class, mode);

        let (result, prediction_error) = match self.score_record(&record, body.is_earth_preset()) {
            Ok(result) => (Some(result), None),
            Err(e) => (None, Some(e.to_string())),
        };
        let score_raw = result.as_ref().map(|r| r.raw_score);
        let score_display = result
            .as_ref()
            .filter(|_| should_display_score)
            .map(|r| r.calibrated_score);

        BodyPrediction {
            name,
            surface,
            display_label,
            should_display_score,
            score_raw,
            score_display,
            result,
            prediction_error,
            mapping,
        }
    }
}

/// Classify on the supplied values only, so unit mistakes stay visible and a
/// missing density never turns into an imputed "rocky".
fn classify_record(record: &RawRecord) -> SurfaceClassification {
    surface::classify_supplied(record.value(Feature::Radius), record.value(Feature::Density))
}

/// One scored table row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordScore {
    pub surface: SurfaceClassification,
    pub display_label: String,
    pub should_display_score: bool,
    pub result: ScoreResult,
}

impl RecordScore {
    /// Calibrated score when the display policy allows it.
    pub fn score_display(&self) -> Option<f64> {
        self.should_display_score.then_some(self.result.calibrated_score)
    }
}

/// Display label for a body whose mapping was rejected.
pub const DATA_INCOMPLETE: &str = "Data Incomplete";

/// Everything a front-end needs to render one body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BodyPrediction {
    pub name: Option<String>,
    pub surface: SurfaceClassification,
    pub display_label: String,
    pub should_display_score: bool,
    pub score_raw: Option<f64>,
    /// Calibrated score, `None` when hidden by the display policy or unavailable.
    pub score_display: Option<f64>,
    pub result: Option<ScoreResult>,
    pub prediction_error: Option<String>,
    pub mapping: MappingDiagnostics,
}
