//! Inference wrapper around a loaded scoring model.
//!
//! The adapter is the only way the rest of the crate calls a model. It:
//! - checks the model's declared feature order against the schema once, at construction
//! - clamps outputs to `[0, 1]`
//! - reports failures as [`ScoreError::ModelInference`] and never substitutes a score

use std::sync::Arc;

use rayon::prelude::*;
use serde::Serialize;

use crate::domain::FeatureVector;
use crate::error::{Result, ScoreError};
use crate::features::FeatureSchema;
use crate::math::clamp;
use crate::models::model::{ReferenceModel, ScoringModel, normalize_importances};
use crate::models::registry::LoadedModel;

/// Vectors per rayon task in [`ModelAdapter::predict_batch`].
const BATCH_CHUNK: usize = 256;

/// Feature values and normalized importances for one prediction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Explanation {
    pub feature_values: Vec<(String, f64)>,
    /// Sums to 1, or all zeros if the model has no native ranking.
    pub normalized_importances: Vec<(String, f64)>,
}

#[derive(Debug, Clone)]
pub struct ModelAdapter {
    version: String,
    model: Arc<dyn ScoringModel>,
}

impl ModelAdapter {
    pub fn new(loaded: LoadedModel, schema: &FeatureSchema) -> Result<Self> {
        schema.ensure_order(loaded.model.feature_order())?;
        Ok(Self {
            version: loaded.version,
            model: loaded.model,
        })
    }

    /// Adapter over the reference formula.
    pub fn reference(schema: &FeatureSchema) -> Result<Self> {
        Self::new(
            LoadedModel {
                version: "reference".to_string(),
                model: Arc::new(ReferenceModel::new()),
            },
            schema,
        )
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn model(&self) -> &Arc<dyn ScoringModel> {
        &self.model
    }

    /// Model output for one vector, clamped to `[0, 1]`.
    pub fn predict_raw(&self, features: &FeatureVector) -> Result<f64> {
        let y = self.model.predict(features).map_err(|e| {
            tracing::warn!(version = %self.version, error = %e, "model inference failed");
            e
        })?;
        finish(y)
    }

    /// Clamped outputs for many vectors, evaluated in parallel chunks.
    pub fn predict_batch(&self, batch: &[FeatureVector]) -> Result<Vec<f64>> {
        let chunks: Vec<Vec<f64>> = batch
            .par_chunks(BATCH_CHUNK)
            .map(|chunk| self.model.predict_many(chunk))
            .collect::<Result<_>>()?;
        chunks.into_iter().flatten().map(finish).collect()
    }

    pub fn explain(&self, features: &FeatureVector) -> Explanation {
        let normalized = normalize_importances(self.model.importances());
        let names = self.model.feature_order();
        let feature_values = names
            .iter()
            .zip(features.as_array())
            .map(|(n, v)| (n.clone(), *v))
            .collect();
        let normalized_importances = names
            .iter()
            .zip(normalized)
            .map(|(n, w)| (n.clone(), w))
            .collect();
        Explanation {
            feature_values,
            normalized_importances,
        }
    }

    /// Whether the model reports a native importance ranking.
    pub fn has_importances(&self) -> bool {
        self.model
            .importances()
            .is_some_and(|imp| imp.iter().any(|x| *x > 0.0))
    }
}

fn finish(y: f64) -> Result<f64> {
    if !y.is_finite() {
        return Err(ScoreError::ModelInference(format!("non-finite model output {y}")));
    }
    Ok(clamp(y, 0.0, 1.0))
}
