//! Linear (optionally logistic) model over the canonical features.
//!
//! Single predictions use a plain dot product; batches are evaluated as one
//! matrix-vector product `X·w + b` with `nalgebra`.

use std::path::Path;

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::domain::{FEATURE_COUNT, FeatureVector};
use crate::error::{Result, ScoreError};
use crate::math::logistic;
use crate::models::model::{ModelKind, ScoringModel};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Link {
    #[default]
    Identity,
    Logistic,
}

impl Link {
    fn apply(self, eta: f64) -> f64 {
        match self {
            Link::Identity => eta,
            Link::Logistic => logistic(eta, 0.0, 1.0),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct LinearArtifact {
    intercept: f64,
    coefficients: Vec<f64>,
    #[serde(default)]
    link: Link,
}

#[derive(Debug, Clone)]
pub struct LinearModel {
    feature_order: Vec<String>,
    intercept: f64,
    coefficients: DVector<f64>,
    link: Link,
}

impl LinearModel {
    pub fn new(feature_order: Vec<String>, intercept: f64, coefficients: Vec<f64>, link: Link) -> Result<Self> {
        if coefficients.len() != FEATURE_COUNT {
            return Err(ScoreError::Config(format!(
                "linear model has {} coefficients, expected {FEATURE_COUNT}",
                coefficients.len()
            )));
        }
        if !intercept.is_finite() || coefficients.iter().any(|c| !c.is_finite()) {
            return Err(ScoreError::Config("linear model has non-finite parameters".to_string()));
        }
        Ok(Self {
            feature_order,
            intercept,
            coefficients: DVector::from_vec(coefficients),
            link,
        })
    }

    pub fn from_json_str(text: &str, feature_order: Vec<String>) -> Result<Self> {
        let artifact: LinearArtifact = serde_json::from_str(text)?;
        Self::new(feature_order, artifact.intercept, artifact.coefficients, artifact.link)
    }

    pub fn load(path: &Path, feature_order: Vec<String>) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            ScoreError::Config(format!("failed to read model '{}': {e}", path.display()))
        })?;
        Self::from_json_str(&text, feature_order)
    }

    fn finish(&self, eta: f64) -> Result<f64> {
        let y = self.link.apply(eta);
        if !y.is_finite() {
            return Err(ScoreError::ModelInference(format!(
                "linear model produced non-finite output {y}"
            )));
        }
        Ok(y)
    }
}

impl ScoringModel for LinearModel {
    fn kind(&self) -> ModelKind {
        ModelKind::Linear
    }

    fn feature_order(&self) -> &[String] {
        &self.feature_order
    }

    fn predict(&self, features: &FeatureVector) -> Result<f64> {
        let eta = self.intercept
            + features
                .as_array()
                .iter()
                .zip(self.coefficients.iter())
                .map(|(x, w)| x * w)
                .sum::<f64>();
        self.finish(eta)
    }

    fn predict_many(&self, batch: &[FeatureVector]) -> Result<Vec<f64>> {
        if batch.is_empty() {
            return Ok(Vec::new());
        }
        let x = DMatrix::from_row_iterator(
            batch.len(),
            FEATURE_COUNT,
            batch.iter().flat_map(|v| v.as_array().iter().copied()),
        );
        let eta = x * &self.coefficients;
        eta.iter().map(|e| self.finish(e + self.intercept)).collect()
    }

    /// Absolute coefficient per feature.
    fn importances(&self) -> Option<[f64; FEATURE_COUNT]> {
        let mut out = [0.0; FEATURE_COUNT];
        for (slot, w) in out.iter_mut().zip(self.coefficients.iter()) {
            *slot = w.abs();
        }
        Some(out)
    }
}
