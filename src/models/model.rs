//! Scoring model interface.
//!
//! A scoring model is an opaque, already-trained function from a canonical
//! feature vector to a scalar. Implementations are immutable after load and
//! must be `Send + Sync`; the adapter shares them behind an `Arc` across rayon
//! workers.

use serde::{Deserialize, Serialize};

use crate::domain::{FEATURE_COUNT, Feature, FeatureVector};
use crate::error::Result;
use crate::features::canonical_names;
use crate::reference;

/// Artifact format understood by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    TreeEnsemble,
    Linear,
    Reference,
}

impl ModelKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ModelKind::TreeEnsemble => "tree_ensemble",
            ModelKind::Linear => "linear",
            ModelKind::Reference => "reference",
        }
    }
}

pub trait ScoringModel: Send + Sync + std::fmt::Debug {
    fn kind(&self) -> ModelKind;

    /// Column names the model was trained on, in input order.
    fn feature_order(&self) -> &[String];

    /// Unclamped prediction for one vector.
    fn predict(&self, features: &FeatureVector) -> Result<f64>;

    /// Predictions for a contiguous batch. Stops at the first failure.
    fn predict_many(&self, batch: &[FeatureVector]) -> Result<Vec<f64>> {
        batch.iter().map(|v| self.predict(v)).collect()
    }

    /// Native, unnormalized importance per feature, or `None` if the model
    /// has no ranking of its own.
    fn importances(&self) -> Option<[f64; FEATURE_COUNT]>;
}

/// The reference formula exposed as a model.
#[derive(Debug, Clone)]
pub struct ReferenceModel {
    feature_order: Vec<String>,
}

impl ReferenceModel {
    pub fn new() -> Self {
        Self {
            feature_order: canonical_names(),
        }
    }
}

impl Default for ReferenceModel {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoringModel for ReferenceModel {
    fn kind(&self) -> ModelKind {
        ModelKind::Reference
    }

    fn feature_order(&self) -> &[String] {
        &self.feature_order
    }

    fn predict(&self, features: &FeatureVector) -> Result<f64> {
        Ok(reference::score(features).score)
    }

    /// Component weights on the features the formula reads.
    fn importances(&self) -> Option<[f64; FEATURE_COUNT]> {
        let mut out = [0.0; FEATURE_COUNT];
        for (feature, weight) in reference::feature_weights() {
            out[feature.index()] = weight;
        }
        Some(out)
    }
}

/// Turn raw importances into a distribution over features.
///
/// All zeros when the model reports nothing or the total is not positive.
pub fn normalize_importances(raw: Option<[f64; FEATURE_COUNT]>) -> [f64; FEATURE_COUNT] {
    let Some(raw) = raw else {
        return [0.0; FEATURE_COUNT];
    };
    let cleaned = raw.map(|x| if x.is_finite() && x > 0.0 { x } else { 0.0 });
    let total: f64 = cleaned.iter().sum();
    if total <= 0.0 {
        return [0.0; FEATURE_COUNT];
    }
    cleaned.map(|x| x / total)
}

/// Features with their normalized importance, highest first.
pub fn ranked_importances(normalized: &[f64; FEATURE_COUNT]) -> Vec<(Feature, f64)> {
    let mut out: Vec<(Feature, f64)> = Feature::ALL.iter().map(|f| (*f, normalized[f.index()])).collect();
    out.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    out
}
