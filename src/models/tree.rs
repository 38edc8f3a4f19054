//! Gradient-boosted regression tree ensemble loaded from JSON.
//!
//! ```json
//! {
//!   "base_score": 0.5,
//!   "trees": [
//!     {"nodes": [
//!       {"split": {"feature": 5, "threshold": 1.9, "left": 1, "right": 2}},
//!       {"leaf": 0.2},
//!       {"leaf": -0.3}
//!     ]}
//!   ]
//! }
//! ```
//!
//! Node 0 is the root. `x < threshold` goes left. Children must come after
//! their parent, which rules out cycles.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{FEATURE_COUNT, FeatureVector};
use crate::error::{Result, ScoreError};
use crate::models::model::{ModelKind, ScoringModel};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

impl Tree {
    fn validate(&self, index: usize) -> Result<()> {
        if self.nodes.is_empty() {
            return Err(ScoreError::Config(format!("tree {index} has no nodes")));
        }
        for (i, node) in self.nodes.iter().enumerate() {
            if let Node::Split { feature, threshold, left, right } = *node {
                if feature >= FEATURE_COUNT {
                    return Err(ScoreError::Config(format!(
                        "tree {index} node {i}: feature index {feature} out of range"
                    )));
                }
                if !threshold.is_finite() {
                    return Err(ScoreError::Config(format!(
                        "tree {index} node {i}: non-finite threshold"
                    )));
                }
                for child in [left, right] {
                    if child <= i || child >= self.nodes.len() {
                        return Err(ScoreError::Config(format!(
                            "tree {index} node {i}: invalid child index {child}"
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    fn eval(&self, x: &[f64; FEATURE_COUNT]) -> f64 {
        let mut i = 0;
        loop {
            match self.nodes[i] {
                Node::Leaf(value) => return value,
                Node::Split { feature, threshold, left, right } => {
                    i = if x[feature] < threshold { left } else { right };
                }
            }
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct TreeArtifact {
    #[serde(default)]
    base_score: f64,
    trees: Vec<Tree>,
}

#[derive(Debug, Clone)]
pub struct TreeEnsemble {
    feature_order: Vec<String>,
    base_score: f64,
    trees: Vec<Tree>,
}

impl TreeEnsemble {
    pub fn new(feature_order: Vec<String>, base_score: f64, trees: Vec<Tree>) -> Result<Self> {
        for (i, tree) in trees.iter().enumerate() {
            tree.validate(i)?;
        }
        Ok(Self {
            feature_order,
            base_score,
            trees,
        })
    }

    pub fn from_json_str(text: &str, feature_order: Vec<String>) -> Result<Self> {
        let artifact: TreeArtifact = serde_json::from_str(text)?;
        Self::new(feature_order, artifact.base_score, artifact.trees)
    }

    pub fn load(path: &Path, feature_order: Vec<String>) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            ScoreError::Config(format!("failed to read model '{}': {e}", path.display()))
        })?;
        Self::from_json_str(&text, feature_order)
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }
}

impl ScoringModel for TreeEnsemble {
    fn kind(&self) -> ModelKind {
        ModelKind::TreeEnsemble
    }

    fn feature_order(&self) -> &[String] {
        &self.feature_order
    }

    fn predict(&self, features: &FeatureVector) -> Result<f64> {
        let x = features.as_array();
        let y = self.base_score + self.trees.iter().map(|t| t.eval(x)).sum::<f64>();
        if !y.is_finite() {
            return Err(ScoreError::ModelInference(format!(
                "tree ensemble produced non-finite output {y}"
            )));
        }
        Ok(y)
    }

    /// Number of splits on each feature ("weight" importance).
    fn importances(&self) -> Option<[f64; FEATURE_COUNT]> {
        let mut counts = [0.0; FEATURE_COUNT];
        for tree in &self.trees {
            for node in &tree.nodes {
                if let Node::Split { feature, .. } = node {
                    counts[*feature] += 1.0;
                }
            }
        }
        Some(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Feature;
    use crate::features::{canonical_names, earth_reference};
    use crate::validation::bodies::MERCURY;

    const STUMP: &str = r#"{
        "base_score": 0.1,
        "trees": [
            {"nodes": [
                {"split": {"feature": 5, "threshold": 1.9, "left": 1, "right": 2}},
                {"leaf": 0.8},
                {"leaf": 0.0}
            ]},
            {"nodes": [
                {"split": {"feature": 0, "threshold": 2.0, "left": 1, "right": 2}},
                {"leaf": 0.1},
                {"leaf": -0.1}
            ]}
        ]
    }"#;

    #[test]
    fn walks_trees_and_sums_leaves() {
        let model = TreeEnsemble::from_json_str(STUMP, canonical_names()).unwrap();
        assert_eq!(model.tree_count(), 2);
        let earth = model.predict(&earth_reference()).unwrap();
        assert!((earth - 1.0).abs() < 1e-12);
        let mercury = model.predict(&MERCURY.features()).unwrap();
        assert!((mercury - 0.2).abs() < 1e-12);
    }

    #[test]
    fn split_counts_are_importances() {
        let model = TreeEnsemble::from_json_str(STUMP, canonical_names()).unwrap();
        let imp = model.importances().unwrap();
        assert_eq!(imp[Feature::Insolation.index()], 1.0);
        assert_eq!(imp[Feature::Radius.index()], 1.0);
        assert_eq!(imp.iter().sum::<f64>(), 2.0);
    }

    #[test]
    fn rejects_backward_edges_and_bad_features() {
        let cycle = r#"{"trees": [{"nodes": [
            {"split": {"feature": 0, "threshold": 1.0, "left": 0, "right": 1}},
            {"leaf": 1.0}
        ]}]}"#;
        assert!(matches!(
            TreeEnsemble::from_json_str(cycle, canonical_names()),
            Err(ScoreError::Config(_))
        ));

        let bad_feature = r#"{"trees": [{"nodes": [
            {"split": {"feature": 12, "threshold": 1.0, "left": 1, "right": 2}},
            {"leaf": 1.0},
            {"leaf": 0.0}
        ]}]}"#;
        assert!(TreeEnsemble::from_json_str(bad_feature, canonical_names()).is_err());
    }

    #[test]
    fn non_finite_output_is_an_inference_error() {
        let huge = r#"{"base_score": 1e308, "trees": [{"nodes": [{"leaf": 1e308}]}]}"#;
        let model = TreeEnsemble::from_json_str(huge, canonical_names()).unwrap();
        assert!(matches!(
            model.predict(&earth_reference()),
            Err(ScoreError::ModelInference(_))
        ));
    }
}
