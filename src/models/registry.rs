//! Versioned model registry.
//!
//! ```json
//! {
//!   "default_version": "v4",
//!   "models": {
//!     "v4": {"kind": "tree_ensemble", "path": "models/v4_trees.json"},
//!     "ref": {"kind": "reference"}
//!   }
//! }
//! ```
//!
//! The version is always an explicit choice: the caller's request, else
//! `default_version`. An unknown version is a configuration error. The registry
//! never searches the file system for another artifact.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScoreError};
use crate::features::canonical_names;
use crate::models::linear::LinearModel;
use crate::models::model::{ModelKind, ReferenceModel, ScoringModel};
use crate::models::tree::TreeEnsemble;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelEntry {
    pub kind: ModelKind,
    /// Artifact path, relative to the registry file. Unused for `reference`.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Declared input order; defaults to the canonical order.
    #[serde(default = "canonical_names")]
    pub feature_order: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRegistry {
    #[serde(default)]
    pub default_version: Option<String>,
    pub models: BTreeMap<String, ModelEntry>,
    #[serde(skip)]
    base_dir: PathBuf,
}

/// A model resolved from the registry.
#[derive(Debug, Clone)]
pub struct LoadedModel {
    pub version: String,
    pub model: Arc<dyn ScoringModel>,
}

impl ModelRegistry {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            ScoreError::Config(format!("failed to read model registry '{}': {e}", path.display()))
        })?;
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Self::from_json_str(&text, base_dir)
    }

    pub fn from_json_str(text: &str, base_dir: impl Into<PathBuf>) -> Result<Self> {
        let mut registry: ModelRegistry = serde_json::from_str(text)?;
        registry.base_dir = base_dir.into();
        if let Some(default) = &registry.default_version {
            if !registry.models.contains_key(default) {
                return Err(ScoreError::Config(format!(
                    "default_version '{default}' is not a registered model"
                )));
            }
        }
        Ok(registry)
    }

    /// Registry with a single `reference` entry, used when no registry file is configured.
    pub fn reference_only() -> Self {
        let mut models = BTreeMap::new();
        models.insert(
            "reference".to_string(),
            ModelEntry {
                kind: ModelKind::Reference,
                path: None,
                feature_order: canonical_names(),
            },
        );
        Self {
            default_version: Some("reference".to_string()),
            models,
            base_dir: PathBuf::new(),
        }
    }

    pub fn versions(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }

    /// Pick the version to load: `requested`, else `default_version`.
    pub fn resolve_version<'a>(&'a self, requested: Option<&'a str>) -> Result<&'a str> {
        let version = requested
            .or(self.default_version.as_deref())
            .ok_or_else(|| {
                ScoreError::Config(
                    "no model version requested and the registry has no default_version".to_string(),
                )
            })?;
        if !self.models.contains_key(version) {
            let known: Vec<&str> = self.versions().collect();
            return Err(ScoreError::Config(format!(
                "unknown model version '{version}' (registered: {})",
                known.join(", ")
            )));
        }
        Ok(version)
    }

    /// Load the chosen model. The schema check happens in the adapter.
    pub fn load_model(&self, requested: Option<&str>) -> Result<LoadedModel> {
        let version = self.resolve_version(requested)?;
        let entry = &self.models[version];
        let order = entry.feature_order.clone();

        let model: Arc<dyn ScoringModel> = match entry.kind {
            ModelKind::Reference => Arc::new(ReferenceModel::new()),
            ModelKind::TreeEnsemble => Arc::new(TreeEnsemble::load(&self.artifact_path(version, entry)?, order)?),
            ModelKind::Linear => Arc::new(LinearModel::load(&self.artifact_path(version, entry)?, order)?),
        };
        tracing::info!(version, kind = entry.kind.as_str(), "loaded scoring model");

        Ok(LoadedModel {
            version: version.to_string(),
            model,
        })
    }

    fn artifact_path(&self, version: &str, entry: &ModelEntry) -> Result<PathBuf> {
        let path = entry.path.as_ref().ok_or_else(|| {
            ScoreError::Config(format!(
                "model '{version}' of kind {} has no artifact path",
                entry.kind.as_str()
            ))
        })?;
        Ok(if path.is_absolute() {
            path.clone()
        } else {
            self.base_dir.join(path)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const REGISTRY: &str = r#"{
        "default_version": "ref",
        "models": {
            "ref": {"kind": "reference"},
            "lin": {"kind": "linear", "path": "lin.json"},
            "broken": {"kind": "tree_ensemble"}
        }
    }"#;

    #[test]
    fn default_and_explicit_versions() {
        let registry = ModelRegistry::from_json_str(REGISTRY, "").unwrap();
        assert_eq!(registry.resolve_version(None).unwrap(), "ref");
        assert_eq!(registry.resolve_version(Some("lin")).unwrap(), "lin");
        let loaded = registry.load_model(None).unwrap();
        assert_eq!(loaded.version, "ref");
        assert_eq!(loaded.model.kind(), ModelKind::Reference);
    }

    #[test]
    fn unknown_version_never_falls_back() {
        let registry = ModelRegistry::from_json_str(REGISTRY, "").unwrap();
        let err = registry.load_model(Some("v3")).unwrap_err();
        match err {
            ScoreError::Config(msg) => assert!(msg.contains("v3")),
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn missing_artifacts_are_config_errors() {
        let registry = ModelRegistry::from_json_str(REGISTRY, "/nonexistent").unwrap();
        assert!(matches!(registry.load_model(Some("broken")), Err(ScoreError::Config(_))));
        assert!(matches!(registry.load_model(Some("lin")), Err(ScoreError::Config(_))));
    }

    #[test]
    fn no_default_requires_explicit_choice() {
        let json = r#"{"models": {"ref": {"kind": "reference"}}}"#;
        let registry = ModelRegistry::from_json_str(json, "").unwrap();
        assert!(registry.resolve_version(None).is_err());
        assert!(registry.resolve_version(Some("ref")).is_ok());

        let dangling = r#"{"default_version": "x", "models": {}}"#;
        assert!(ModelRegistry::from_json_str(dangling, "").is_err());
    }

    #[test]
    fn artifact_paths_are_relative_to_registry() {
        let dir = tempfile::tempdir().unwrap();
        let coefficients = vec![0.0; 12];
        let artifact = serde_json::json!({"intercept": 0.4, "coefficients": coefficients});
        fs::write(dir.path().join("lin.json"), artifact.to_string()).unwrap();
        let registry_path = dir.path().join("registry.json");
        fs::write(&registry_path, REGISTRY).unwrap();

        let registry = ModelRegistry::load(&registry_path).unwrap();
        let loaded = registry.load_model(Some("lin")).unwrap();
        assert_eq!(loaded.model.kind(), ModelKind::Linear);
    }
}
