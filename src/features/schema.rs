//! Feature schema: names, units and validation ranges of the model inputs.
//!
//! The schema is loaded once at startup. Its feature order must be the
//! canonical order; anything else would silently permute model inputs, so it is
//! rejected with [`ScoreError::SchemaMismatch`].

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{Feature, FeatureVector};
use crate::error::{Result, ScoreError};

/// One schema entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSpec {
    pub name: String,
    #[serde(default)]
    pub units: String,
    /// Inclusive `[lo, hi]` validation range.
    pub range: [f64; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSchema {
    pub version: String,
    pub features: Vec<FeatureSpec>,
}

impl FeatureSchema {
    /// Built-in schema mirroring the canonical clamp ranges.
    pub fn builtin() -> Self {
        Self {
            version: "builtin".to_string(),
            features: Feature::ALL
                .iter()
                .map(|f| {
                    let (lo, hi) = f.clamp_range();
                    FeatureSpec {
                        name: f.column().to_string(),
                        units: f.units().to_string(),
                        range: [lo, hi],
                    }
                })
                .collect(),
        }
    }

    /// Load and order-check a schema JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            ScoreError::Config(format!("failed to read schema '{}': {e}", path.display()))
        })?;
        let schema = Self::from_json_str(&text)?;
        tracing::info!(
            path = %path.display(),
            version = %schema.version,
            "loaded feature schema"
        );
        Ok(schema)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let schema: FeatureSchema = serde_json::from_str(text)?;
        schema.ensure_order(&schema.names())?;
        for spec in &schema.features {
            let [lo, hi] = spec.range;
            if !(lo <= hi) {
                return Err(ScoreError::Config(format!(
                    "schema range for {} is empty: [{lo}, {hi}]",
                    spec.name
                )));
            }
        }
        Ok(schema)
    }

    pub fn names(&self) -> Vec<String> {
        self.features.iter().map(|f| f.name.clone()).collect()
    }

    /// Check that `found` lists exactly the canonical features in canonical order.
    pub fn ensure_order(&self, found: &[String]) -> Result<()> {
        let expected = canonical_names();
        if found != expected.as_slice() {
            return Err(ScoreError::SchemaMismatch { expected, found: found.to_vec() });
        }
        Ok(())
    }
}

impl Default for FeatureSchema {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Canonical column names in vector order.
pub fn canonical_names() -> Vec<String> {
    Feature::ALL.iter().map(|f| f.column().to_string()).collect()
}

/// Human-readable warnings for values outside the schema ranges.
///
/// Empty when every value is in range. The schema order has already been
/// checked at load time, so entries line up with the vector by position.
pub fn validate_features(vector: &FeatureVector, schema: &FeatureSchema) -> Vec<String> {
    let mut warnings = Vec::new();
    for (spec, value) in schema.features.iter().zip(vector.as_array()) {
        let [lo, hi] = spec.range;
        if !value.is_finite() {
            warnings.push(format!("{} is not finite (got {value})", spec.name));
        } else if *value < lo || *value > hi {
            let units = if spec.units.is_empty() {
                String::new()
            } else {
                format!(" {}", spec.units)
            };
            warnings.push(format!(
                "{} = {value:.4e}{units} outside valid range [{lo:.2e}, {hi:.2e}]",
                spec.name
            ));
        }
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::canonical::earth_reference;
    use std::io::Write;

    #[test]
    fn builtin_schema_is_canonical() {
        let schema = FeatureSchema::builtin();
        assert_eq!(schema.features.len(), 12);
        assert!(schema.ensure_order(&schema.names()).is_ok());
        assert!(validate_features(&earth_reference(), &schema).is_empty());
    }

    #[test]
    fn reordered_schema_is_rejected() {
        let mut schema = FeatureSchema::builtin();
        schema.features.swap(0, 1);
        let json = serde_json::to_string(&schema).unwrap();
        match FeatureSchema::from_json_str(&json) {
            Err(ScoreError::SchemaMismatch { expected, found }) => {
                assert_eq!(expected[0], "pl_rade");
                assert_eq!(found[0], "pl_masse");
            }
            other => panic!("expected schema mismatch, got {other:?}"),
        }
    }

    #[test]
    fn missing_feature_is_rejected() {
        let mut schema = FeatureSchema::builtin();
        schema.features.pop();
        let json = serde_json::to_string(&schema).unwrap();
        assert!(matches!(
            FeatureSchema::from_json_str(&json),
            Err(ScoreError::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn narrower_ranges_produce_warnings() {
        let mut schema = FeatureSchema::builtin();
        schema.features[Feature::EquilibriumTemperature.index()].range = [260.0, 2000.0];
        let warnings = validate_features(&earth_reference(), &schema);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].starts_with("pl_eqt"));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let json = serde_json::to_string_pretty(&FeatureSchema::builtin()).unwrap();
        file.write_all(json.as_bytes()).unwrap();
        let schema = FeatureSchema::load(file.path()).unwrap();
        assert_eq!(schema, FeatureSchema::builtin());

        let missing = FeatureSchema::load(Path::new("/nonexistent/schema.json"));
        assert!(matches!(missing, Err(ScoreError::Config(_))));
    }
}
