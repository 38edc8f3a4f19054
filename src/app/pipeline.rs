//! Shared loading and scoring workflow used by the CLI commands.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! schema -> registry -> model version -> adapter -> calibration -> scores

use std::path::{Path, PathBuf};

use crate::domain::SurfaceMode;
use crate::error::AppError;
use crate::features::FeatureSchema;
use crate::io::ingest::{IngestedRecords, load_records};
use crate::models::{ModelAdapter, ModelRegistry, RecordScore, Scorer};

/// Where the schema and model come from.
#[derive(Debug, Clone, Default)]
pub struct ModelSource {
    pub schema: Option<PathBuf>,
    pub registry: Option<PathBuf>,
    pub model_version: Option<String>,
}

/// Load the feature schema, or the built-in one when no path is given.
pub fn load_schema(path: Option<&Path>) -> Result<FeatureSchema, AppError> {
    match path {
        Some(p) => Ok(FeatureSchema::load(p)?),
        None => Ok(FeatureSchema::builtin()),
    }
}

/// Resolve the requested model version and check it against the schema.
pub fn load_adapter(source: &ModelSource) -> Result<(FeatureSchema, ModelAdapter), AppError> {
    let schema = load_schema(source.schema.as_deref())?;
    let registry = match &source.registry {
        Some(p) => ModelRegistry::load(p)?,
        None => ModelRegistry::reference_only(),
    };
    let loaded = registry.load_model(source.model_version.as_deref())?;
    let adapter = ModelAdapter::new(loaded, &schema)?;
    Ok((schema, adapter))
}

/// Adapter plus Earth calibration.
pub fn load_scorer(source: &ModelSource) -> Result<Scorer, AppError> {
    let (_, adapter) = load_adapter(source)?;
    Ok(Scorer::new(adapter)?)
}

/// All computed outputs of a single `hab score` run.
#[derive(Debug, Clone)]
pub struct ScoreRun {
    pub ingest: IngestedRecords,
    pub scores: Vec<RecordScore>,
    pub model_version: String,
}

/// Ingest a CSV and score every valid row.
pub fn run_score(source: &ModelSource, path: &Path, mode: SurfaceMode) -> Result<ScoreRun, AppError> {
    let scorer = load_scorer(source)?;
    let ingest = load_records(path)?;
    let records: Vec<_> = ingest.rows.iter().map(|r| r.record).collect();
    let scores = scorer.score_table(&records, mode)?;
    tracing::info!(
        rows = scores.len(),
        version = scorer.adapter().version(),
        "scored records"
    );
    Ok(ScoreRun {
        ingest,
        scores,
        model_version: scorer.adapter().version().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_source_is_reference() {
        let scorer = load_scorer(&ModelSource::default()).unwrap();
        assert_eq!(scorer.adapter().version(), "reference");
    }

    #[test]
    fn unknown_version_is_config_error() {
        let source = ModelSource {
            model_version: Some("v9".into()),
            ..ModelSource::default()
        };
        let err = load_scorer(&source).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn scores_a_csv_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("planets.csv");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "name,pl_rade,pl_masse,pl_orbper,pl_orbsmax,pl_orbeccen,pl_insol,pl_eqt,pl_dens,st_teff,st_mass,st_rad,st_lum").unwrap();
        writeln!(f, "Earth,1.0,1.0,365.25,1.0,0.0167,1.0,255.0,5.51,5778,1.0,1.0,1.0").unwrap();
        writeln!(f, "Sparse,1.2,,,,,,,,3500,0.4,,").unwrap();
        drop(f);

        let run = run_score(&ModelSource::default(), &path, SurfaceMode::All).unwrap();
        assert_eq!(run.scores.len(), 2);
        assert_eq!(run.scores[0].result.calibrated_score, 100.0);
        assert!(!run.scores[1].result.imputed_fields.is_empty());
    }
}
