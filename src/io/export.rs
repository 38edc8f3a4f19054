//! CSV exports: per-record scores and synthetic training labels.
//!
//! Both are meant to be easy to consume in spreadsheets or training scripts.

use std::fs::File;
use std::path::Path;

use crate::data::LabeledRecord;
use crate::domain::Feature;
use crate::error::AppError;
use crate::io::ingest::NamedRecord;
use crate::models::RecordScore;

fn create_writer(path: &Path, what: &str) -> Result<csv::Writer<File>, AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create {what} CSV '{}': {e}", path.display())))?;
    Ok(csv::Writer::from_writer(file))
}

fn write_err(e: csv::Error) -> AppError {
    AppError::new(2, format!("Failed to write export CSV: {e}"))
}

/// Write one row per scored record. Hidden scores are left empty.
pub fn write_results_csv(path: &Path, inputs: &[NamedRecord], scores: &[RecordScore]) -> Result<(), AppError> {
    let mut w = create_writer(path, "results")?;
    w.write_record([
        "name",
        "raw_score",
        "calibrated_score",
        "surface_class",
        "display_label",
        "flux",
        "temperature",
        "radius",
        "density",
        "eccentricity",
        "regime_tags",
        "imputed_fields",
    ])
    .map_err(write_err)?;

    for (input, row) in inputs.iter().zip(scores) {
        let result = &row.result;
        let c = &result.component_scores;
        let tags: Vec<&str> = result.regime_tags.iter().map(|t| t.as_str()).collect();
        let imputed: Vec<String> = result.imputed_fields.iter().map(|i| i.to_string()).collect();
        w.write_record([
            input.name.clone(),
            format!("{:.6}", result.raw_score),
            row.score_display().map(|v| format!("{v:.4}")).unwrap_or_default(),
            row.surface.class.as_str().to_string(),
            row.display_label.clone(),
            format!("{:.6}", c.flux),
            format!("{:.6}", c.temperature),
            format!("{:.6}", c.radius),
            format!("{:.6}", c.density),
            format!("{:.6}", c.eccentricity),
            tags.join(";"),
            imputed.join(";"),
        ])
        .map_err(write_err)?;
    }
    w.flush().map_err(|e| AppError::new(2, format!("Failed to flush results CSV: {e}")))?;
    Ok(())
}

/// Write the twelve canonical features plus the reference label.
pub fn write_labels_csv(path: &Path, labeled: &[LabeledRecord]) -> Result<(), AppError> {
    let mut w = create_writer(path, "labels")?;
    let mut header: Vec<&str> = Feature::ALL.iter().map(|f| f.column()).collect();
    header.extend(["n_imputed", "label"]);
    w.write_record(&header).map_err(write_err)?;

    for row in labeled {
        let mut fields: Vec<String> = row.features.as_array().iter().map(|v| format!("{v:.10}")).collect();
        fields.push(row.imputed.to_string());
        fields.push(format!("{:.10}", row.label));
        w.write_record(&fields).map_err(write_err)?;
    }
    w.flush().map_err(|e| AppError::new(2, format!("Failed to flush labels CSV: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{SyntheticConfig, generate_labels};

    #[test]
    fn labels_csv_has_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labels.csv");
        let labeled = generate_labels(&SyntheticConfig {
            count: 25,
            seed: 11,
            missing_rate: 0.3,
        })
        .unwrap();
        write_labels_csv(&path, &labeled).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.len(), 14);
        assert_eq!(&headers[0], "pl_rade");
        assert_eq!(&headers[13], "label");
        assert_eq!(reader.records().count(), 25);
    }

    #[test]
    fn results_csv_blanks_hidden_scores() {
        use crate::domain::SurfaceMode;
        use crate::features::FeatureSchema;
        use crate::models::{ModelAdapter, Scorer};
        use crate::validation::bodies::{EARTH, JUPITER};

        let scorer = Scorer::new(ModelAdapter::reference(&FeatureSchema::builtin()).unwrap()).unwrap();
        let inputs = vec![
            NamedRecord { name: "Earth".into(), record: EARTH.record() },
            NamedRecord { name: "Jupiter".into(), record: JUPITER.record() },
        ];
        let records: Vec<_> = inputs.iter().map(|n| n.record).collect();
        let scores = scorer.score_table(&records, SurfaceMode::RockyOnly).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.csv");
        write_results_csv(&path, &inputs, &scores).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][0], "Earth");
        assert_eq!(&rows[0][3], "rocky");
        assert_eq!(&rows[1][2], "");
        assert_eq!(&rows[1][3], "giant");
    }

    #[test]
    fn unwritable_path_is_usage_error() {
        let err = write_labels_csv(Path::new("/nonexistent/dir/labels.csv"), &[]).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
