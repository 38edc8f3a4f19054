//! CSV ingest of archive-style planet records.
//!
//! Columns follow the NASA Exoplanet Archive names (`pl_rade`, `pl_masse`,
//! ..., `st_lum`) plus an optional `name` (or `pl_name`). Every feature column
//! is optional; empty cells are missing values for the canonicalizer.
//!
//! Design goals:
//! - **Header-tolerant**: case-insensitive, BOM-safe header matching
//! - **Row-level validation**: unparseable cells reject the row, not the file
//! - **Deterministic**: rows keep file order

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use csv::StringRecord;

use crate::domain::{Feature, RawRecord};
use crate::error::AppError;

/// One named input row.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedRecord {
    pub name: String,
    pub record: RawRecord,
}

/// A row-level error encountered during ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: usize,
    pub name: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct IngestedRecords {
    pub rows: Vec<NamedRecord>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    /// Feature columns present in the header.
    pub columns: Vec<Feature>,
}

/// Load planet records from a CSV file.
pub fn load_records(path: &Path) -> Result<IngestedRecords, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;
    read_records(file)
}

/// Load planet records from any CSV reader.
pub fn read_records<R: std::io::Read>(reader: R) -> Result<IngestedRecords, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    let columns: Vec<Feature> = Feature::ALL
        .into_iter()
        .filter(|f| header_map.contains_key(f.column()))
        .collect();
    if columns.is_empty() {
        return Err(AppError::new(
            2,
            "CSV has no recognized feature columns (expected archive names such as `pl_rade`, `st_teff`).",
        ));
    }

    let mut rows = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2: records() starts after the header and lines are 1-based.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    name: None,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        let name = get_optional(&record, &header_map, "name")
            .or_else(|| get_optional(&record, &header_map, "pl_name"))
            .map(str::to_string)
            .unwrap_or_else(|| format!("row-{}", idx + 1));

        match parse_row(&record, &header_map) {
            Ok(raw) => rows.push(NamedRecord { name, record: raw }),
            Err(message) => row_errors.push(RowError {
                line,
                name: Some(name),
                message,
            }),
        }
    }

    if rows.is_empty() {
        return Err(AppError::new(3, "No valid rows in input CSV."));
    }
    if !row_errors.is_empty() {
        tracing::warn!(skipped = row_errors.len(), "skipped invalid CSV rows");
    }

    Ok(IngestedRecords {
        rows,
        row_errors,
        rows_read,
        columns,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports may prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn parse_row(record: &StringRecord, header_map: &HashMap<String, usize>) -> Result<RawRecord, String> {
    let mut raw = RawRecord::default();
    for feature in Feature::ALL {
        let value = parse_opt_f64(get_optional(record, header_map, feature.column()), feature)?;
        let slot = match feature {
            Feature::Radius => &mut raw.planet.radius,
            Feature::Mass => &mut raw.planet.mass,
            Feature::OrbitalPeriod => &mut raw.planet.orbital_period,
            Feature::SemiMajorAxis => &mut raw.planet.semi_major_axis,
            Feature::Eccentricity => &mut raw.planet.eccentricity,
            Feature::Insolation => &mut raw.planet.insolation,
            Feature::EquilibriumTemperature => &mut raw.planet.equilibrium_temperature,
            Feature::Density => &mut raw.planet.density,
            Feature::StellarTemperature => &mut raw.star.temperature,
            Feature::StellarMass => &mut raw.star.mass,
            Feature::StellarRadius => &mut raw.star.radius,
            Feature::StellarLuminosity => &mut raw.star.luminosity,
        };
        *slot = value;
    }
    Ok(raw)
}

fn get_optional<'a>(record: &'a StringRecord, header_map: &HashMap<String, usize>, name: &str) -> Option<&'a str> {
    let idx = header_map.get(name)?;
    record.get(*idx).map(str::trim).filter(|s| !s.is_empty())
}

/// Empty and `nan` cells are missing; anything else must parse as a number.
fn parse_opt_f64(s: Option<&str>, feature: Feature) -> Result<Option<f64>, String> {
    let Some(s) = s else { return Ok(None) };
    if s.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    s.parse::<f64>()
        .map(Some)
        .map_err(|_| format!("Invalid `{feature}` value '{s}'."))
}
