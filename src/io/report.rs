//! Timestamped JSON report files (`sanity_check_<ts>.json`, `validation_<ts>.json`).

use std::fs::{File, create_dir_all};
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::Serialize;

use crate::error::AppError;

/// File name for a report written now, e.g. `validation_20250101_120000.json`.
pub fn report_file_name(prefix: &str) -> String {
    let ts = Local::now().format("%Y%m%d_%H%M%S");
    format!("{prefix}_{ts}.json")
}

/// Write `report` as pretty JSON into `dir`, creating the directory if needed.
pub fn write_json_report<T: Serialize>(dir: &Path, prefix: &str, report: &T) -> Result<PathBuf, AppError> {
    create_dir_all(dir)
        .map_err(|e| AppError::new(2, format!("Failed to create report dir '{}': {e}", dir.display())))?;

    let path = dir.join(report_file_name(prefix));
    let file = File::create(&path)
        .map_err(|e| AppError::new(2, format!("Failed to create report '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, report)
        .map_err(|e| AppError::new(2, format!("Failed to write report JSON: {e}")))?;

    tracing::info!(path = %path.display(), "wrote report");
    Ok(path)
}
