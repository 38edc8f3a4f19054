//! Error types.
//!
//! Library operations return [`ScoreError`]; the `hab` binary converts them into
//! [`AppError`], which carries the process exit code.
//!
//! Exit codes:
//! - 2: usage, configuration or I/O problem
//! - 3: input data cannot be scored (missing critical fields)
//! - 4: model or internal failure

use thiserror::Error;

/// Typed failures of the scoring pipeline.
///
/// Imputation notices and range warnings are not errors: they are recorded in
/// the imputation metadata or logged.
#[derive(Debug, Error)]
pub enum ScoreError {
    /// Input mapping aborted because a required field was absent.
    #[error("missing critical fields: {}", .0.join(", "))]
    MissingCriticalField(Vec<String>),

    /// A feature value is non-finite or outside its declared range.
    #[error("invalid feature value: {0}")]
    InvalidFeature(String),

    /// The scoring model failed to produce a prediction.
    #[error("model inference failed: {0}")]
    ModelInference(String),

    /// The model's feature order disagrees with the loaded schema.
    #[error("feature schema mismatch: expected [{}], found [{}]", .expected.join(", "), .found.join(", "))]
    SchemaMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },

    /// Invalid or incomplete configuration (schema, registry, version choice).
    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ScoreError>;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<ScoreError> for AppError {
    fn from(err: ScoreError) -> Self {
        let exit_code = match &err {
            ScoreError::MissingCriticalField(_) | ScoreError::InvalidFeature(_) => 3,
            ScoreError::ModelInference(_) | ScoreError::SchemaMismatch { .. } => 4,
            ScoreError::Config(_) | ScoreError::Io(_) | ScoreError::Json(_) => 2,
        };
        AppError::new(exit_code, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_errors_map_to_exit_codes() {
        let missing: AppError = ScoreError::MissingCriticalField(vec!["planet.mass".into()]).into();
        assert_eq!(missing.exit_code(), 3);
        assert!(missing.to_string().contains("planet.mass"));

        let inference: AppError = ScoreError::ModelInference("boom".into()).into();
        assert_eq!(inference.exit_code(), 4);

        let config: AppError = ScoreError::Config("no version".into()).into();
        assert_eq!(config.exit_code(), 2);
    }
}
