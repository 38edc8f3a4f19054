//! Pipeline sanity check: feature building, inference, gates, explainability.
//!
//! Each check yields PASS, WARN, FAIL or SKIPPED with free-form details and a
//! list of issues. The overall status is the worst check status; the
//! recommended fix comes from the first check that reached it.

use serde::Serialize;
use serde_json::{Value, json};

use crate::domain::{Feature, FeatureVector, RawRecord};
use crate::features::{FeatureSchema, canonicalize, earth_record, validate_features};
use crate::models::{EarthCalibration, ModelAdapter, ranked_importances, normalize_importances};
use crate::validation::gates::run_gates;

const TOP_FEATURES: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
    Skipped,
}

impl CheckStatus {
    fn severity(self) -> u8 {
        match self {
            CheckStatus::Pass | CheckStatus::Skipped => 0,
            CheckStatus::Warn => 1,
            CheckStatus::Fail => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CheckStatus::Pass => "PASS",
            CheckStatus::Warn => "WARN",
            CheckStatus::Fail => "FAIL",
            CheckStatus::Skipped => "SKIPPED",
        }
    }
}

impl std::fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub details: Value,
    pub issues: Vec<String>,
    #[serde(skip)]
    fix: Option<String>,
    /// Highest overall status this check can cause.
    #[serde(skip)]
    overall_cap: CheckStatus,
}

impl CheckResult {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Pass,
            details: json!({}),
            issues: Vec::new(),
            fix: None,
            overall_cap: CheckStatus::Fail,
        }
    }

    fn skipped(name: &str, why: &str) -> Self {
        let mut check = Self::new(name);
        check.status = CheckStatus::Skipped;
        check.issues.push(why.to_string());
        check
    }

    /// Raise the status to at least `status`. The first warning fix is kept;
    /// each further failure replaces the fix.
    fn flag(&mut self, status: CheckStatus, issue: String, fix: &str) {
        let raise = status.severity() > self.status.severity();
        if raise || (status == CheckStatus::Fail && self.status == CheckStatus::Fail) {
            self.status = status;
            self.fix = Some(fix.to_string());
        }
        self.issues.push(issue);
    }

    /// Status this check contributes to the overall status.
    fn contribution(&self) -> CheckStatus {
        if self.status.severity() > self.overall_cap.severity() {
            self.overall_cap
        } else {
            self.status
        }
    }

    fn detail(&mut self, key: &str, value: Value) {
        if let Value::Object(map) = &mut self.details {
            map.insert(key.to_string(), value);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Checks {
    pub feature_building: CheckResult,
    pub model_inference: CheckResult,
    pub solar_system_validation: CheckResult,
    pub explainability: CheckResult,
}

impl Checks {
    /// Checks paired with their JSON keys, in run order.
    pub fn keyed(&self) -> [(&'static str, &CheckResult); 4] {
        [
            ("feature_building", &self.feature_building),
            ("model_inference", &self.model_inference),
            ("solar_system_validation", &self.solar_system_validation),
            ("explainability", &self.explainability),
        ]
    }

    pub fn in_order(&self) -> [&CheckResult; 4] {
        [
            &self.feature_building,
            &self.model_inference,
            &self.solar_system_validation,
            &self.explainability,
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SanityReport {
    pub timestamp: String,
    pub subject: String,
    pub model_version: String,
    pub checks: Checks,
    pub overall_status: CheckStatus,
    pub recommended_fix: String,
}

/// Run all checks for `record` (the literal Earth record when `None`).
pub fn run_sanity_check(
    adapter: &ModelAdapter,
    schema: &FeatureSchema,
    record: Option<(&str, &RawRecord)>,
) -> SanityReport {
    let earth = earth_record();
    let (subject, record) = record.unwrap_or(("Earth", &earth));

    let (feature_building, features) = check_feature_building(record, schema);
    let model_inference = match features {
        Some(v) if feature_building.status != CheckStatus::Fail => check_model_inference(adapter, &v),
        _ => CheckResult::skipped("Model Inference", "Skipped due to feature building failure"),
    };
    let solar_system_validation = check_solar_system(adapter);
    let explainability = match features {
        Some(v) if model_inference.status != CheckStatus::Fail && model_inference.status != CheckStatus::Skipped => {
            check_explainability(adapter, &v)
        }
        _ => CheckResult::skipped("Feature Importance & Explainability", "Skipped due to previous failures"),
    };

    let checks = Checks {
        feature_building,
        model_inference,
        solar_system_validation,
        explainability,
    };
    let worst = checks
        .in_order()
        .into_iter()
        .map(CheckResult::contribution)
        .max_by_key(|s| s.severity())
        .unwrap_or(CheckStatus::Pass);
    let overall_status = if worst.severity() == 0 { CheckStatus::Pass } else { worst };
    // The last failure decides the fix; for warnings the first one does.
    let contributing = checks
        .in_order()
        .into_iter()
        .filter(|c| c.contribution() == overall_status && c.fix.is_some());
    let fix_source = match overall_status {
        CheckStatus::Fail => contributing.last(),
        _ => contributing.into_iter().next(),
    };
    let recommended_fix = fix_source
        .and_then(|c| c.fix.clone())
        .unwrap_or_else(|| "No issues detected".to_string());

    tracing::info!(status = %overall_status, subject, "sanity check finished");

    SanityReport {
        timestamp: chrono::Local::now().to_rfc3339(),
        subject: subject.to_string(),
        model_version: adapter.version().to_string(),
        checks,
        overall_status,
        recommended_fix,
    }
}

fn check_feature_building(record: &RawRecord, schema: &FeatureSchema) -> (CheckResult, Option<FeatureVector>) {
    let mut check = CheckResult::new("Feature Building & Schema Compliance");
    let canonical = canonicalize(record);
    let v = canonical.features;

    check.detail("feature_vector", json!(v.as_array()));
    check.detail(
        "imputed_fields",
        json!(canonical.imputation.as_slice().iter().map(|i| i.to_string()).collect::<Vec<_>>()),
    );

    let non_finite: Vec<&str> = Feature::ALL
        .iter()
        .filter(|f| !v.get(**f).is_finite())
        .map(|f| f.column())
        .collect();
    if !non_finite.is_empty() {
        check.flag(
            CheckStatus::Fail,
            format!("Non-finite values in: {}", non_finite.join(", ")),
            "Feature building produced NaN values",
        );
        return (check, None);
    }

    for warning in validate_features(&v, schema) {
        check.flag(CheckStatus::Warn, warning, "Some features outside expected ranges");
    }
    (check, Some(v))
}

fn check_model_inference(adapter: &ModelAdapter, v: &FeatureVector) -> CheckResult {
    let mut check = CheckResult::new("Model Inference");

    let calibration = match EarthCalibration::new(adapter) {
        Ok(c) => c,
        Err(e) => {
            check.flag(
                CheckStatus::Fail,
                format!("Earth reference prediction failed: {e}"),
                &format!("Model inference error: {e}"),
            );
            return check;
        }
    };
    check.detail("earth_reference_raw", json!(calibration.reference_raw()));
    if calibration.reference_raw() <= 0.0 {
        check.flag(
            CheckStatus::Warn,
            "Model scores Earth at zero; calibration degrades to raw * 100".to_string(),
            "Model calibration issue: Earth reference score is zero",
        );
    }

    match adapter.predict_raw(v) {
        Ok(raw) => {
            let score = calibration.calibrate(raw);
            check.detail("raw_score", json!(raw));
            check.detail("earth_normalized_score", json!(score));
            check.detail("interpretation", json!("0-100 scale (Earth=100), NOT probability of life"));
            if !(0.0..=100.0).contains(&score) {
                check.flag(
                    CheckStatus::Fail,
                    format!("Score {score:.2} outside valid range [0, 100]"),
                    "Model output normalization issue",
                );
            }
            if !(0.0..=1.0).contains(&raw) {
                check.flag(
                    CheckStatus::Fail,
                    format!("Raw score {raw:.4} outside valid range [0, 1]"),
                    "Model output range issue",
                );
            }
        }
        Err(e) => check.flag(
            CheckStatus::Fail,
            format!("Prediction failed: {e}"),
            &format!("Model inference error: {e}"),
        ),
    }
    check
}

fn check_solar_system(adapter: &ModelAdapter) -> CheckResult {
    let mut check = CheckResult::new("Solar System Ranking Test");
    match run_gates(|v| adapter.predict_raw(v)) {
        Ok(report) => {
            let mut ranking: Vec<(&String, &f64)> = report.scores.iter().collect();
            ranking.sort_by(|a, b| b.1.partial_cmp(a.1).unwrap_or(std::cmp::Ordering::Equal));
            check.detail("scores", json!(report.scores));
            check.detail("ranking", json!(ranking));
            check.detail("all_gates_passed", json!(report.all_passed));
            for gate in report.failures() {
                check.flag(
                    CheckStatus::Fail,
                    format!("{}: {}", gate.name, gate.description),
                    "Solar System ranking incorrect - model calibration issue",
                );
            }
        }
        Err(e) => {
            // The check fails, but an aborted gate run only warns overall.
            check.flag(
                CheckStatus::Fail,
                format!("Solar System validation failed: {e}"),
                "Solar System validation could not run; check model inference",
            );
            check.overall_cap = CheckStatus::Warn;
        }
    }
    check
}

fn check_explainability(adapter: &ModelAdapter, v: &FeatureVector) -> CheckResult {
    let mut check = CheckResult::new("Feature Importance & Explainability");
    if !adapter.has_importances() {
        check.flag(
            CheckStatus::Warn,
            "Model reports no native feature importance".to_string(),
            "Export feature importances with the model artifact",
        );
    }
    let normalized = normalize_importances(adapter.model().importances());
    let top: Vec<Value> = ranked_importances(&normalized)
        .into_iter()
        .take(TOP_FEATURES)
        .map(|(f, w)| json!({"name": f.column(), "importance": w, "value": v.get(f)}))
        .collect();
    check.detail("top_features", Value::Array(top));
    check
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FEATURE_COUNT;
    use crate::error::{Result, ScoreError};
    use crate::models::{LoadedModel, ModelKind, ScoringModel};
    use std::sync::Arc;

    fn reference_adapter() -> ModelAdapter {
        ModelAdapter::reference(&FeatureSchema::builtin()).unwrap()
    }

    #[derive(Debug)]
    struct Broken(Vec<String>);

    impl ScoringModel for Broken {
        fn kind(&self) -> ModelKind {
            ModelKind::TreeEnsemble
        }
        fn feature_order(&self) -> &[String] {
            &self.0
        }
        fn predict(&self, _: &FeatureVector) -> Result<f64> {
            Err(ScoreError::ModelInference("artifact corrupted".into()))
        }
        fn importances(&self) -> Option<[f64; FEATURE_COUNT]> {
            None
        }
    }

    #[test]
    fn reference_model_passes_everything() {
        let report = run_sanity_check(&reference_adapter(), &FeatureSchema::builtin(), None);
        assert_eq!(report.overall_status, CheckStatus::Pass);
        assert_eq!(report.recommended_fix, "No issues detected");
        assert_eq!(report.checks.model_inference.details["earth_normalized_score"], json!(100.0));
    }

    #[test]
    fn range_warnings_downgrade_to_warn() {
        let mut schema = FeatureSchema::builtin();
        schema.features[Feature::Radius.index()].range = [2.0, 20.0];
        let report = run_sanity_check(&reference_adapter(), &schema, None);
        assert_eq!(report.checks.feature_building.status, CheckStatus::Warn);
        assert_eq!(report.overall_status, CheckStatus::Warn);
        assert_eq!(report.recommended_fix, "Some features outside expected ranges");
    }

    #[test]
    fn inference_failure_fails_and_skips_explainability() {
        let adapter = ModelAdapter::new(
            LoadedModel {
                version: "broken".into(),
                model: Arc::new(Broken(crate::features::canonical_names())),
            },
            &FeatureSchema::builtin(),
        )
        .unwrap();
        let report = run_sanity_check(&adapter, &FeatureSchema::builtin(), None);
        assert_eq!(report.checks.model_inference.status, CheckStatus::Fail);
        assert_eq!(report.checks.explainability.status, CheckStatus::Skipped);
        assert_eq!(report.checks.solar_system_validation.status, CheckStatus::Fail);
        assert_eq!(report.overall_status, CheckStatus::Fail);
        assert!(report.recommended_fix.starts_with("Model inference error"));
    }

    /// Scores everything except bodies larger than 5 Earth radii.
    #[derive(Debug)]
    struct NoGiants(Vec<String>);

    impl ScoringModel for NoGiants {
        fn kind(&self) -> ModelKind {
            ModelKind::Linear
        }
        fn feature_order(&self) -> &[String] {
            &self.0
        }
        fn predict(&self, v: &FeatureVector) -> Result<f64> {
            if v.get(Feature::Radius) > 5.0 {
                return Err(ScoreError::ModelInference("radius out of training range".into()));
            }
            Ok(crate::reference::score(v).score)
        }
        fn importances(&self) -> Option<[f64; FEATURE_COUNT]> {
            Some([1.0; FEATURE_COUNT])
        }
    }

    #[test]
    fn aborted_gate_run_fails_check_but_only_warns_overall() {
        let adapter = ModelAdapter::new(
            LoadedModel {
                version: "no-giants".into(),
                model: Arc::new(NoGiants(crate::features::canonical_names())),
            },
            &FeatureSchema::builtin(),
        )
        .unwrap();
        let report = run_sanity_check(&adapter, &FeatureSchema::builtin(), None);
        assert_eq!(report.checks.model_inference.status, CheckStatus::Pass);
        assert_eq!(report.checks.solar_system_validation.status, CheckStatus::Fail);
        assert_eq!(report.overall_status, CheckStatus::Warn);
        assert_eq!(
            report.recommended_fix,
            "Solar System validation could not run; check model inference"
        );
    }

    #[test]
    fn last_failure_sets_the_fix() {
        let mut check = CheckResult::new("x");
        check.flag(CheckStatus::Warn, "w".into(), "first warning");
        check.flag(CheckStatus::Fail, "a".into(), "first failure");
        check.flag(CheckStatus::Fail, "b".into(), "second failure");
        check.flag(CheckStatus::Warn, "w2".into(), "late warning");
        assert_eq!(check.status, CheckStatus::Fail);
        assert_eq!(check.fix.as_deref(), Some("second failure"));
        assert_eq!(check.issues.len(), 4);
    }

    #[test]
    fn report_serializes_statuses_uppercase() {
        let report = run_sanity_check(&reference_adapter(), &FeatureSchema::builtin(), None);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["overall_status"], "PASS");
        assert_eq!(json["checks"]["explainability"]["status"], "PASS");
        assert!(json["checks"]["feature_building"]["details"]["feature_vector"].is_array());
    }
}
