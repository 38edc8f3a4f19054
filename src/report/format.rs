//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the scoring and validation code stays clean and testable
//! - output changes are localized

use crate::data::LabeledRecord;
use crate::debug::DebugSnapshot;
use crate::io::ingest::{IngestedRecords, NamedRecord};
use crate::models::{Explanation, RecordScore};
use crate::surface::SurfaceClassification;
use crate::validation::{CheckStatus, GateDetail, GateReport, SanityReport};

/// Score table for `hab score`, best first.
pub fn format_score_table(
    ingest: &IngestedRecords,
    rows: &[(&NamedRecord, &RecordScore)],
    model_version: &str,
) -> String {
    let mut out = String::new();

    out.push_str("=== hab - Earth-likeness scores ===\n");
    out.push_str(&format!("Model: {model_version}\n"));
    out.push_str(&format!(
        "Rows: read={} scored={} skipped={}\n",
        ingest.rows_read,
        ingest.rows.len(),
        ingest.row_errors.len()
    ));
    for err in &ingest.row_errors {
        out.push_str(&format!(
            "  line {}{}: {}\n",
            err.line,
            err.name.as_deref().map(|n| format!(" ({n})")).unwrap_or_default(),
            err.message
        ));
    }
    out.push('\n');

    out.push_str(&table_line(&format!(
        "{:<24} {:>8} {:>8} {:<8} {:<28} {:<20} {:>3}",
        "name", "score", "raw", "surface", "label", "regime", "imp"
    )));
    out.push_str(&table_line(&format!(
        "{:-<24} {:-<8} {:-<8} {:-<8} {:-<28} {:-<20} {:-<3}",
        "", "", "", "", "", "", ""
    )));

    for (input, row) in rows {
        let score = row
            .score_display()
            .map(|v| format!("{v:.2}"))
            .unwrap_or_else(|| "-".to_string());
        let tags: Vec<&str> = row.result.regime_tags.iter().map(|t| t.as_str()).collect();
        out.push_str(&table_line(&format!(
            "{:<24} {:>8} {:>8.4} {:<8} {:<28} {:<20} {:>3}",
            truncate(&input.name, 24),
            score,
            row.result.raw_score,
            row.surface.class.as_str(),
            truncate(&row.display_label, 28),
            truncate(&tags.join(","), 20),
            row.result.imputed_fields.len(),
        )));
    }

    out
}

/// Gate report for `hab validate`.
pub fn format_gate_report(report: &GateReport, model_version: &str) -> String {
    let mut out = String::new();

    out.push_str("=== hab - Solar System validation ===\n");
    out.push_str(&format!("Model: {model_version}\n"));
    out.push_str("\nRaw scores:\n");
    for (body, score) in &report.scores {
        out.push_str(&format!("  {body:<8} {score:.4}\n"));
    }

    out.push_str("\nGates:\n");
    for gate in &report.gates {
        let mark = if gate.pass { "PASS" } else { "FAIL" };
        out.push_str(&format!(
            "  [{mark}] {:<18} {} ({})\n",
            gate.name,
            gate.description,
            format_gate_detail(&gate.detail)
        ));
    }

    out.push_str(&format!(
        "\n{}/{} gates passed\n",
        report.passed_count(),
        report.gates.len()
    ));
    out
}

fn format_gate_detail(detail: &GateDetail) -> String {
    match detail {
        GateDetail::Ranking { ranking } => {
            let parts: Vec<String> = ranking.iter().map(|(b, s)| format!("{b}={s:.3}")).collect();
            parts.join(" > ")
        }
        GateDetail::Difference { difference } => format!("diff={difference:+.4}"),
        GateDetail::Ratio { ratio, threshold } if ratio.is_finite() => {
            format!("ratio={ratio:.3} < {threshold:.2}")
        }
        GateDetail::Ratio { threshold, .. } => format!("ratio=inf < {threshold:.2}"),
    }
}

/// Sanity report for `hab check`.
pub fn format_sanity_report(report: &SanityReport) -> String {
    let mut out = String::new();

    out.push_str("=== hab - pipeline sanity check ===\n");
    out.push_str(&format!("Subject: {}\n", report.subject));
    out.push_str(&format!("Model: {}\n\n", report.model_version));

    for (key, check) in report.checks.keyed() {
        out.push_str(&format!("[{:<7}] {key}: {}\n", check.status.as_str(), check.name));
        for issue in &check.issues {
            out.push_str(&format!("          - {issue}\n"));
        }
    }

    out.push_str(&format!("\nOverall: {}\n", report.overall_status));
    if report.overall_status != CheckStatus::Pass {
        out.push_str(&format!("Recommended fix: {}\n", report.recommended_fix));
    }
    out
}

/// Per-body table for `hab bodies`.
pub fn format_body_snapshot(snapshot: &DebugSnapshot) -> String {
    let mut out = String::new();

    out.push_str("=== hab - simulator bodies ===\n");
    out.push_str(&format!("Model: {}\n", snapshot.model_version));
    out.push_str(&format!(
        "Bodies: {} scored={}\n\n",
        snapshot.planets.len(),
        snapshot.scored_count()
    ));

    out.push_str(&table_line(&format!(
        "{:<20} {:>8} {:>8} {:<8} {:>8} {:<28}",
        "name", "pl_rade", "pl_dens", "surface", "score", "status"
    )));
    out.push_str(&table_line(&format!(
        "{:-<20} {:-<8} {:-<8} {:-<8} {:-<8} {:-<28}",
        "", "", "", "", "", ""
    )));

    let opt = |v: Option<f64>, prec: usize| v.map(|x| format!("{x:.prec$}")).unwrap_or_else(|| "-".to_string());
    for p in &snapshot.planets {
        let status = match (&p.prediction_error, p.missing_critical.is_empty()) {
            (Some(e), _) => format!("error: {e}"),
            (None, false) => format!("missing {}", p.missing_critical.join(",")),
            (None, true) => p.display_label.clone(),
        };
        out.push_str(&table_line(&format!(
            "{:<20} {:>8} {:>8} {:<8} {:>8} {:<28}",
            truncate(&p.name, 20),
            opt(p.pl_rade, 3),
            opt(p.pl_dens, 2),
            p.surface_class.as_str(),
            opt(p.score_display, 2),
            truncate(&status, 28),
        )));
    }
    out
}

/// Feature importances, largest first.
pub fn format_explanation(explanation: &Explanation, top_n: usize) -> String {
    let mut ranked: Vec<(&str, f64, f64)> = explanation
        .normalized_importances
        .iter()
        .zip(&explanation.feature_values)
        .map(|((name, weight), (_, value))| (name.as_str(), *weight, *value))
        .collect();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    let mut out = String::from("Top features:\n");
    for (name, weight, value) in ranked.into_iter().take(top_n) {
        out.push_str(&format!("  {name:<10} {weight:>6.3}  value={value:.4}\n"));
    }
    out
}

/// Classification summary for `hab classify`.
pub fn format_classification(
    radius: f64,
    density: f64,
    classification: &SurfaceClassification,
    display_label: &str,
    should_display_score: bool,
) -> String {
    let mut out = String::new();
    out.push_str(&format!("radius={radius} R_earth, density={density} g/cm^3\n"));
    out.push_str(&format!("class: {}\n", classification.class));
    out.push_str(&format!("surface applicable: {}\n", classification.applicable));
    out.push_str(&format!("reason: {}\n", classification.reason));
    if !display_label.is_empty() {
        out.push_str(&format!("label: {display_label}\n"));
    }
    out.push_str(&format!("score shown: {should_display_score}\n"));
    for warning in &classification.warnings {
        out.push_str(&format!("warning: {warning}\n"));
    }
    out
}

/// One-line summary of a generated label set.
pub fn format_labels_summary(labeled: &[LabeledRecord], seed: u64) -> String {
    let n = labeled.len();
    let mean = if n == 0 {
        0.0
    } else {
        labeled.iter().map(|l| l.label).sum::<f64>() / n as f64
    };
    let max = labeled.iter().map(|l| l.label).fold(0.0, f64::max);
    let imputed = labeled.iter().map(|l| l.imputed).sum::<usize>();
    format!("labels: n={n} seed={seed} mean={mean:.4} max={max:.4} imputed_fields={imputed}\n")
}

fn table_line(s: &str) -> String {
    let mut line = s.trim_end().to_string();
    line.push('\n');
    line
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
