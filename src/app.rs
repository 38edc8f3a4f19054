//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - installs logging
//! - loads the schema and model
//! - prints reports and debug snapshots
//! - writes optional exports

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{BodiesArgs, CheckArgs, ClassifyArgs, Cli, Command, LabelsArgs, ModelArgs, ScoreArgs, ValidateArgs};
use crate::data::{SyntheticConfig, generate_labels};
use crate::error::AppError;
use crate::validation::{CheckStatus, run_gates, run_sanity_check};

pub mod pipeline;

use pipeline::ModelSource;

/// Top features printed by `hab check`.
const EXPLAIN_TOP: usize = 5;

/// Entry point for the `hab` binary.
pub fn run() -> Result<(), AppError> {
    // A missing .env is fine; the environment and flags still apply.
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let source = |model: &ModelArgs| ModelSource {
        schema: cli.schema.clone(),
        registry: cli.registry.clone(),
        model_version: model.model_version.clone(),
    };

    match &cli.command {
        Command::Score(args) => handle_score(args, &source(&args.model)),
        Command::Validate(args) => handle_validate(args, &source(&args.model)),
        Command::Check(args) => handle_check(args, &source(&args.model)),
        Command::Bodies(args) => handle_bodies(args, &source(&args.model)),
        Command::Labels(args) => handle_labels(args),
        Command::Classify(args) => handle_classify(args),
    }
}

/// Logs go to stderr so tables on stdout stay pipeable.
fn init_tracing(verbose: bool) {
    let default = if verbose { "hab_score=debug" } else { "hab_score=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .ok();
}

fn handle_score(args: &ScoreArgs, source: &ModelSource) -> Result<(), AppError> {
    let run = pipeline::run_score(source, &args.record, args.surface_mode)?;
    let rows = crate::report::ranked_rows(&run.ingest.rows, &run.scores);
    println!(
        "{}",
        crate::report::format_score_table(&run.ingest, &rows, &run.model_version)
    );

    if let Some(path) = &args.export {
        crate::io::export::write_results_csv(path, &run.ingest.rows, &run.scores)?;
        println!("Wrote results: {}", path.display());
    }
    Ok(())
}

fn handle_validate(args: &ValidateArgs, source: &ModelSource) -> Result<(), AppError> {
    let (_, adapter) = pipeline::load_adapter(source)?;
    let report = run_gates(|f| adapter.predict_raw(f))?;
    println!(
        "{}",
        crate::report::format_gate_report(&report, adapter.version())
    );

    let path = crate::io::report::write_json_report(&args.export_dir, "validation", &report)?;
    println!("Wrote report: {}", path.display());

    if !report.all_passed {
        for gate in report.failures() {
            tracing::warn!(gate = %gate.name, "validation gate failed");
        }
        if args.strict {
            return Err(AppError::new(
                4,
                format!(
                    "{} of {} validation gates failed.",
                    report.gates.len() - report.passed_count(),
                    report.gates.len()
                ),
            ));
        }
    }
    Ok(())
}

fn handle_check(args: &CheckArgs, source: &ModelSource) -> Result<(), AppError> {
    let (schema, adapter) = pipeline::load_adapter(source)?;

    let subject = match &args.record {
        Some(path) => {
            let ingest = crate::io::ingest::load_records(path)?;
            ingest.rows.into_iter().next()
        }
        None => None,
    };
    let report = run_sanity_check(
        &adapter,
        &schema,
        subject.as_ref().map(|s| (s.name.as_str(), &s.record)),
    );
    println!("{}", crate::report::format_sanity_report(&report));

    if adapter.has_importances() {
        let record = subject.map(|s| s.record).unwrap_or_else(crate::features::earth_record);
        let features = crate::features::canonicalize(&record).features;
        println!(
            "{}",
            crate::report::format_explanation(&adapter.explain(&features), EXPLAIN_TOP)
        );
    }

    let path = crate::io::report::write_json_report(&args.export_dir, "sanity_check", &report)?;
    println!("Wrote report: {}", path.display());

    if report.overall_status == CheckStatus::Fail {
        return Err(AppError::new(4, format!("Sanity check failed: {}", report.recommended_fix)));
    }
    Ok(())
}

fn handle_bodies(args: &BodiesArgs, source: &ModelSource) -> Result<(), AppError> {
    let scorer = pipeline::load_scorer(source)?;
    let bodies = crate::debug::load_bodies(&args.input)?;
    let snapshot = crate::debug::build_snapshot(&scorer, &bodies);
    println!("{}", crate::report::format_body_snapshot(&snapshot));

    let path = crate::io::report::write_json_report(&args.export_dir, "debug_snapshot", &snapshot)?;
    println!("Wrote snapshot: {}", path.display());
    Ok(())
}

fn handle_labels(args: &LabelsArgs) -> Result<(), AppError> {
    let config = SyntheticConfig {
        count: args.count,
        seed: args.seed,
        missing_rate: args.missing_rate,
    };
    let labeled = generate_labels(&config)?;
    crate::io::export::write_labels_csv(&args.out, &labeled)?;
    print!("{}", crate::report::format_labels_summary(&labeled, args.seed));
    println!("Wrote labels: {}", args.out.display());
    Ok(())
}

fn handle_classify(args: &ClassifyArgs) -> Result<(), AppError> {
    let classification = crate::surface::classify(args.radius, args.density);
    let label = crate::surface::display_label(classification.class, args.surface_mode);
    let shown = crate::surface::should_display_score(classification.class, args.surface_mode);
    print!(
        "{}",
        crate::report::format_classification(args.radius, args.density, &classification, label, shown)
    );
    Ok(())
}
