//! Command-line parsing for the `hab` scorer.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the scoring code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::SurfaceMode;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "hab", version, about = "Earth-likeness scoring for exoplanet records")]
pub struct Cli {
    /// Feature schema JSON (defaults to the built-in schema).
    #[arg(long, global = true, env = "HAB_SCHEMA", value_name = "JSON")]
    pub schema: Option<PathBuf>,

    /// Model registry JSON (defaults to the reference formula only).
    #[arg(long, global = true, env = "HAB_MODEL_REGISTRY", value_name = "JSON")]
    pub registry: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Score every row of an archive-style CSV and print a ranked table.
    Score(ScoreArgs),
    /// Run the Solar System validation gates and write a JSON report.
    Validate(ValidateArgs),
    /// Run the pipeline sanity check and write a JSON report.
    Check(CheckArgs),
    /// Score simulator bodies from JSON and write a per-body debug snapshot.
    Bodies(BodiesArgs),
    /// Generate a seeded synthetic label dataset.
    Labels(LabelsArgs),
    /// Classify a body's surface from radius and density.
    #[command(allow_negative_numbers = true)]
    Classify(ClassifyArgs),
}

/// Model selection shared by scoring commands.
#[derive(Debug, Args, Clone)]
pub struct ModelArgs {
    /// Registry version to load (defaults to the registry's `default_version`).
    #[arg(long, env = "HAB_MODEL_VERSION")]
    pub model_version: Option<String>,
}

#[derive(Debug, Args, Clone)]
pub struct ScoreArgs {
    /// CSV with NASA Exoplanet Archive columns (`pl_rade`, ..., `st_lum`) and optional `name`.
    #[arg(long, value_name = "CSV")]
    pub record: PathBuf,

    #[command(flatten)]
    pub model: ModelArgs,

    /// Which bodies get a numeric score.
    #[arg(long, value_enum, default_value_t = SurfaceMode::All)]
    pub surface_mode: SurfaceMode,

    /// Export per-record results to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    /// Directory for `validation_<timestamp>.json`.
    #[arg(long, default_value = "reports")]
    pub export_dir: PathBuf,

    /// Exit non-zero when any gate fails.
    #[arg(long)]
    pub strict: bool,
}

#[derive(Debug, Args, Clone)]
pub struct CheckArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    /// Check the first row of this CSV instead of the Earth record.
    #[arg(long, value_name = "CSV")]
    pub record: Option<PathBuf>,

    /// Directory for `sanity_check_<timestamp>.json`.
    #[arg(long, default_value = "reports")]
    pub export_dir: PathBuf,
}

#[derive(Debug, Args, Clone)]
pub struct BodiesArgs {
    /// JSON array of `{planet, star}` simulator bodies.
    #[arg(long, value_name = "JSON")]
    pub input: PathBuf,

    #[command(flatten)]
    pub model: ModelArgs,

    /// Directory for `debug_snapshot_<timestamp>.json`.
    #[arg(long, default_value = "exports")]
    pub export_dir: PathBuf,
}

#[derive(Debug, Args, Clone)]
pub struct LabelsArgs {
    /// Number of synthetic records.
    #[arg(short = 'n', long, default_value_t = 1000)]
    pub count: usize,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Probability that an optional field is dropped.
    #[arg(long, default_value_t = 0.3)]
    pub missing_rate: f64,

    /// Output CSV.
    #[arg(long, value_name = "CSV")]
    pub out: PathBuf,
}

#[derive(Debug, Args, Clone)]
pub struct ClassifyArgs {
    /// Radius in Earth radii.
    pub radius: f64,

    /// Bulk density in g/cm^3.
    pub density: f64,

    #[arg(long, value_enum, default_value_t = SurfaceMode::All)]
    pub surface_mode: SurfaceMode,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_score_with_rocky_only() {
        let cli = Cli::try_parse_from([
            "hab",
            "score",
            "--record",
            "planets.csv",
            "--surface-mode",
            "rocky_only",
            "--model-version",
            "v1",
        ])
        .unwrap();
        let Command::Score(args) = cli.command else {
            panic!("expected score");
        };
        assert_eq!(args.surface_mode, SurfaceMode::RockyOnly);
        assert_eq!(args.model.model_version.as_deref(), Some("v1"));
        assert_eq!(args.record, PathBuf::from("planets.csv"));
    }

    #[test]
    fn global_options_follow_subcommand() {
        let cli = Cli::try_parse_from(["hab", "validate", "--strict", "--schema", "s.json"]).unwrap();
        assert_eq!(cli.schema, Some(PathBuf::from("s.json")));
        let Command::Validate(args) = cli.command else {
            panic!("expected validate");
        };
        assert!(args.strict);
        assert_eq!(args.export_dir, PathBuf::from("reports"));
    }

    #[test]
    fn bodies_defaults_to_exports_dir() {
        let cli = Cli::try_parse_from(["hab", "bodies", "--input", "bodies.json"]).unwrap();
        let Command::Bodies(args) = cli.command else {
            panic!("expected bodies");
        };
        assert_eq!(args.input, PathBuf::from("bodies.json"));
        assert_eq!(args.export_dir, PathBuf::from("exports"));
    }

    #[test]
    fn classify_takes_positionals() {
        let cli = Cli::try_parse_from(["hab", "classify", "2.5", "2.0"]).unwrap();
        let Command::Classify(args) = cli.command else {
            panic!("expected classify");
        };
        assert_eq!(args.radius, 2.5);
        assert_eq!(args.surface_mode, SurfaceMode::All);
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
