//! Seeded synthetic exoplanet population for training labels.
//!
//! Records are drawn sequentially from one `StdRng` so a seed always yields the
//! same population; scoring is then done in parallel. Optional fields are
//! dropped at random so the labels are produced through the same imputation
//! path that live predictions use.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::{Beta, LogNormal, Uniform};
use rayon::prelude::*;
use serde::Serialize;

use crate::domain::{FeatureVector, RawRecord};
use crate::error::{Result, ScoreError};
use crate::features::canonicalize;
use crate::physics;
use crate::reference;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyntheticConfig {
    pub count: usize,
    pub seed: u64,
    /// Probability that an optional field is left out of a record.
    pub missing_rate: f64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            count: 1000,
            seed: 42,
            missing_rate: 0.3,
        }
    }
}

/// One generated record with its canonical vector and reference label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabeledRecord {
    pub record: RawRecord,
    pub features: FeatureVector,
    pub imputed: usize,
    pub label: f64,
}

struct Distributions {
    teff: Uniform<f64>,
    radius: LogNormal<f64>,
    period: LogNormal<f64>,
    eccentricity: Beta<f64>,
    scatter: LogNormal<f64>,
}

impl Distributions {
    fn new() -> Result<Self> {
        let err = |e: &dyn std::fmt::Display| ScoreError::Config(format!("synthetic distribution error: {e}"));
        Ok(Self {
            teff: Uniform::new_inclusive(2800.0, 7500.0),
            radius: LogNormal::new(1.6f64.ln(), 0.8).map_err(|e| err(&e))?,
            period: LogNormal::new(60f64.ln(), 1.6).map_err(|e| err(&e))?,
            // Kipping (2013) fit to RV eccentricities.
            eccentricity: Beta::new(0.867, 3.03).map_err(|e| err(&e))?,
            scatter: LogNormal::new(0.0, 0.15).map_err(|e| err(&e))?,
        })
    }
}

fn draw_record(rng: &mut StdRng, d: &Distributions, missing_rate: f64) -> RawRecord {
    let teff: f64 = d.teff.sample(rng);
    let star_mass = (teff / physics::SOLAR_TEFF).powf(1.6) * d.scatter.sample(rng);
    let star_radius = star_mass.powf(0.8);
    let luminosity = physics::stefan_boltzmann_luminosity(star_radius, teff);

    let radius: f64 = d.radius.sample(rng).min(20.0);
    let mass = if radius < physics::ROCKY_RADIUS_LIMIT {
        radius.powf(2.06)
    } else {
        radius.powf(1.3) * 2.7
    } * d.scatter.sample(rng);
    let period: f64 = d.period.sample(rng);
    let semi_major_axis = physics::kepler_semi_major_axis(period, star_mass);
    let eccentricity: f64 = d.eccentricity.sample(rng);
    let insolation = physics::insolation(luminosity, semi_major_axis);
    let equilibrium_temperature = physics::equilibrium_temperature(insolation);
    let density = physics::bulk_density(mass, radius);

    let mut keep = |v: f64| -> Option<f64> {
        if rng.gen_bool(missing_rate) { None } else { Some(v) }
    };

    let mut record = RawRecord::default();
    record.planet.radius = Some(radius);
    record.planet.mass = keep(mass);
    record.planet.orbital_period = keep(period);
    record.planet.semi_major_axis = keep(semi_major_axis);
    record.planet.eccentricity = keep(eccentricity);
    record.planet.insolation = keep(insolation);
    record.planet.equilibrium_temperature = keep(equilibrium_temperature);
    record.planet.density = density.and_then(&mut keep);
    record.star.temperature = keep(teff);
    record.star.mass = keep(star_mass);
    record.star.radius = keep(star_radius);
    record.star.luminosity = keep(luminosity);
    record
}

/// Draw `config.count` sparse records. Deterministic for a given seed.
pub fn generate_records(config: &SyntheticConfig) -> Result<Vec<RawRecord>> {
    if config.count == 0 {
        return Err(ScoreError::Config("synthetic count must be > 0".to_string()));
    }
    if !(0.0..1.0).contains(&config.missing_rate) {
        return Err(ScoreError::Config(format!(
            "missing rate must be in [0, 1), got {}",
            config.missing_rate
        )));
    }
    let d = Distributions::new()?;
    let mut rng = StdRng::seed_from_u64(config.seed);
    Ok((0..config.count)
        .map(|_| draw_record(&mut rng, &d, config.missing_rate))
        .collect())
}

/// Canonicalize and label records with the reference formula, in parallel.
pub fn label_records(records: &[RawRecord]) -> Vec<LabeledRecord> {
    records
        .par_iter()
        .map(|record| {
            let canonical = canonicalize(record);
            LabeledRecord {
                record: *record,
                features: canonical.features,
                imputed: canonical.imputation.len(),
                label: reference::score(&canonical.features).score,
            }
        })
        .collect()
}

/// Generate and label a synthetic population.
pub fn generate_labels(config: &SyntheticConfig) -> Result<Vec<LabeledRecord>> {
    let records = generate_records(config)?;
    let labeled = label_records(&records);
    tracing::info!(
        count = labeled.len(),
        seed = config.seed,
        imputed = labeled.iter().map(|l| l.imputed).sum::<usize>(),
        "generated synthetic labels"
    );
    Ok(labeled)
}
