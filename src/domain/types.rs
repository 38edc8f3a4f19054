//! Shared domain types.
//!
//! These types are intentionally kept small and serializable so they can be:
//!
//! - passed between the canonicalizer, scorers and calibration layer
//! - exported to JSON/CSV reports
//! - compared bit-for-bit in tests

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::ScoreError;

/// Number of fields in a canonical feature vector.
pub const FEATURE_COUNT: usize = 12;

/// One of the twelve canonical features, in schema order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    Radius,
    Mass,
    OrbitalPeriod,
    SemiMajorAxis,
    Eccentricity,
    Insolation,
    EquilibriumTemperature,
    Density,
    StellarTemperature,
    StellarMass,
    StellarRadius,
    StellarLuminosity,
}

impl Feature {
    /// All features in vector order.
    pub const ALL: [Feature; FEATURE_COUNT] = [
        Feature::Radius,
        Feature::Mass,
        Feature::OrbitalPeriod,
        Feature::SemiMajorAxis,
        Feature::Eccentricity,
        Feature::Insolation,
        Feature::EquilibriumTemperature,
        Feature::Density,
        Feature::StellarTemperature,
        Feature::StellarMass,
        Feature::StellarRadius,
        Feature::StellarLuminosity,
    ];

    /// Position in the feature vector.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Archive column name (NASA Exoplanet Archive convention).
    ///
    /// These names are what the feature schema and model artifacts refer to.
    pub fn column(self) -> &'static str {
        match self {
            Feature::Radius => "pl_rade",
            Feature::Mass => "pl_masse",
            Feature::OrbitalPeriod => "pl_orbper",
            Feature::SemiMajorAxis => "pl_orbsmax",
            Feature::Eccentricity => "pl_orbeccen",
            Feature::Insolation => "pl_insol",
            Feature::EquilibriumTemperature => "pl_eqt",
            Feature::Density => "pl_dens",
            Feature::StellarTemperature => "st_teff",
            Feature::StellarMass => "st_mass",
            Feature::StellarRadius => "st_rad",
            Feature::StellarLuminosity => "st_lum",
        }
    }

    pub fn from_column(name: &str) -> Option<Feature> {
        Feature::ALL.into_iter().find(|f| f.column() == name)
    }

    pub fn units(self) -> &'static str {
        match self {
            Feature::Radius => "R_earth",
            Feature::Mass => "M_earth",
            Feature::OrbitalPeriod => "days",
            Feature::SemiMajorAxis => "AU",
            Feature::Eccentricity => "",
            Feature::Insolation => "S_earth",
            Feature::EquilibriumTemperature => "K",
            Feature::Density => "g/cm^3",
            Feature::StellarTemperature => "K",
            Feature::StellarMass => "M_sun",
            Feature::StellarRadius => "R_sun",
            Feature::StellarLuminosity => "L_sun",
        }
    }

    /// Inclusive clamp range applied by the canonicalizer.
    pub fn clamp_range(self) -> (f64, f64) {
        match self {
            Feature::Radius => (0.1, 20.0),
            Feature::Mass => (0.001, 500.0),
            Feature::OrbitalPeriod => (0.1, 100_000.0),
            Feature::SemiMajorAxis => (0.01, 1000.0),
            Feature::Eccentricity => (0.0, 1.0),
            Feature::Insolation => (1e-4, 100.0),
            Feature::EquilibriumTemperature => (50.0, 3000.0),
            Feature::Density => (0.1, 30.0),
            Feature::StellarTemperature => (2000.0, 50_000.0),
            Feature::StellarMass => (0.08, 100.0),
            Feature::StellarRadius => (0.1, 1000.0),
            Feature::StellarLuminosity => (1e-4, 1e6),
        }
    }
}

impl std::fmt::Display for Feature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.column())
    }
}

/// A complete, clamped feature vector in canonical order.
///
/// Every value is finite and inside [`Feature::clamp_range`]. The only ways to
/// build one are the canonicalizer and [`FeatureVector::try_from_array`], which
/// checks the invariant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureVector {
    values: [f64; FEATURE_COUNT],
}

impl FeatureVector {
    pub(crate) fn from_clamped(values: [f64; FEATURE_COUNT]) -> Self {
        Self { values }
    }

    /// Build a vector from raw values, rejecting NaN/inf and out-of-range entries.
    pub fn try_from_array(values: [f64; FEATURE_COUNT]) -> Result<Self, ScoreError> {
        for feature in Feature::ALL {
            let v = values[feature.index()];
            let (lo, hi) = feature.clamp_range();
            if !v.is_finite() || v < lo || v > hi {
                return Err(ScoreError::InvalidFeature(format!(
                    "{feature} = {v} outside [{lo}, {hi}]"
                )));
            }
        }
        Ok(Self { values })
    }

    pub fn get(&self, feature: Feature) -> f64 {
        self.values[feature.index()]
    }

    pub fn as_array(&self) -> &[f64; FEATURE_COUNT] {
        &self.values
    }

    /// `(column, value)` pairs in vector order (for reports).
    pub fn named(&self) -> Vec<(&'static str, f64)> {
        Feature::ALL
            .iter()
            .map(|f| (f.column(), self.get(*f)))
            .collect()
    }
}

/// Planet-side inputs of a raw record. All fields optional.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanetFields {
    /// Earth radii.
    pub radius: Option<f64>,
    /// Earth masses.
    pub mass: Option<f64>,
    /// Days.
    pub orbital_period: Option<f64>,
    /// AU.
    pub semi_major_axis: Option<f64>,
    pub eccentricity: Option<f64>,
    /// Earth flux units.
    pub insolation: Option<f64>,
    /// Kelvin, no greenhouse.
    pub equilibrium_temperature: Option<f64>,
    /// g/cm^3.
    pub density: Option<f64>,
}

/// Star-side inputs of a raw record. All fields optional.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StarFields {
    /// Effective temperature in Kelvin.
    pub temperature: Option<f64>,
    /// Solar masses.
    pub mass: Option<f64>,
    /// Solar radii.
    pub radius: Option<f64>,
    /// Solar luminosities.
    pub luminosity: Option<f64>,
}

/// Sparse astronomical record, namespaced by body.
///
/// Planet and star values never share a key space, so `planet.mass` and
/// `star.mass` cannot shadow each other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub planet: PlanetFields,
    pub star: StarFields,
}

impl RawRecord {
    /// Record with every field supplied, in canonical feature order.
    pub fn complete(values: [f64; FEATURE_COUNT]) -> Self {
        let v = |f: Feature| Some(values[f.index()]);
        Self {
            planet: PlanetFields {
                radius: v(Feature::Radius),
                mass: v(Feature::Mass),
                orbital_period: v(Feature::OrbitalPeriod),
                semi_major_axis: v(Feature::SemiMajorAxis),
                eccentricity: v(Feature::Eccentricity),
                insolation: v(Feature::Insolation),
                equilibrium_temperature: v(Feature::EquilibriumTemperature),
                density: v(Feature::Density),
            },
            star: StarFields {
                temperature: v(Feature::StellarTemperature),
                mass: v(Feature::StellarMass),
                radius: v(Feature::StellarRadius),
                luminosity: v(Feature::StellarLuminosity),
            },
        }
    }

    /// Supplied value for a feature, treating NaN as missing.
    pub fn value(&self, feature: Feature) -> Option<f64> {
        let v = match feature {
            Feature::Radius => self.planet.radius,
            Feature::Mass => self.planet.mass,
            Feature::OrbitalPeriod => self.planet.orbital_period,
            Feature::SemiMajorAxis => self.planet.semi_major_axis,
            Feature::Eccentricity => self.planet.eccentricity,
            Feature::Insolation => self.planet.insolation,
            Feature::EquilibriumTemperature => self.planet.equilibrium_temperature,
            Feature::Density => self.planet.density,
            Feature::StellarTemperature => self.star.temperature,
            Feature::StellarMass => self.star.mass,
            Feature::StellarRadius => self.star.radius,
            Feature::StellarLuminosity => self.star.luminosity,
        };
        v.filter(|x| !x.is_nan())
    }
}

/// Formula used to synthesize a missing feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImputationMethod {
    /// Fixed population/solar default.
    Default,
    /// `M = R^2.06` for small planets.
    RockyMassRadius,
    /// Stepped median mass by radius bin.
    GiantRadiusBin,
    /// `a = (P_yr^2 * M_star)^(1/3)`.
    KeplerThirdLaw,
    /// `L = R^2 (T/5778)^4`.
    StefanBoltzmann,
    /// `S = L / a^2`.
    InverseSquareFlux,
    /// `T_eq = 278.5 S^0.25`.
    FluxPowerLaw,
    /// Bulk density from mass and radius.
    MassRadiusVolume,
    /// Earth density when the volume is degenerate.
    EarthDensityFallback,
}

impl ImputationMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            ImputationMethod::Default => "default",
            ImputationMethod::RockyMassRadius => "rocky_mass_radius",
            ImputationMethod::GiantRadiusBin => "giant_radius_bin",
            ImputationMethod::KeplerThirdLaw => "kepler_third_law",
            ImputationMethod::StefanBoltzmann => "stefan_boltzmann",
            ImputationMethod::InverseSquareFlux => "inverse_square_flux",
            ImputationMethod::FluxPowerLaw => "flux_power_law",
            ImputationMethod::MassRadiusVolume => "mass_radius_volume",
            ImputationMethod::EarthDensityFallback => "earth_density_fallback",
        }
    }
}

/// One synthesized field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Imputation {
    pub feature: Feature,
    pub method: ImputationMethod,
}

impl std::fmt::Display for Imputation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.feature, self.method.as_str())
    }
}

/// Multiplicative regime penalty identifiers, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegimeTag {
    #[serde(rename = "extreme_hot_5x")]
    ExtremeHot,
    #[serde(rename = "severe_hot_3x")]
    SevereHot,
    #[serde(rename = "moderate_hot_1.9x")]
    ModerateHot,
    #[serde(rename = "extreme_cold_0.05x")]
    ExtremeCold,
    #[serde(rename = "moderate_cold_0.15x")]
    ModerateCold,
}

impl RegimeTag {
    pub fn as_str(self) -> &'static str {
        match self {
            RegimeTag::ExtremeHot => "extreme_hot_5x",
            RegimeTag::SevereHot => "severe_hot_3x",
            RegimeTag::ModerateHot => "moderate_hot_1.9x",
            RegimeTag::ExtremeCold => "extreme_cold_0.05x",
            RegimeTag::ModerateCold => "moderate_cold_0.15x",
        }
    }

    /// Multiplier applied when the tag fires.
    pub fn multiplier(self) -> f64 {
        match self {
            RegimeTag::ExtremeHot => 0.10,
            RegimeTag::SevereHot => 0.30,
            RegimeTag::ModerateHot => 0.70,
            RegimeTag::ExtremeCold => 0.20,
            RegimeTag::ModerateCold => 0.50,
        }
    }
}

impl std::fmt::Display for RegimeTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-component Gaussian scores of the reference formula, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComponentScores {
    pub flux: f64,
    pub temperature: f64,
    pub radius: f64,
    pub density: f64,
    pub eccentricity: f64,
}

/// Result of scoring one record end to end.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreResult {
    /// Model output in `[0, 1]`.
    pub raw_score: f64,
    /// Earth-relative score in `[0, 100]`.
    pub calibrated_score: f64,
    pub component_scores: ComponentScores,
    pub regime_tags: Vec<RegimeTag>,
    pub imputed_fields: Vec<Imputation>,
}

/// Display policy for surface-gated scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceMode {
    /// Show a numeric score for every body.
    #[default]
    All,
    /// Show a numeric score only for rocky bodies.
    #[value(name = "rocky_only")]
    RockyOnly,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feature_order_matches_indices() {
        for (i, f) in Feature::ALL.iter().enumerate() {
            assert_eq!(f.index(), i);
            assert_eq!(Feature::from_column(f.column()), Some(*f));
        }
    }

    #[test]
    fn nan_inputs_are_missing() {
        let mut record = RawRecord::default();
        record.planet.radius = Some(f64::NAN);
        record.star.mass = Some(0.9);
        assert_eq!(record.value(Feature::Radius), None);
        assert_eq!(record.value(Feature::StellarMass), Some(0.9));
    }

    #[test]
    fn try_from_array_rejects_out_of_range() {
        let mut values = [1.0; FEATURE_COUNT];
        values[Feature::OrbitalPeriod.index()] = 365.25;
        values[Feature::Eccentricity.index()] = 0.0;
        values[Feature::EquilibriumTemperature.index()] = 255.0;
        values[Feature::Density.index()] = 5.51;
        values[Feature::StellarTemperature.index()] = 5778.0;
        assert!(FeatureVector::try_from_array(values).is_ok());

        values[Feature::Radius.index()] = 50.0;
        assert!(FeatureVector::try_from_array(values).is_err());

        values[Feature::Radius.index()] = f64::NAN;
        assert!(FeatureVector::try_from_array(values).is_err());
    }
}
