//! Sparse record -> complete, clamped feature vector.
//!
//! Fields are resolved in a fixed order because later fallbacks read earlier,
//! already-clamped values:
//!
//! 1. radius, 2. mass (needs radius), 3. period, 4. stellar mass,
//! 5. semi-major axis (needs 3, 4), 6. eccentricity, 7. stellar temperature,
//! 8. stellar radius, 9. luminosity (needs 7, 8), 10. insolation (needs 5, 9),
//! 11. equilibrium temperature (needs 10), 12. density (needs 1, 2).
//!
//! Supplied values are never replaced, only clamped. Every substituted value is
//! recorded in the imputation log with the formula that produced it.

use serde::Serialize;

use crate::domain::{
    FEATURE_COUNT, Feature, FeatureVector, Imputation, ImputationMethod, RawRecord,
};
use crate::math::clamp;
use crate::physics;

const DEFAULT_RADIUS: f64 = 6.0;
const DEFAULT_PERIOD_DAYS: f64 = 10.0;
const DEFAULT_STELLAR_MASS: f64 = 1.0;
const DEFAULT_ECCENTRICITY: f64 = 0.0;
const DEFAULT_STELLAR_RADIUS: f64 = 1.0;

/// Exponent of the small-planet mass-radius relation `M = R^2.06`.
const ROCKY_MASS_RADIUS_EXPONENT: f64 = 2.06;

/// Ordered, read-only list of the fields the canonicalizer had to synthesize.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ImputationLog(Vec<Imputation>);

impl ImputationLog {
    pub fn as_slice(&self) -> &[Imputation] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, feature: Feature) -> bool {
        self.0.iter().any(|i| i.feature == feature)
    }

    pub fn method_for(&self, feature: Feature) -> Option<ImputationMethod> {
        self.0.iter().find(|i| i.feature == feature).map(|i| i.method)
    }

    pub fn into_vec(self) -> Vec<Imputation> {
        self.0
    }
}

/// Output of [`canonicalize`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Canonical {
    pub features: FeatureVector,
    pub imputation: ImputationLog,
}

struct Builder<'a> {
    record: &'a RawRecord,
    values: [f64; FEATURE_COUNT],
    log: Vec<Imputation>,
}

impl<'a> Builder<'a> {
    fn new(record: &'a RawRecord) -> Self {
        Self {
            record,
            values: [0.0; FEATURE_COUNT],
            log: Vec::new(),
        }
    }

    fn get(&self, feature: Feature) -> f64 {
        self.values[feature.index()]
    }

    /// Take the supplied value or compute a fallback, then clamp.
    fn resolve(&mut self, feature: Feature, fallback: impl FnOnce(&Self) -> (f64, ImputationMethod)) {
        let (lo, hi) = feature.clamp_range();
        let value = match self.record.value(feature) {
            Some(v) => {
                if !(lo..=hi).contains(&v) {
                    tracing::debug!(
                        feature = feature.column(),
                        value = v,
                        lo,
                        hi,
                        "supplied value outside clamp range"
                    );
                }
                v
            }
            None => {
                let (v, method) = fallback(&*self);
                tracing::debug!(
                    feature = feature.column(),
                    value = v,
                    method = method.as_str(),
                    "imputed missing feature"
                );
                self.log.push(Imputation { feature, method });
                v
            }
        };
        self.values[feature.index()] = clamp(value, lo, hi);
    }

    fn resolve_default(&mut self, feature: Feature, value: f64) {
        self.resolve(feature, |_| (value, ImputationMethod::Default));
    }

    fn finish(self) -> Canonical {
        Canonical {
            features: FeatureVector::from_clamped(self.values),
            imputation: ImputationLog(self.log),
        }
    }
}

fn mass_from_radius(radius: f64) -> (f64, ImputationMethod) {
    if radius < physics::ROCKY_RADIUS_LIMIT {
        (
            radius.powf(ROCKY_MASS_RADIUS_EXPONENT),
            ImputationMethod::RockyMassRadius,
        )
    } else {
        let mass = if radius < 4.0 {
            10.0
        } else if radius < 8.0 {
            50.0
        } else {
            200.0
        };
        (mass, ImputationMethod::GiantRadiusBin)
    }
}

/// Build the canonical feature vector for a sparse record.
///
/// Never fails: missing values are imputed and everything is clamped.
pub fn canonicalize(record: &RawRecord) -> Canonical {
    let mut b = Builder::new(record);

    b.resolve_default(Feature::Radius, DEFAULT_RADIUS);
    b.resolve(Feature::Mass, |b| mass_from_radius(b.get(Feature::Radius)));
    b.resolve_default(Feature::OrbitalPeriod, DEFAULT_PERIOD_DAYS);
    b.resolve_default(Feature::StellarMass, DEFAULT_STELLAR_MASS);
    b.resolve(Feature::SemiMajorAxis, |b| {
        (
            physics::kepler_semi_major_axis(b.get(Feature::OrbitalPeriod), b.get(Feature::StellarMass)),
            ImputationMethod::KeplerThirdLaw,
        )
    });
    b.resolve_default(Feature::Eccentricity, DEFAULT_ECCENTRICITY);
    b.resolve_default(Feature::StellarTemperature, physics::SOLAR_TEFF);
    b.resolve_default(Feature::StellarRadius, DEFAULT_STELLAR_RADIUS);
    b.resolve(Feature::StellarLuminosity, |b| {
        (
            physics::stefan_boltzmann_luminosity(
                b.get(Feature::StellarRadius),
                b.get(Feature::StellarTemperature),
            ),
            ImputationMethod::StefanBoltzmann,
        )
    });
    b.resolve(Feature::Insolation, |b| {
        (
            physics::insolation(b.get(Feature::StellarLuminosity), b.get(Feature::SemiMajorAxis)),
            ImputationMethod::InverseSquareFlux,
        )
    });
    b.resolve(Feature::EquilibriumTemperature, |b| {
        (
            physics::equilibrium_temperature(b.get(Feature::Insolation)),
            ImputationMethod::FluxPowerLaw,
        )
    });
    b.resolve(Feature::Density, |b| {
        match physics::bulk_density(b.get(Feature::Mass), b.get(Feature::Radius)) {
            Some(rho) => (rho, ImputationMethod::MassRadiusVolume),
            None => (physics::EARTH_DENSITY, ImputationMethod::EarthDensityFallback),
        }
    });

    b.finish()
}

/// Literal Earth record with every field supplied.
pub fn earth_record() -> RawRecord {
    RawRecord::complete([
        1.0, 1.0, 365.25, 1.0, 0.0167, 1.0, 255.0, 5.51, 5778.0, 1.0, 1.0, 1.0,
    ])
}

/// Canonical Earth vector, the calibration anchor.
pub fn earth_reference() -> FeatureVector {
    canonicalize(&earth_record()).features
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn earth_needs_no_imputation() {
        let out = canonicalize(&earth_record());
        assert!(out.imputation.is_empty());
        assert_eq!(out.features.get(Feature::EquilibriumTemperature), 255.0);
        assert_eq!(out.features.get(Feature::Radius), 1.0);
        assert_eq!(out.features, earth_reference());
    }

    #[test]
    fn full_record_is_idempotent() {
        let first = canonicalize(&earth_record());
        let second = canonicalize(&earth_record());
        assert_eq!(first.features.as_array(), second.features.as_array());
        assert!(second.imputation.is_empty());

        let again = RawRecord::complete(*first.features.as_array());
        assert_eq!(canonicalize(&again).features, first.features);
    }

    #[test]
    fn empty_record_uses_defaults_and_formulas() {
        let out = canonicalize(&RawRecord::default());
        let f = &out.features;
        assert_eq!(out.imputation.len(), 12);

        assert_eq!(f.get(Feature::Radius), 6.0);
        assert_eq!(f.get(Feature::Mass), 50.0);
        assert_eq!(out.imputation.method_for(Feature::Mass), Some(ImputationMethod::GiantRadiusBin));
        assert_eq!(f.get(Feature::OrbitalPeriod), 10.0);

        let a = (10.0f64 / 365.25).powi(2).cbrt();
        assert!((f.get(Feature::SemiMajorAxis) - a).abs() < 1e-12);
        assert_eq!(
            out.imputation.method_for(Feature::SemiMajorAxis),
            Some(ImputationMethod::KeplerThirdLaw)
        );
        assert!((f.get(Feature::StellarLuminosity) - 1.0).abs() < 1e-12);
        // Close-in default orbit saturates the insolation clamp.
        assert_eq!(f.get(Feature::Insolation), 100.0);
        assert!((f.get(Feature::EquilibriumTemperature) - 278.5 * 100f64.powf(0.25)).abs() < 1e-9);
        assert_eq!(
            out.imputation.method_for(Feature::Density),
            Some(ImputationMethod::MassRadiusVolume)
        );
    }

    #[test]
    fn small_planet_mass_uses_rocky_relation() {
        let mut record = RawRecord::default();
        record.planet.radius = Some(1.2);
        let out = canonicalize(&record);
        assert!((out.features.get(Feature::Mass) - 1.2f64.powf(2.06)).abs() < 1e-12);
        assert_eq!(
            out.imputation.method_for(Feature::Mass),
            Some(ImputationMethod::RockyMassRadius)
        );
        assert!(!out.imputation.contains(Feature::Radius));
    }

    #[test]
    fn supplied_values_are_clamped_not_replaced() {
        let mut record = earth_record();
        record.planet.radius = Some(-3.0);
        record.planet.insolation = Some(f64::INFINITY);
        record.planet.eccentricity = Some(1.5);
        let out = canonicalize(&record);
        assert_eq!(out.features.get(Feature::Radius), 0.1);
        assert_eq!(out.features.get(Feature::Insolation), 100.0);
        assert_eq!(out.features.get(Feature::Eccentricity), 1.0);
        assert!(out.imputation.is_empty());
    }

    #[test]
    fn imputation_follows_resolution_order() {
        let mut record = RawRecord::default();
        record.planet.radius = Some(1.0);
        record.planet.mass = Some(1.0);
        let out = canonicalize(&record);
        let order: Vec<Feature> = out.imputation.as_slice().iter().map(|i| i.feature).collect();
        assert_eq!(
            order,
            vec![
                Feature::OrbitalPeriod,
                Feature::StellarMass,
                Feature::SemiMajorAxis,
                Feature::Eccentricity,
                Feature::StellarTemperature,
                Feature::StellarRadius,
                Feature::StellarLuminosity,
                Feature::Insolation,
                Feature::EquilibriumTemperature,
                Feature::Density,
            ]
        );
    }

    fn sparse_value() -> impl Strategy<Value = Option<f64>> {
        prop_oneof![
            Just(None),
            Just(Some(f64::NAN)),
            Just(Some(f64::INFINITY)),
            Just(Some(f64::NEG_INFINITY)),
            (-1e7f64..1e7).prop_map(Some),
            (0.0f64..10.0).prop_map(Some),
        ]
    }

    fn sparse_record() -> impl Strategy<Value = RawRecord> {
        proptest::collection::vec(sparse_value(), FEATURE_COUNT).prop_map(|v| {
            let mut record = RawRecord::default();
            record.planet.radius = v[0];
            record.planet.mass = v[1];
            record.planet.orbital_period = v[2];
            record.planet.semi_major_axis = v[3];
            record.planet.eccentricity = v[4];
            record.planet.insolation = v[5];
            record.planet.equilibrium_temperature = v[6];
            record.planet.density = v[7];
            record.star.temperature = v[8];
            record.star.mass = v[9];
            record.star.radius = v[10];
            record.star.luminosity = v[11];
            record
        })
    }

    proptest! {
        #[test]
        fn every_field_is_finite_and_in_range(record in sparse_record()) {
            let out = canonicalize(&record);
            for feature in Feature::ALL {
                let v = out.features.get(feature);
                let (lo, hi) = feature.clamp_range();
                prop_assert!(v.is_finite(), "{feature} = {v}");
                prop_assert!(v >= lo && v <= hi, "{feature} = {v} outside [{lo}, {hi}]");
            }
            prop_assert!(FeatureVector::try_from_array(*out.features.as_array()).is_ok());
        }
    }
}
