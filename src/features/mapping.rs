//! Simulator body -> [`RawRecord`] mapping.
//!
//! Simulator bodies carry their own key names and a few derived values
//! (surface temperature, greenhouse offset). This is the only place those are
//! translated into archive-convention inputs. Nothing is imputed here; missing
//! optional fields are left for the canonicalizer.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{Feature, PlanetFields, RawRecord, StarFields};
use crate::error::{Result, ScoreError};
use crate::physics::GREENHOUSE_OFFSET_ROCKY;

const RADIUS_UNIT_LIMIT: f64 = 25.0;
const DENSITY_UNIT_LIMIT: f64 = 20.0;

/// Planet as exposed by the simulator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimPlanet {
    pub name: Option<String>,
    /// Earth radii (not the rendered radius in km).
    pub radius: Option<f64>,
    /// Earth masses.
    pub mass: Option<f64>,
    pub orbital_period: Option<f64>,
    /// Legacy alias for `orbital_period`.
    pub orbper: Option<f64>,
    #[serde(alias = "semiMajorAxis")]
    pub semi_major_axis: Option<f64>,
    pub eccentricity: Option<f64>,
    #[serde(alias = "stellarFlux")]
    pub stellar_flux: Option<f64>,
    pub equilibrium_temperature: Option<f64>,
    /// Surface temperature including greenhouse warming.
    pub temperature: Option<f64>,
    pub greenhouse_offset: Option<f64>,
    /// g/cm^3.
    pub density: Option<f64>,
    pub preset_type: Option<String>,
}

/// Host star as exposed by the simulator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimStar {
    pub temperature: Option<f64>,
    pub mass: Option<f64>,
    pub radius: Option<f64>,
    pub luminosity: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimBody {
    pub planet: SimPlanet,
    pub star: SimStar,
}

impl SimBody {
    pub fn is_earth_preset(&self) -> bool {
        self.planet.preset_type.as_deref() == Some("Earth")
    }

    /// Simulator preset for Earth around the Sun.
    pub fn earth_preset() -> Self {
        Self {
            planet: SimPlanet {
                name: Some("Earth".to_string()),
                radius: Some(1.0),
                mass: Some(1.0),
                orbital_period: Some(365.25),
                orbper: Some(365.25),
                semi_major_axis: Some(1.0),
                eccentricity: Some(0.0167),
                stellar_flux: Some(1.0),
                equilibrium_temperature: Some(255.0),
                temperature: Some(288.0),
                greenhouse_offset: Some(33.0),
                density: Some(5.51),
                preset_type: Some("Earth".to_string()),
            },
            star: SimStar {
                temperature: Some(5778.0),
                mass: Some(1.0),
                radius: Some(1.0),
                luminosity: Some(1.0),
            },
        }
    }
}

/// What the mapper did with each key.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MappingDiagnostics {
    /// Archive column -> simulator source path.
    pub mapped_keys: BTreeMap<String, String>,
    pub missing_critical: Vec<String>,
    pub missing_optional: Vec<String>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MappingOutcome {
    Mapped {
        record: RawRecord,
        diagnostics: MappingDiagnostics,
    },
    Rejected {
        diagnostics: MappingDiagnostics,
    },
}

impl MappingOutcome {
    pub fn diagnostics(&self) -> &MappingDiagnostics {
        match self {
            MappingOutcome::Mapped { diagnostics, .. } | MappingOutcome::Rejected { diagnostics } => {
                diagnostics
            }
        }
    }

    /// Convert a rejection into [`ScoreError::MissingCriticalField`].
    pub fn into_result(self) -> Result<(RawRecord, MappingDiagnostics)> {
        match self {
            MappingOutcome::Mapped { record, diagnostics } => Ok((record, diagnostics)),
            MappingOutcome::Rejected { diagnostics } => {
                Err(ScoreError::MissingCriticalField(diagnostics.missing_critical))
            }
        }
    }
}

struct Mapper {
    diagnostics: MappingDiagnostics,
}

impl Mapper {
    fn optional(&mut self, feature: Feature, value: Option<f64>, source: &str) -> Option<f64> {
        match value {
            Some(v) => {
                if v.is_nan() {
                    self.diagnostics.warnings.push(format!("{feature} is NaN"));
                }
                self.diagnostics
                    .mapped_keys
                    .insert(feature.column().to_string(), source.to_string());
                Some(v)
            }
            None => {
                self.diagnostics.missing_optional.push(feature.column().to_string());
                None
            }
        }
    }
}

/// Map a simulator body onto a sparse record.
///
/// Critical fields are `planet.radius`, `planet.mass`, `star.temperature` and
/// `star.mass`; if any is absent the body is rejected with no partial record.
pub fn map_body(body: &SimBody) -> MappingOutcome {
    let planet = &body.planet;
    let star = &body.star;
    let mut m = Mapper { diagnostics: MappingDiagnostics::default() };

    let critical = [
        ("planet.radius", planet.radius),
        ("planet.mass", planet.mass),
        ("star.temperature", star.temperature),
        ("star.mass", star.mass),
    ];
    for (key, value) in critical {
        if value.is_none_or(f64::is_nan) {
            m.diagnostics.missing_critical.push(key.to_string());
        }
    }
    if !m.diagnostics.missing_critical.is_empty() {
        m.diagnostics.warnings.push(format!(
            "Cannot compute score: missing critical fields [{}]",
            m.diagnostics.missing_critical.join(", ")
        ));
        return MappingOutcome::Rejected { diagnostics: m.diagnostics };
    }

    let radius = m.optional(Feature::Radius, planet.radius, "planet.radius");
    if let Some(r) = radius.filter(|r| *r > RADIUS_UNIT_LIMIT) {
        m.diagnostics.warnings.push(format!(
            "UNIT MISMATCH WARNING: pl_rade={r:.2} > {RADIUS_UNIT_LIMIT} R_E. \
             Check if using a physical radius (km/m) instead of Earth radii."
        ));
    }
    let mass = m.optional(Feature::Mass, planet.mass, "planet.mass");

    let orbital_period = m.optional(
        Feature::OrbitalPeriod,
        planet.orbital_period.or(planet.orbper),
        "planet.orbital_period or planet.orbper",
    );
    let semi_major_axis =
        m.optional(Feature::SemiMajorAxis, planet.semi_major_axis, "planet.semi_major_axis");
    let eccentricity = m.optional(Feature::Eccentricity, planet.eccentricity, "planet.eccentricity");
    let insolation = m.optional(Feature::Insolation, planet.stellar_flux, "planet.stellar_flux");

    let equilibrium_temperature = match planet.equilibrium_temperature {
        Some(_) => m.optional(
            Feature::EquilibriumTemperature,
            planet.equilibrium_temperature,
            "planet.equilibrium_temperature",
        ),
        None => {
            m.diagnostics
                .missing_optional
                .push(Feature::EquilibriumTemperature.column().to_string());
            m.diagnostics
                .warnings
                .push("Using planet surface temperature as proxy for equilibrium temperature".to_string());
            planet.temperature.map(|t| {
                m.diagnostics.mapped_keys.insert(
                    Feature::EquilibriumTemperature.column().to_string(),
                    "planet.temperature - greenhouse_offset (estimated)".to_string(),
                );
                t - planet.greenhouse_offset.unwrap_or(GREENHOUSE_OFFSET_ROCKY)
            })
        }
    };

    let density = m.optional(Feature::Density, planet.density, "planet.density");
    if let Some(d) = density.filter(|d| *d > DENSITY_UNIT_LIMIT) {
        m.diagnostics.warnings.push(format!(
            "UNIT MISMATCH WARNING: pl_dens={d:.2} > {DENSITY_UNIT_LIMIT} g/cm^3. \
             Check if using kg/m^3 (divide by 1000 to get g/cm^3)."
        ));
    }

    let st_teff = m.optional(Feature::StellarTemperature, star.temperature, "star.temperature");
    let st_mass = m.optional(Feature::StellarMass, star.mass, "star.mass");
    let st_rad = m.optional(Feature::StellarRadius, star.radius, "star.radius");
    let st_lum = m.optional(Feature::StellarLuminosity, star.luminosity, "star.luminosity");

    let record = RawRecord {
        planet: PlanetFields {
            radius,
            mass,
            orbital_period,
            semi_major_axis,
            eccentricity,
            insolation,
            equilibrium_temperature,
            density,
        },
        star: StarFields {
            temperature: st_teff,
            mass: st_mass,
            radius: st_rad,
            luminosity: st_lum,
        },
    };

    MappingOutcome::Mapped { record, diagnostics: m.diagnostics }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::canonical::{canonicalize, earth_record};

    #[test]
    fn earth_preset_maps_to_literal_record() {
        let (record, diagnostics) = map_body(&SimBody::earth_preset()).into_result().unwrap();
        assert_eq!(record, earth_record());
        assert!(diagnostics.missing_optional.is_empty());
        assert!(diagnostics.warnings.is_empty());
        assert_eq!(diagnostics.mapped_keys.len(), 12);
        assert!(canonicalize(&record).imputation.is_empty());
    }

    #[test]
    fn missing_critical_fields_reject() {
        let mut body = SimBody::earth_preset();
        body.planet.mass = None;
        body.star.temperature = None;
        let outcome = map_body(&body);
        assert!(matches!(outcome, MappingOutcome::Rejected { .. }));
        assert_eq!(
            outcome.diagnostics().missing_critical,
            vec!["planet.mass".to_string(), "star.temperature".to_string()]
        );
        match outcome.into_result() {
            Err(ScoreError::MissingCriticalField(fields)) => assert_eq!(fields.len(), 2),
            other => panic!("expected MissingCriticalField, got {other:?}"),
        }
    }

    #[test]
    fn nan_critical_fields_count_as_missing() {
        let mut body = SimBody::earth_preset();
        body.planet.radius = Some(f64::NAN);
        body.star.mass = Some(f64::NAN);
        let outcome = map_body(&body);
        assert!(matches!(outcome, MappingOutcome::Rejected { .. }));
        assert_eq!(
            outcome.diagnostics().missing_critical,
            vec!["planet.radius".to_string(), "star.mass".to_string()]
        );
    }

    #[test]
    fn surface_temperature_stands_in_for_equilibrium() {
        let mut body = SimBody::earth_preset();
        body.planet.equilibrium_temperature = None;
        body.planet.temperature = Some(300.0);
        body.planet.greenhouse_offset = None;
        let (record, diagnostics) = map_body(&body).into_result().unwrap();
        assert_eq!(record.planet.equilibrium_temperature, Some(267.0));
        assert!(diagnostics.missing_optional.contains(&"pl_eqt".to_string()));
        assert!(diagnostics.mapped_keys["pl_eqt"].contains("estimated"));
    }

    #[test]
    fn orbper_alias_and_missing_optionals() {
        let body = SimBody {
            planet: SimPlanet {
                radius: Some(1.1),
                mass: Some(1.3),
                orbper: Some(12.0),
                ..SimPlanet::default()
            },
            star: SimStar {
                temperature: Some(3200.0),
                mass: Some(0.2),
                ..SimStar::default()
            },
        };
        let (record, diagnostics) = map_body(&body).into_result().unwrap();
        assert_eq!(record.planet.orbital_period, Some(12.0));
        assert_eq!(record.planet.equilibrium_temperature, None);
        for key in ["pl_orbsmax", "pl_orbeccen", "pl_insol", "pl_eqt", "pl_dens", "st_rad", "st_lum"] {
            assert!(diagnostics.missing_optional.contains(&key.to_string()), "{key}");
        }
    }

    #[test]
    fn unit_mismatches_warn() {
        let mut body = SimBody::earth_preset();
        body.planet.radius = Some(6371.0);
        body.planet.density = Some(5510.0);
        let (_, diagnostics) = map_body(&body).into_result().unwrap();
        let unit_warnings = diagnostics
            .warnings
            .iter()
            .filter(|w| w.starts_with("UNIT MISMATCH"))
            .count();
        assert_eq!(unit_warnings, 2);
    }

    #[test]
    fn simulator_json_aliases() {
        let json = r#"{
            "planet": {"radius": 1.0, "mass": 1.0, "semiMajorAxis": 1.0, "stellarFlux": 1.0},
            "star": {"temperature": 5778.0, "mass": 1.0}
        }"#;
        let body: SimBody = serde_json::from_str(json).unwrap();
        assert_eq!(body.planet.semi_major_axis, Some(1.0));
        assert_eq!(body.planet.stellar_flux, Some(1.0));
    }
}
