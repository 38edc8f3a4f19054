//! Rocky / giant classification from radius and bulk density.
//!
//! Pure functions. The classifier only decides whether a "surface" score is
//! meaningful; it never changes the score itself.

use serde::{Deserialize, Serialize};

use crate::domain::SurfaceMode;

const RADIUS_DOMAIN: (f64, f64) = (0.05, 25.0);
const DENSITY_DOMAIN: (f64, f64) = (0.1, 20.0);

const GIANT_RADIUS: f64 = 3.0;
const PUFFY_RADIUS: f64 = 2.0;
const PUFFY_DENSITY: f64 = 2.5;
const ROCKY_MAX_RADIUS: f64 = 1.8;
const ROCKY_MIN_DENSITY: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceClass {
    Rocky,
    Giant,
    Unknown,
}

impl SurfaceClass {
    pub fn as_str(self) -> &'static str {
        match self {
            SurfaceClass::Rocky => "rocky",
            SurfaceClass::Giant => "giant",
            SurfaceClass::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for SurfaceClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceClassification {
    pub class: SurfaceClass,
    /// True only for rocky bodies.
    pub applicable: bool,
    pub reason: String,
    pub warnings: Vec<String>,
}

impl SurfaceClassification {
    fn new(class: SurfaceClass, reason: String) -> Self {
        Self {
            class,
            applicable: class == SurfaceClass::Rocky,
            reason,
            warnings: Vec::new(),
        }
    }
}

/// Classify a body from radius (R⊕) and density (g/cm^3).
///
/// Values outside the physical domain are reported as `unknown` with a
/// unit-mismatch warning rather than being clamped.
pub fn classify(radius: f64, density: f64) -> SurfaceClassification {
    let in_domain = |x: f64, (lo, hi): (f64, f64)| x.is_finite() && x >= lo && x <= hi;

    if !in_domain(radius, RADIUS_DOMAIN) {
        let mut out = SurfaceClassification::new(
            SurfaceClass::Unknown,
            format!("Radius out of range ({radius:.2} R_E) - check units"),
        );
        out.warnings.push(format!(
            "pl_rade={radius:.2} R_E outside expected range [{}, {}] - possible unit mismatch",
            RADIUS_DOMAIN.0, RADIUS_DOMAIN.1
        ));
        return out;
    }
    if !in_domain(density, DENSITY_DOMAIN) {
        let mut out = SurfaceClassification::new(
            SurfaceClass::Unknown,
            format!("Density out of range ({density:.2} g/cm^3) - check units"),
        );
        out.warnings.push(format!(
            "pl_dens={density:.2} g/cm^3 outside expected range [{}, {}] - possible unit mismatch",
            DENSITY_DOMAIN.0, DENSITY_DOMAIN.1
        ));
        return out;
    }

    if radius >= GIANT_RADIUS {
        return SurfaceClassification::new(
            SurfaceClass::Giant,
            format!("Large radius ({radius:.2} R_E) indicates gas/ice giant"),
        );
    }
    if radius >= PUFFY_RADIUS && density <= PUFFY_DENSITY {
        return SurfaceClassification::new(
            SurfaceClass::Giant,
            format!(
                "Low density ({density:.2} g/cm^3) with moderate radius ({radius:.2} R_E) indicates H/He envelope"
            ),
        );
    }
    if radius <= ROCKY_MAX_RADIUS && density >= ROCKY_MIN_DENSITY {
        return SurfaceClassification::new(
            SurfaceClass::Rocky,
            format!("Small radius ({radius:.2} R_E) with rocky density ({density:.2} g/cm^3)"),
        );
    }
    SurfaceClassification::new(
        SurfaceClass::Unknown,
        format!("Ambiguous: radius={radius:.2} R_E, density={density:.2} g/cm^3 (transition zone)"),
    )
}

/// Classify from possibly missing inputs. Either value absent (or NaN) is
/// `unknown`; nothing is imputed for display decisions.
pub fn classify_supplied(radius: Option<f64>, density: Option<f64>) -> SurfaceClassification {
    match (radius.filter(|r| !r.is_nan()), density.filter(|d| !d.is_nan())) {
        (Some(r), Some(d)) => classify(r, d),
        _ => {
            let mut out = SurfaceClassification::new(
                SurfaceClass::Unknown,
                "Missing radius or density data".to_string(),
            );
            out.warnings.push("pl_rade or pl_dens is None".to_string());
            out
        }
    }
}

/// Badge text shown next to a body.
pub fn display_label(class: SurfaceClass, mode: SurfaceMode) -> &'static str {
    match (class, mode) {
        (SurfaceClass::Rocky, _) => "",
        (SurfaceClass::Giant, SurfaceMode::All) => "Gas/Ice Giant",
        (SurfaceClass::Giant, SurfaceMode::RockyOnly) => "Surface N/A (Gas/Ice Giant)",
        (SurfaceClass::Unknown, _) => "Classification Uncertain",
    }
}

pub fn should_display_score(class: SurfaceClass, mode: SurfaceMode) -> bool {
    match mode {
        SurfaceMode::All => true,
        SurfaceMode::RockyOnly => class == SurfaceClass::Rocky,
    }
}
