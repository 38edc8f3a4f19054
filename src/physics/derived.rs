//! Closed-form derived quantities.
//!
//! Units follow the archive conventions used by the feature vector: Earth
//! radii/masses for planets, solar units for stars, days for periods, AU for
//! distances and Earth flux units for insolation.

use serde::{Deserialize, Serialize};

use crate::math::logistic;

/// Gravitational constant, m^3 kg^-1 s^-2.
pub const G: f64 = 6.674_30e-11;
/// Earth mass, kg.
pub const EARTH_MASS_KG: f64 = 5.972e24;
/// Earth radius, m.
pub const EARTH_RADIUS_M: f64 = 6.371e6;
/// Earth bulk density, g/cm^3.
pub const EARTH_DENSITY: f64 = 5.51;
/// Solar effective temperature, K.
pub const SOLAR_TEFF: f64 = 5778.0;
pub const DAYS_PER_YEAR: f64 = 365.25;

/// `T_eq` of a body receiving one Earth flux with Earth-like albedo.
pub const EQT_AT_ONE_FLUX: f64 = 278.5;

/// Radius (R⊕) below which a body is treated as rocky by the legacy formulas.
pub const ROCKY_RADIUS_LIMIT: f64 = 1.6;

pub const GREENHOUSE_OFFSET_ROCKY: f64 = 33.0;
pub const GREENHOUSE_OFFSET_THICK: f64 = 70.0;

const TIDAL_LOCK_CENTER_DAYS: f64 = 25.0;
const TIDAL_LOCK_WIDTH_DAYS: f64 = 5.0;

/// Bulk density in g/cm^3 from mass (M⊕) and radius (R⊕).
///
/// Returns `None` when the sphere volume is not positive.
pub fn bulk_density(mass_earth: f64, radius_earth: f64) -> Option<f64> {
    let mass_kg = mass_earth * EARTH_MASS_KG;
    let radius_m = radius_earth * EARTH_RADIUS_M;
    let volume_m3 = (4.0 / 3.0) * std::f64::consts::PI * radius_m.powi(3);
    if !(volume_m3 > 0.0) {
        return None;
    }
    // kg/m^3 -> g/cm^3
    Some(mass_kg / volume_m3 / 1000.0)
}

/// Surface escape velocity in km/s. Zero for a non-positive radius.
pub fn escape_velocity_kms(mass_earth: f64, radius_earth: f64) -> f64 {
    let mass_kg = mass_earth * EARTH_MASS_KG;
    let radius_m = radius_earth * EARTH_RADIUS_M;
    if radius_m <= 0.0 {
        return 0.0;
    }
    (2.0 * G * mass_kg / radius_m).sqrt() / 1000.0
}

/// Semi-major axis (AU) from period (days) and stellar mass (M☉), Kepler's third law.
pub fn kepler_semi_major_axis(period_days: f64, stellar_mass: f64) -> f64 {
    let p_years = period_days / DAYS_PER_YEAR;
    (p_years * p_years * stellar_mass).cbrt()
}

/// Luminosity (L☉) from radius (R☉) and effective temperature (K).
pub fn stefan_boltzmann_luminosity(stellar_radius: f64, teff: f64) -> f64 {
    stellar_radius * stellar_radius * (teff / SOLAR_TEFF).powi(4)
}

/// Insolation (S⊕) at `semi_major_axis` AU from a star of `luminosity` L☉.
pub fn insolation(luminosity: f64, semi_major_axis: f64) -> f64 {
    luminosity / (semi_major_axis * semi_major_axis)
}

/// Equilibrium temperature (K) from insolation.
pub fn equilibrium_temperature(insolation: f64) -> f64 {
    EQT_AT_ONE_FLUX * insolation.powf(0.25)
}

/// Greenhouse offset (K) added on top of `T_eq` when no surface temperature is known.
pub fn greenhouse_offset(radius_earth: f64) -> f64 {
    if radius_earth < ROCKY_RADIUS_LIMIT {
        GREENHOUSE_OFFSET_ROCKY
    } else {
        GREENHOUSE_OFFSET_THICK
    }
}

/// Sign convention of the tidal-lock indicator.
///
/// Both conventions share the logistic centered at 25 days with width 5; they
/// differ in which end of the period axis maps to 1. There is deliberately no
/// default: callers must pick one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TidalLockConvention {
    /// `1 / (1 + exp(-(P - 25) / 5))`: long periods approach 1.
    LongPeriodHigh,
    /// `1 / (1 + exp((P - 25) / 5))`: short (likely locked) periods approach 1.
    ShortPeriodHigh,
}

/// Tidal-lock indicator in `(0, 1)` for an orbital period in days.
pub fn tidal_lock_indicator(period_days: f64, convention: TidalLockConvention) -> f64 {
    let rising = logistic(period_days, TIDAL_LOCK_CENTER_DAYS, TIDAL_LOCK_WIDTH_DAYS);
    match convention {
        TidalLockConvention::LongPeriodHigh => rising,
        TidalLockConvention::ShortPeriodHigh => 1.0 - rising,
    }
}

/// Where a resolved surface temperature came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceTemperatureSource {
    Simulated,
    RecordEquilibrium,
    EstimatedWithGreenhouse,
}

/// Surface temperature (K) by priority: simulated value, recorded `T_eq`, or
/// `T_eq(insolation)` plus a radius-dependent greenhouse offset.
pub fn surface_temperature(
    simulated: Option<f64>,
    recorded_equilibrium: Option<f64>,
    insolation: f64,
    radius_earth: f64,
) -> (f64, SurfaceTemperatureSource) {
    if let Some(t) = simulated.filter(|t| t.is_finite()) {
        return (t, SurfaceTemperatureSource::Simulated);
    }
    if let Some(t) = recorded_equilibrium.filter(|t| t.is_finite()) {
        return (t, SurfaceTemperatureSource::RecordEquilibrium);
    }
    (
        equilibrium_temperature(insolation) + greenhouse_offset(radius_earth),
        SurfaceTemperatureSource::EstimatedWithGreenhouse,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn earth_density_from_mass_and_radius() {
        let rho = bulk_density(1.0, 1.0).unwrap();
        assert!((rho - 5.513).abs() < 1e-3, "got {rho}");
        assert!(bulk_density(1.0, 0.0).is_none());
    }

    #[test]
    fn earth_escape_velocity() {
        let v = escape_velocity_kms(1.0, 1.0);
        assert!((v - 11.186).abs() < 0.01, "got {v}");
        assert_eq!(escape_velocity_kms(1.0, 0.0), 0.0);
    }

    #[test]
    fn kepler_one_year_is_one_au() {
        let a = kepler_semi_major_axis(365.25, 1.0);
        assert!((a - 1.0).abs() < 1e-12);
    }

    #[test]
    fn solar_luminosity_and_flux() {
        assert!((stefan_boltzmann_luminosity(1.0, SOLAR_TEFF) - 1.0).abs() < 1e-12);
        assert!((insolation(1.0, 2.0) - 0.25).abs() < 1e-12);
        assert!((equilibrium_temperature(1.0) - 278.5).abs() < 1e-12);
    }

    #[test]
    fn tidal_lock_conventions_are_mirrored() {
        for p in [1.0, 10.0, 25.0, 88.0, 365.25] {
            let up = tidal_lock_indicator(p, TidalLockConvention::LongPeriodHigh);
            let down = tidal_lock_indicator(p, TidalLockConvention::ShortPeriodHigh);
            assert!((up + down - 1.0).abs() < 1e-12);
        }
        assert!(tidal_lock_indicator(365.25, TidalLockConvention::LongPeriodHigh) > 0.99);
        assert!(tidal_lock_indicator(2.0, TidalLockConvention::ShortPeriodHigh) > 0.99);
    }

    #[test]
    fn surface_temperature_priority() {
        let (t, src) = surface_temperature(Some(288.0), Some(255.0), 1.0, 1.0);
        assert_eq!((t, src), (288.0, SurfaceTemperatureSource::Simulated));

        let (t, src) = surface_temperature(None, Some(255.0), 1.0, 1.0);
        assert_eq!((t, src), (255.0, SurfaceTemperatureSource::RecordEquilibrium));

        let (t, src) = surface_temperature(None, None, 1.0, 1.0);
        assert_eq!(src, SurfaceTemperatureSource::EstimatedWithGreenhouse);
        assert!((t - (278.5 + 33.0)).abs() < 1e-9);

        let (t, _) = surface_temperature(None, None, 1.0, 2.0);
        assert!((t - (278.5 + 70.0)).abs() < 1e-9);
    }
}
